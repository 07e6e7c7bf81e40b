//! Sidebar navigation filtered by the signed-in user's permissions.

use agentdesk_shared::{filter_nav_items_by_role, NavItem, UserPermissions};
use dioxus::prelude::*;

/// Permissions of the signed-in user. `None` until the auth layer has loaded them.
#[derive(Clone, Copy, Debug)]
pub struct PermissionsContext {
    pub permissions: Signal<Option<UserPermissions>>,
}

impl PermissionsContext {
    pub fn set(&mut self, permissions: Option<UserPermissions>) {
        self.permissions.set(permissions);
    }
}

/// Provide a permissions context to the subtree.
pub fn use_permissions_provider(initial: Option<UserPermissions>) -> PermissionsContext {
    let permissions = use_signal(|| initial);
    use_context_provider(|| PermissionsContext { permissions })
}

/// Entries of `items` the user may see. Empty while permissions are unknown.
pub fn use_visible_nav_items(items: Vec<NavItem>) -> Memo<Vec<NavItem>> {
    let ctx = use_context::<PermissionsContext>();
    use_memo(move || filter_nav_items_by_role(&items, ctx.permissions.read().as_ref()))
}
