//! Permission-filtered navigation.

use serde::{Deserialize, Serialize};

/// A sidebar/menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NavItem {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            icon: None,
        }
    }
}

/// Capabilities of the signed-in user, as reported by the permissions API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPermissions {
    pub is_owner: bool,
    pub is_billing_admin: bool,
    pub is_admin: bool,
    pub can_manage_agents: bool,
}

/// Whether a route is visible for the given permissions.
pub fn is_route_visible(url: &str, permissions: &UserPermissions) -> bool {
    match url {
        "/billing" => permissions.is_owner || permissions.is_billing_admin,
        "/analytics" => true,
        "/audit-logs" | "/manage" => permissions.is_owner,
        _ => true,
    }
}

/// Keep the entries the user may see, in their original order.
///
/// Without permissions nothing is shown.
pub fn filter_nav_items_by_role(
    items: &[NavItem],
    permissions: Option<&UserPermissions>,
) -> Vec<NavItem> {
    let Some(permissions) = permissions else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| is_route_visible(&item.url, permissions))
        .cloned()
        .collect()
}
