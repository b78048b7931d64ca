//! Built-in navigation fragments for the admin shell.
//!
//! Each functional area contributes its own provider, the same way external
//! modules would; the route table names every route an item links to.

use std::sync::Arc;

use gatehouse_menu::{MenuNode, MenuProvider, RouteTarget, StaticRouteTable};

/// Core admin area: overview plus user/role/group/permission management.
pub struct AdminMenu;

impl MenuProvider for AdminMenu {
    fn order(&self) -> i32 {
        10
    }

    fn menu(&self) -> Vec<MenuNode> {
        vec![
            MenuNode::item("Overview").with_route(RouteTarget::new("admin.overview")),
            MenuNode::sub("Access Control")
                .with_permission("users.read|roles.read|groups.read")
                .with_role("Admin")
                .with_children(vec![
                    MenuNode::item("Users")
                        .with_permission("users.read")
                        .with_role("Admin")
                        .with_route(RouteTarget::new("admin.users")),
                    MenuNode::item("Roles")
                        .with_permission("roles.read")
                        .with_role("Admin")
                        .with_route(RouteTarget::new("admin.roles")),
                    MenuNode::item("Groups")
                        .with_permission("groups.read")
                        .with_role("Admin")
                        .with_route(RouteTarget::new("admin.groups")),
                    MenuNode::item("Permissions")
                        .with_role("Admin")
                        .with_route(RouteTarget::new("admin.permissions")),
                ]),
        ]
    }
}

/// Announcement area: bulletins and notifications.
pub struct AnnouncementsMenu;

impl MenuProvider for AnnouncementsMenu {
    fn order(&self) -> i32 {
        20
    }

    fn menu(&self) -> Vec<MenuNode> {
        vec![MenuNode::group("Announcements").with_children(vec![
            MenuNode::item("Bulletins")
                .with_permission("bulletins.read")
                .with_role("Admin")
                .with_route(RouteTarget::new("admin.bulletins")),
            MenuNode::item("Notifications")
                .with_route(RouteTarget::new("admin.notifications")),
        ])]
    }
}

pub fn default_providers() -> Vec<Arc<dyn MenuProvider>> {
    vec![Arc::new(AdminMenu), Arc::new(AnnouncementsMenu)]
}

pub fn default_route_table() -> StaticRouteTable {
    StaticRouteTable::new()
        .with_route("admin.overview", "/admin")
        .with_route("admin.users", "/admin/users")
        .with_route("admin.roles", "/admin/roles")
        .with_route("admin.groups", "/admin/groups")
        .with_route("admin.permissions", "/admin/permissions")
        .with_route("admin.bulletins", "/admin/bulletins")
        .with_route("admin.notifications", "/admin/notifications")
}
