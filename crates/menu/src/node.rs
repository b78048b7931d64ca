use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use gatehouse_auth::Principal;

/// Node flavor, which decides the structural rules a node must obey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MenuKind {
    /// Leaf entry resolving to a concrete link. Never carries children.
    Item,
    /// Collapsible sub-menu. Carries children, never a route.
    Sub,
    /// Visual grouping of entries. Carries children, never a route.
    Group,
}

impl fmt::Display for MenuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuKind::Item => "menu item",
            MenuKind::Sub => "sub-menu",
            MenuKind::Group => "menu group",
        })
    }
}

/// Custom visibility rule attached to a node by its provider.
///
/// A named capability rather than a closure, so declared trees stay
/// inspectable and carry no hidden captured state.
pub trait MenuVisibility: fmt::Debug + Send + Sync {
    fn evaluate(&self, principal: &dyn Principal) -> bool;
}

/// Named route plus parameters, resolved to a link at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub name: String,
    pub params: BTreeMap<String, String>,
}

impl RouteTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// One node of a declared (or filtered) navigation forest.
///
/// Declaration fields (constraints, route) are build-time inputs and are not
/// serialized; what goes over the wire is title, type, the resolved link, an
/// explicit direct-access marker and the surviving children.
#[derive(Debug, Clone, Serialize)]
pub struct MenuNode {
    pub title: String,

    #[serde(rename = "type")]
    pub kind: MenuKind,

    /// `|`/`;`/`,`-separated permission alternatives; any one suffices.
    #[serde(skip)]
    pub permission: Option<String>,

    /// Role alternatives, same separator convention.
    #[serde(skip)]
    pub role: Option<String>,

    /// Group alternatives, same separator convention.
    #[serde(skip)]
    pub group: Option<String>,

    #[serde(skip)]
    pub validator: Option<Arc<dyn MenuVisibility>>,

    /// Whether the link opens outside the shell navigation. Explicit `false`
    /// is normalized away during the build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directly: Option<bool>,

    #[serde(skip)]
    pub route: Option<RouteTarget>,

    /// Resolved URL; only ever set on emitted `Item` nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn item(title: impl Into<String>) -> Self {
        Self::new(title, MenuKind::Item)
    }

    pub fn sub(title: impl Into<String>) -> Self {
        Self::new(title, MenuKind::Sub)
    }

    pub fn group(title: impl Into<String>) -> Self {
        Self::new(title, MenuKind::Group)
    }

    fn new(title: impl Into<String>, kind: MenuKind) -> Self {
        Self {
            title: title.into(),
            kind,
            permission: None,
            role: None,
            group: None,
            validator: None,
            directly: None,
            route: None,
            link: None,
            children: Vec::new(),
        }
    }

    pub fn with_permission(mut self, spec: impl Into<String>) -> Self {
        self.permission = Some(spec.into());
        self
    }

    pub fn with_role(mut self, spec: impl Into<String>) -> Self {
        self.role = Some(spec.into());
        self
    }

    pub fn with_group(mut self, spec: impl Into<String>) -> Self {
        self.group = Some(spec.into());
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn MenuVisibility>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_directly(mut self, directly: bool) -> Self {
        self.directly = Some(directly);
        self
    }

    pub fn with_route(mut self, route: RouteTarget) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = children;
        self
    }

    /// True when no visibility constraint of any kind is declared.
    pub fn is_unconstrained(&self) -> bool {
        self.permission.is_none()
            && self.role.is_none()
            && self.group.is_none()
            && self.validator.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_shape_hides_declaration_fields() {
        let node = MenuNode::item("Users")
            .with_permission("users.read")
            .with_route(RouteTarget::new("admin.users"));

        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "title": "Users", "type": "Item" })
        );
    }

    #[test]
    fn serialized_shape_keeps_link_directly_and_children() {
        let mut leaf = MenuNode::item("Users").with_directly(true);
        leaf.link = Some("/admin/users".to_string());
        let node = MenuNode::sub("Access Control").with_children(vec![leaf]);

        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "title": "Access Control",
                "type": "Sub",
                "children": [
                    {
                        "title": "Users",
                        "type": "Item",
                        "directly": true,
                        "link": "/admin/users",
                    }
                ],
            })
        );
    }
}
