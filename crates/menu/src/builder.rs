use std::sync::Arc;

use tracing::debug;

use gatehouse_auth::Principal;

use crate::error::MenuDefectError;
use crate::node::{MenuKind, MenuNode};
use crate::provider::MenuProvider;
use crate::routing::RouteResolver;

/// Builds the navigation forest a principal is allowed to see.
///
/// Holds no per-request state: `build` reads its inputs, returns a freshly
/// assembled forest and is safe to call concurrently for different
/// principals.
pub struct MenuTreeBuilder {
    resolver: Arc<dyn RouteResolver>,
}

impl MenuTreeBuilder {
    pub fn new(resolver: Arc<dyn RouteResolver>) -> Self {
        Self { resolver }
    }

    /// Merge, filter and link the fragments of `providers` for `principal`.
    ///
    /// Providers contribute in ascending order key (ties keep declaration
    /// order). Nodes the principal may not see are dropped silently together
    /// with their subtrees; containers left without visible children are
    /// omitted as well. Only structurally invalid declarations fail.
    pub fn build(
        &self,
        providers: &[Arc<dyn MenuProvider>],
        principal: &dyn Principal,
    ) -> Result<Vec<MenuNode>, MenuDefectError> {
        let mut ordered: Vec<&Arc<dyn MenuProvider>> = providers.iter().collect();
        ordered.sort_by_key(|p| p.order());

        let mut forest = Vec::new();
        for provider in ordered {
            for root in provider.menu() {
                if let Some(node) = self.filter(root, principal)? {
                    forest.push(node);
                }
            }
        }

        debug!(roots = forest.len(), "menu forest assembled");
        Ok(forest)
    }

    /// Structurally validate every declared node of every provider.
    ///
    /// Declaration defects are provider bugs, independent of any principal;
    /// running this at registration/startup time surfaces them before the
    /// first request does. Visibility rules are not evaluated; a defect on a
    /// node nobody can currently see is still a defect.
    pub fn verify(&self, providers: &[Arc<dyn MenuProvider>]) -> Result<(), MenuDefectError> {
        for provider in providers {
            for root in provider.menu() {
                verify_structure(&root)?;
            }
        }
        Ok(())
    }

    /// Bottom-up rebuild of one subtree: `None` means pruned.
    fn filter(
        &self,
        node: MenuNode,
        principal: &dyn Principal,
    ) -> Result<Option<MenuNode>, MenuDefectError> {
        // An invisible node is dropped with its whole subtree; structural
        // rules are only enforced on what the principal can actually reach.
        if !is_visible(&node, principal) {
            return Ok(None);
        }

        let mut node = node;

        // An explicit `false` carries no information; normalize to unset.
        if node.directly == Some(false) {
            node.directly = None;
        }

        match node.kind {
            MenuKind::Item => {
                if !node.children.is_empty() {
                    return Err(MenuDefectError::ItemHasChildren { title: node.title });
                }
                node.link = node.route.as_ref().and_then(|r| self.resolver.resolve(r));
                Ok(Some(node))
            }
            MenuKind::Sub | MenuKind::Group => {
                if node.route.is_some() {
                    return Err(MenuDefectError::ContainerHasRoute {
                        kind: node.kind,
                        title: node.title,
                    });
                }
                if node.directly == Some(true) {
                    return Err(MenuDefectError::ContainerMarkedDirect {
                        kind: node.kind,
                        title: node.title,
                    });
                }

                let declared = std::mem::take(&mut node.children);
                let mut kept = Vec::with_capacity(declared.len());
                for child in declared {
                    if let Some(child) = self.filter(child, principal)? {
                        kept.push(child);
                    }
                }

                // A container with nothing visible underneath is omitted,
                // never reported.
                if kept.is_empty() {
                    return Ok(None);
                }

                node.children = kept;
                Ok(Some(node))
            }
        }
    }
}

impl core::fmt::Debug for MenuTreeBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MenuTreeBuilder").finish_non_exhaustive()
    }
}

fn verify_structure(node: &MenuNode) -> Result<(), MenuDefectError> {
    match node.kind {
        MenuKind::Item => {
            if !node.children.is_empty() {
                return Err(MenuDefectError::ItemHasChildren {
                    title: node.title.clone(),
                });
            }
        }
        MenuKind::Sub | MenuKind::Group => {
            if node.route.is_some() {
                return Err(MenuDefectError::ContainerHasRoute {
                    kind: node.kind,
                    title: node.title.clone(),
                });
            }
            if node.directly == Some(true) {
                return Err(MenuDefectError::ContainerMarkedDirect {
                    kind: node.kind,
                    title: node.title.clone(),
                });
            }
            for child in &node.children {
                verify_structure(child)?;
            }
        }
    }
    Ok(())
}

/// Visibility rule: an unconstrained node is visible to everyone; otherwise
/// any one satisfied constraint suffices. The fields OR together, none
/// overrides another.
fn is_visible(node: &MenuNode, principal: &dyn Principal) -> bool {
    if node.is_unconstrained() {
        return true;
    }

    if let Some(validator) = &node.validator
        && validator.evaluate(principal)
    {
        return true;
    }
    if let Some(spec) = &node.permission
        && matches_any(spec, |p| principal.has_permission(p))
    {
        return true;
    }
    if let Some(spec) = &node.role
        && matches_any(spec, |r| principal.is_in_role(r))
    {
        return true;
    }
    if let Some(spec) = &node.group
        && matches_any(spec, |g| principal.is_in_group(g))
    {
        return true;
    }

    false
}

fn matches_any(spec: &str, held: impl Fn(&str) -> bool) -> bool {
    spec.split(['|', ';', ',']).any(held)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{MenuVisibility, RouteTarget};
    use crate::routing::StaticRouteTable;
    use gatehouse_auth::{ResolvedPrincipal, UserId};

    struct FixedProvider {
        order: i32,
        roots: Vec<MenuNode>,
    }

    impl MenuProvider for FixedProvider {
        fn order(&self) -> i32 {
            self.order
        }

        fn menu(&self) -> Vec<MenuNode> {
            self.roots.clone()
        }
    }

    fn provider(order: i32, roots: Vec<MenuNode>) -> Arc<dyn MenuProvider> {
        Arc::new(FixedProvider { order, roots })
    }

    fn builder() -> MenuTreeBuilder {
        MenuTreeBuilder::new(Arc::new(
            StaticRouteTable::new()
                .with_route("admin.users", "/admin/users")
                .with_route("admin.overview", "/admin"),
        ))
    }

    fn anyone() -> ResolvedPrincipal {
        ResolvedPrincipal::new(UserId::new(1))
    }

    #[test]
    fn providers_merge_in_order_key_order() {
        let providers = vec![
            provider(2, vec![MenuNode::item("A")]),
            provider(1, vec![MenuNode::item("B")]),
        ];

        let forest = builder().build(&providers, &anyone()).unwrap();

        let titles: Vec<&str> = forest.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
    }

    #[test]
    fn equal_order_keys_keep_declaration_order() {
        let providers = vec![
            provider(5, vec![MenuNode::item("First")]),
            provider(5, vec![MenuNode::item("Second")]),
        ];

        let forest = builder().build(&providers, &anyone()).unwrap();

        let titles: Vec<&str> = forest.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second"]);
    }

    #[test]
    fn or_semantics_across_constraint_fields() {
        // Role "Admin" only, no explicit permissions.
        let principal = ResolvedPrincipal::new(UserId::new(1)).with_roles(["Admin"]);

        let providers = vec![provider(
            0,
            vec![
                MenuNode::item("X").with_permission("P1|P2").with_role("Admin"),
                MenuNode::item("Y").with_permission("P3"),
            ],
        )];

        let forest = builder().build(&providers, &principal).unwrap();

        let titles: Vec<&str> = forest.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["X"]);
    }

    #[test]
    fn permission_alternatives_split_on_all_three_delimiters() {
        let providers = vec![provider(
            0,
            vec![
                MenuNode::item("Pipe").with_permission("a|users.read"),
                MenuNode::item("Semicolon").with_permission("b;users.read"),
                MenuNode::item("Comma").with_permission("c,users.read"),
                MenuNode::item("None").with_permission("a|b;c"),
            ],
        )];

        let principal = ResolvedPrincipal::new(UserId::new(1)).with_permissions(["users.read"]);
        let forest = builder().build(&providers, &principal).unwrap();

        let titles: Vec<&str> = forest.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["Pipe", "Semicolon", "Comma"]);
    }

    #[derive(Debug)]
    struct EvenUserId;

    impl MenuVisibility for EvenUserId {
        fn evaluate(&self, principal: &dyn Principal) -> bool {
            principal.user_id().as_i64() % 2 == 0
        }
    }

    #[test]
    fn validator_is_one_voice_in_the_or_not_an_override() {
        // Validator says no (odd user id), but the role matches: visible.
        let principal = ResolvedPrincipal::new(UserId::new(1)).with_roles(["Admin"]);
        let providers = vec![provider(
            0,
            vec![
                MenuNode::item("ValidatorOrRole")
                    .with_validator(Arc::new(EvenUserId))
                    .with_role("Admin"),
                MenuNode::item("ValidatorOnly").with_validator(Arc::new(EvenUserId)),
            ],
        )];

        let forest = builder().build(&providers, &principal).unwrap();
        let titles: Vec<&str> = forest.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["ValidatorOrRole"]);

        // Validator alone says yes for an even user id.
        let principal = ResolvedPrincipal::new(UserId::new(2));
        let forest = builder().build(&providers, &principal).unwrap();
        let titles: Vec<&str> = forest.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["ValidatorOrRole", "ValidatorOnly"]);
    }

    #[test]
    fn container_without_visible_children_is_omitted_silently() {
        let providers = vec![provider(
            0,
            vec![
                MenuNode::sub("Gated").with_children(vec![
                    MenuNode::item("Secret").with_permission("secret.read"),
                ]),
                MenuNode::item("Visible"),
            ],
        )];

        let forest = builder().build(&providers, &anyone()).unwrap();

        let titles: Vec<&str> = forest.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["Visible"]);
    }

    #[test]
    fn empty_containers_collapse_recursively() {
        // The inner sub loses its only child, so the outer group loses its
        // only child too.
        let providers = vec![provider(
            0,
            vec![MenuNode::group("Outer").with_children(vec![
                MenuNode::sub("Inner").with_children(vec![
                    MenuNode::item("Secret").with_permission("secret.read"),
                ]),
            ])],
        )];

        let forest = builder().build(&providers, &anyone()).unwrap();
        assert!(forest.is_empty());
    }

    #[test]
    fn surviving_container_keeps_only_visible_children() {
        let principal = ResolvedPrincipal::new(UserId::new(1)).with_permissions(["users.read"]);
        let providers = vec![provider(
            0,
            vec![MenuNode::sub("Access Control").with_children(vec![
                MenuNode::item("Users")
                    .with_permission("users.read")
                    .with_route(RouteTarget::new("admin.users")),
                MenuNode::item("Roles").with_permission("roles.read"),
            ])],
        )];

        let forest = builder().build(&providers, &principal).unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].title, "Users");
        assert_eq!(forest[0].children[0].link.as_deref(), Some("/admin/users"));
    }

    #[test]
    fn visible_item_with_children_is_a_declaration_defect() {
        let providers = vec![provider(
            0,
            vec![MenuNode::item("Broken").with_children(vec![MenuNode::item("Child")])],
        )];

        let result = builder().build(&providers, &anyone());

        assert_eq!(
            result.unwrap_err(),
            MenuDefectError::ItemHasChildren {
                title: "Broken".into()
            }
        );
    }

    #[test]
    fn invisible_subtrees_are_pruned_before_structural_checks() {
        // The defective item is unreachable for this principal, so the build
        // succeeds; `verify` still reports it (see below).
        let providers = vec![provider(
            0,
            vec![
                MenuNode::item("Broken")
                    .with_permission("secret.read")
                    .with_children(vec![MenuNode::item("Child")]),
            ],
        )];

        assert!(builder().build(&providers, &anyone()).unwrap().is_empty());
        assert!(builder().verify(&providers).is_err());
    }

    #[test]
    fn container_with_route_is_a_declaration_defect() {
        let providers = vec![provider(
            0,
            vec![
                MenuNode::sub("Routed")
                    .with_route(RouteTarget::new("admin.users"))
                    .with_children(vec![MenuNode::item("Child")]),
            ],
        )];

        let result = builder().build(&providers, &anyone());

        assert_eq!(
            result.unwrap_err(),
            MenuDefectError::ContainerHasRoute {
                kind: MenuKind::Sub,
                title: "Routed".into()
            }
        );
    }

    #[test]
    fn container_marked_direct_is_a_declaration_defect() {
        let providers = vec![provider(
            0,
            vec![
                MenuNode::group("Direct")
                    .with_directly(true)
                    .with_children(vec![MenuNode::item("Child")]),
            ],
        )];

        let result = builder().build(&providers, &anyone());

        assert_eq!(
            result.unwrap_err(),
            MenuDefectError::ContainerMarkedDirect {
                kind: MenuKind::Group,
                title: "Direct".into()
            }
        );
    }

    #[test]
    fn explicit_directly_false_is_normalized_away() {
        let providers = vec![provider(
            0,
            vec![MenuNode::group("G").with_directly(false).with_children(vec![
                MenuNode::item("Leaf").with_directly(false),
            ])],
        )];

        let forest = builder().build(&providers, &anyone()).unwrap();

        assert_eq!(forest[0].directly, None);
        assert_eq!(forest[0].children[0].directly, None);
    }

    #[test]
    fn explicit_directly_true_survives_on_items() {
        let providers = vec![provider(0, vec![MenuNode::item("Leaf").with_directly(true)])];

        let forest = builder().build(&providers, &anyone()).unwrap();

        assert_eq!(forest[0].directly, Some(true));
    }

    #[test]
    fn unresolvable_route_emits_the_item_without_a_link() {
        let providers = vec![provider(
            0,
            vec![MenuNode::item("Elsewhere").with_route(RouteTarget::new("no.such.route"))],
        )];

        let forest = builder().build(&providers, &anyone()).unwrap();

        assert_eq!(forest[0].link, None);
    }

    #[test]
    fn verify_accepts_a_well_formed_declaration() {
        let providers = vec![provider(
            0,
            vec![MenuNode::sub("S").with_permission("p").with_children(vec![
                MenuNode::item("I").with_route(RouteTarget::new("admin.users")),
            ])],
        )];

        assert!(builder().verify(&providers).is_ok());
    }

    #[test]
    fn verify_reports_defects_nested_under_containers() {
        let providers = vec![provider(
            0,
            vec![MenuNode::sub("Outer").with_children(vec![
                MenuNode::group("Inner").with_directly(true).with_children(vec![
                    MenuNode::item("Leaf"),
                ]),
            ])],
        )];

        assert_eq!(
            builder().verify(&providers),
            Err(MenuDefectError::ContainerMarkedDirect {
                kind: MenuKind::Group,
                title: "Inner".into()
            })
        );
    }
}
