use std::collections::HashMap;

use crate::node::RouteTarget;

/// Turns a named route plus parameters into a URL.
///
/// Implemented by the host's routing layer; `None` means the route is unknown
/// or a required parameter is missing, in which case the node is emitted
/// without a link rather than failing the build.
pub trait RouteResolver: Send + Sync {
    fn resolve(&self, route: &RouteTarget) -> Option<String>;
}

/// Route table mapping route names to `:param` path templates.
///
/// `resolve` substitutes every `:param` segment from the target's parameters;
/// a template segment with no matching parameter makes the route unresolvable.
#[derive(Debug, Clone, Default)]
pub struct StaticRouteTable {
    templates: HashMap<String, String>,
}

impl StaticRouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(
        mut self,
        name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.templates.insert(name.into(), template.into());
        self
    }
}

impl RouteResolver for StaticRouteTable {
    fn resolve(&self, route: &RouteTarget) -> Option<String> {
        let template = self.templates.get(&route.name)?;

        let mut segments = Vec::new();
        for segment in template.split('/') {
            if let Some(param) = segment.strip_prefix(':') {
                segments.push(route.params.get(param)?.as_str());
            } else {
                segments.push(segment);
            }
        }

        Some(segments.join("/"))
    }
}
