use thiserror::Error;

use crate::node::MenuKind;

/// Invalid menu declaration.
///
/// These indicate a programming error in a menu provider, not bad runtime
/// data: they should surface loudly at startup/registration time, not be
/// swallowed per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuDefectError {
    #[error("menu item '{title}' must not carry child entries")]
    ItemHasChildren { title: String },

    #[error("{kind} '{title}' must not carry a route")]
    ContainerHasRoute { kind: MenuKind, title: String },

    #[error("{kind} '{title}' must not be marked for direct access")]
    ContainerMarkedDirect { kind: MenuKind, title: String },
}
