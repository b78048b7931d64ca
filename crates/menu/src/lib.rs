//! `gatehouse-menu` — permission-filtered navigation trees.
//!
//! Menu fragments are contributed by independent, ordered providers and merged
//! into one forest per request. Filtering is a pure rebuild: the input
//! fragments are never mutated, and a caller only ever sees nodes its
//! principal is allowed to see.

pub mod builder;
pub mod error;
pub mod node;
pub mod provider;
pub mod routing;

pub use builder::MenuTreeBuilder;
pub use error::MenuDefectError;
pub use node::{MenuKind, MenuNode, MenuVisibility, RouteTarget};
pub use provider::MenuProvider;
pub use routing::{RouteResolver, StaticRouteTable};
