//! `gatehouse-api` — HTTP surface for the admin session and navigation core.
//!
//! Thin by design: routes translate between HTTP and the `gatehouse-auth` /
//! `gatehouse-menu` components, and everything stateful lives behind
//! [`app::AppServices`].

pub mod app;
pub mod context;
pub mod errors;
pub mod middleware;
pub mod navigation;
pub mod routes;
pub mod telemetry;
