//! `gatehouse-auth` — session credential core (zero-trust boundary).
//!
//! This crate owns the signing key and the refresh-token lifecycle. It is
//! intentionally decoupled from HTTP and storage: the only I/O happens through
//! the [`KeyValueStore`] seam, and all clock reads are caller-supplied.

pub mod claims;
pub mod principal;
pub mod session;
pub mod settings;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod test_store;

pub use claims::ClaimSet;
pub use principal::{Principal, ResolvedPrincipal, UserId};
pub use session::{SessionError, SessionManager, SessionTokens};
pub use settings::TokenSettings;
pub use store::{KeyValueStore, StoreError};
pub use token::{TokenError, TokenManager};
