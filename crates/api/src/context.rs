use gatehouse_auth::{Principal, ResolvedPrincipal, UserId};

/// Principal context for a request (authenticated identity + grants).
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    principal: ResolvedPrincipal,
}

impl PrincipalContext {
    pub fn new(principal: ResolvedPrincipal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id()
    }

    pub fn principal(&self) -> &ResolvedPrincipal {
        &self.principal
    }
}
