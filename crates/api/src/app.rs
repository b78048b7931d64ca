use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};

use gatehouse_auth::{KeyValueStore, SessionManager, TokenManager, TokenSettings};
use gatehouse_infra::InMemoryStore;
use gatehouse_menu::{MenuProvider, MenuTreeBuilder, StaticRouteTable};

use crate::middleware::{auth_middleware, AuthState};
use crate::navigation;
use crate::routes;

/// Everything the routes need, wired once at startup.
pub struct AppServices {
    pub tokens: Arc<TokenManager>,
    pub sessions: Arc<SessionManager>,
    pub menu: MenuTreeBuilder,
    pub menu_providers: Vec<Arc<dyn MenuProvider>>,
}

impl AppServices {
    /// In-memory session store (dev/test wiring).
    pub fn in_memory(
        settings: TokenSettings,
        providers: Vec<Arc<dyn MenuProvider>>,
        route_table: StaticRouteTable,
    ) -> Self {
        Self::with_store(settings, Arc::new(InMemoryStore::new()), providers, route_table)
    }

    /// Redis-backed session store, shared across instances.
    #[cfg(feature = "redis")]
    pub fn redis(
        settings: TokenSettings,
        redis_url: &str,
        providers: Vec<Arc<dyn MenuProvider>>,
        route_table: StaticRouteTable,
    ) -> Result<Self, gatehouse_auth::StoreError> {
        let store = gatehouse_infra::RedisStore::connect(redis_url)?;
        Ok(Self::with_store(
            settings,
            Arc::new(store),
            providers,
            route_table,
        ))
    }

    pub fn with_store(
        settings: TokenSettings,
        store: Arc<dyn KeyValueStore>,
        providers: Vec<Arc<dyn MenuProvider>>,
        route_table: StaticRouteTable,
    ) -> Self {
        let tokens = Arc::new(TokenManager::new(settings, store));
        let sessions = Arc::new(SessionManager::new(Arc::clone(&tokens)));
        let menu = MenuTreeBuilder::new(Arc::new(route_table));

        Self {
            tokens,
            sessions,
            menu,
            menu_providers: providers,
        }
    }

    /// Pick the store backend from the environment. Used by `main`; tests
    /// call the constructors directly.
    pub fn from_env(settings: TokenSettings) -> Self {
        let use_redis = std::env::var("USE_REDIS_SESSIONS")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        let providers = navigation::default_providers();
        let route_table = navigation::default_route_table();

        if use_redis {
            #[cfg(feature = "redis")]
            {
                let url = std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
                match Self::redis(settings.clone(), &url, providers.clone(), route_table.clone()) {
                    Ok(services) => return services,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to open redis session store, falling back to in-memory");
                    }
                }
            }
            #[cfg(not(feature = "redis"))]
            {
                tracing::warn!(
                    "USE_REDIS_SESSIONS set but the redis feature is not enabled, falling back to in-memory"
                );
            }
        }

        Self::in_memory(settings, providers, route_table)
    }
}

/// Token settings from the environment, with insecure-but-loud dev defaults.
pub fn settings_from_env() -> TokenSettings {
    let secret = std::env::var("TOKEN_SECRET").unwrap_or_else(|_| {
        tracing::warn!("TOKEN_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    TokenSettings {
        issuer: env_or("TOKEN_ISSUER", "gatehouse"),
        audience: env_or("TOKEN_AUDIENCE", "gatehouse-admin"),
        secret,
        access_token_lifetime: Duration::from_secs(env_secs("ACCESS_TOKEN_LIFETIME_SECS", 1800)),
        clock_skew: Duration::from_secs(env_secs("CLOCK_SKEW_SECS", 300)),
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_secs(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Assemble the router.
///
/// Fails if any registered menu provider declares a structurally invalid
/// fragment: declaration defects abort startup instead of surfacing on the
/// first unlucky request.
pub fn build_app(services: Arc<AppServices>) -> anyhow::Result<Router> {
    services
        .menu
        .verify(&services.menu_providers)
        .context("invalid menu declaration")?;

    let auth_state = AuthState {
        tokens: Arc::clone(&services.tokens),
    };

    let protected = Router::new()
        .route("/admin/menus", get(routes::menus::menus))
        .route("/admin/session/logout", post(routes::session::logout))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(health))
        .route("/admin/session/renew", post(routes::session::renew))
        .merge(protected)
        .layer(Extension(services)))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
