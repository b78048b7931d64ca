use std::sync::Arc;

#[tokio::main]
async fn main() {
    gatehouse_api::telemetry::init();

    let settings = gatehouse_api::app::settings_from_env();
    let services = Arc::new(gatehouse_api::app::AppServices::from_env(settings));

    let app = gatehouse_api::app::build_app(services).expect("invalid menu declaration");

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
