use resara_api::{app, state::AppState};
use resara_pricing::{DiscountModel, HeuristicModel, LinearModel, Optimizer};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_model(config: &resara_config::ModelConfig) -> Arc<dyn DiscountModel> {
    match LinearModel::from_path(&config.artifact_path) {
        Ok(model) => {
            tracing::info!(version = model.version(), "pricing model loaded");
            Arc::new(model)
        }
        Err(err) if config.allow_heuristic_fallback => {
            tracing::warn!(error = %err, "pricing model unavailable, falling back to heuristic baseline");
            Arc::new(HeuristicModel)
        }
        Err(err) => panic!("pricing model unavailable and heuristic fallback disabled: {err}"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resara_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = resara_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Resara API on port {}", config.server.port);

    let model = load_model(&config.model);
    let optimizer = Arc::new(Optimizer::new(config.pricing.clone(), model));

    let app = app(AppState { optimizer });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
