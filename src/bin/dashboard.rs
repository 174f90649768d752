use std::sync::Arc;

use travel_predict::artifacts::ArtifactBundle;
use travel_predict::config::{AppConfig, Frontend};
use travel_predict::inference::InferenceService;
use travel_predict::web::{dashboard_app, halted_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = travel_predict::logging::init("travel-dashboard.log");

    let config = AppConfig::from_env(Frontend::Dashboard);

    eprintln!("📊 Travel Dashboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Preprocessor: {}", config.preprocessor_path.display());
    eprintln!("   Model: {}", config.model_path.display());

    // Missing artifacts do not stop the process: the page itself shows the
    // halting message and no widgets are offered.
    let app = match ArtifactBundle::load(&config.artifact_paths()) {
        Ok(bundle) => {
            let service = InferenceService::new(Arc::new(bundle), config.inference_timeout);
            dashboard_app(service)
        }
        Err(e) => {
            tracing::error!(
                artifact = %e.kind(),
                error = %e,
                "Artifacts unavailable, serving halting page"
            );
            eprintln!("   Halted: {}", e);
            halted_app(e.to_string())
        }
    };

    let listener = tokio::net::TcpListener::bind(config.socket_addr()?).await?;
    let local = listener.local_addr()?;
    eprintln!("   Dashboard: http://{}/", local);
    eprintln!("   Dashboard WS: ws://{}/ws\n", local);
    tracing::info!(addr = %local, "Dashboard server started");

    axum::serve(listener, app).await?;
    Ok(())
}
