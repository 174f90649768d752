use std::sync::Arc;

use travel_predict::artifacts::ArtifactBundle;
use travel_predict::config::{AppConfig, Frontend};
use travel_predict::inference::InferenceService;
use travel_predict::web::form_app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_guard = travel_predict::logging::init("travel-predict.log");

    let config = AppConfig::from_env(Frontend::Form);

    eprintln!("🧳 Travel Predict v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Preprocessor: {}", config.preprocessor_path.display());
    eprintln!("   Model: {}", config.model_path.display());

    // Both artifacts must load before the port is bound.
    let bundle = match ArtifactBundle::load(&config.artifact_paths()) {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::error!(
                artifact = %e.kind(),
                error = %e,
                "Cannot start without model and preprocessor"
            );
            eprintln!("Error: Model or preprocessor files are missing or unreadable!");
            eprintln!("  {}", e);
            // Flush the log file before exiting.
            drop(log_guard);
            std::process::exit(1);
        }
    };

    let addr = config.socket_addr()?;
    let service = InferenceService::new(Arc::new(bundle), config.inference_timeout);
    let app = form_app(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    eprintln!("   Form: http://{}/", local);
    eprintln!("   API: http://{}/api/predict\n", local);
    tracing::info!(addr = %local, "Form server started");

    axum::serve(listener, app).await?;
    drop(log_guard);
    Ok(())
}
