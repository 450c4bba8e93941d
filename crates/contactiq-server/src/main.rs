//! ContactIQ — contact extraction and fusion server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use contactiq_server::{jobs, routes, state::AppState};

fn resolve_data_dir() -> PathBuf {
    std::env::var("CONTACTIQ_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                println!("ContactIQ — contact extraction and fusion server");
                println!();
                println!("Usage: contactiq [command]");
                println!();
                println!("Commands:");
                println!("  (none)    Start the server");
                println!("  help      Show this help message");
                println!();
                println!("Environment:");
                println!("  CONTACTIQ_DATA_DIR   Data directory (default: ./data)");
                println!("  PORT                 Listen port (default: 8002)");
                println!("  OCR_SERVICE_URL      OCR service base URL (optional)");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'contactiq help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = contactiq_core::ContactIqConfig::from_env(&data_dir)?;
    let port = config.port;

    let provider_config =
        contactiq_llm::ProviderConfig::load(&config.data_paths.llm_config_file);
    let client = Arc::new(contactiq_llm::ExtractionClient::new(provider_config));

    // The entity recognizer always works, so a missing provider only
    // degrades quality rather than blocking startup.
    match client.active_provider() {
        Some(provider) => info!("Model extraction enabled via {}", provider),
        None => warn!("No provider credentials, running on entity recognition only"),
    }

    let ocr: Arc<dyn contactiq_pipeline::OcrEngine> = match std::env::var("OCR_SERVICE_URL") {
        Ok(url) => {
            info!("OCR service: {}", url);
            Arc::new(contactiq_pipeline::RemoteOcr::new(&url))
        }
        Err(_) => {
            warn!("OCR_SERVICE_URL not set, image extraction disabled");
            Arc::new(contactiq_pipeline::DisabledOcr)
        }
    };

    let pipeline = Arc::new(contactiq_pipeline::Pipeline::new(client, ocr));
    let state = Arc::new(AppState::new(config, pipeline));

    jobs::start_ocr_worker(state.clone());

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ContactIQ server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
