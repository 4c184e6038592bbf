use chrono::{DateTime, Utc};
use laptop_advisor::comparator::Comparator;
use laptop_advisor::config::{load_config, AppConfig, RequestConfig};
use laptop_advisor::loader::{load_catalog, source_for};
use laptop_advisor::model::{ComparisonRequest, ComparisonResult};
use laptop_advisor::session::ComparisonSession;
use laptop_advisor::utils::report_file_name;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Serialize)]
struct Report<'a> {
    label: String,
    generated_at: DateTime<Utc>,
    request: &'a ComparisonRequest,
    result: &'a ComparisonResult,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let source = match source_for(&config.catalog) {
        Ok(source) => source,
        Err(e) => {
            error!("Catalog source error: {}", e);
            return;
        }
    };
    let catalog = match load_catalog(source.as_ref()).await {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            error!("Catalog load error: {}", e);
            return;
        }
    };
    if catalog.is_empty() {
        warn!("Catalog is empty; every selection will be reported as unknown");
    }

    let comparator = Comparator::new(config.scoring, config.markup, config.simulated_delay());
    let session = ComparisonSession::new(catalog, comparator, config.max_compare);

    info!("Requests to process: {}", config.requests.len());
    for request_cfg in &config.requests {
        process_request(request_cfg, &session, config.output_dir.as_deref()).await;
    }
    info!("All requests processed.");
}

/// Runs one configured comparison, prints its report and optionally saves it.
async fn process_request(request_cfg: &RequestConfig, session: &ComparisonSession, output_dir: Option<&Path>) {
    let label = request_cfg.display_label();
    info!("Processing request: {}", label);

    let request = request_cfg.to_request();
    let result = match session.submit(&request).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Request '{}' skipped: {}", label, e);
            return;
        }
    };

    let generated_at = Utc::now();
    let report = Report {
        label: label.clone(),
        generated_at,
        request: &request,
        result: &result,
    };
    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(e) => {
            warn!("Report serialization failed: {}", e);
            return;
        }
    };
    println!("{}", json);

    if let Some(folder) = output_dir {
        save_report(folder, &report_file_name(&label, generated_at), &json).await;
    }
}

async fn save_report(folder: &Path, file_name: &str, json: &str) {
    if let Err(e) = tokio::fs::create_dir_all(folder).await {
        warn!("Failed to create report folder: {}", e);
        return;
    }
    let filename = folder.join(file_name);
    if let Err(e) = tokio::fs::write(&filename, json).await {
        warn!("Failed to write report: {}", e);
    } else {
        info!("Saved report: {}", filename.display());
    }
}
