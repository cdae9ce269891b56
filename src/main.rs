// Main entry point - Dependency injection and a single sync cycle
mod application;
mod domain;
mod infrastructure;

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::application::dashboard_reconciler::DashboardReconciler;
use crate::application::sync_service::SyncService;
use crate::infrastructure::config::{load_app_config, AppConfig};
use crate::infrastructure::http_feed_source::HttpFeedSource;
use crate::infrastructure::taskade_repository::TaskadeRepository;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout only carries the task id line
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_app_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            return ExitCode::from(2);
        }
    };

    if config.dry_run {
        return match service.preview().await {
            Ok(body) => {
                println!("{}", body);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "Dry run failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match service.run_cycle(config.existing_record()).await {
        Ok(report) => {
            tracing::info!(
                record_id = %report.identifier,
                action = %report.action,
                vehicles = report.vehicle_count,
                recovered_from_stale = report.recovered_from_stale,
                "Dashboard sync complete"
            );
            println!("{}", serde_json::json!({ "TASKADE_TASK_ID": report.identifier.as_str() }));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), "Dashboard sync failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_service(config: &AppConfig) -> anyhow::Result<SyncService> {
    let feed = Arc::new(HttpFeedSource::new(
        config.gtfsr_url.clone(),
        config.http_timeout(),
    )?);

    let store = Arc::new(TaskadeRepository::new(
        config.taskade_base_url.clone(),
        config.taskade_api_token.clone(),
        config.taskade_project_id.clone(),
        config.dashboard_title.clone(),
        config.http_timeout(),
    )?);

    let reconciler = DashboardReconciler::new(store, config.display_settings()?);

    Ok(SyncService::new(
        feed,
        reconciler,
        config.retry_policy(),
        config.recreate_on_stale,
    ))
}
