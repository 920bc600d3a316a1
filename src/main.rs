mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,classroom_downloader=info".into()),
        )
        .init();

    let config = config::AppConfig::from_env();
    tracing::info!(
        base_url = %config.api.base_url,
        download_dir = %config.api.download_dir.display(),
        "Starting Classroom Downloader"
    );

    // Job tracking gets its own single control thread
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("job-tracker")
        .enable_all()
        .build()?;

    let api_client = api::ApiClient::new(config.api.clone())?;
    let job_client = api::ApiClient::new(config.api)?;
    let tracker_config = config.tracker;
    let handle = runtime.handle().clone();

    iced::application(
        move || {
            app::ClassroomApp::new(
                api_client.clone(),
                job_client.clone(),
                tracker_config,
                handle.clone(),
            )
        },
        app::update,
        app::view,
    )
    .title("Classroom Downloader")
    .run()?;

    Ok(())
}
