use anyhow::Context;
use sql_contest_core::domain::Question;
use sql_contest_server::api::{AppState, build_app};
use sql_contest_server::config::GraderConfig;
use sql_contest_server::{build_grading_service, db};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config_path = std::env::var("GRADER_CONFIG").unwrap_or_else(|_| "grader.toml".to_string());
    info!(path = %config_path, "loading grader config");
    let config = GraderConfig::from_file(&config_path)
        .with_context(|| format!("failed to load grader config from {config_path}"))?
        .with_env_overrides();

    let store = db::init_store_and_migrate(&config.database_url).await?;
    info!("contest store ready");
    let dataset = db::connect_dataset(&config.dataset_url).await?;
    info!("dataset connected");

    let grading = build_grading_service(store, dataset, &config);
    info!(
        keywords = ?grading.filter().keywords(),
        query_timeout_ms = config.query_timeout_ms,
        "grading service configured"
    );

    for question in config.questions.iter().cloned().map(Question::from) {
        let question_id = question.id;
        if let Err(err) = grading.seed_question(question).await {
            warn!(%question_id, error = %err, "failed to seed question");
        }
    }

    let app = build_app(AppState::new(grading, config.leaderboard_size));
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, "server is ready, press Ctrl+C to shut down");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, stopping server"),
        Err(err) => warn!(error = %err, "failed to listen for shutdown signal"),
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
