//! Students API binary
//!
//! Composition root: reads configuration once, picks the student store and
//! the upload adapter, builds the router and runs the HTTP server until
//! Ctrl+C or SIGTERM.

use anyhow::Result;
use cli::{Cli, Commands};
use config::{load_config, validate_app_config, vars, AppConfig, EnvVars, ValidationReport};
use observability::{init_logging, init_metrics, HttpMetrics, LogFormat};
use server::{
    validate_port_available, ComponentStatus, HealthState, HttpServer, ServerConfig,
};
use std::sync::Arc;
use students::{
    build_upload_store, create_router, AppState, InMemoryStudentStore, PostgresStudentStore,
    RouterConfig, StudentStore, StudentsService,
};
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "students-api";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let mut env = EnvVars::from_process();

    let log_format = LogFormat::parse_or_default(env.get(vars::LOG_FORMAT).unwrap_or_default());
    init_logging(SERVICE_NAME, log_format)?;
    debug!(?cli, "CLI arguments parsed");

    match cli.command() {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                env.set(vars::HOST, host);
            }
            if let Some(port) = port {
                env.set(vars::PORT, port.to_string());
            }
            info!("Executing 'serve' command");
            serve(&env).await
        }
        Commands::Validate => {
            info!("Executing 'validate' command");
            validate_command(&env)
        }
    }
}

fn load_and_validate(env: &EnvVars) -> Result<(AppConfig, ValidationReport)> {
    let loaded = match load_config(env) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_app_config(&loaded.config).with_defaults(loaded.defaults_applied);
    Ok((loaded.config, report))
}

async fn serve(env: &EnvVars) -> Result<()> {
    let (config, report) = load_and_validate(env)?;

    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start server due to configuration errors");
    }

    if let Some(port) = config.observability.metrics_port {
        init_metrics(port)?;
    }

    let health = Arc::new(HealthState::new(SERVICE_NAME));
    let store = build_store(&config).await?;
    health.set_component(ComponentStatus::up("store", store.backend()));

    let uploader = build_upload_store(&config.upload)?;
    health.set_component(ComponentStatus::up("uploads", uploader.backend()));

    let state = AppState::new(
        StudentsService::new(store),
        uploader,
        HttpMetrics::new(SERVICE_NAME),
    );
    let router = create_router(
        state,
        RouterConfig::from_app_config(&config),
        Some(health),
    );

    let server_config = ServerConfig::new(config.http.host.clone(), config.http.port);
    validate_port_available(&server_config).await?;

    info!(
        host = %server_config.host,
        port = server_config.http_port,
        upload_backend = config.upload.backend.as_str(),
        "Starting Students API"
    );

    HttpServer::new(SERVICE_NAME, server_config, router)
        .run_until_signal()
        .await?;

    info!("Students API stopped");
    Ok(())
}

/// PostgreSQL when `DATABASE_URL` is set, in-memory otherwise
async fn build_store(config: &AppConfig) -> Result<Arc<dyn StudentStore>> {
    match &config.storage.database_url {
        Some(url) => {
            let store = PostgresStudentStore::connect(url).await?;
            store.run_migrations().await?;
            info!("Using PostgreSQL student store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, student records will not survive a restart");
            Ok(Arc::new(InMemoryStudentStore::new()))
        }
    }
}

fn validate_command(env: &EnvVars) -> Result<()> {
    let (config, report) = load_and_validate(env)?;

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Listen: {}:{}", config.http.host, config.http.port);
    println!("Upload backend: {}", config.upload.backend.as_str());
    println!(
        "Store: {}",
        if config.storage.database_url.is_some() {
            "postgres"
        } else {
            "memory"
        }
    );
    println!(
        "CORS: {}",
        if config.cors.enforce {
            format!("enforced ({})", config.cors.allowed_origins.join(", "))
        } else {
            "permissive".to_string()
        }
    );

    Ok(())
}
