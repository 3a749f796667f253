use crate::defaults::*;
use crate::validator::DefaultApplied;
use crate::*;
use std::path::PathBuf;
use tracing::{info, instrument};

/// A loaded configuration and the defaults that were filled in
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub defaults_applied: Vec<DefaultApplied>,
}

/// Build an [`AppConfig`] from an environment snapshot
///
/// Missing optional values get defaults (recorded in
/// [`LoadedConfig::defaults_applied`]). Values that are present but cannot
/// be parsed are errors, and so are missing Cloudinary credentials when
/// `ENABLE_CLOUDINARY=true`.
#[instrument(skip(env))]
pub fn load_config(env: &EnvVars) -> ConfigResult<LoadedConfig> {
    let mut defaults_applied = Vec::new();
    let mut note_default = |var: &str, value: String| {
        if !env.is_set(var) {
            defaults_applied.push(DefaultApplied {
                field: var.to_string(),
                value,
            });
        }
    };

    let host = env.get_env_var(vars::HOST, Some(default_host()))?;
    note_default(vars::HOST, host.clone());

    let port = env.get_env_parsed(vars::PORT, default_port())?;
    note_default(vars::PORT, port.to_string());

    let max_upload_bytes = env.get_env_parsed(vars::MAX_UPLOAD_BYTES, default_max_upload_bytes())?;
    note_default(vars::MAX_UPLOAD_BYTES, max_upload_bytes.to_string());

    let allowed_origins = env.get_env_list(vars::CORS_ALLOWED_ORIGINS, default_cors_allowed_origins());
    note_default(vars::CORS_ALLOWED_ORIGINS, allowed_origins.join(","));
    let enforce = env.get_env_flag(vars::CORS_ENFORCE);

    let backend = if env.get_env_flag(vars::ENABLE_CLOUDINARY) {
        UploadBackend::Cloudinary(CloudinaryConfig {
            cloud_name: env.get_env_var(vars::CLOUD_NAME, None)?,
            api_key: env.get_env_var(vars::API_KEY, None)?,
            api_secret: env.get_env_var(vars::API_SECRET, None)?,
        })
    } else {
        UploadBackend::Local
    };

    let upload_dir = env.get_env_var(vars::UPLOAD_DIR, Some(default_upload_dir()))?;
    note_default(vars::UPLOAD_DIR, upload_dir.clone());

    let app_domain = env.get_env_or_default(vars::APP_DOMAIN, &default_app_domain(port));
    note_default(vars::APP_DOMAIN, app_domain.clone());

    let log_format = env.get_env_var(vars::LOG_FORMAT, Some(default_log_format()))?;
    note_default(vars::LOG_FORMAT, log_format.clone());

    let metrics_port = match env.get(vars::METRICS_PORT) {
        Some(_) => Some(env.get_env_parsed::<u16>(vars::METRICS_PORT, 0)?),
        None => None,
    };

    let config = AppConfig {
        http: HttpConfig {
            host,
            port,
            max_upload_bytes,
        },
        cors: CorsConfig {
            allowed_origins,
            enforce,
        },
        upload: UploadConfig {
            backend,
            upload_dir: PathBuf::from(upload_dir),
            app_domain: app_domain.trim_end_matches('/').to_string(),
        },
        storage: StorageConfig {
            database_url: env.get(vars::DATABASE_URL).map(str::to_string),
        },
        observability: ObservabilityConfig {
            log_format,
            metrics_port,
        },
    };

    info!(
        port = config.http.port,
        upload_backend = config.upload.backend.as_str(),
        cors_enforced = config.cors.enforce,
        postgres = config.storage.database_url.is_some(),
        "Configuration loaded from environment"
    );

    Ok(LoadedConfig {
        config,
        defaults_applied,
    })
}
