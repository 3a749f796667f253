use crate::*;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("HTTP port must be a positive integer")]
    InvalidPort,

    #[error("MAX_UPLOAD_BYTES must be a positive integer")]
    InvalidUploadLimit,

    #[error("Invalid CORS origin '{origin}': {message}")]
    InvalidOrigin { origin: String, message: String },

    #[error("Upload directory must not be empty")]
    EmptyUploadDir,

    #[error("Invalid APP_DOMAIN '{0}'. Must be an absolute http(s) URL")]
    InvalidAppDomain(String),

    #[error("Cloudinary: {message}")]
    InvalidCloudinary { message: String },

    #[error("Invalid log format '{0}'. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("DATABASE_URL must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn with_defaults(mut self, defaults: Vec<DefaultApplied>) -> Self {
        self.defaults_applied = defaults;
        self
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_app_config(config: &AppConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_http(&config.http, &mut report);
    validate_cors(&config.cors, &mut report);
    validate_upload(&config.upload, &mut report);
    validate_storage(&config.storage, &mut report);
    validate_observability(&config.observability, &mut report);

    report
}

fn validate_http(http: &HttpConfig, report: &mut ValidationReport) {
    if http.port == 0 {
        report.add_error(ValidationError::InvalidPort);
    }

    if http.max_upload_bytes == 0 {
        report.add_error(ValidationError::InvalidUploadLimit);
    }
}

fn validate_cors(cors: &CorsConfig, report: &mut ValidationReport) {
    for origin in &cors.allowed_origins {
        match Url::parse(origin) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                if url.path() != "/" || origin.ends_with('/') {
                    report.add_warning(
                        vars::CORS_ALLOWED_ORIGINS,
                        &format!("origin '{}' has a path; browsers never send one", origin),
                    );
                }
            }
            Ok(url) => report.add_error(ValidationError::InvalidOrigin {
                origin: origin.clone(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => report.add_error(ValidationError::InvalidOrigin {
                origin: origin.clone(),
                message: e.to_string(),
            }),
        }
    }

    if cors.enforce && cors.allowed_origins.is_empty() {
        report.add_warning(
            vars::CORS_ENFORCE,
            "CORS is enforced with an empty allow-list; every cross-origin request will be rejected",
        );
    }

    if !cors.enforce {
        report.add_warning(vars::CORS_ENFORCE, "CORS origin check is disabled; all origins are allowed");
    }
}

fn validate_upload(upload: &UploadConfig, report: &mut ValidationReport) {
    if upload.upload_dir.as_os_str().is_empty() {
        report.add_error(ValidationError::EmptyUploadDir);
    }

    match Url::parse(&upload.app_domain) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => report.add_error(ValidationError::InvalidAppDomain(upload.app_domain.clone())),
    }

    if let UploadBackend::Cloudinary(ref cloudinary) = upload.backend {
        if cloudinary.cloud_name.contains('/') {
            report.add_error(ValidationError::InvalidCloudinary {
                message: format!("cloud name '{}' must not contain '/'", cloudinary.cloud_name),
            });
        }
    }
}

fn validate_storage(storage: &StorageConfig, report: &mut ValidationReport) {
    match storage.database_url {
        Some(ref url) => {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                report.add_error(ValidationError::InvalidDatabaseUrl);
            }
        }
        None => report.add_warning(
            vars::DATABASE_URL,
            "DATABASE_URL not set; using the in-memory store (records are lost on restart)",
        ),
    }
}

fn validate_observability(observability: &ObservabilityConfig, report: &mut ValidationReport) {
    let valid_formats = ["pretty", "json", "compact"];
    if !valid_formats.contains(&observability.log_format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(observability.log_format.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        load_config(&EnvVars::default()).unwrap().config
    }

    #[test]
    fn test_default_config_is_valid() {
        let report = validate_app_config(&base_config());
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
        // in-memory store and disabled CORS both warn
        assert!(report.warnings.iter().any(|w| w.field == "DATABASE_URL"));
        assert!(report.warnings.iter().any(|w| w.field == "CORS_ENFORCE"));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let mut config = base_config();
        config.http.port = 0;
        config.cors.allowed_origins = vec!["ftp://files.example".to_string(), "nope".to_string()];
        config.upload.app_domain = "localhost".to_string();
        config.storage.database_url = Some("mysql://db".to_string());
        config.observability.log_format = "xml".to_string();

        let report = validate_app_config(&config);
        assert!(!report.is_valid());
        assert!(report.errors.contains(&ValidationError::InvalidPort));
        assert!(report.errors.contains(&ValidationError::InvalidDatabaseUrl));
        assert!(report
            .errors
            .contains(&ValidationError::InvalidLogFormat("xml".to_string())));
        assert!(report
            .errors
            .contains(&ValidationError::InvalidAppDomain("localhost".to_string())));
        assert_eq!(
            report
                .errors
                .iter()
                .filter(|e| matches!(e, ValidationError::InvalidOrigin { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_enforced_empty_allow_list_warns() {
        let mut config = base_config();
        config.cors.enforce = true;
        config.cors.allowed_origins.clear();

        let report = validate_app_config(&config);
        assert!(report.is_valid());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.field == "CORS_ENFORCE" && w.message.contains("empty allow-list")));
    }
}
