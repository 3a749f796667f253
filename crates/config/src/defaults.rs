pub fn default_host() -> &'static str {
    "0.0.0.0"
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_upload_dir() -> &'static str {
    "uploads"
}

pub fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

pub fn default_cors_allowed_origins() -> &'static str {
    "http://localhost:3000"
}

pub fn default_log_format() -> &'static str {
    "pretty"
}

pub fn default_app_domain(port: u16) -> String {
    format!("http://localhost:{}", port)
}
