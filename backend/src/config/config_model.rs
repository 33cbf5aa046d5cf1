use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub mail: Mail,
    pub sftp: Sftp,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Mail {
    pub relay_url: Option<String>,
    pub from_email: String,
    pub admin_email: Option<String>,
    pub log_dir: PathBuf,
}

/// Host and port baked into the credential emails and the credentials
/// endpoint; the backend never connects to it itself.
#[derive(Debug, Clone)]
pub struct Sftp {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct JwtSecret {
    pub secret: String,
}
