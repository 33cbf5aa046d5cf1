use anyhow::{Ok, Result};

use super::config_model::{Database, DotEnvyConfig, JwtSecret, Mail, Server, Sftp};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let mail = Mail {
        relay_url: std::env::var("MAIL_RELAY_URL").ok(),
        from_email: std::env::var("FROM_EMAIL")
            .unwrap_or_else(|_| "billing@astra.host".to_string()),
        admin_email: std::env::var("ADMIN_EMAIL").ok(),
        log_dir: std::env::var("EMAIL_LOG_DIR")
            .unwrap_or_else(|_| "/tmp/astra-emails".to_string())
            .into(),
    };

    let sftp = Sftp {
        host: std::env::var("SFTP_HOST").unwrap_or_else(|_| "sftp.astra.host".to_string()),
        port: std::env::var("SFTP_PORT")
            .unwrap_or_else(|_| "2222".to_string())
            .parse()?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        mail,
        sftp,
    })
}

pub fn get_jwt_secret() -> Result<JwtSecret> {
    dotenvy::dotenv().ok();

    Ok(JwtSecret {
        secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
    })
}
