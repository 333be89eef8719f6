/// Configuration management for the API server
///
/// Loads configuration from environment variables (a `.env` file is
/// honored in development) into a typed struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: bind host (default: 0.0.0.0)
/// - `API_PORT`: bind port (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: *)
/// - `JWT_SECRET`: JWT signing key, at least 32 chars (required)
/// - `PROJECT_INVITE_TTL_HOURS`: invite lifetime (default: 72)
/// - `CLIENT_URL`: web client base URL for invite links
///   (default: http://localhost:5173)
/// - `INVITE_EMAIL_BEST_EFFORT`: "true" to log (not fail) on invite
///   email errors (default: false)
/// - `SMTP_HOST` / `SMTP_PORT` / `SMTP_SECURE` / `SMTP_USER` /
///   `SMTP_PASSWORD`: mailer transport; missing host means log-only
/// - `EMAIL_FROM`: From header (default: "Verto <no-reply@verto.app>")
/// - `RUST_LOG`: log filter (default: info)

use serde::{Deserialize, Serialize};
use std::env;

use verto_shared::email::MailerConfig;
use verto_shared::invites::{InviteSettings, DEFAULT_INVITE_TTL_HOURS};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Invitation configuration
    pub invites: InviteConfig,

    /// Email configuration
    pub email: EmailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; "*" means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing; at least 32 bytes
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Invitation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteConfig {
    /// Hours until an invite token expires
    pub ttl_hours: i64,

    /// Web client base URL for acceptance links
    pub client_url: String,

    /// Log instead of fail when the invite email can't be sent
    pub email_best_effort: bool,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or have
    /// invalid values.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_hours = env::var("PROJECT_INVITE_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_INVITE_TTL_HOURS);

        let client_url =
            env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let email_best_effort = env::var("INVITE_EMAIL_BEST_EFFORT")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let smtp_host = env::var("SMTP_HOST").ok().filter(|h| !h.is_empty());
        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(587);
        let smtp_secure = env::var("SMTP_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(smtp_port == 465);

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            invites: InviteConfig {
                ttl_hours,
                client_url,
                email_best_effort,
            },
            email: EmailConfig {
                smtp_host,
                smtp_port,
                smtp_secure,
                smtp_username: env::var("SMTP_USER").ok(),
                smtp_password: env::var("SMTP_PASSWORD").ok(),
                from: env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "Verto <no-reply@verto.app>".to_string()),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Invitation settings for the shared invite lifecycle
    pub fn invite_settings(&self) -> InviteSettings {
        InviteSettings {
            ttl_hours: self.invites.ttl_hours,
            client_url: self.invites.client_url.clone(),
            email_best_effort: self.invites.email_best_effort,
        }
    }

    /// Mailer transport configuration
    pub fn mailer_config(&self) -> MailerConfig {
        MailerConfig {
            smtp_host: self.email.smtp_host.clone(),
            smtp_port: self.email.smtp_port,
            smtp_secure: self.email.smtp_secure,
            smtp_username: self.email.smtp_username.clone(),
            smtp_password: self.email.smtp_password.clone(),
            from: self.email.from.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/verto_test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            invites: InviteConfig {
                ttl_hours: 72,
                client_url: "http://localhost:5173".to_string(),
                email_best_effort: false,
            },
            email: EmailConfig {
                smtp_host: None,
                smtp_port: 587,
                smtp_secure: false,
                smtp_username: None,
                smtp_password: None,
                from: "Verto <no-reply@verto.app>".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invite_settings_carry_over() {
        let settings = test_config().invite_settings();
        assert_eq!(settings.ttl_hours, 72);
        assert_eq!(settings.client_url, "http://localhost:5173");
        assert!(!settings.email_best_effort);
    }
}
