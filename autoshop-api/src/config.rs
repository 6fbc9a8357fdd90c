/// Configuration management for the API server
///
/// Configuration is read once at startup from environment variables (and a
/// `.env` file when present) into a typed [`Config`].
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `ENV`: Deployment environment (default: development)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: HMAC signing secret, at least 32 characters (required)
/// - `JWT_ALGORITHM`: HS256, HS384 or HS512 (default: HS256)
/// - `JWT_EXPIRATION_DAYS`: Token lifetime in days, 1 to 3650 (default: 1)
/// - `ORDER_STATUS`: Comma-separated allowed order statuses
/// - `ADMIN_USERNAME` / `ADMIN_PASSWORD`: Bootstrap administrator (optional)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use autoshop_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use autoshop_shared::auth::jwt::{TokenCodec, TokenError, MAX_EXPIRATION_DAYS};
use autoshop_shared::db::pool::DatabaseConfig;
use chrono::Duration;
use std::env;
use std::fmt;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Order statuses used when `ORDER_STATUS` is unset
pub const DEFAULT_ORDER_STATUSES: &str = "REQUESTED,IN_PROGRESS,FINISHED,CANCELED";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub orders: OrderConfig,

    /// Administrator created at startup if missing
    pub bootstrap_admin: Option<AdminCredentials>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Deployment environment name (`development`, `staging`, `production`)
    pub environment: String,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub algorithm: String,
    pub expiration_days: i64,
}

/// Order workflow configuration
#[derive(Debug, Clone)]
pub struct OrderConfig {
    /// Statuses an order may take
    pub statuses: Vec<String>,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("expiration_days", &self.expiration_days)
            .finish()
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric variable does not parse, or the token lifetime is out of range
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = var_or("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;
        let environment = var_or("ENV", "development");
        let cors_origins = split_list(&var_or("CORS_ORIGINS", "*"));

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
        }
        let jwt_algorithm = var_or("JWT_ALGORITHM", "HS256");
        let expiration_days = var_or("JWT_EXPIRATION_DAYS", "1")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("JWT_EXPIRATION_DAYS is invalid: {}", e))?;
        if expiration_days <= 0 || expiration_days > MAX_EXPIRATION_DAYS {
            anyhow::bail!(
                "JWT_EXPIRATION_DAYS must be between 1 and {}",
                MAX_EXPIRATION_DAYS
            );
        }

        let statuses = split_list(&var_or("ORDER_STATUS", DEFAULT_ORDER_STATUSES));
        if statuses.is_empty() {
            anyhow::bail!("ORDER_STATUS must list at least one status");
        }

        let bootstrap_admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminCredentials { username, password })
            }
            _ => None,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                environment,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..Default::default()
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                algorithm: jwt_algorithm,
                expiration_days,
            },
            orders: OrderConfig { statuses },
            bootstrap_admin,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True for environments that log JSON
    pub fn is_production(&self) -> bool {
        matches!(self.api.environment.as_str(), "production" | "staging")
    }

    /// Builds the token codec from the JWT settings
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Config` for a non-HMAC algorithm or a lifetime
    /// out of range.
    pub fn token_codec(&self) -> Result<TokenCodec, TokenError> {
        let expiration = Duration::try_days(self.jwt.expiration_days).ok_or_else(|| {
            TokenError::Config(format!(
                "expiration of {} days is out of range",
                self.jwt.expiration_days
            ))
        })?;

        TokenCodec::new(&self.jwt.secret, &self.jwt.algorithm, expiration)
    }
}

impl OrderConfig {
    /// Status given to orders created without one: the first configured
    pub fn default_status(&self) -> &str {
        self.statuses.first().map(String::as_str).unwrap_or("REQUESTED")
    }

    pub fn is_valid_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DATABASE_URL", "postgresql://localhost/autoshop_test"),
            ("JWT_SECRET", SECRET),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = load(&required()).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.environment, "development");
        assert!(!config.is_production());
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.jwt.expiration_days, 1);
        assert_eq!(
            config.orders.statuses,
            vec!["REQUESTED", "IN_PROGRESS", "FINISHED", "CANCELED"]
        );
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut vars = required();
        vars.extend([
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("ENV", "production"),
            ("CORS_ORIGINS", "http://localhost:3000, https://shop.example.com"),
            ("JWT_ALGORITHM", "HS512"),
            ("JWT_EXPIRATION_DAYS", "7"),
            ("ORDER_STATUS", "OPEN,CLOSED"),
            ("ADMIN_USERNAME", "admin@email.com"),
            ("ADMIN_PASSWORD", "changeme"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert!(config.is_production());
        assert_eq!(
            config.api.cors_origins,
            vec!["http://localhost:3000", "https://shop.example.com"]
        );
        assert_eq!(config.jwt.expiration_days, 7);
        assert!(config.orders.is_valid_status("OPEN"));
        assert!(!config.orders.is_valid_status("REQUESTED"));
        assert_eq!(config.orders.default_status(), "OPEN");

        let codec = config.token_codec().unwrap();
        assert_eq!(codec.expiration(), Duration::days(7));

        assert_eq!(
            config.bootstrap_admin.map(|a| a.username),
            Some("admin@email.com".to_string())
        );
    }

    #[test]
    fn test_missing_required_variables() {
        let err = load(&[("JWT_SECRET", SECRET)]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = load(&[("DATABASE_URL", "postgresql://localhost/x")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgresql://localhost/x"),
            ("JWT_SECRET", "too-short"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_non_positive_expiration_rejected() {
        for days in ["0", "-1"] {
            let mut vars = required();
            vars.push(("JWT_EXPIRATION_DAYS", days));
            assert!(load(&vars).is_err(), "expiration {} should be rejected", days);
        }
    }

    #[test]
    fn test_oversized_expiration_rejected() {
        let max = MAX_EXPIRATION_DAYS.to_string();
        let mut vars = required();
        vars.push(("JWT_EXPIRATION_DAYS", max.as_str()));
        assert!(load(&vars).unwrap().token_codec().is_ok());

        let huge = i64::MAX.to_string();
        for days in ["3651", "100000000", huge.as_str()] {
            let mut vars = required();
            vars.push(("JWT_EXPIRATION_DAYS", days));
            let err = load(&vars).unwrap_err();
            assert!(err.to_string().contains("between 1 and 3650"), "{}", err);
        }
    }

    #[test]
    fn test_out_of_range_lifetime_fails_codec_construction() {
        let mut config = load(&required()).unwrap();
        config.jwt.expiration_days = i64::MAX;

        assert!(matches!(config.token_codec(), Err(TokenError::Config(_))));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut vars = required();
        vars.push(("API_PORT", "not-a-port"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_non_hmac_algorithm_fails_codec_construction() {
        let mut vars = required();
        vars.push(("JWT_ALGORITHM", "RS256"));
        let config = load(&vars).unwrap();

        assert!(matches!(config.token_codec(), Err(TokenError::Config(_))));
    }

    #[test]
    fn test_partial_admin_credentials_ignored() {
        let mut vars = required();
        vars.push(("ADMIN_USERNAME", "admin@email.com"));
        assert!(load(&vars).unwrap().bootstrap_admin.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut vars = required();
        vars.extend([("ADMIN_USERNAME", "admin@email.com"), ("ADMIN_PASSWORD", "hunter22")]);
        let rendered = format!("{:?}", load(&vars).unwrap());

        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("<redacted>"));
    }
}
