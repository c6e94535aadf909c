use std::env;

use axum::http::HeaderValue;

const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_seconds: i64,
    pub jwt_refresh_expiration_seconds: i64,
    pub host: String,
    pub port: u16,
    pub production: bool,
    pub frontend_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_seconds: env::var("JWT_EXPIRATION_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            jwt_refresh_expiration_seconds: env::var("JWT_REFRESH_EXPIRATION_SECONDS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse()
                .unwrap_or(604800),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .unwrap_or(5001),
            production: env::var("APP_ENV").is_ok_and(|v| v == "production"),
            frontend_url: env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Origins the browser frontend may call from.
    pub fn allowed_origins(&self) -> Vec<HeaderValue> {
        let origins: Vec<&str> = if self.production {
            self.frontend_url.iter().map(String::as_str).collect()
        } else {
            DEV_ORIGINS.to_vec()
        };

        origins
            .into_iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect()
    }
}
