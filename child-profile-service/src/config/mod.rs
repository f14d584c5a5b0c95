use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub db_interact: DbInteractConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbInteractConfig {
    /// Base URL of the db-interact service, e.g. http://db-interact-service:8082
    pub url: String,
    /// Upper bound on each downstream call, connect and total.
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 secret shared with the auth service.
    pub secret: String,
    pub linking_code_expiry_hours: i64,
}

impl ProfileConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = ProfileConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("child-profile-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            db_interact: DbInteractConfig {
                // Required in every environment: the service cannot function
                // without a downstream to forward to.
                url: get_env("DB_INTERACT_SERVICE_URL", None, is_prod)?,
                timeout_seconds: get_env("DB_INTERACT_TIMEOUT_SECONDS", Some("10"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET_KEY", Some("dev_jwt_secret_change_me"), is_prod)?,
                linking_code_expiry_hours: get_env(
                    "LINKING_CODE_EXPIRATION_HOURS",
                    Some("24"),
                    is_prod,
                )?
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                })?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 && self.environment == Environment::Prod {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if !self.db_interact.url.starts_with("http://") && !self.db_interact.url.starts_with("https://")
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DB_INTERACT_SERVICE_URL must be an http(s) URL"
            )));
        }

        if self.db_interact.timeout_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DB_INTERACT_TIMEOUT_SECONDS must be greater than 0"
            )));
        }

        if self.jwt.linking_code_expiry_hours <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "LINKING_CODE_EXPIRATION_HOURS must be positive"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
