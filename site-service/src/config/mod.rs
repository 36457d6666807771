use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub store: StoreConfig,
    pub llm: LlmConfig,
    pub smtp: SmtpConfig,
    pub jwt: JwtConfig,
    pub admin: AdminBootstrapConfig,
    pub recaptcha: RecaptchaConfig,
    pub company: CompanyConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(format!("Unknown ENVIRONMENT: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown STORE_BACKEND: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    Gemini,
    Anthropic,
    Mock,
}

impl FromStr for LlmProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(LlmProviderKind::Gemini),
            "anthropic" => Ok(LlmProviderKind::Anthropic),
            "mock" => Ok(LlmProviderKind::Mock),
            other => Err(format!("Unknown LLM_PROVIDER: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub api_key: Secret<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    /// Recipient of admin notifications (contact form, meeting requests).
    pub to_email: String,
    /// Port 465 style TLS-on-connect instead of STARTTLS.
    pub implicit_tls: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub expiration_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminBootstrapConfig {
    pub username: String,
    pub password: Secret<String>,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecaptchaConfig {
    pub secret_key: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyConfig {
    pub name: String,
    pub contact_email: String,
    pub website: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub chat_per_minute: u32,
    pub contact_per_hour: u32,
    pub login_per_minute: u32,
}

/// Placeholder some deployments leave in place of a real reCAPTCHA secret.
const RECAPTCHA_PLACEHOLDER: &str = "YOUR_RECAPTCHA_SECRET_KEY";

impl SiteConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let environment: Environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "dev".to_string())
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;
        let is_prod = environment == Environment::Prod;

        let otlp_endpoint = env::var("OTLP_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| common.otlp_endpoint.clone());
        let log_level = get_env("LOG_LEVEL", Some(common.log_level.as_str()), is_prod)?;

        let recaptcha_secret = get_env("RECAPTCHA_SECRET_KEY", Some(""), is_prod)?;

        let config = SiteConfig {
            environment,
            service_name: get_env("SERVICE_NAME", Some("site-service"), is_prod)?,
            log_level,
            otlp_endpoint,
            store: StoreConfig {
                backend: parse_env("STORE_BACKEND", "mongo", is_prod)?,
                mongodb: MongoConfig {
                    uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                    database: get_env("MONGODB_DATABASE", Some("site_db"), is_prod)?,
                },
            },
            llm: LlmConfig {
                provider: parse_env("LLM_PROVIDER", "anthropic", is_prod)?,
                api_key: Secret::new(get_env("LLM_API_KEY", Some(""), is_prod)?),
                model: get_env("LLM_MODEL", Some("claude-sonnet-4-20250514"), is_prod)?,
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", "120", is_prod)?,
                max_tokens: parse_env("LLM_MAX_TOKENS", "1024", is_prod)?,
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", Some("localhost"), is_prod)?,
                port: parse_env("SMTP_PORT", "465", is_prod)?,
                username: get_env("SMTP_USERNAME", Some(""), is_prod)?,
                password: Secret::new(get_env("SMTP_PASSWORD", Some(""), is_prod)?),
                from_email: get_env("SMTP_FROM_EMAIL", Some("info@mitaict.com"), is_prod)?,
                from_name: get_env("SMTP_FROM_NAME", Some("MITA ICT"), is_prod)?,
                to_email: get_env("SMTP_TO_EMAIL", Some("info@mitaict.com"), is_prod)?,
                implicit_tls: parse_env("SMTP_IMPLICIT_TLS", "true", is_prod)?,
                enabled: parse_env("SMTP_ENABLED", "false", is_prod)?,
            },
            jwt: JwtConfig {
                secret: Secret::new(get_env("JWT_SECRET", Some("dev-only-change-me"), is_prod)?),
                expiration_hours: parse_env("JWT_EXPIRATION_HOURS", "24", is_prod)?,
            },
            admin: AdminBootstrapConfig {
                username: get_env("ADMIN_USERNAME", Some("admin"), is_prod)?,
                password: Secret::new(get_env("ADMIN_PASSWORD", Some("admin123"), is_prod)?),
                email: get_env("ADMIN_EMAIL", Some("admin@mitaict.com"), is_prod)?,
            },
            recaptcha: RecaptchaConfig {
                secret_key: Some(recaptcha_secret)
                    .filter(|s| !s.trim().is_empty() && s.as_str() != RECAPTCHA_PLACEHOLDER)
                    .map(Secret::new),
            },
            company: CompanyConfig {
                name: get_env("COMPANY_NAME", Some("MITA ICT"), is_prod)?,
                contact_email: get_env("COMPANY_CONTACT_EMAIL", Some("info@mitaict.com"), is_prod)?,
                website: get_env("COMPANY_WEBSITE", Some("www.mitaict.com"), is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            },
            rate_limit: RateLimitConfig {
                chat_per_minute: parse_env("RATE_LIMIT_CHAT_PER_MINUTE", "20", is_prod)?,
                contact_per_hour: parse_env("RATE_LIMIT_CONTACT_PER_HOUR", "5", is_prod)?,
                login_per_minute: parse_env("RATE_LIMIT_LOGIN_PER_MINUTE", "5", is_prod)?,
            },
            common,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.llm.provider != LlmProviderKind::Mock && self.llm.api_key.expose_secret().is_empty()
        {
            tracing::warn!(
                provider = ?self.llm.provider,
                "LLM_API_KEY is empty; chat requests will fail until it is set"
            );
        }
        if self.environment == Environment::Prod && self.jwt.secret.expose_secret().len() < 32 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters in production"
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
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(default), is_prod)?
        .trim()
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("Invalid {}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_env_falls_back_to_default_outside_prod() {
        let value = get_env("SITE_TEST_SURELY_UNSET_KEY", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn get_env_requires_value_in_prod() {
        let err = get_env("SITE_TEST_SURELY_UNSET_KEY", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn parse_env_reports_the_offending_key() {
        let err = parse_env::<u32>("SITE_TEST_SURELY_UNSET_KEY", "not-a-number", false).unwrap_err();
        assert!(err.to_string().contains("SITE_TEST_SURELY_UNSET_KEY"));
    }

    #[test]
    fn provider_and_backend_names_parse() {
        assert_eq!("Gemini".parse::<LlmProviderKind>(), Ok(LlmProviderKind::Gemini));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
