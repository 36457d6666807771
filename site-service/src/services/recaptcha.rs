//! Google reCAPTCHA verification for the public contact form.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;
use std::time::Duration;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

#[derive(Clone)]
pub struct RecaptchaVerifier {
    secret: Option<Secret<String>>,
    client: reqwest::Client,
}

impl RecaptchaVerifier {
    /// `None` disables verification.
    pub fn new(secret: Option<Secret<String>>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { secret, client })
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Ok(true) when verification is disabled or Google accepts the token.
    pub async fn verify(&self, token: Option<&str>) -> Result<bool, AppError> {
        let Some(secret) = self.secret.as_ref() else {
            return Ok(true);
        };

        let form = [
            ("secret", secret.expose_secret().as_str()),
            ("response", token.unwrap_or_default()),
        ];
        let response = self
            .client
            .post(SITEVERIFY_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::service("reCAPTCHA", e))?;

        let result: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|e| AppError::service("reCAPTCHA", e))?;

        if !result.success {
            tracing::warn!(error_codes = ?result.error_codes, "reCAPTCHA verification failed");
        }
        Ok(result.success)
    }
}
