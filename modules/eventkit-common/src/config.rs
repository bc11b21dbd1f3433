use std::env;

use crate::error::EventKitError;
use crate::types::OrgPlan;

pub const DEFAULT_TELEMETRY_API_URL: &str = "https://api.phospho.ai/v2";
pub const DEFAULT_TELEMETRY_PROJECT_ID: &str = "b20659d0932d4edbb2b9682d3e6a0ccb";

/// Configuration loaded from environment variables (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    // Platform API
    pub platform_api_url: String,
    pub access_token: String,

    // Onboarding feedback
    pub telemetry_api_url: String,
    pub telemetry_api_key: Option<String>,
    pub telemetry_project_id: String,

    // Behaviour
    pub rollback_on_persist_failure: bool,
    pub org_plan: OrgPlan,
}

impl Config {
    pub fn from_env() -> Result<Self, EventKitError> {
        dotenvy::dotenv().ok();

        let config = Self {
            platform_api_url: required_env("PLATFORM_API_URL")?,
            access_token: required_env("PLATFORM_ACCESS_TOKEN")?,
            telemetry_api_url: env::var("TELEMETRY_API_URL")
                .unwrap_or_else(|_| DEFAULT_TELEMETRY_API_URL.to_string()),
            telemetry_api_key: env::var("TELEMETRY_API_KEY").ok().filter(|k| !k.is_empty()),
            telemetry_project_id: env::var("TELEMETRY_PROJECT_ID")
                .unwrap_or_else(|_| DEFAULT_TELEMETRY_PROJECT_ID.to_string()),
            rollback_on_persist_failure: env::var("ROLLBACK_ON_PERSIST_FAILURE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            org_plan: env::var("ORG_PLAN")
                .map(|v| OrgPlan::parse(&v))
                .unwrap_or_default(),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
            format!("{}...({} chars)", &val[..n], val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  PLATFORM_API_URL: {}", self.platform_api_url);
        tracing::info!("  PLATFORM_ACCESS_TOKEN: {}", preview(&self.access_token));
        tracing::info!(
            "  TELEMETRY_API_KEY: {}",
            self.telemetry_api_key
                .as_deref()
                .map(preview)
                .unwrap_or_else(|| "<not set>".to_string())
        );
        tracing::info!("  ROLLBACK_ON_PERSIST_FAILURE: {}", self.rollback_on_persist_failure);
    }
}

fn required_env(key: &str) -> Result<String, EventKitError> {
    env::var(key).map_err(|_| EventKitError::Config(format!("{key} environment variable is required")))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
