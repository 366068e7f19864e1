use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub agirails_base_url: String,
    pub agent_api_key: String,
    pub agent_did: String,
    pub polling_enabled: bool,
    pub poll_interval_ms: u64,
    pub port: u16,
    /// Settle a transaction on the ledger once its result has been stored
    pub auto_settle: bool,
}

impl AgentConfig {
    /// Load from the process environment (after `.env` has been applied).
    pub fn from_env() -> AppResult<Self> {
        Self::load(Environment::default())
    }

    /// Load from an explicit variable map instead of the process environment.
    #[cfg(test)]
    pub fn from_vars(vars: ::config::Map<String, String>) -> AppResult<Self> {
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(environment: Environment) -> AppResult<Self> {
        let mut config: AgentConfig = Self::build(environment)
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.agirails_base_url = config.agirails_base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn build(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("agirails_base_url", "http://localhost:5173")?
            .set_default("agent_api_key", "")?
            .set_default("agent_did", "")?
            .set_default("polling_enabled", true)?
            .set_default("poll_interval_ms", 3000_i64)?
            .set_default("port", 8788_i64)?
            .set_default("auto_settle", false)?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Fail fast on anything the agent cannot run without.
    pub fn validate(&self) -> AppResult<()> {
        let mut missing = Vec::new();
        if self.agent_api_key.is_empty() {
            missing.push("AGENT_API_KEY");
        }
        if self.agent_did.is_empty() {
            missing.push("AGENT_DID");
        }
        if self.agirails_base_url.is_empty() {
            missing.push("AGIRAILS_BASE_URL");
        }
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "Missing required env vars: {}",
                missing.join(", ")
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "POLL_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
