use crate::error::{Result, SketchGenError};
use std::env;

/// Hard ceiling on configured repair attempts. Repair calls are full model
/// invocations; anything past a couple of rounds is latency with no payoff.
pub const MAX_REPAIR_ATTEMPTS: u32 = 3;

pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .ok();
        let access_key = env::var("AWS_ACCESS_KEY_ID").ok();
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY").ok();

        BedrockConfig {
            region,
            access_key,
            secret_key,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Credentials must be resolvable before the first model call; either both
    /// static keys are present or neither is (default provider chain).
    pub fn validate(&self) -> Result<()> {
        match (&self.access_key, &self.secret_key) {
            (Some(_), Some(_)) | (None, None) => Ok(()),
            _ => Err(SketchGenError::ConfigError(
                "AWS access key and secret key must be provided together".into(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub default_model_id: String,
    pub max_tokens: i32,
    pub temperature: f32,
    pub repair_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            default_model_id: DEFAULT_MODEL_ID.to_string(),
            max_tokens: 4096,
            temperature: 0.0,
            repair_attempts: 1,
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let default_model_id =
            env::var("SKETCHGEN_MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
        let max_tokens = env::var("SKETCHGEN_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(4096);
        let repair_attempts = env::var("SKETCHGEN_REPAIR_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        GenerationConfig {
            default_model_id,
            max_tokens,
            temperature: 0.0,
            repair_attempts: repair_attempts.min(MAX_REPAIR_ATTEMPTS),
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.default_model_id = model_id.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_repair_attempts(mut self, attempts: u32) -> Self {
        self.repair_attempts = attempts.min(MAX_REPAIR_ATTEMPTS);
        self
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub max_entries: usize,
    pub ttl_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            max_entries: 256,
            ttl_seconds: 3600,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub bedrock: BedrockConfig,
    pub generation: GenerationConfig,
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            bedrock: BedrockConfig::default(),
            generation: GenerationConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            port,
            bedrock: BedrockConfig::from_env(),
            generation: GenerationConfig::from_env(),
            store: StoreConfig::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = config;
        self
    }

    pub fn with_generation(mut self, config: GenerationConfig) -> Self {
        self.generation = config;
        self
    }

    pub fn with_store(mut self, config: StoreConfig) -> Self {
        self.store = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_must_be_paired() {
        let config = BedrockConfig::new().with_region("us-east-1");
        assert!(config.validate().is_ok());

        let config = BedrockConfig {
            region: None,
            access_key: Some("AKIA...".to_string()),
            secret_key: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_repair_attempts_capped() {
        let config = GenerationConfig::new().with_repair_attempts(10);
        assert_eq!(config.repair_attempts, MAX_REPAIR_ATTEMPTS);
    }
}
