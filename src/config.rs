use crate::generation::service::GeneratorSettings;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Parser, Clone)]
#[command(name = "meditest", about = "Generates compliance-aware test cases from requirements")]
pub struct AppConfig {
    /// Address the HTTP API listens on.
    #[arg(long, env = "MEDITEST_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Access credential for the generation service.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-3-flash-preview")]
    pub model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Upper bound for one generation call, in seconds.
    #[arg(long, env = "GENERATION_TIMEOUT_SECS", default_value_t = 90)]
    pub timeout_secs: u64,

    /// Reasoning token allowance for the model, 0 disables it.
    #[arg(long, env = "THINKING_BUDGET", default_value_t = 1024)]
    pub thinking_budget: u32,

    #[arg(long, env = "TRACEABILITY_PREFIX", default_value = "REQ-GEN")]
    pub traceability_prefix: String,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings::builder()
            .maybe_api_key(self.api_key.clone())
            .model(self.model.clone())
            .timeout(self.timeout())
            .thinking_budget(self.thinking_budget)
            .traceability_prefix(self.traceability_prefix.clone())
            .build()
    }
}

// credential stays out of logs
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind", &self.bind)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("thinking_budget", &self.thinking_budget)
            .field("traceability_prefix", &self.traceability_prefix)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}
