use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;

/// Environment variables override file values, e.g. `VOICE_BRIDGE__RTC__APP_ID`.
pub const ENV_PREFIX: &str = "VOICE_BRIDGE";

/// Placeholder shipped in sample env files; treated the same as "unset".
pub const CERTIFICATE_PLACEHOLDER: &str = "your_agora_app_certificate_here";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub rtc: RtcConfig,
    pub agent: AgentConfig,
    pub tts: TtsConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Allowed CORS origin; any origin when empty
    #[serde(default)]
    pub frontend_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct RtcConfig {
    pub app_id: String,
    #[serde(default)]
    pub app_certificate: String,
    pub token_ttl_secs: u64,
}

impl RtcConfig {
    /// Whether real signing material is present
    pub fn has_certificate(&self) -> bool {
        !self.app_certificate.is_empty() && self.app_certificate != CERTIFICATE_PLACEHOLDER
    }
}

impl fmt::Debug for RtcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtcConfig")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct AgentConfig {
    /// Vendor REST root, e.g. https://api.agora.io/api/conversational-ai-agent/v2
    pub api_base_url: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub customer_secret: String,
    pub agent_rtc_uid: String,
    pub remote_rtc_uids: Vec<String>,
    pub idle_timeout_secs: u64,
    pub system_prompt: String,
    pub greeting: String,
    pub failure_message: String,
    pub max_history: u32,
    pub model: String,
    pub asr_language: String,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api_base_url", &self.api_base_url)
            .field("customer_id", &self.customer_id)
            .field("customer_secret", &"[REDACTED]")
            .field("agent_rtc_uid", &self.agent_rtc_uid)
            .field("remote_rtc_uids", &self.remote_rtc_uids)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct TtsConfig {
    pub vendor: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub voice_id: String,
}

impl fmt::Debug for TtsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtsConfig")
            .field("vendor", &self.vendor)
            .field("api_key", &"[REDACTED]")
            .field("voice_id", &self.voice_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from an optional file at `path` (any extension the
    /// `config` crate understands) layered under `VOICE_BRIDGE__*` variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("agent.remote_rtc_uids")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("service.name", "voice-agent-bridge")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 3000)?
            .set_default("service.frontend_origin", "")?
            .set_default("rtc.app_id", "")?
            .set_default("rtc.token_ttl_secs", 3600)?
            .set_default(
                "agent.api_base_url",
                "https://api.agora.io/api/conversational-ai-agent/v2",
            )?
            .set_default("agent.agent_rtc_uid", "1")?
            .set_default("agent.remote_rtc_uids", vec!["0"])?
            .set_default("agent.idle_timeout_secs", 300)?
            .set_default(
                "agent.system_prompt",
                "You are a helpful and friendly support assistant.",
            )?
            .set_default(
                "agent.greeting",
                "Hi, I am your support assistant. How can I help you today?",
            )?
            .set_default(
                "agent.failure_message",
                "I'm sorry, I'm having a little trouble right now. Could you please repeat that?",
            )?
            .set_default("agent.max_history", 10)?
            .set_default("agent.model", "gpt-4")?
            .set_default("agent.asr_language", "en-US")?
            .set_default("tts.vendor", "elevenlabs")?
            .set_default("webhook.timeout_secs", 10)?)
    }
}
