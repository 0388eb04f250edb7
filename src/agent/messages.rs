use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST {base}/projects/{app_id}/join`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: String,
    pub properties: AgentProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProperties {
    pub channel: String,
    pub token: String,
    pub agent_rtc_uid: String,
    pub remote_rtc_uids: Vec<String>,
    pub enable_string_uid: bool,
    pub idle_timeout: u64,
    pub mute_agent: bool,
    pub llm: LlmProperties,
    pub asr: AsrProperties,
    pub tts: TtsProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProperties {
    /// Workflow webhook acting as the language model endpoint
    pub url: String,
    /// Required by the vendor API even when the endpoint ignores it
    pub api_key: String,
    pub system_messages: Vec<SystemMessage>,
    pub greeting_message: String,
    pub failure_message: String,
    pub max_history: u32,
    pub params: LlmParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmParams {
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrProperties {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsProperties {
    pub vendor: String,
    pub params: TtsParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsParams {
    pub key: String,
    pub voice_id: String,
}

/// Vendor reply to a join request. Unknown fields are kept so the backend can
/// hand the payload back to its caller untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub agent_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error body returned by the vendor API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}
