/// Voice provider client: the single point of entry for all calls to the
/// voice-AI provider's API.
///
/// ARCHITECTURAL RULE: No other module may talk to the provider directly.
/// The client is constructed once at startup from `Config` and carried in
/// `AppState`; missing credentials fail the boot, not a request.
///
/// Neither operation retries: both create remote resources (a live call, an
/// assistant), so a blind retry could dial a candidate twice.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub mod events;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Outbound wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallRequest<'a> {
    pub assistant_id: &'a str,
    pub customer: Customer<'a>,
    pub metadata: CallMetadata,
}

#[derive(Debug, Serialize)]
pub struct Customer<'a> {
    /// Phone number, or the `"browser"` sentinel for a web call.
    pub number: &'a str,
}

/// Rides along on the provider call so the assistant's tool call can find the
/// session it belongs to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMetadata {
    pub interview_session_id: Uuid,
}

/// The provider's acknowledgement of a created call. Only the id matters here.
#[derive(Debug, Deserialize)]
pub struct CallHandle {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest {
    pub model: AssistantModel,
    pub voice: AssistantVoice,
    pub transcriber: AssistantTranscriber,
    pub first_message: String,
    pub end_call_message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantModel {
    pub provider: &'static str,
    pub model: &'static str,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantVoice {
    pub provider: &'static str,
    pub voice_id: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AssistantTranscriber {
    pub provider: &'static str,
    pub model: &'static str,
    pub language: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct AssistantHandle {
    pub id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single voice-provider client used by the interview flow.
#[derive(Clone)]
pub struct VoiceClient {
    client: Client,
    api_key: String,
    assistant_id: String,
    base_url: String,
}

impl VoiceClient {
    pub fn new(api_key: String, assistant_id: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            assistant_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Starts a provider-hosted call against the configured assistant,
    /// tagging it with the interview session id.
    pub async fn create_call(
        &self,
        customer_number: &str,
        session_id: Uuid,
    ) -> Result<CallHandle, VoiceError> {
        let body = CreateCallRequest {
            assistant_id: &self.assistant_id,
            customer: Customer {
                number: customer_number,
            },
            metadata: CallMetadata {
                interview_session_id: session_id,
            },
        };

        let call: CallHandle = self.post_json("/call", &body).await?;
        debug!("Provider call created: {}", call.id);
        Ok(call)
    }

    /// Creates a one-off assistant (per-interview system prompt and voice
    /// settings) and returns its provider id.
    pub async fn create_assistant(
        &self,
        request: &CreateAssistantRequest,
    ) -> Result<AssistantHandle, VoiceError> {
        let assistant: AssistantHandle = self.post_json("/assistant", request).await?;
        debug!("Provider assistant created: {}", assistant.id);
        Ok(assistant)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, VoiceError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            // Providers wrap failures as {"message": "..."}; fall back to the
            // raw body when the shape differs.
            let message = serde_json::from_str::<ProviderError>(&raw)
                .map(|e| e.message)
                .unwrap_or(raw);
            return Err(VoiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
