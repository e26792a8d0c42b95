/// Inbound webhook payloads from the voice provider.
///
/// The provider sends many message types; we act on two (`function-call` and
/// `status-update`) and deliberately swallow the rest. Parsing must never
/// fail the webhook: any payload we cannot understand becomes
/// `ServerMessage::Unknown` and is acknowledged without action.
use serde::Deserialize;
use serde_json::Value;

/// Status string the provider sends when a call has finished.
pub const CALL_ENDED: &str = "call-ended";

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "function-call")]
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },

    #[serde(rename = "status-update")]
    StatusUpdate {
        status: String,
        call: Option<CallStatus>,
    },

    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Parses a raw webhook body. Unrecognized types, missing tags, and
    /// malformed payloads for known types all collapse to `Unknown` rather
    /// than erroring.
    pub fn parse(body: Value) -> Self {
        serde_json::from_value(body).unwrap_or(ServerMessage::Unknown)
    }
}

#[derive(Debug, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub parameters: FunctionCallParameters,
}

/// Tool-call arguments. The session id stays a string here: a garbage id
/// from the model should produce a tool error result, not a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallParameters {
    pub interview_session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallStatus {
    pub id: String,
    #[serde(default)]
    pub transcript: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_function_call() {
        let body = json!({
            "type": "function-call",
            "functionCall": {
                "name": "get_candidate_resume_data",
                "parameters": { "interviewSessionId": "abc-123" }
            }
        });

        match ServerMessage::parse(body) {
            ServerMessage::FunctionCall { function_call } => {
                assert_eq!(function_call.name, "get_candidate_resume_data");
                assert_eq!(
                    function_call.parameters.interview_session_id.as_deref(),
                    Some("abc-123")
                );
            }
            other => panic!("expected FunctionCall, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_function_call_without_parameters() {
        let body = json!({
            "type": "function-call",
            "functionCall": { "name": "get_candidate_resume_data" }
        });

        match ServerMessage::parse(body) {
            ServerMessage::FunctionCall { function_call } => {
                assert!(function_call.parameters.interview_session_id.is_none());
            }
            other => panic!("expected FunctionCall, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_call_ended_status_update() {
        let body = json!({
            "type": "status-update",
            "status": "call-ended",
            "call": { "id": "call_9", "transcript": "AI: Hello.\nUser: Hi." }
        });

        match ServerMessage::parse(body) {
            ServerMessage::StatusUpdate { status, call } => {
                assert_eq!(status, CALL_ENDED);
                let call = call.unwrap();
                assert_eq!(call.id, "call_9");
                assert_eq!(call.transcript.as_deref(), Some("AI: Hello.\nUser: Hi."));
            }
            other => panic!("expected StatusUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_status_update_without_transcript() {
        let body = json!({
            "type": "status-update",
            "status": "in-progress",
            "call": { "id": "call_9" }
        });

        match ServerMessage::parse(body) {
            ServerMessage::StatusUpdate { status, call } => {
                assert_eq!(status, "in-progress");
                assert!(call.unwrap().transcript.is_none());
            }
            other => panic!("expected StatusUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_type_is_unknown() {
        let body = json!({ "type": "speech-update", "status": "started" });
        assert!(matches!(ServerMessage::parse(body), ServerMessage::Unknown));
    }

    #[test]
    fn test_missing_type_is_unknown() {
        let body = json!({ "hello": "world" });
        assert!(matches!(ServerMessage::parse(body), ServerMessage::Unknown));
    }

    #[test]
    fn test_malformed_known_type_is_unknown() {
        // Correct tag but functionCall is not an object.
        let body = json!({ "type": "function-call", "functionCall": 42 });
        assert!(matches!(ServerMessage::parse(body), ServerMessage::Unknown));
    }

    #[test]
    fn test_non_object_body_is_unknown() {
        assert!(matches!(
            ServerMessage::parse(json!("ping")),
            ServerMessage::Unknown
        ));
    }
}
