//! Request and response bodies, versioned so the wire shape can evolve
//! without touching the agent types.

pub mod v1 {
    use lingua_core::{Command, HistoryEntry, Language, Model};
    use serde::{Deserialize, Serialize};

    pub use lingua_core::TranslateOutput as TranslateResponse;

    /// Body of `POST /api/translate`. Every field is optional; an empty body
    /// is the same as `{}`.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    pub struct TranslateRequest {
        #[serde(default)]
        pub text: Option<String>,
        #[serde(default)]
        pub to_language: Option<Language>,
        #[serde(default)]
        pub model: Option<Model>,
        #[serde(default)]
        pub command: Option<Command>,
    }

    impl TranslateRequest {
        pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Self::default());
            }
            serde_json::from_slice(body)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HistoryResponse {
        pub thread_id: String,
        pub translation_count: u64,
        pub history: Vec<HistoryEntry>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClearResponse {
        pub thread_id: String,
        pub cleared: bool,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct HealthResponse {
        pub status: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorDetail {
        pub kind: String,
        pub message: String,
    }

    /// Body of every non-2xx response.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: ErrorDetail,
    }
}
