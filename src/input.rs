use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Input JSON from the host's PostToolUse hook.
///
/// Every field is optional and a field of the wrong JSON type reads as
/// absent: `tool_response` in particular may be a string or a content array.
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    #[serde(default, deserialize_with = "lenient")]
    pub hook_event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub session_id: Option<String>,
    /// Working directory of the host session
    #[serde(default, deserialize_with = "lenient")]
    pub cwd: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tool_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tool_input: Option<ToolInput>,
    #[serde(default, deserialize_with = "lenient")]
    pub tool_response: Option<ToolResponse>,
}

/// Arguments the tool was called with
#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default, deserialize_with = "lenient")]
    pub file_path: Option<String>,
}

/// What the tool reported back after running
#[derive(Debug, Default, Deserialize)]
pub struct ToolResponse {
    #[serde(
        default,
        rename = "filePath",
        alias = "file_path",
        deserialize_with = "lenient"
    )]
    pub file_path: Option<String>,
}

/// Reads any JSON value, keeping it only if it has the expected shape
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl HookInput {
    /// Parse a hook payload. Only malformed JSON is an error; a valid
    /// document of any other shape yields an empty input.
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).context("Failed to parse hook input JSON")?;
        if !value.is_object() {
            return Ok(HookInput::default());
        }
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    /// File the event refers to. `tool_input` wins over `tool_response`;
    /// empty strings count as absent.
    pub fn file_path(&self) -> Option<&str> {
        let primary = self
            .tool_input
            .as_ref()
            .and_then(|t| t.file_path.as_deref());
        let fallback = self
            .tool_response
            .as_ref()
            .and_then(|t| t.file_path.as_deref());

        primary
            .filter(|p| !p.is_empty())
            .or_else(|| fallback.filter(|p| !p.is_empty()))
    }
}
