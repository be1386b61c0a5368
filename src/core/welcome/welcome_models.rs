use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::embed::EmbedDraft;

/// How a welcome message is rendered by the bot. Only used when writing;
/// stored values are read back as plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Embed,
}

// ============================================================================
// MODULE STATE (GET /{guild}/welcome)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeModule {
    pub id: i64,
    pub guild_id: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_dm: Option<JoinDmSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_roles: Option<JoinRolesSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave: Option<LeaveSettings>,
}

// The backend keeps `messageType` as free text and `embed` as opaque JSON,
// so both are read without assuming a shape.

/// Message posted in a channel when someone joins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSettings {
    pub enabled: Option<bool>,
    pub message_type: Option<String>,
    pub channel_id: Option<String>,
    pub content: Option<String>,
    pub embed: Option<Value>,
}

/// Direct message sent to whoever joined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDmSettings {
    pub enabled: Option<bool>,
    pub message_type: Option<String>,
    pub content: Option<String>,
    pub embed: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRolesSettings {
    pub enabled: Option<bool>,
    pub roles: Option<Vec<String>>,
    pub delay: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSettings {
    pub enabled: Option<bool>,
    pub channel_id: Option<String>,
    pub content: Option<String>,
}

impl JoinSettings {
    /// The stored embed as an editable draft.
    pub fn embed_draft(&self) -> Result<Option<EmbedDraft>, serde_json::Error> {
        match &self.embed {
            None | Some(Value::Null) => Ok(None),
            Some(value) => EmbedDraft::from_saved_json(value.clone()).map(Some),
        }
    }
}

// ============================================================================
// MODULE UPDATE (POST /{guild}/welcome)
// ============================================================================
// Sections left as None are not touched by the backend. A section that is
// sent replaces every field in it, so unspecified fields are cleared.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_dm: Option<JoinDmUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_roles: Option<ToggleUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave: Option<ToggleUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinUpdate {
    pub enabled: Option<bool>,
    pub message_type: Option<MessageType>,
    pub channel_id: Option<String>,
    pub content: Option<String>,
    pub embed: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDmUpdate {
    pub enabled: Option<bool>,
    pub message_type: Option<MessageType>,
    pub content: Option<String>,
    pub embed: Option<Value>,
}

/// Sections the backend only lets us switch on or off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleUpdate {
    pub enabled: Option<bool>,
}

/// Body the backend sends along with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub code: u16,
    pub message: String,
}
