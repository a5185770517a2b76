//! Connector "message card" document.

use serde::Serialize;

use super::Fact;

const MESSAGE_CARD_TYPE: &str = "MessageCard";
const MESSAGE_CARD_CONTEXT: &str = "https://schema.org/extensions";

/// Legacy connector card. Empty members are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
    #[serde(rename = "potentialAction", skip_serializing_if = "Vec::is_empty")]
    pub potential_actions: Vec<PotentialAction>,
}

impl MessageCard {
    /// Empty card with the schema type and context filled in.
    #[must_use]
    pub fn new() -> Self {
        Self {
            card_type: MESSAGE_CARD_TYPE.to_string(),
            context: MESSAGE_CARD_CONTEXT.to_string(),
            summary: String::new(),
            title: String::new(),
            text: String::new(),
            theme_color: None,
            sections: Vec::new(),
            potential_actions: Vec::new(),
        }
    }
}

impl Default for MessageCard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<Fact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotentialAction {
    #[serde(rename = "@type")]
    pub action_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<OpenUriTarget>,
}

impl PotentialAction {
    /// `OpenUri` action with a single default-OS target.
    pub fn open_uri(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            action_type: "OpenUri".to_string(),
            name: name.into(),
            targets: vec![OpenUriTarget {
                os: "default".to_string(),
                uri: uri.into(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenUriTarget {
    pub os: String,
    pub uri: String,
}
