//! Workflow "adaptive card" document.

use serde::Serialize;

use super::Fact;

const ATTACHMENT_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";
const ADAPTIVE_CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
const ADAPTIVE_CARD_VERSION: &str = "1.0";

/// Message envelope carrying one adaptive card attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdaptiveCard {
    pub attachments: Vec<Attachment>,
}

impl AdaptiveCard {
    /// Card with a wrapped text block followed by a single-action action set.
    #[must_use]
    pub fn with_text_and_action(text: String, action: CardAction) -> Self {
        Self {
            attachments: vec![Attachment {
                content_type: ATTACHMENT_CONTENT_TYPE.to_string(),
                content: CardContent {
                    schema: ADAPTIVE_CARD_SCHEMA.to_string(),
                    card_type: "AdaptiveCard".to_string(),
                    version: ADAPTIVE_CARD_VERSION.to_string(),
                    body: vec![
                        BodyElement::TextBlock { wrap: true, text },
                        BodyElement::ActionSet {
                            actions: vec![action],
                        },
                    ],
                },
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    pub content: CardContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardContent {
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub version: String,
    pub body: Vec<BodyElement>,
}

/// Typed block in the card body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum BodyElement {
    TextBlock { wrap: bool, text: String },
    ActionSet { actions: Vec<CardAction> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub title: String,
    pub url: String,
    pub style: String,
}

impl CardAction {
    pub fn open_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            action_type: "Action.OpenUrl".to_string(),
            title: title.into(),
            url: url.into(),
            style: "positive".to_string(),
        }
    }
}

/// Render facts as markdown lines, one `*Name*: value` per hard line break.
#[must_use]
pub fn markdown_lines(facts: &[Fact]) -> String {
    facts
        .iter()
        .map(|fact| format!("  \n*{}*: {}", fact.name, fact.value))
        .collect()
}
