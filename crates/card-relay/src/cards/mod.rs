//! Card documents and the event → card rules.
//!
//! Every event kind renders into either outbound schema through
//! [`RenderCard`]. Each rule module first builds one schema-neutral view of
//! the event (defaults, colors, timeline) and then projects that view into
//! the requested container, so both schemas always agree on content.

pub mod adaptive;
pub mod build;
pub mod incident;
pub mod legacy;

use serde::Serialize;

use crate::error::ValidationError;
use crate::events::{Event, IncidentNotification};

pub use adaptive::AdaptiveCard;
pub use legacy::MessageCard;

/// Outbound card schema selected by the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardSchema {
    /// Connector "message card"
    Legacy,
    /// Workflow "adaptive card"
    Adaptive,
}

impl CardSchema {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Adaptive => "adaptive",
        }
    }
}

/// A rendered card, ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Card {
    Legacy(MessageCard),
    Adaptive(AdaptiveCard),
}

impl Card {
    #[must_use]
    pub const fn schema(&self) -> CardSchema {
        match self {
            Self::Legacy(_) => CardSchema::Legacy,
            Self::Adaptive(_) => CardSchema::Adaptive,
        }
    }

    /// Serialize to the exact bytes sent downstream and echoed to the caller.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// A labelled value shown on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

impl Fact {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Render an event into a card of the requested schema.
///
/// Implementations are pure: the same event always yields the same card.
pub trait RenderCard {
    fn render(&self, schema: CardSchema) -> Result<Card, ValidationError>;
}

impl RenderCard for IncidentNotification {
    fn render(&self, schema: CardSchema) -> Result<Card, ValidationError> {
        self.incident.render(schema)
    }
}

impl RenderCard for Event {
    fn render(&self, schema: CardSchema) -> Result<Card, ValidationError> {
        match self {
            Self::Incident(notification) => notification.render(schema),
            Self::Build(build) => build.render(schema),
        }
    }
}
