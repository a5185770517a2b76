//! CI/CD build → card rules.

use super::adaptive::{markdown_lines, AdaptiveCard, CardAction};
use super::legacy::{MessageCard, PotentialAction};
use super::{Card, CardSchema, Fact, RenderCard};
use crate::error::ValidationError;
use crate::events::{BuildEvent, BuildStatus};

const ACTION_LABEL: &str = "View Logs";

impl BuildStatus {
    /// Theme color for a known status; `None` for anything unrecognized.
    #[must_use]
    pub const fn theme_color(&self) -> Option<&'static str> {
        match self {
            Self::Queued => Some("#808080"),    // Gray
            Self::Working => Some("#FFA500"),   // Orange
            Self::Success => Some("#008000"),   // Green
            Self::Failure => Some("#FF0000"),   // Red
            Self::Cancelled => Some("#FFFFFF"), // White
            Self::Other(_) => None,
        }
    }
}

fn legacy_card(build: &BuildEvent) -> MessageCard {
    let mut card = MessageCard::new();
    card.title = format!("Cloud Build ({})", build.trigger_name);
    card.text = format!("**Tag** {}<br>**Status** {}", build.tag, build.status);
    card.theme_color = build.status.theme_color().map(str::to_string);
    card.potential_actions = vec![PotentialAction::open_uri(ACTION_LABEL, &build.log_url)];
    card
}

fn adaptive_card(build: &BuildEvent) -> AdaptiveCard {
    let lines = [
        Fact::new("Cloud Build", &build.trigger_name),
        Fact::new("Tag", &build.tag),
        Fact::new("Status", build.status.as_str()),
    ];
    AdaptiveCard::with_text_and_action(
        markdown_lines(&lines),
        CardAction::open_url(ACTION_LABEL, &build.log_url),
    )
}

impl RenderCard for BuildEvent {
    fn render(&self, schema: CardSchema) -> Result<Card, ValidationError> {
        Ok(match schema {
            CardSchema::Legacy => Card::Legacy(legacy_card(self)),
            CardSchema::Adaptive => Card::Adaptive(adaptive_card(self)),
        })
    }
}
