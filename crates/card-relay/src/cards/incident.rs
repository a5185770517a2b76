//! Monitoring incident → card rules.

use super::adaptive::{markdown_lines, AdaptiveCard, CardAction};
use super::legacy::{MessageCard, PotentialAction, Section};
use super::{Card, CardSchema, Fact, RenderCard};
use crate::error::ValidationError;
use crate::events::IncidentEvent;
use crate::humanize::{duration_between, format_timestamp, unix_timestamp};

/// Red
const OPENED_COLOR: &str = "#F5222D";
/// Blue
const CLOSED_COLOR: &str = "#1890FF";

const MISSING_NAME: &str = "-";
const NO_SUMMARY: &str = "No summary available.";
const ACTION_LABEL: &str = "View Incident";

/// Schema-neutral reading of an incident.
struct IncidentView<'a> {
    incident_id: &'a str,
    policy_name: &'a str,
    condition_name: &'a str,
    opened: bool,
    summary: Option<&'a str>,
    timeline: Vec<Fact>,
    url: &'a str,
}

impl<'a> IncidentView<'a> {
    fn new(incident: &'a IncidentEvent) -> Result<Self, ValidationError> {
        Ok(Self {
            incident_id: &incident.incident_id,
            policy_name: or_dash(&incident.policy_name),
            condition_name: or_dash(&incident.condition_name),
            opened: incident.is_open(),
            summary: Some(incident.summary.as_str()).filter(|s| !s.is_empty()),
            timeline: timeline(incident)?,
            url: &incident.url,
        })
    }

    fn title(&self) -> String {
        let verb = if self.opened { "opened" } else { "closed" };
        format!("Incident {verb} for \"{}\".", self.policy_name)
    }

    const fn status(&self) -> &'static str {
        if self.opened {
            "Opened"
        } else {
            "Closed"
        }
    }

    const fn color(&self) -> &'static str {
        if self.opened {
            OPENED_COLOR
        } else {
            CLOSED_COLOR
        }
    }

    fn into_legacy(self) -> MessageCard {
        let summary = self.summary.unwrap_or(NO_SUMMARY).to_string();

        let mut facts = vec![
            Fact::new("Incident ID", self.incident_id),
            Fact::new("Condition", self.condition_name),
        ];
        facts.extend(self.timeline.iter().cloned());

        let mut card = MessageCard::new();
        card.title = self.title();
        card.theme_color = Some(self.color().to_string());
        card.text.clone_from(&summary);
        card.summary = summary;
        card.sections = vec![Section { facts }];
        card.potential_actions = vec![PotentialAction::open_uri(ACTION_LABEL, self.url)];
        card
    }

    fn into_adaptive(self) -> AdaptiveCard {
        let mut lines = vec![
            Fact::new("Incident ID", self.incident_id),
            Fact::new("Condition", self.condition_name),
        ];
        // No placeholder here: the adaptive card drops the line instead.
        if let Some(summary) = self.summary {
            lines.push(Fact::new("Summary", summary));
        }
        lines.push(Fact::new("Status", self.status()));
        lines.extend(self.timeline.iter().cloned());

        AdaptiveCard::with_text_and_action(
            markdown_lines(&lines),
            CardAction::open_url(ACTION_LABEL, self.url),
        )
    }
}

impl RenderCard for IncidentEvent {
    fn render(&self, schema: CardSchema) -> Result<Card, ValidationError> {
        let view = IncidentView::new(self)?;
        Ok(match schema {
            CardSchema::Legacy => Card::Legacy(view.into_legacy()),
            CardSchema::Adaptive => Card::Adaptive(view.into_adaptive()),
        })
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        MISSING_NAME
    } else {
        value
    }
}

/// `Started at`, then `Ended at` with the elapsed duration. The end is never
/// shown without a start.
fn timeline(incident: &IncidentEvent) -> Result<Vec<Fact>, ValidationError> {
    let Some(started) = unix_timestamp("started_at", incident.started_at)? else {
        return Ok(Vec::new());
    };

    let mut facts = vec![Fact::new("Started at", format_timestamp(&started))];
    if let Some(ended) = unix_timestamp("ended_at", incident.ended_at)? {
        facts.push(Fact::new(
            "Ended at",
            format!(
                "{} ({})",
                format_timestamp(&ended),
                duration_between(&started, &ended)
            ),
        ));
    }
    Ok(facts)
}
