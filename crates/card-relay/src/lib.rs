//! Webhook-to-card relay for Teams channels.
//!
//! This crate receives monitoring incident and CI/CD build webhooks,
//! renders them as Teams cards and relays each card to a configured
//! channel webhook.
//!
//! # Usage
//!
//! ```no_run
//! use card_relay::{BuildEvent, CardSchema, RenderCard};
//!
//! let build = BuildEvent::decode(br#"{"triggerName":"deploy","status":"SUCCESS"}"#)?;
//! let card = build.render(CardSchema::Legacy)?;
//! let payload = card.to_json()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Configuration
//!
//! The service is configured via flags or environment variables:
//!
//! - `TEAMS_CHANNEL`: webhook receiving message cards (required)
//! - `TEAMS_CHANNEL_WORKFLOW`: workflow webhook receiving adaptive cards (required)
//! - `PORT` / `HOST`: listen port and IP address (default `0.0.0.0:8080`)
//! - `RELAY_TIMEOUT_SECS`: downstream request timeout (default 5)
//!
//! # Architecture
//!
//! - [`events`] decodes request bodies into [`IncidentNotification`] or [`BuildEvent`]
//! - [`RenderCard`] maps an event to a [`Card`] of either [`CardSchema`]
//! - [`Relay`] delivers the serialized card; [`WebhookRelay`] does it over HTTP
//! - [`server`] wires the routes and maps errors to HTTP statuses

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod cards;
pub mod config;
pub mod error;
pub mod events;
pub mod humanize;
pub mod relay;
pub mod server;

pub use cards::{Card, CardSchema, RenderCard};
pub use config::{Config, LogFormat, Settings};
pub use error::{ConfigError, DecodeError, RelayError, RelayServiceError, ValidationError};
pub use events::{BuildEvent, BuildStatus, Event, EventKind, IncidentEvent, IncidentNotification};
pub use relay::{Relay, WebhookRelay};
pub use server::{build_router, run_server, AppState};
