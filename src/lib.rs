//! Polling core of a Twitch channel-status integration for a host
//! automation framework.
//!
//! An [`UpdateCoordinator`] periodically pulls the authenticated user's
//! tracked channels from the Helix API (live stream, game, followers,
//! follow relation, subscription), assembles them into an immutable
//! [`Snapshot`], and hands it to the host through a [`SnapshotSink`].
//! The [`sensor`] and [`binary_sensor`] modules project snapshot fields
//! onto read-only entity values.
//!
//! OAuth2 token acquisition and refresh stay with the host; the client
//! asks for the current bearer token through [`AccessTokenProvider`].

pub mod binary_sensor;
pub mod config;
pub mod coordinator;
pub mod data;
pub mod entity;
pub mod error;
pub mod helix;
pub mod sensor;

pub use config::IntegrationOptions;
pub use coordinator::{SnapshotSink, UpdateCoordinator};
pub use data::{Channel, Snapshot, User};
pub use entity::{EntityDescription, EntityKind, SensorValue};
pub use error::{TwitchError, TwitchResult, UpdateError};
pub use helix::{AccessTokenProvider, HelixClient, TwitchApi, OAUTH_SCOPES};
