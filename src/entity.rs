use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::{Channel, Snapshot};

pub const ICON: &str = "mdi:twitch";

/// Stream thumbnails render at 1280x720, game box art at 300x400.
pub(crate) const STREAM_PICTURE_SIZE: (u32, u32) = (1280, 720);
pub(crate) const GAME_PICTURE_SIZE: (u32, u32) = (300, 400);

/// Scalar state of an informational sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Text(String),
    Count(u64),
    Timestamp(DateTime<Utc>),
    Flag(bool),
}

/// Common projection surface of every sensor kind: a pure, stateless
/// read of the current snapshot. Kinds are closed enums so the mapping
/// from snapshot fields to entity state stays exhaustive.
pub trait EntityKind {
    /// Stable key suffix; the full entity key is `"{channel_id}_{suffix}"`.
    fn key_suffix(&self) -> &'static str;

    /// Human-readable label appended to the channel display name.
    fn label(&self) -> &'static str;

    fn value(&self, snapshot: &Snapshot, channel_id: &str) -> Option<SensorValue>;

    /// Default availability: the channel exists in the snapshot.
    fn is_available(&self, snapshot: &Snapshot, channel_id: &str) -> bool {
        snapshot.channel(channel_id).is_some()
    }

    fn entity_picture(&self, snapshot: &Snapshot, channel_id: &str) -> Option<String> {
        snapshot.channel(channel_id).and_then(channel_picture)
    }

    fn attributes(&self, _snapshot: &Snapshot, _channel_id: &str) -> Option<serde_json::Value> {
        None
    }

    fn key(&self, channel_id: &str) -> String {
        format!("{}_{}", channel_id, self.key_suffix())
    }

    fn name(&self, channel: &Channel) -> String {
        format!("{} {}", channel.display_name, self.label())
    }
}

/// One concrete entity: a kind bound to a channel, with the identity
/// metadata the host registers it under.
#[derive(Debug, Clone)]
pub struct EntityDescription<K> {
    pub key: String,
    pub name: String,
    pub icon: &'static str,
    pub channel_id: String,
    pub kind: K,
}

impl<K: EntityKind> EntityDescription<K> {
    pub fn new(kind: K, channel: &Channel) -> Self {
        Self {
            key: kind.key(&channel.id),
            name: kind.name(channel),
            icon: ICON,
            channel_id: channel.id.clone(),
            kind,
        }
    }

    pub fn value(&self, snapshot: &Snapshot) -> Option<SensorValue> {
        self.kind.value(snapshot, &self.channel_id)
    }

    pub fn is_available(&self, snapshot: &Snapshot) -> bool {
        self.kind.is_available(snapshot, &self.channel_id)
    }

    pub fn entity_picture(&self, snapshot: &Snapshot) -> Option<String> {
        self.kind.entity_picture(snapshot, &self.channel_id)
    }

    pub fn attributes(&self, snapshot: &Snapshot) -> Option<serde_json::Value> {
        self.kind.attributes(snapshot, &self.channel_id)
    }
}

/// Substitute the `{width}`/`{height}` placeholders Helix leaves in
/// thumbnail and box-art URL templates.
pub fn format_picture_url(template: &str, (width, height): (u32, u32)) -> String {
    template
        .replace("{width}", &width.to_string())
        .replace("{height}", &height.to_string())
}

/// Stream thumbnail while live, channel profile image otherwise.
pub(crate) fn channel_picture(channel: &Channel) -> Option<String> {
    match &channel.stream {
        Some(stream) => Some(format_picture_url(&stream.thumbnail_url, STREAM_PICTURE_SIZE)),
        None => channel.profile_image_url.clone(),
    }
}
