use crate::data::Snapshot;
use crate::entity::{EntityDescription, EntityKind, SensorValue};

/// Binary sensors projected from one channel's snapshot fields. Only
/// liveness today; the enum keeps the dispatch exhaustive if more are
/// added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarySensorKind {
    /// Whether the channel currently has an active stream.
    Live,
}

impl BinarySensorKind {
    /// Boolean reading: `false` for offline channels and for channels
    /// missing from the snapshot.
    pub fn is_on(&self, snapshot: &Snapshot, channel_id: &str) -> bool {
        match self {
            BinarySensorKind::Live => snapshot
                .channel(channel_id)
                .map(|channel| channel.is_live())
                .unwrap_or(false),
        }
    }
}

impl EntityKind for BinarySensorKind {
    fn key_suffix(&self) -> &'static str {
        match self {
            BinarySensorKind::Live => "live",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BinarySensorKind::Live => "live",
        }
    }

    fn value(&self, snapshot: &Snapshot, channel_id: &str) -> Option<SensorValue> {
        let channel = snapshot.channel(channel_id)?;
        match self {
            BinarySensorKind::Live => Some(SensorValue::Flag(channel.is_live())),
        }
    }

    /// The full channel status map, mirroring what the stream-status
    /// entity historically exposed as attributes.
    fn attributes(&self, snapshot: &Snapshot, channel_id: &str) -> Option<serde_json::Value> {
        let channel = snapshot.channel(channel_id)?;

        Some(serde_json::json!({
            "game": channel.stream.as_ref().map(|s| s.game_name.clone()),
            "title": channel.stream.as_ref().map(|s| s.title.clone()),
            "started_at": channel.stream.as_ref().map(|s| s.started_at),
            "views": channel.stream.as_ref().map(|s| s.viewer_count),
            "subscribed": channel.subscription.is_some(),
            "subscription_is_gifted": channel.subscription.as_ref().map(|s| s.is_gift),
            "followers": channel.followers,
            "following_since": channel.following.as_ref().map(|f| f.followed_at),
        }))
    }
}

/// One liveness entity per tracked channel, in snapshot order.
pub fn describe_binary_sensors(snapshot: &Snapshot) -> Vec<EntityDescription<BinarySensorKind>> {
    snapshot
        .channels
        .iter()
        .map(|channel| EntityDescription::new(BinarySensorKind::Live, channel))
        .collect()
}
