use crate::data::Snapshot;
use crate::entity::{
    channel_picture, format_picture_url, EntityDescription, EntityKind, SensorValue,
    GAME_PICTURE_SIZE,
};

/// Informational sensors projected from one channel's snapshot fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Name of the game the live stream plays.
    Game,
    /// Title of the live stream.
    Title,
    /// Total follower count of the channel.
    Followers,
    /// When the authenticated user started following the channel.
    FollowedSince,
    /// Viewer count of the live stream.
    Viewers,
    /// Whether the authenticated user subscribes to the channel.
    Subscription,
    /// Whether that subscription was gifted.
    SubscriptionGifted,
}

impl SensorKind {
    pub const ALL: [SensorKind; 7] = [
        SensorKind::Game,
        SensorKind::Title,
        SensorKind::Followers,
        SensorKind::FollowedSince,
        SensorKind::Viewers,
        SensorKind::Subscription,
        SensorKind::SubscriptionGifted,
    ];
}

impl EntityKind for SensorKind {
    fn key_suffix(&self) -> &'static str {
        match self {
            SensorKind::Game => "game",
            SensorKind::Title => "title",
            SensorKind::Followers => "followers",
            SensorKind::FollowedSince => "following_since",
            SensorKind::Viewers => "views",
            SensorKind::Subscription => "subscribed",
            SensorKind::SubscriptionGifted => "subscription_is_gifted",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SensorKind::Game => "game",
            SensorKind::Title => "title",
            SensorKind::Followers => "followers",
            SensorKind::FollowedSince => "following since",
            SensorKind::Viewers => "views",
            SensorKind::Subscription => "subscribed",
            SensorKind::SubscriptionGifted => "subscription gifted",
        }
    }

    fn value(&self, snapshot: &Snapshot, channel_id: &str) -> Option<SensorValue> {
        let channel = snapshot.channel(channel_id)?;

        match self {
            SensorKind::Game => channel
                .stream
                .as_ref()
                .map(|stream| SensorValue::Text(stream.game_name.clone())),
            SensorKind::Title => channel
                .stream
                .as_ref()
                .map(|stream| SensorValue::Text(stream.title.clone())),
            SensorKind::Followers => channel.followers.map(SensorValue::Count),
            SensorKind::FollowedSince => channel
                .following
                .as_ref()
                .map(|follow| SensorValue::Timestamp(follow.followed_at)),
            SensorKind::Viewers => channel
                .stream
                .as_ref()
                .map(|stream| SensorValue::Count(stream.viewer_count)),
            SensorKind::Subscription => {
                Some(SensorValue::Flag(channel.subscription.is_some()))
            }
            SensorKind::SubscriptionGifted => channel
                .subscription
                .as_ref()
                .map(|subscription| SensorValue::Flag(subscription.is_gift)),
        }
    }

    fn entity_picture(&self, snapshot: &Snapshot, channel_id: &str) -> Option<String> {
        let channel = snapshot.channel(channel_id)?;

        match self {
            SensorKind::Game => channel
                .game
                .as_ref()
                .map(|game| format_picture_url(&game.box_art_url, GAME_PICTURE_SIZE)),
            _ => channel_picture(channel),
        }
    }
}

/// One sensor entity per kind per tracked channel, in snapshot order.
pub fn describe_sensors(snapshot: &Snapshot) -> Vec<EntityDescription<SensorKind>> {
    snapshot
        .channels
        .iter()
        .flat_map(|channel| {
            SensorKind::ALL
                .iter()
                .map(|kind| EntityDescription::new(*kind, channel))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::data::test_support::{live_stream, offline_channel, user};
    use crate::data::{Follow, Subscription};

    fn snapshot() -> Snapshot {
        let mut alpha = offline_channel("1", "Alpha");
        alpha.stream = Some(live_stream("1", "Live!", "Chess", 42));
        alpha.followers = Some(1234);
        alpha.following = Some(Follow {
            broadcaster_id: "1".to_string(),
            broadcaster_login: "alpha".to_string(),
            broadcaster_name: "Alpha".to_string(),
            followed_at: Utc.with_ymd_and_hms(2022, 5, 24, 22, 22, 8).unwrap(),
        });
        alpha.subscription = Some(Subscription {
            broadcaster_id: "1".to_string(),
            tier: "1000".to_string(),
            is_gift: true,
        });
        alpha.game = Some(crate::data::Game {
            id: "g1".to_string(),
            name: "Chess".to_string(),
            box_art_url: "https://cdn.example/chess-{width}x{height}.jpg".to_string(),
        });

        Snapshot::new(vec![alpha, offline_channel("2", "Zeta")], user("9", "Me"))
    }

    #[test]
    fn live_channel_values() {
        let snapshot = snapshot();

        assert_eq!(
            SensorKind::Game.value(&snapshot, "1"),
            Some(SensorValue::Text("Chess".to_string()))
        );
        assert_eq!(
            SensorKind::Title.value(&snapshot, "1"),
            Some(SensorValue::Text("Live!".to_string()))
        );
        assert_eq!(
            SensorKind::Viewers.value(&snapshot, "1"),
            Some(SensorValue::Count(42))
        );
        assert_eq!(
            SensorKind::Followers.value(&snapshot, "1"),
            Some(SensorValue::Count(1234))
        );
        assert_eq!(
            SensorKind::Subscription.value(&snapshot, "1"),
            Some(SensorValue::Flag(true))
        );
        assert_eq!(
            SensorKind::SubscriptionGifted.value(&snapshot, "1"),
            Some(SensorValue::Flag(true))
        );
        assert!(matches!(
            SensorKind::FollowedSince.value(&snapshot, "1"),
            Some(SensorValue::Timestamp(_))
        ));
    }

    #[test]
    fn offline_channel_values_are_absent() {
        let snapshot = snapshot();

        assert_eq!(SensorKind::Game.value(&snapshot, "2"), None);
        assert_eq!(SensorKind::Title.value(&snapshot, "2"), None);
        assert_eq!(SensorKind::Viewers.value(&snapshot, "2"), None);
        // Not subscribed is a real false, not an absent value.
        assert_eq!(
            SensorKind::Subscription.value(&snapshot, "2"),
            Some(SensorValue::Flag(false))
        );
        assert_eq!(SensorKind::SubscriptionGifted.value(&snapshot, "2"), None);
    }

    #[test]
    fn unknown_channel_is_unavailable_and_valueless() {
        let snapshot = snapshot();

        assert!(!SensorKind::Game.is_available(&snapshot, "404"));
        assert_eq!(SensorKind::Game.value(&snapshot, "404"), None);
        assert_eq!(SensorKind::Game.entity_picture(&snapshot, "404"), None);

        assert!(SensorKind::Game.is_available(&snapshot, "1"));
    }

    #[test]
    fn game_sensor_uses_box_art() {
        let snapshot = snapshot();

        assert_eq!(
            SensorKind::Game.entity_picture(&snapshot, "1").unwrap(),
            "https://cdn.example/chess-300x400.jpg"
        );
        // Other sensors use the stream thumbnail / profile image rule.
        assert!(SensorKind::Title
            .entity_picture(&snapshot, "1")
            .unwrap()
            .contains("1280x720"));
    }

    #[test]
    fn descriptions_cover_every_kind_for_every_channel() {
        let snapshot = snapshot();
        let descriptions = describe_sensors(&snapshot);

        assert_eq!(descriptions.len(), 2 * SensorKind::ALL.len());
        assert_eq!(descriptions[0].key, "1_game");
        assert_eq!(descriptions[0].name, "Alpha game");
        assert_eq!(descriptions[0].icon, "mdi:twitch");
    }
}
