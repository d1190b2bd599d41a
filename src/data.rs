use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated Twitch user. Resolved once per process lifetime and
/// cached on the coordinator; it changes far less often than per-cycle
/// channel data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A follow relationship from the authenticated user to a broadcaster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Follow {
    pub broadcaster_id: String,
    pub broadcaster_login: String,
    pub broadcaster_name: String,
    pub followed_at: DateTime<Utc>,
}

/// Game / category metadata. `box_art_url` is a Helix template with
/// `{width}`/`{height}` placeholders.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub box_art_url: String,
}

/// A live stream. Present on a channel iff the channel is currently
/// live; liveness is defined solely by its presence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Stream {
    pub id: String,
    pub user_id: String,
    pub game_id: String,
    pub game_name: String,
    pub title: String,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    /// `{width}x{height}` thumbnail template.
    pub thumbnail_url: String,
}

/// The authenticated user's subscription to a broadcaster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subscription {
    pub broadcaster_id: String,
    pub tier: String,
    pub is_gift: bool,
}

/// One tracked channel and its derived status fields. Optional fields
/// are `None` when the corresponding lookup found nothing, which is
/// normal rather than an error.
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<Follow>,
    pub game: Option<Game>,
    pub stream: Option<Stream>,
    pub subscription: Option<Subscription>,
}

impl Channel {
    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }
}

/// The fully assembled result of one update cycle. Replaced wholesale
/// each cycle; consumers always read an internally consistent snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Tracked channels, sorted ascending by case-insensitive display
    /// name. Channel ids are unique within one snapshot.
    pub channels: Vec<Channel>,
    pub user: User,
}

impl Snapshot {
    pub fn new(mut channels: Vec<Channel>, user: User) -> Self {
        sort_channels(&mut channels);
        Snapshot { channels, user }
    }

    /// Linear scan; the channel list is small and user-configured, so no
    /// index structure is kept.
    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.id == channel_id)
    }
}

fn sort_channels(channels: &mut [Channel]) {
    channels.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
    });
}
