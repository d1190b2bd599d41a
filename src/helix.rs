use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use crate::data::{Follow, Game, Stream, Subscription, User};
use crate::error::{TwitchError, TwitchResult};

const TWITCH_API_URL: &str = "https://api.twitch.tv/helix";

/// OAuth scopes the bearer token must carry for all lookups this crate
/// performs. Requesting them is the host's job.
pub const OAUTH_SCOPES: &[&str] = &[
    "user:read:follows",
    "user:read:subscriptions",
    "moderator:read:followers",
];

/// Source of a valid OAuth2 bearer token. Token acquisition and refresh
/// are entirely the host framework's responsibility; the client only
/// asks for the current token before each request.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync + 'static {
    async fn access_token(&self) -> TwitchResult<String>;
}

/// The read-only subset of the Helix API the update coordinator needs.
///
/// A trait seam so the coordinator can be driven by a mock in tests.
#[async_trait]
pub trait TwitchApi: Send + Sync + 'static {
    /// The user the token belongs to, or `None` if Helix returns an
    /// empty user list.
    async fn get_current_user(&self) -> TwitchResult<Option<User>>;

    async fn get_users_by_ids(&self, user_ids: &[String]) -> TwitchResult<Vec<User>>;

    /// All channels the user follows, drained across pagination cursors
    /// and sorted ascending by case-insensitive broadcaster name.
    async fn get_followed_channels(&self, user_id: &str) -> TwitchResult<Vec<Follow>>;

    /// Total follower count of a broadcaster.
    async fn get_channel_followers(&self, broadcaster_id: &str) -> TwitchResult<u64>;

    /// The authenticated user's follow relationship to one broadcaster,
    /// or `None` if the user does not follow the channel.
    async fn get_followed(
        &self,
        user_id: &str,
        broadcaster_id: &str,
    ) -> TwitchResult<Option<Follow>>;

    /// The broadcaster's live stream, or `None` when offline.
    async fn get_stream(&self, user_id: &str) -> TwitchResult<Option<Stream>>;

    async fn get_game(&self, game_id: &str) -> TwitchResult<Option<Game>>;

    /// The authenticated user's subscription to a broadcaster. Answers
    /// `Err(TwitchError::NotSubscribed)` when Helix reports 404, which
    /// is the expected "no subscription" outcome.
    async fn check_subscription(
        &self,
        broadcaster_id: &str,
        user_id: &str,
    ) -> TwitchResult<Subscription>;
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
struct UsersResponse {
    data: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct FollowedChannelsResponse {
    data: Vec<Follow>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelFollowersResponse {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct StreamsResponse {
    data: Vec<Stream>,
}

#[derive(Debug, Deserialize)]
struct GamesResponse {
    data: Vec<Game>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionsResponse {
    data: Vec<Subscription>,
}

// ============================================================================
// Client
// ============================================================================

/// Thin typed wrapper over the Helix REST API. Every call carries the
/// application client id and the host-managed bearer token.
#[derive(Debug, Clone)]
pub struct HelixClient<T> {
    client: Client,
    client_id: String,
    tokens: T,
}

impl<T: AccessTokenProvider> HelixClient<T> {
    pub fn new(client_id: impl Into<String>, tokens: T) -> TwitchResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| TwitchError::Internal(e.into()))?;

        Ok(Self {
            client,
            client_id: client_id.into(),
            tokens,
        })
    }

    /// Issue an authenticated GET and translate credential-class
    /// statuses. Other non-success statuses are left for the caller,
    /// which knows which ones are expected (e.g. 404 on the
    /// subscription lookup).
    async fn get(&self, path_and_query: &str) -> TwitchResult<Response> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(format!("{}/{}", TWITCH_API_URL, path_and_query))
            .header("Authorization", format!("Bearer {}", token))
            .header("Client-Id", &self.client_id)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED
            || response.status() == StatusCode::FORBIDDEN
        {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TwitchError::Authorization(error_text));
        }

        Ok(response)
    }

    /// Fail on any remaining non-success status.
    async fn expect_success(response: Response, context: &str) -> TwitchResult<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TwitchError::Api(format!(
                "{} ({}): {}",
                context, status, error_text
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl<T: AccessTokenProvider> TwitchApi for HelixClient<T> {
    async fn get_current_user(&self) -> TwitchResult<Option<User>> {
        let response = self.get("users").await?;
        let response = Self::expect_success(response, "Failed to get user").await?;

        let users: UsersResponse = response
            .json()
            .await
            .map_err(|e| TwitchError::Api(format!("Failed to parse users response: {}", e)))?;

        Ok(users.data.into_iter().next())
    }

    async fn get_users_by_ids(&self, user_ids: &[String]) -> TwitchResult<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let ids_param = user_ids
            .iter()
            .map(|id| format!("id={}", id))
            .collect::<Vec<_>>()
            .join("&");

        let response = self.get(&format!("users?{}", ids_param)).await?;
        let response = Self::expect_success(response, "Failed to get users").await?;

        let users: UsersResponse = response
            .json()
            .await
            .map_err(|e| TwitchError::Api(format!("Failed to parse users response: {}", e)))?;

        Ok(users.data)
    }

    async fn get_followed_channels(&self, user_id: &str) -> TwitchResult<Vec<Follow>> {
        let mut channels: Vec<Follow> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut path = format!("channels/followed?user_id={}&first=100", user_id);
            if let Some(ref c) = cursor {
                path.push_str(&format!("&after={}", c));
            }

            let response = self.get(&path).await?;
            let response =
                Self::expect_success(response, "Failed to get followed channels").await?;

            let page: FollowedChannelsResponse = response.json().await.map_err(|e| {
                TwitchError::Api(format!("Failed to parse followed channels response: {}", e))
            })?;

            channels.extend(page.data);
            cursor = page.pagination.cursor;
            if cursor.is_none() {
                break;
            }
        }

        channels.sort_by(|a, b| {
            a.broadcaster_name
                .to_lowercase()
                .cmp(&b.broadcaster_name.to_lowercase())
        });

        Ok(channels)
    }

    async fn get_channel_followers(&self, broadcaster_id: &str) -> TwitchResult<u64> {
        let response = self
            .get(&format!("channels/followers?broadcaster_id={}", broadcaster_id))
            .await?;
        let response = Self::expect_success(response, "Failed to get channel followers").await?;

        let followers: ChannelFollowersResponse = response.json().await.map_err(|e| {
            TwitchError::Api(format!("Failed to parse channel followers response: {}", e))
        })?;

        Ok(followers.total)
    }

    async fn get_followed(
        &self,
        user_id: &str,
        broadcaster_id: &str,
    ) -> TwitchResult<Option<Follow>> {
        let response = self
            .get(&format!(
                "channels/followed?user_id={}&broadcaster_id={}",
                user_id, broadcaster_id
            ))
            .await?;
        let response = Self::expect_success(response, "Failed to get follow relationship").await?;

        let follows: FollowedChannelsResponse = response.json().await.map_err(|e| {
            TwitchError::Api(format!("Failed to parse follow response: {}", e))
        })?;

        Ok(follows.data.into_iter().next())
    }

    async fn get_stream(&self, user_id: &str) -> TwitchResult<Option<Stream>> {
        let response = self.get(&format!("streams?user_id={}", user_id)).await?;
        let response = Self::expect_success(response, "Failed to get stream").await?;

        let streams: StreamsResponse = response
            .json()
            .await
            .map_err(|e| TwitchError::Api(format!("Failed to parse streams response: {}", e)))?;

        Ok(streams.data.into_iter().next())
    }

    async fn get_game(&self, game_id: &str) -> TwitchResult<Option<Game>> {
        let response = self.get(&format!("games?id={}", game_id)).await?;
        let response = Self::expect_success(response, "Failed to get game").await?;

        let games: GamesResponse = response
            .json()
            .await
            .map_err(|e| TwitchError::Api(format!("Failed to parse games response: {}", e)))?;

        Ok(games.data.into_iter().next())
    }

    async fn check_subscription(
        &self,
        broadcaster_id: &str,
        user_id: &str,
    ) -> TwitchResult<Subscription> {
        let response = self
            .get(&format!(
                "subscriptions/user?broadcaster_id={}&user_id={}",
                broadcaster_id, user_id
            ))
            .await?;

        // 404 is the documented "user does not subscribe" answer.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TwitchError::NotSubscribed);
        }

        let response = Self::expect_success(response, "Failed to check subscription").await?;

        let subscriptions: SubscriptionsResponse = response.json().await.map_err(|e| {
            TwitchError::Api(format!("Failed to parse subscription response: {}", e))
        })?;

        subscriptions
            .data
            .into_iter()
            .next()
            .ok_or(TwitchError::NotSubscribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_response_decodes() {
        let body = r#"{
            "data": [{
                "id": "141981764",
                "login": "twitchdev",
                "display_name": "TwitchDev",
                "type": "",
                "broadcaster_type": "partner",
                "profile_image_url": "https://static-cdn.jtvnw.net/profile.png",
                "created_at": "2016-12-14T20:32:28Z"
            }]
        }"#;

        let users: UsersResponse = serde_json::from_str(body).unwrap();
        let user = &users.data[0];
        assert_eq!(user.id, "141981764");
        assert_eq!(user.display_name, "TwitchDev");
        assert!(user.created_at.is_some());
    }

    #[test]
    fn followed_channels_envelope_carries_cursor() {
        let body = r#"{
            "data": [{
                "broadcaster_id": "11111",
                "broadcaster_login": "userloginname",
                "broadcaster_name": "UserDisplayName",
                "followed_at": "2022-05-24T22:22:08Z"
            }],
            "pagination": { "cursor": "eyJiIjpudWxsfQ" }
        }"#;

        let page: FollowedChannelsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.pagination.cursor.as_deref(), Some("eyJiIjpudWxsfQ"));
    }

    #[test]
    fn missing_pagination_means_last_page() {
        let body = r#"{ "data": [] }"#;
        let page: FollowedChannelsResponse = serde_json::from_str(body).unwrap();
        assert!(page.pagination.cursor.is_none());
    }

    #[test]
    fn streams_response_decodes() {
        let body = r#"{
            "data": [{
                "id": "40952121085",
                "user_id": "101051819",
                "user_login": "afro",
                "user_name": "Afro",
                "game_id": "32982",
                "game_name": "Grand Theft Auto V",
                "type": "live",
                "title": "Jacob: Digital Den Laptops & Routers",
                "viewer_count": 1490,
                "started_at": "2021-03-10T03:18:11Z",
                "language": "en",
                "thumbnail_url": "https://static-cdn.jtvnw.net/previews-ttv/live_user_afro-{width}x{height}.jpg",
                "is_mature": false
            }]
        }"#;

        let streams: StreamsResponse = serde_json::from_str(body).unwrap();
        let stream = &streams.data[0];
        assert_eq!(stream.game_name, "Grand Theft Auto V");
        assert_eq!(stream.viewer_count, 1490);
        assert!(stream.thumbnail_url.contains("{width}x{height}"));
    }

    #[test]
    fn followers_total_is_read_from_the_envelope() {
        let body = r#"{ "total": 8, "data": [], "pagination": {} }"#;
        let followers: ChannelFollowersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(followers.total, 8);
    }

    #[test]
    fn subscription_response_decodes() {
        let body = r#"{
            "data": [{
                "broadcaster_id": "141981764",
                "broadcaster_login": "twitchdev",
                "broadcaster_name": "TwitchDev",
                "is_gift": true,
                "gifter_login": "gifter",
                "gifter_name": "Gifter",
                "tier": "1000"
            }]
        }"#;

        let subscriptions: SubscriptionsResponse = serde_json::from_str(body).unwrap();
        let subscription = &subscriptions.data[0];
        assert!(subscription.is_gift);
        assert_eq!(subscription.tier, "1000");
    }
}
