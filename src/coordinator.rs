use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use futures::try_join;
use tokio::sync::{broadcast, RwLock};
use tokio::time::MissedTickBehavior;

use crate::config::IntegrationOptions;
use crate::data::{Channel, Snapshot, Subscription, User};
use crate::error::{TwitchError, TwitchResult, UpdateError};
use crate::helix::TwitchApi;

/// Host-framework seam. The coordinator pushes each successfully
/// assembled snapshot and reports failed cycles; the host decides what
/// entities and repair affordances to derive from them.
#[async_trait]
pub trait SnapshotSink: Send + Sync + 'static {
    async fn publish_snapshot(&self, snapshot: Arc<Snapshot>);

    async fn update_failed(&self, error: &UpdateError);
}

/// Orchestrates one polling cycle: resolve the authenticated user (once
/// per process lifetime), resolve the configured channels, fan out the
/// per-channel lookups, and assemble a sorted [`Snapshot`].
///
/// There is deliberately no inline retry logic; a failed cycle is
/// reported and the next scheduled interval is the sole recovery
/// mechanism.
pub struct UpdateCoordinator<A> {
    api: A,
    options: IntegrationOptions,
    user: RwLock<Option<User>>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl<A: TwitchApi> UpdateCoordinator<A> {
    pub fn new(api: A, options: IntegrationOptions) -> Self {
        Self {
            api,
            options,
            user: RwLock::new(None),
            snapshot: RwLock::new(None),
        }
    }

    /// The most recently published snapshot, if any cycle has succeeded
    /// yet. Failed cycles never replace it.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Run one update cycle under the configured wall-clock timeout and
    /// publish the result. A timed-out cycle is abandoned and reported
    /// as a transient failure; no partial snapshot is ever stored.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, UpdateError> {
        let data = tokio::time::timeout(self.options.cycle_timeout(), self.fetch_data()).await;

        let snapshot = match data {
            Err(_) => {
                return Err(UpdateError::UpdateFailed(format!(
                    "Update cycle exceeded {}s",
                    self.options.cycle_timeout_seconds
                )))
            }
            Ok(Err(err)) => return Err(err.into()),
            Ok(Ok(snapshot)) => Arc::new(snapshot),
        };

        *self.snapshot.write().await = Some(snapshot.clone());
        tracing::debug!(
            channels = snapshot.channels.len(),
            user = %snapshot.user.login,
            "Update cycle complete"
        );

        Ok(snapshot)
    }

    async fn fetch_data(&self) -> TwitchResult<Snapshot> {
        let user = self.resolve_user().await?;

        let channel_users = self
            .api
            .get_users_by_ids(&self.options.channel_ids)
            .await?;

        // Channels are independent of each other; fan out and join.
        // Ordering is restored deterministically by the snapshot sort.
        let channels = try_join_all(
            channel_users
                .into_iter()
                .map(|channel_user| self.fetch_channel(&user, channel_user)),
        )
        .await?;

        Ok(Snapshot::new(channels, user))
    }

    async fn resolve_user(&self) -> TwitchResult<User> {
        if let Some(user) = self.user.read().await.clone() {
            return Ok(user);
        }

        let user = self
            .api
            .get_current_user()
            .await?
            .ok_or_else(|| TwitchError::Api("Cannot get authenticated user".to_string()))?;

        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    async fn fetch_channel(&self, user: &User, channel_user: User) -> TwitchResult<Channel> {
        let (followers, following, stream, subscription) = try_join!(
            self.api.get_channel_followers(&channel_user.id),
            self.api.get_followed(&user.id, &channel_user.id),
            self.api.get_stream(&channel_user.id),
            self.check_subscription(&channel_user.id, &user.id),
        )?;

        // Game metadata only matters while a stream is live.
        let game = match &stream {
            Some(stream) if !stream.game_id.is_empty() => {
                self.api.get_game(&stream.game_id).await?
            }
            _ => None,
        };

        Ok(Channel {
            id: channel_user.id,
            display_name: channel_user.display_name,
            profile_image_url: channel_user.profile_image_url,
            followers: Some(followers),
            following,
            game,
            stream,
            subscription,
        })
    }

    /// A 404 from the subscription lookup means "not subscribed" and is
    /// recorded as an absent field; any other error class fails the
    /// whole cycle.
    async fn check_subscription(
        &self,
        broadcaster_id: &str,
        user_id: &str,
    ) -> TwitchResult<Option<Subscription>> {
        match self.api.check_subscription(broadcaster_id, user_id).await {
            Ok(subscription) => Ok(Some(subscription)),
            Err(TwitchError::NotSubscribed) => {
                tracing::debug!(broadcaster_id, "User is not subscribed to this channel");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Polling loop: one cycle per interval tick until shutdown. An
    /// authorization failure suspends polling entirely; the host's
    /// re-authentication flow owns recovery and tears this task down.
    pub async fn run<S: SnapshotSink>(&self, sink: &S, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.options.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Update coordinator received shutdown signal");
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.refresh().await {
                Ok(snapshot) => sink.publish_snapshot(snapshot).await,
                Err(err) => {
                    sink.update_failed(&err).await;
                    match err {
                        UpdateError::AuthFailed(msg) => {
                            tracing::error!(
                                "Authorization failed, suspending polling until re-authentication: {}",
                                msg
                            );
                            let _ = shutdown.recv().await;
                            return;
                        }
                        UpdateError::UpdateFailed(msg) => {
                            tracing::warn!("Update cycle failed, retrying next interval: {}", msg);
                        }
                    }
                }
            }
        }
    }
}
