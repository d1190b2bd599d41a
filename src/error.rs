/// Errors raised by the Helix client layer.
///
/// `NotSubscribed` is the one expected-empty outcome: the subscription
/// lookup answers 404 when the authenticated user simply does not
/// subscribe to the channel, and the coordinator records that as an
/// absent field instead of failing the cycle.
#[derive(Debug, thiserror::Error)]
pub enum TwitchError {
    #[error("Twitch authorization failed: {0}")]
    Authorization(String),

    #[error("Twitch API error: {0}")]
    Api(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("User is not subscribed to this channel")]
    NotSubscribed,

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl TwitchError {
    /// True for credential-class failures that require the host to run
    /// its re-authentication flow.
    pub fn is_authorization(&self) -> bool {
        matches!(self, TwitchError::Authorization(_))
    }
}

pub type TwitchResult<T> = Result<T, TwitchError>;

/// Outcome vocabulary of one update cycle, as reported to the host.
///
/// `AuthFailed` suspends polling until the user re-consents;
/// `UpdateFailed` is transient and the host's next scheduled interval is
/// the sole retry mechanism. Cycle timeouts and malformed responses both
/// map to `UpdateFailed`.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Authentication failed, re-authorization required: {0}")]
    AuthFailed(String),

    #[error("Update failed: {0}")]
    UpdateFailed(String),
}

impl From<TwitchError> for UpdateError {
    fn from(err: TwitchError) -> Self {
        match err {
            TwitchError::Authorization(msg) => UpdateError::AuthFailed(msg),
            other => UpdateError::UpdateFailed(other.to_string()),
        }
    }
}
