//! Error taxonomy for gateway calls.

/// Errors that can occur during a provider call.
///
/// The variants distinguish the three failure classes callers react to
/// differently: bad credentials, a provider that could not be reached or
/// answered unsuccessfully, and a success response whose body could not be
/// understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The provider rejected the credential (HTTP 401/403).
    #[error("provider rejected credentials (HTTP {status})")]
    Unauthorized {
        /// The HTTP status the provider answered with.
        status: u16,
    },

    /// The provider could not be reached, timed out, or answered with a
    /// non-success status other than an authentication failure.
    #[error("provider unavailable: {reason}")]
    Unavailable {
        /// HTTP status when a response was received; `None` when the request
        /// never produced one (transport error or timeout).
        status: Option<u16>,
        /// Description of the failure.
        reason: String,
    },

    /// The provider answered with a success status but an unusable body.
    #[error("malformed provider response: {detail}")]
    Malformed {
        /// Description of what could not be parsed.
        detail: String,
    },
}

impl GatewayError {
    /// Creates the appropriate error for a non-success HTTP status.
    #[must_use]
    pub fn rejected(status: u16) -> Self {
        if status == 401 || status == 403 {
            Self::Unauthorized { status }
        } else {
            Self::Unavailable {
                status: Some(status),
                reason: format!("HTTP {status}"),
            }
        }
    }

    /// Creates an `Unavailable` error for a request that never produced a
    /// response.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            status: None,
            reason: reason.into(),
        }
    }

    /// Creates a `Malformed` error with the given detail.
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }

    /// Returns `true` when the provider itself answered with a non-success
    /// HTTP status, as opposed to the request failing in transit or the
    /// response failing to parse.
    ///
    /// Callers use this to pick between their "cannot process right now"
    /// and "an error occurred" fallback texts.
    #[must_use]
    pub const fn is_provider_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::Unavailable { status: Some(_), .. }
        )
    }
}
