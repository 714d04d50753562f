//! Obtains a valid access token for the calendar API.
//!
//! The interactive browser grant only runs from `calclock auth`; everything
//! else goes through [`CredentialProvider::obtain`], which reuses or
//! refreshes the persisted token.

use std::future::Future;

use chrono::{Duration, Utc};

use calclock_core::ClockError;

use crate::config::{self, AccountTokens, GcalConfig};
use crate::providers::gcal;

/// Tokens are treated as expired this long before their recorded expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Source of valid calendar credentials.
///
/// The production implementation talks to Google; tests substitute a fixed
/// token so nothing touches the network or a browser.
pub trait CredentialProvider {
    fn obtain(&self) -> impl Future<Output = Result<AccountTokens, ClockError>> + Send;
}

/// Production credential source: persisted tokens plus Google refresh.
pub struct GoogleCredentials {
    config: GcalConfig,
}

impl GoogleCredentials {
    pub fn new(config: GcalConfig) -> Self {
        Self { config }
    }

    fn needs_refresh(tokens: &AccountTokens) -> bool {
        match tokens.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= expires_at,
            // No recorded expiry: assume stale.
            None => true,
        }
    }

    async fn obtain_inner(&self) -> Result<AccountTokens, ClockError> {
        let tokens = config::load_tokens()
            .map_err(|e| ClockError::Auth(e.to_string()))?
            .ok_or_else(|| {
                ClockError::Auth("no stored tokens; run `calclock auth` first".to_string())
            })?;

        if !Self::needs_refresh(&tokens) {
            return Ok(tokens);
        }

        if tokens.refresh_token.is_empty() {
            return Err(ClockError::Auth(
                "stored token expired and has no refresh token; run `calclock auth` again"
                    .to_string(),
            ));
        }

        let refreshed = gcal::refresh(&self.config, &tokens)
            .await
            .map_err(|e| ClockError::Auth(format!("token refresh failed: {e}")))?;

        config::save_tokens(&refreshed).map_err(|e| ClockError::Auth(e.to_string()))?;

        Ok(refreshed)
    }
}

impl CredentialProvider for GoogleCredentials {
    fn obtain(&self) -> impl Future<Output = Result<AccountTokens, ClockError>> + Send {
        self.obtain_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(expires_at: Option<chrono::DateTime<Utc>>) -> AccountTokens {
        AccountTokens {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_fresh_token_is_reused() {
        let fresh = tokens(Some(Utc::now() + Duration::hours(1)));
        assert!(!GoogleCredentials::needs_refresh(&fresh));
    }

    #[test]
    fn test_expired_token_needs_refresh() {
        let expired = tokens(Some(Utc::now() - Duration::hours(1)));
        assert!(GoogleCredentials::needs_refresh(&expired));
    }

    #[test]
    fn test_token_inside_skew_window_needs_refresh() {
        let nearly_expired = tokens(Some(Utc::now() + Duration::seconds(30)));
        assert!(GoogleCredentials::needs_refresh(&nearly_expired));
    }

    #[test]
    fn test_unknown_expiry_needs_refresh() {
        assert!(GoogleCredentials::needs_refresh(&tokens(None)));
    }

    /// Credential double returning a fixed token, for exercising consumers
    /// without network or browser interaction.
    struct FixedCredentials(AccountTokens);

    impl CredentialProvider for FixedCredentials {
        fn obtain(&self) -> impl Future<Output = Result<AccountTokens, ClockError>> + Send {
            let tokens = self.0.clone();
            async move { Ok(tokens) }
        }
    }

    #[tokio::test]
    async fn test_fixed_provider_yields_its_token() {
        let provider = FixedCredentials(tokens(None));
        let got = provider.obtain().await.unwrap();
        assert_eq!(got.access_token, "access");
    }
}
