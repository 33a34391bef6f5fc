//! Email-verified registration flow

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::errors::{AccountError, AccountResult};
use crate::config::HomeserverConfig;
use crate::core_directory::{EmailAddress, UserId};

/// Credentials tying a verified email to a registration request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreePidCredentials {
    /// Client-generated secret binding token requests together
    pub client_secret: String,

    /// Verification session id minted by the server
    pub sid: String,

    /// Identity server host the verification ran against
    pub id_server_host: String,
}

/// Authentication operations provided by the session backend
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Request a verification email for `address`. Returns the verification
    /// session id.
    async fn request_email_token(
        &self,
        address: &EmailAddress,
        client_secret: &str,
        send_attempt: u32,
    ) -> AccountResult<String>;

    /// Register an account against verified three-PID credentials
    async fn register_with_three_pid(
        &self,
        credentials: &ThreePidCredentials,
        password: &str,
        device_display_name: &str,
    ) -> AccountResult<UserId>;
}

struct PendingVerification {
    address: EmailAddress,
    client_secret: String,
    send_attempt: u32,
}

/// Drives email-verified account registration
pub struct RegistrationService {
    auth: Arc<dyn AuthBackend>,
    homeserver: HomeserverConfig,
    pending: Mutex<Option<PendingVerification>>,
}

impl RegistrationService {
    pub fn new(auth: Arc<dyn AuthBackend>, homeserver: HomeserverConfig) -> Self {
        Self { auth, homeserver, pending: Mutex::new(None) }
    }

    /// Send (or resend) the verification email and return the credentials
    /// needed for [`register`](Self::register).
    ///
    /// Resubmitting the same address reuses the client secret and bumps the
    /// send attempt, so the server resends instead of opening a new session.
    pub async fn submit_email_verification(
        &self,
        address: &EmailAddress,
    ) -> AccountResult<ThreePidCredentials> {
        let id_server_host = self
            .homeserver
            .identity_server_host()
            .ok_or(AccountError::MissingIdentityServer)?;

        let mut pending = self.pending.lock().await;
        let (client_secret, send_attempt) = match pending.as_ref() {
            Some(previous) if previous.address == *address => {
                (previous.client_secret.clone(), previous.send_attempt + 1)
            }
            _ => (generate_client_secret(), 1),
        };

        let sid = self
            .auth
            .request_email_token(address, &client_secret, send_attempt)
            .await?;
        debug!(%address, send_attempt, "verification email requested");

        *pending = Some(PendingVerification {
            address: address.clone(),
            client_secret: client_secret.clone(),
            send_attempt,
        });

        Ok(ThreePidCredentials { client_secret, sid, id_server_host })
    }

    /// Complete registration with verified credentials
    pub async fn register(
        &self,
        credentials: &ThreePidCredentials,
        password: &str,
        device_display_name: &str,
    ) -> AccountResult<UserId> {
        let user_id = self
            .auth
            .register_with_three_pid(credentials, password, device_display_name)
            .await?;
        info!(%user_id, "account registered");

        *self.pending.lock().await = None;
        Ok(user_id)
    }

    /// Drop any pending verification session. Idempotent.
    pub async fn cancel_pending_registration(&self) {
        if self.pending.lock().await.take().is_some() {
            debug!("pending registration cancelled");
        }
    }

    /// Whether a verification session is currently pending
    pub async fn has_pending_registration(&self) -> bool {
        self.pending.lock().await.is_some()
    }
}

fn generate_client_secret() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    const SECRET_LEN: usize = 24;

    let mut rng = rand::rng();
    (0..SECRET_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
