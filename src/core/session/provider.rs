//! Session/identity provider
//!
//! Caches the signed-in [`Identity`]. The durable copy under
//! [`SESSION_CACHE_KEY`] is a warm-start hint only and is never returned by
//! [`SessionProvider::current_user`] until a refresh confirms it.

use crate::adapters::api::{endpoints, ApiGateway};
use crate::adapters::storage::KeyValueStore;
use crate::config::{CredentialsConfig, SecretString};
use crate::domain::{Access, GodwitError, Identity, RegistrationDraft, Result, Role};
use secrecy::ExposeSecret;
use std::sync::{Arc, RwLock};

/// Durable-storage key of the warm-start hint
pub const SESSION_CACHE_KEY: &str = "gc_user";

/// Account created alongside a registration
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: SecretString,
}

impl NewAccount {
    /// Derives the account from a completed draft; the username is the
    /// primary contact number
    pub fn from_draft(draft: &RegistrationDraft) -> Self {
        Self {
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            email: draft.email.trim().to_string(),
            username: draft.primary_number.trim().to_string(),
            password: draft.account_password.secret().clone(),
        }
    }

    /// Identifier used to sign in: the email, or the username without one
    pub fn login_identifier(&self) -> &str {
        if self.email.is_empty() {
            &self.username
        } else {
            &self.email
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "username": self.username,
            "password": self.password.expose_secret().as_str(),
        })
    }
}

/// Process-wide cache of the current identity
pub struct SessionProvider {
    gateway: Arc<dyn ApiGateway>,
    cache: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Identity>>,
}

impl SessionProvider {
    pub fn new(gateway: Arc<dyn ApiGateway>, cache: Arc<dyn KeyValueStore>) -> Self {
        Self {
            gateway,
            cache,
            current: RwLock::new(None),
        }
    }

    fn store(&self, identity: Option<Identity>) {
        let hint = match &identity {
            Some(identity) => serde_json::to_string(identity)
                .map_err(GodwitError::from)
                .and_then(|raw| self.cache.set(SESSION_CACHE_KEY, &raw)),
            None => self.cache.remove(SESSION_CACHE_KEY),
        };
        if let Err(e) = hint {
            tracing::warn!(error = %e, "Could not update session hint");
        }

        *self.current.write().unwrap_or_else(|p| p.into_inner()) = identity;
    }

    /// Re-queries the backend and replaces the cached identity
    ///
    /// Never fails: no session, a rejected request or an unreachable server
    /// all resolve to `None`.
    pub async fn refresh(&self) -> Option<Identity> {
        let identity = match self.gateway.get_json(endpoints::AUTH_ME).await {
            Ok(body) => match body.decode::<Identity>() {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!(error = %e, "Unexpected identity payload");
                    None
                }
            },
            Err(GodwitError::Http(e)) if e.is_unauthorized() => None,
            Err(e) => {
                tracing::debug!(error = %e, "Session refresh failed");
                None
            }
        };

        match &identity {
            Some(identity) => tracing::debug!(
                email = ?identity.email,
                doctor = identity.is_doctor(),
                "Session refreshed"
            ),
            None => tracing::debug!("No active session"),
        }

        self.store(identity.clone());
        identity
    }

    /// Identity from the last refresh
    pub fn current_user(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Identity persisted by an earlier run, unverified
    pub fn cached_hint(&self) -> Option<Identity> {
        let raw = self.cache.get(SESSION_CACHE_KEY).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    /// Signs in with form-encoded credentials, then refreshes
    ///
    /// # Errors
    ///
    /// Returns the HTTP error from the login call, or an authentication error
    /// if the server accepted the credentials but no session followed.
    pub async fn login(&self, identifier: &str, password: &SecretString) -> Result<Identity> {
        tracing::info!(identifier = identifier, "Signing in");
        self.gateway
            .post_urlencoded(
                endpoints::AUTH_LOGIN,
                &[
                    ("email", identifier),
                    ("password", password.expose_secret().as_str()),
                ],
            )
            .await?;

        self.refresh().await.ok_or_else(|| {
            GodwitError::Authentication("Signed in but no session was established".to_string())
        })
    }

    /// Ends the session; the local identity is cleared even if the call fails
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the logout call.
    pub async fn logout(&self) -> Result<()> {
        self.store(None);
        self.gateway
            .post_json(endpoints::AUTH_LOGOUT, &serde_json::json!({}))
            .await?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Creates a user account
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the register call.
    pub async fn register_account(&self, account: &NewAccount) -> Result<()> {
        self.gateway
            .post_json(endpoints::AUTH_REGISTER, &account.to_json())
            .await?;
        tracing::info!(email = %account.email, "Account created");
        Ok(())
    }

    /// Gates a view on the current identity
    ///
    /// `None` only requires a session.
    pub fn authorize(&self, required: Option<&Role>) -> Access {
        match self.current_user() {
            None => Access::SignInRequired,
            Some(identity) => match required {
                Some(role) if !identity.has_role(role) => Access::Forbidden(identity),
                _ => Access::Granted(identity),
            },
        }
    }

    /// Returns the current identity, signing in with `credentials` if needed
    ///
    /// # Errors
    ///
    /// Returns an authentication error when there is no session and no
    /// usable credentials, or the error from [`SessionProvider::login`].
    pub async fn ensure_signed_in(&self, credentials: &CredentialsConfig) -> Result<Identity> {
        if let Some(identity) = self.refresh().await {
            return Ok(identity);
        }

        match (&credentials.email, &credentials.password) {
            (Some(email), Some(password)) if credentials.is_complete() => {
                self.login(email.trim(), password).await
            }
            _ => Err(GodwitError::Authentication(
                "Sign-in required: set credentials.email and credentials.password".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for SessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionProvider")
            .field("current", &self.current_user())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::HttpGateway;
    use crate::adapters::storage::MemoryStore;
    use crate::config::{secret_string, ApiConfig};
    use mockito::Matcher;

    fn provider(server: &mockito::ServerGuard) -> (SessionProvider, Arc<MemoryStore>) {
        let config = ApiConfig {
            base_url: format!("{}/api", server.url()),
            ..Default::default()
        };
        let gateway = Arc::new(HttpGateway::new(&config).unwrap());
        let cache = Arc::new(MemoryStore::new());
        (SessionProvider::new(gateway, cache.clone()), cache)
    }

    const DOCTOR: &str = r#"{"id":3,"firstName":"Grace","lastName":"Hopper","email":"g@h.io","roles":["ROLE_DOCTOR"]}"#;

    #[tokio::test]
    async fn test_refresh_caches_identity() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DOCTOR)
            .create_async()
            .await;

        let (session, cache) = provider(&server);
        assert!(session.current_user().is_none());

        let identity = session.refresh().await.unwrap();
        assert!(identity.is_doctor());
        assert_eq!(session.current_user(), Some(identity.clone()));
        assert!(cache.snapshot(SESSION_CACHE_KEY).is_some());
        assert_eq!(session.cached_hint(), Some(identity));
    }

    #[tokio::test]
    async fn test_refresh_without_session_is_none_and_clears_hint() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(401)
            .create_async()
            .await;

        let (session, cache) = provider(&server);
        cache.set(SESSION_CACHE_KEY, DOCTOR).unwrap();
        assert!(session.cached_hint().is_some());
        assert!(session.current_user().is_none());

        assert!(session.refresh().await.is_none());
        assert!(cache.snapshot(SESSION_CACHE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_refresh_never_errors_on_server_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let (session, _) = provider(&server);
        assert!(session.refresh().await.is_none());
    }

    #[tokio::test]
    async fn test_login_posts_form_then_refreshes() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("email".into(), "g@h.io".into()),
                Matcher::UrlEncoded("password".into(), "pw".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(DOCTOR)
            .create_async()
            .await;

        let (session, _) = provider(&server);
        let identity = session
            .login("g@h.io", &secret_string("pw".to_string()))
            .await
            .unwrap();
        assert_eq!(identity.email.as_deref(), Some("g@h.io"));
        login.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_without_resulting_session_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(204)
            .create_async()
            .await;

        let (session, _) = provider(&server);
        let err = session
            .login("g@h.io", &secret_string("pw".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GodwitError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_authorize() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email":"p@x.io","roles":["USER"]}"#)
            .create_async()
            .await;

        let (session, _) = provider(&server);
        assert_eq!(session.authorize(None), Access::SignInRequired);

        session.refresh().await;
        assert!(session.authorize(Some(&Role::Patient)).is_granted());
        assert!(matches!(
            session.authorize(Some(&Role::Doctor)),
            Access::Forbidden(_)
        ));
    }

    #[tokio::test]
    async fn test_ensure_signed_in_without_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(401)
            .create_async()
            .await;

        let (session, _) = provider(&server);
        let err = session
            .ensure_signed_in(&CredentialsConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GodwitError::Authentication(_)));
    }

    #[test]
    fn test_new_account_from_draft() {
        let mut draft = RegistrationDraft::default();
        draft.first_name = " Ada ".into();
        draft.primary_number = "+447700900000".into();
        let account = NewAccount::from_draft(&draft);
        assert_eq!(account.first_name, "Ada");
        assert_eq!(account.login_identifier(), "+447700900000");

        draft.email = "ada@example.com".into();
        assert_eq!(NewAccount::from_draft(&draft).login_identifier(), "ada@example.com");
    }
}
