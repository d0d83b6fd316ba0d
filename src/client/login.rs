//! Login form view
//!
//! Form state lives in a `watch` channel; a renderer subscribes and redraws
//! on every change. Sign-in is delegated to an [`Authenticator`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::watch;

use super::ui::{Notification, Notifier};
use super::ClientError;
use crate::models::auth::{LoginRequest, LoginResponse};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";
pub const PLACEHOLDER_MESSAGE: &str = "Login functionality would be connected to your backend here!";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const SIGN_IN_FAILED_MESSAGE: &str = "An error occurred while signing in. Please try again.";

pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(1500);

const MASK_CHAR: char = '•';

#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginFormState {
    pub email: String,
    pub password: String,
    pub password_visible: bool,
    pub submitting: bool,
}

impl fmt::Debug for LoginFormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginFormState")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_visible", &self.password_visible)
            .field("submitting", &self.submitting)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRendering {
    Masked,
    Plain,
}

/// Password input as it should be rendered
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordField {
    pub rendering: PasswordRendering,
    pub value: String,
}

impl PasswordField {
    pub fn display_text(&self) -> String {
        match self.rendering {
            PasswordRendering::Plain => self.value.clone(),
            PasswordRendering::Masked => self.value.chars().map(|_| MASK_CHAR).collect(),
        }
    }
}

impl fmt::Debug for PasswordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordField")
            .field("rendering", &self.rendering)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

/// Result of an authentication attempt that reached a verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated { username: String },
    /// No backend is wired in; carries the message to show.
    Placeholder(String),
    Denied(String),
}

impl AuthOutcome {
    pub fn message(&self) -> String {
        match self {
            AuthOutcome::Authenticated { username } => format!("Welcome back, {}!", username),
            AuthOutcome::Placeholder(message) | AuthOutcome::Denied(message) => message.clone(),
        }
    }

    fn notification(&self) -> Notification {
        match self {
            AuthOutcome::Authenticated { .. } => Notification::success(self.message()),
            AuthOutcome::Placeholder(_) => Notification::info(self.message()),
            AuthOutcome::Denied(_) => Notification::error(self.message()),
        }
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthOutcome, ClientError>;
}

/// Stand-in authenticator: waits, performs no I/O, returns the placeholder.
pub struct SimulatedAuthenticator {
    delay: Duration,
}

impl SimulatedAuthenticator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedAuthenticator {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_DELAY)
    }
}

#[async_trait]
impl Authenticator for SimulatedAuthenticator {
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthOutcome, ClientError> {
        tracing::debug!(email = %credentials.email, "Simulated sign-in");
        tokio::time::sleep(self.delay).await;
        Ok(AuthOutcome::Placeholder(PLACEHOLDER_MESSAGE.to_string()))
    }
}

/// Signs in against `POST {base_url}/api/v1/auth/login`.
pub struct HttpAuthenticator {
    client: Client,
    endpoint: Url,
}

impl HttpAuthenticator {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut endpoint =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v1", "auth", "login"]);

        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthOutcome, ClientError> {
        let body = LoginRequest {
            email: credentials.email,
            password: credentials.password.expose_secret().clone(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(AuthOutcome::Denied(INVALID_CREDENTIALS_MESSAGE.to_string())),
            status if status.is_success() => {
                let login: LoginResponse = response.json().await?;
                Ok(AuthOutcome::Authenticated {
                    username: login.user.username,
                })
            }
            status => Err(ClientError::Status(status.as_u16())),
        }
    }
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A submit was already running.
    Ignored,
    /// A field was empty; nothing was sent.
    Invalid,
    Completed(AuthOutcome),
    Failed,
}

pub struct LoginFormView {
    state: watch::Sender<LoginFormState>,
    authenticator: Arc<dyn Authenticator>,
    notifier: Arc<dyn Notifier>,
}

impl LoginFormView {
    pub fn new(authenticator: Arc<dyn Authenticator>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(LoginFormState::default());
        Self {
            state,
            authenticator,
            notifier,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoginFormState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LoginFormState {
        self.state.borrow().clone()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.state.send_modify(|s| s.email = email);
    }

    pub fn set_password(&self, password: impl Into<String>) {
        let password = password.into();
        self.state.send_modify(|s| s.password = password);
    }

    pub fn toggle_password_visibility(&self) {
        self.state.send_modify(|s| s.password_visible = !s.password_visible);
    }

    pub fn password_field(&self) -> PasswordField {
        let state = self.state.borrow();
        PasswordField {
            rendering: if state.password_visible {
                PasswordRendering::Plain
            } else {
                PasswordRendering::Masked
            },
            value: state.password.clone(),
        }
    }

    /// Enter submits the form; other keys are left to the input.
    pub async fn key_press(&self, key: Key) -> Option<LoginOutcome> {
        match key {
            Key::Enter => Some(self.submit().await),
            _ => None,
        }
    }

    pub async fn submit(&self) -> LoginOutcome {
        let snapshot = self.state();
        if snapshot.submitting {
            return LoginOutcome::Ignored;
        }
        if snapshot.email.is_empty() || snapshot.password.is_empty() {
            self.notifier
                .notify(Notification::validation(MISSING_FIELDS_MESSAGE))
                .await;
            return LoginOutcome::Invalid;
        }

        let result = {
            let Some(_guard) = SubmittingGuard::begin(&self.state) else {
                return LoginOutcome::Ignored;
            };
            let credentials = Credentials {
                email: snapshot.email,
                password: Secret::new(snapshot.password),
            };
            self.authenticator.authenticate(credentials).await
        };

        // submitting is already cleared when the outcome is shown
        match result {
            Ok(outcome) => {
                tracing::info!(outcome = ?outcome, "Sign-in completed");
                self.notifier.notify(outcome.notification()).await;
                LoginOutcome::Completed(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "Sign-in failed");
                self.notifier.notify(Notification::error(SIGN_IN_FAILED_MESSAGE)).await;
                LoginOutcome::Failed
            }
        }
    }
}

/// Marks the form as submitting; cleared on drop.
struct SubmittingGuard<'a> {
    state: &'a watch::Sender<LoginFormState>,
}

impl<'a> SubmittingGuard<'a> {
    fn begin(state: &'a watch::Sender<LoginFormState>) -> Option<Self> {
        let started = state.send_if_modified(|s| {
            if s.submitting {
                false
            } else {
                s.submitting = true;
                true
            }
        });
        started.then_some(Self { state })
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.submitting = false);
    }
}
