//! 登录表单测试

use async_trait::async_trait;
use medstock::client::login::{
    MISSING_FIELDS_MESSAGE, PLACEHOLDER_MESSAGE, SIGN_IN_FAILED_MESSAGE,
};
use medstock::client::{
    AuthOutcome, Authenticator, ClientError, Credentials, Key, LoginFormState, LoginFormView,
    LoginOutcome, Notification, NotificationKind, Notifier, PasswordRendering,
    SimulatedAuthenticator,
};
use secrecy::ExposeSecret;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

/// 记录收到的凭据并返回固定结果
struct StubAuthenticator {
    result: fn() -> Result<AuthOutcome, ClientError>,
    received: Mutex<Vec<(String, String)>>,
}

impl StubAuthenticator {
    fn new(result: fn() -> Result<AuthOutcome, ClientError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            received: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Authenticator for StubAuthenticator {
    async fn authenticate(&self, credentials: Credentials) -> Result<AuthOutcome, ClientError> {
        self.received.lock().unwrap().push((
            credentials.email,
            credentials.password.expose_secret().clone(),
        ));
        (self.result)()
    }
}

fn welcome() -> Result<AuthOutcome, ClientError> {
    Ok(AuthOutcome::Authenticated {
        username: "pharmacist".to_string(),
    })
}

fn view_with(authenticator: Arc<dyn Authenticator>) -> (Arc<LoginFormView>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let view = Arc::new(LoginFormView::new(authenticator, notifier.clone()));
    (view, notifier)
}

#[tokio::test]
async fn test_empty_password_short_circuits() {
    let authenticator = StubAuthenticator::new(welcome);
    let (view, notifier) = view_with(authenticator.clone());
    let mut rx = view.subscribe();

    view.set_email("pharmacist@example.com");
    rx.borrow_and_update();

    let outcome = view.submit().await;

    assert_eq!(outcome, LoginOutcome::Invalid);
    assert!(!rx.has_changed().unwrap(), "submit must not enter the busy state");
    assert!(authenticator.received.lock().unwrap().is_empty());
    assert_eq!(
        notifier.seen.lock().unwrap().clone(),
        vec![Notification::validation(MISSING_FIELDS_MESSAGE)]
    );
}

#[tokio::test]
async fn test_empty_email_short_circuits() {
    let authenticator = StubAuthenticator::new(welcome);
    let (view, _) = view_with(authenticator.clone());
    view.set_password("TestPass123");

    assert_eq!(view.submit().await, LoginOutcome::Invalid);
    assert!(authenticator.received.lock().unwrap().is_empty());
}

#[test]
fn test_toggle_visibility_twice_restores_masking() {
    let (view, _) = view_with(StubAuthenticator::new(welcome));
    view.set_password("s3cret");

    let initial = view.password_field();
    assert_eq!(initial.rendering, PasswordRendering::Masked);
    assert_eq!(initial.display_text(), "••••••");

    view.toggle_password_visibility();
    let shown = view.password_field();
    assert_eq!(shown.rendering, PasswordRendering::Plain);
    assert_eq!(shown.display_text(), "s3cret");

    view.toggle_password_visibility();
    assert_eq!(view.password_field(), initial);
}

#[tokio::test]
async fn test_enter_submits_and_other_keys_do_not() {
    let authenticator = StubAuthenticator::new(welcome);
    let (view, notifier) = view_with(authenticator.clone());
    view.set_email("pharmacist@example.com");
    view.set_password("TestPass123");

    assert_eq!(view.key_press(Key::Char('a')).await, None);
    assert_eq!(view.key_press(Key::Other).await, None);
    assert!(authenticator.received.lock().unwrap().is_empty());

    let outcome = view.key_press(Key::Enter).await;
    assert!(matches!(outcome, Some(LoginOutcome::Completed(AuthOutcome::Authenticated { .. }))));
    assert_eq!(
        authenticator.received.lock().unwrap().clone(),
        vec![("pharmacist@example.com".to_string(), "TestPass123".to_string())]
    );

    let seen = notifier.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![Notification::success("Welcome back, pharmacist!")]);
}

#[tokio::test(start_paused = true)]
async fn test_simulated_sign_in() {
    let (view, notifier) = view_with(Arc::new(SimulatedAuthenticator::new(Duration::from_millis(1500))));
    view.set_email("pharmacist@example.com");
    view.set_password("TestPass123");

    let started = Instant::now();
    let submitting = {
        let view = view.clone();
        tokio::spawn(async move { view.submit().await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(view.state().submitting);
    assert_eq!(view.submit().await, LoginOutcome::Ignored);

    let outcome = submitting.await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert_eq!(
        outcome,
        LoginOutcome::Completed(AuthOutcome::Placeholder(PLACEHOLDER_MESSAGE.to_string()))
    );
    assert!(!view.state().submitting);

    let seen = notifier.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, NotificationKind::Info);
    assert_eq!(seen[0].message, PLACEHOLDER_MESSAGE);
}

#[tokio::test]
async fn test_authenticator_error_clears_busy_state() {
    let (view, notifier) = view_with(StubAuthenticator::new(|| {
        Err(ClientError::Transport("connection refused".to_string()))
    }));
    view.set_email("pharmacist@example.com");
    view.set_password("TestPass123");

    assert_eq!(view.submit().await, LoginOutcome::Failed);
    assert!(!view.state().submitting);
    assert_eq!(
        notifier.seen.lock().unwrap().clone(),
        vec![Notification::error(SIGN_IN_FAILED_MESSAGE)]
    );
}

#[tokio::test]
async fn test_denied_shows_message() {
    let (view, notifier) = view_with(StubAuthenticator::new(|| {
        Ok(AuthOutcome::Denied("Invalid email or password".to_string()))
    }));
    view.set_email("pharmacist@example.com");
    view.set_password("WrongPass1");

    let outcome = view.submit().await;

    assert!(matches!(outcome, LoginOutcome::Completed(AuthOutcome::Denied(_))));
    assert_eq!(
        notifier.seen.lock().unwrap().clone(),
        vec![Notification::error("Invalid email or password")]
    );
}

#[tokio::test]
async fn test_subscribers_see_busy_transitions() {
    let (view, _) = view_with(StubAuthenticator::new(welcome));
    let mut rx = view.subscribe();
    view.set_email("pharmacist@example.com");
    view.set_password("TestPass123");
    rx.borrow_and_update();

    view.submit().await;

    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().submitting);
}

/// 通知时读取表单的提交状态
#[derive(Default)]
struct SnapshotNotifier {
    state: Mutex<Option<tokio::sync::watch::Receiver<LoginFormState>>>,
    submitting_at_notify: Mutex<Vec<bool>>,
}

#[async_trait]
impl Notifier for SnapshotNotifier {
    async fn notify(&self, _notification: Notification) {
        let submitting = self
            .state
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| rx.borrow().submitting);
        if let Some(submitting) = submitting {
            self.submitting_at_notify.lock().unwrap().push(submitting);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_busy_state_cleared_before_result_is_shown() {
    let notifier = Arc::new(SnapshotNotifier::default());
    let view = LoginFormView::new(
        Arc::new(SimulatedAuthenticator::new(Duration::from_millis(1500))),
        notifier.clone(),
    );
    *notifier.state.lock().unwrap() = Some(view.subscribe());
    view.set_email("pharmacist@example.com");
    view.set_password("TestPass123");

    view.submit().await;

    // 失败路径同样先解除提交状态
    let failing = LoginFormView::new(
        StubAuthenticator::new(|| Err(ClientError::Transport("timeout".to_string()))),
        notifier.clone(),
    );
    *notifier.state.lock().unwrap() = Some(failing.subscribe());
    failing.set_email("pharmacist@example.com");
    failing.set_password("TestPass123");

    assert_eq!(failing.submit().await, LoginOutcome::Failed);
    assert_eq!(*notifier.submitting_at_notify.lock().unwrap(), vec![false, false]);
}
