//! UI collaborator contracts.
//!
//! Components receive these as explicit references at construction time.

use async_trait::async_trait;

use super::stock_update::MedicineId;
use crate::models::medicine::Medicine;

/// The primary action control of a form (its submit button).
pub trait ActionControl: Send + Sync {
    fn label(&self) -> String;
    fn set_label(&self, label: &str);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&self, enabled: bool);
}

/// A modal dialog hosting a form.
pub trait ModalDialog: Send + Sync {
    fn hide(&self);
}

/// A flash alert that can be dismissed.
pub trait DismissibleAlert: Send + Sync {
    fn close(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Validation,
    Info,
}

/// A blocking, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Validation, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }
}

/// Shows blocking notifications. `notify` resolves once the user has
/// dismissed the message.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Refreshes the view after a record changed on the server.
///
/// `updated` is the record as returned by the server, when it sent one.
#[async_trait]
pub trait ViewRefresher: Send + Sync {
    async fn refresh(&self, medicine_id: MedicineId, updated: Option<Medicine>);
}
