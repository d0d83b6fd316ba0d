//! Stock update controller
//!
//! Submits a registered stock form, reports the result through the
//! [`Notifier`] and schedules a view refresh on success.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::transport::StockTransport;
use super::ui::{ActionControl, ModalDialog, Notification, Notifier, ViewRefresher};
use super::ClientError;

pub const BUSY_LABEL: &str = "Updating...";
pub const SUCCESS_MESSAGE: &str = "Stock updated successfully!";
pub const FAILURE_MESSAGE: &str = "An error occurred while updating stock. Please try again.";
const UNKNOWN_ERROR: &str = "Unknown error";

pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_millis(500);

/// Medicine identifier as it appears in the update URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MedicineId(String);

impl MedicineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for MedicineId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for MedicineId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MedicineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for MedicineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stock form bound to one medicine, with its submit control and modal.
pub struct StockForm {
    medicine_id: MedicineId,
    fields: RwLock<Vec<(String, String)>>,
    action: Arc<dyn ActionControl>,
    modal: Arc<dyn ModalDialog>,
}

impl StockForm {
    pub fn new(
        medicine_id: impl Into<MedicineId>,
        action: Arc<dyn ActionControl>,
        modal: Arc<dyn ModalDialog>,
    ) -> Self {
        Self {
            medicine_id: medicine_id.into(),
            fields: RwLock::new(Vec::new()),
            action,
            modal,
        }
    }

    pub fn with_field(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn medicine_id(&self) -> &MedicineId {
        &self.medicine_id
    }

    /// Set a field value, replacing an existing field of the same name.
    pub fn set_field(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        let mut fields = self.fields.write().unwrap_or_else(|e| e.into_inner());
        match fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => fields.push((name, value)),
        }
    }

    /// Current field values in insertion order
    pub fn fields(&self) -> Vec<(String, String)> {
        self.fields.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn action(&self) -> &Arc<dyn ActionControl> {
        &self.action
    }
}

/// Result of a settled submit
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Server accepted the update; the handle completes after the refresh.
    ReloadPending(JoinHandle<()>),
    /// Server answered `success: false`.
    Rejected { message: String },
    /// Transport failure, non-2xx status or undecodable body.
    Failed,
}

impl SubmitOutcome {
    pub fn is_reload_pending(&self) -> bool {
        matches!(self, SubmitOutcome::ReloadPending(_))
    }

    pub fn into_reload(self) -> Option<JoinHandle<()>> {
        match self {
            SubmitOutcome::ReloadPending(handle) => Some(handle),
            _ => None,
        }
    }
}

pub struct StockUpdateController {
    forms: HashMap<MedicineId, Arc<StockForm>>,
    in_flight: Arc<Mutex<HashSet<MedicineId>>>,
    transport: Arc<dyn StockTransport>,
    notifier: Arc<dyn Notifier>,
    refresher: Arc<dyn ViewRefresher>,
    reload_delay: Duration,
}

impl StockUpdateController {
    pub fn new(
        transport: Arc<dyn StockTransport>,
        notifier: Arc<dyn Notifier>,
        refresher: Arc<dyn ViewRefresher>,
    ) -> Self {
        Self {
            forms: HashMap::new(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            transport,
            notifier,
            refresher,
            reload_delay: DEFAULT_RELOAD_DELAY,
        }
    }

    pub fn with_reload_delay(mut self, delay: Duration) -> Self {
        self.reload_delay = delay;
        self
    }

    /// Register a form; a later registration for the same id replaces it.
    pub fn register(&mut self, form: StockForm) -> Arc<StockForm> {
        let form = Arc::new(form);
        self.forms.insert(form.medicine_id.clone(), form.clone());
        form
    }

    pub fn form(&self, medicine_id: &MedicineId) -> Option<&Arc<StockForm>> {
        self.forms.get(medicine_id)
    }

    pub async fn submit(&self, medicine_id: &MedicineId) -> Result<SubmitOutcome, ClientError> {
        let form = self
            .forms
            .get(medicine_id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownForm(medicine_id.clone()))?;

        let _guard = BusyGuard::acquire(form.clone(), self.in_flight.clone())?;

        let fields = form.fields();
        let result = self.transport.update_stock(medicine_id, &fields).await;

        let outcome = match result {
            Ok(response) if response.success => {
                self.notifier.notify(Notification::success(SUCCESS_MESSAGE)).await;
                form.modal.hide();

                let refresher = self.refresher.clone();
                let delay = self.reload_delay;
                let id = medicine_id.clone();
                let updated = response.medicine;
                tracing::info!(medicine_id = %id, "Stock updated, refresh scheduled");

                SubmitOutcome::ReloadPending(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    refresher.refresh(id, updated).await;
                }))
            }
            Ok(response) => {
                let message = format!(
                    "Error: {}",
                    response.error.as_deref().unwrap_or(UNKNOWN_ERROR)
                );
                tracing::warn!(medicine_id = %medicine_id, %message, "Stock update rejected");
                self.notifier.notify(Notification::error(message.clone())).await;
                SubmitOutcome::Rejected { message }
            }
            Err(e) => {
                tracing::error!(medicine_id = %medicine_id, error = %e, "Stock update failed");
                self.notifier.notify(Notification::error(FAILURE_MESSAGE)).await;
                SubmitOutcome::Failed
            }
        };

        Ok(outcome)
    }
}

/// Holds a form in the busy state; restores the control on drop.
struct BusyGuard {
    form: Arc<StockForm>,
    in_flight: Arc<Mutex<HashSet<MedicineId>>>,
    label: String,
    enabled: bool,
}

impl BusyGuard {
    fn acquire(
        form: Arc<StockForm>,
        in_flight: Arc<Mutex<HashSet<MedicineId>>>,
    ) -> Result<Self, ClientError> {
        if !lock(&in_flight).insert(form.medicine_id.clone()) {
            return Err(ClientError::Busy(form.medicine_id.clone()));
        }

        let label = form.action.label();
        let enabled = form.action.is_enabled();
        form.action.set_enabled(false);
        form.action.set_label(BUSY_LABEL);

        Ok(Self {
            form,
            in_flight,
            label,
            enabled,
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.form.action.set_label(&self.label);
        self.form.action.set_enabled(self.enabled);
        lock(&self.in_flight).remove(&self.form.medicine_id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopControl;

    impl ActionControl for NoopControl {
        fn label(&self) -> String {
            "Update".to_string()
        }
        fn set_label(&self, _label: &str) {}
        fn is_enabled(&self) -> bool {
            true
        }
        fn set_enabled(&self, _enabled: bool) {}
    }

    struct NoopModal;

    impl ModalDialog for NoopModal {
        fn hide(&self) {}
    }

    #[test]
    fn test_medicine_id_conversions() {
        assert_eq!(MedicineId::from(7i64), MedicineId::from("7"));
        assert_eq!(MedicineId::from(7i64).to_string(), "7");
    }

    #[test]
    fn test_form_fields_keep_order_and_replace() {
        let form = StockForm::new(1i64, Arc::new(NoopControl), Arc::new(NoopModal))
            .with_field("transaction_type", "in")
            .with_field("quantity", "5");
        form.set_field("quantity", "6");

        assert_eq!(
            form.fields(),
            vec![
                ("transaction_type".to_string(), "in".to_string()),
                ("quantity".to_string(), "6".to_string()),
            ]
        );
    }
}
