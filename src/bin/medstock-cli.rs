//! 终端客户端：库存更新与登录

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use medstock::client::{
    ActionControl, ClientSettings, HttpAuthenticator, HttpStockClient, LoginFormView,
    LoginOutcome, MedicineId, ModalDialog, Notification, NotificationKind, Notifier,
    SimulatedAuthenticator, StockForm, StockUpdateController, SubmitOutcome, ViewRefresher,
};
use medstock::{config::LoggingConfig, models::medicine::Medicine, telemetry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(name = "medstock-cli", version, about = "Medicine stock terminal client")]
struct Cli {
    /// 覆盖 MEDSTOCK_CLIENT__BASE_URL
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, short, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 提交一次库存变更
    UpdateStock {
        #[arg(long)]
        id: String,
        /// in 或 out
        #[arg(long, default_value = "in")]
        transaction_type: String,
        #[arg(long)]
        quantity: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        batch_number: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        expiry_date: Option<String>,
    },
    /// 登录
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// 不访问服务器，使用模拟登录
        #[arg(long)]
        simulate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    telemetry::init_telemetry(&LoggingConfig {
        level: cli.log_level.clone(),
        format: "text".to_string(),
    });

    let mut settings = ClientSettings::from_env()?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }

    match cli.command {
        Command::UpdateStock {
            id,
            transaction_type,
            quantity,
            notes,
            batch_number,
            expiry_date,
        } => {
            let transport = Arc::new(HttpStockClient::from_settings(&settings)?);
            let mut controller =
                StockUpdateController::new(transport, Arc::new(ConsoleNotifier), Arc::new(ConsoleRefresher))
                    .with_reload_delay(settings.reload_delay());

            let medicine_id = MedicineId::new(id);
            let mut form = StockForm::new(
                medicine_id.clone(),
                Arc::new(ConsoleButton::new("Update Stock")),
                Arc::new(ConsoleModal),
            )
            .with_field("transaction_type", transaction_type)
            .with_field("quantity", quantity);
            for (name, value) in [
                ("notes", notes),
                ("batch_number", batch_number),
                ("expiry_date", expiry_date),
            ] {
                if let Some(value) = value {
                    form = form.with_field(name, value);
                }
            }
            controller.register(form);

            match controller.submit(&medicine_id).await? {
                SubmitOutcome::ReloadPending(handle) => handle.await?,
                SubmitOutcome::Rejected { .. } | SubmitOutcome::Failed => std::process::exit(1),
            }
        }
        Command::Login {
            email,
            password,
            simulate,
        } => {
            let view = if simulate {
                LoginFormView::new(
                    Arc::new(SimulatedAuthenticator::new(settings.login_delay())),
                    Arc::new(ConsoleNotifier),
                )
            } else {
                LoginFormView::new(
                    Arc::new(HttpAuthenticator::new(&settings.base_url)?),
                    Arc::new(ConsoleNotifier),
                )
            };
            view.set_email(email);
            view.set_password(password);

            match view.submit().await {
                LoginOutcome::Completed(_) => {}
                _ => std::process::exit(1),
            }
        }
    }

    Ok(())
}

struct ConsoleButton {
    label: Mutex<String>,
    enabled: AtomicBool,
}

impl ConsoleButton {
    fn new(label: &str) -> Self {
        Self {
            label: Mutex::new(label.to_string()),
            enabled: AtomicBool::new(true),
        }
    }
}

impl ActionControl for ConsoleButton {
    fn label(&self) -> String {
        self.label.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn set_label(&self, label: &str) {
        if let Ok(mut current) = self.label.lock() {
            *current = label.to_string();
        }
        tracing::debug!(label, "Button label changed");
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

struct ConsoleModal;

impl ModalDialog for ConsoleModal {
    fn hide(&self) {
        tracing::debug!("Modal hidden");
    }
}

struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error | NotificationKind::Validation => {
                eprintln!("{}", notification.message)
            }
            NotificationKind::Success | NotificationKind::Info => println!("{}", notification.message),
        }
    }
}

struct ConsoleRefresher;

#[async_trait]
impl ViewRefresher for ConsoleRefresher {
    async fn refresh(&self, medicine_id: MedicineId, updated: Option<Medicine>) {
        match updated {
            Some(medicine) => println!(
                "#{} {} (batch {}): {} in stock, expires {}",
                medicine.id, medicine.name, medicine.batch_number, medicine.quantity, medicine.expiry_date
            ),
            None => println!("Medicine {} updated", medicine_id),
        }
    }
}
