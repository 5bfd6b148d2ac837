//! Service wiring: stores, auth, engine, reminder gate and background jobs.

use std::sync::Arc;

use eventia_auth::{CredentialStore, CredentialVerifier, TokenCodec, TokenIssuer, UserDirectory};
use eventia_core::{Clock, LocalCalendar, SystemClock};
use eventia_infra::jobs::{JobHandle, JobRunner, ReminderJob, StatusSyncJob};
use eventia_infra::{InMemoryStore, PostgresStore};
use eventia_lifecycle::{EventStatusWriter, LifecycleStore, StatusEngine};
use eventia_notify::{
    DispatchGate, MessagingClient, NotificationLedger, ReminderSource, WhatsAppClient,
};

use crate::config::{AppConfig, CookieSettings};

pub type Engine = StatusEngine<Arc<dyn LifecycleStore>>;
pub type ReminderGate =
    DispatchGate<Arc<dyn ReminderSource>, Arc<dyn NotificationLedger>, Arc<dyn MessagingClient>>;

/// Every storage seam, backed by one store.
#[derive(Clone)]
pub struct Stores {
    pub directory: Arc<dyn UserDirectory>,
    pub credentials: Arc<dyn CredentialStore>,
    pub lifecycle: Arc<dyn LifecycleStore>,
    pub status_writer: Arc<dyn EventStatusWriter>,
    pub reminder_source: Arc<dyn ReminderSource>,
    pub ledger: Arc<dyn NotificationLedger>,
}

impl Stores {
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            directory: store.clone(),
            credentials: store.clone(),
            lifecycle: store.clone(),
            status_writer: store.clone(),
            reminder_source: store.clone(),
            ledger: store,
        }
    }

    pub fn postgres(store: Arc<PostgresStore>) -> Self {
        Self {
            directory: store.clone(),
            credentials: store.clone(),
            lifecycle: store.clone(),
            status_writer: store.clone(),
            reminder_source: store.clone(),
            ledger: store,
        }
    }
}

#[derive(Clone)]
pub struct AppServices {
    pub verifier: CredentialVerifier,
    pub issuer: TokenIssuer,
    pub credentials: Arc<dyn CredentialStore>,
    pub status_writer: Arc<dyn EventStatusWriter>,
    pub engine: Arc<Engine>,
    pub reminders: Arc<ReminderGate>,
    pub cookies: CookieSettings,
}

/// Wire services from already-built stores and collaborators.
pub fn build_services_with(
    config: &AppConfig,
    stores: Stores,
    messenger: Arc<dyn MessagingClient>,
    clock: Arc<dyn Clock>,
) -> AppServices {
    let calendar = LocalCalendar::from_offset_minutes(config.utc_offset_minutes);
    let codec = Arc::new(TokenCodec::new(config.jwt_secret.as_str(), clock.clone()));
    let verifier = CredentialVerifier::new(codec.clone(), stores.directory.clone());
    let issuer = TokenIssuer::new(codec, verifier.clone(), config.token_ttls);

    let engine = Arc::new(StatusEngine::new(stores.lifecycle.clone(), clock.clone(), calendar));
    let reminders = Arc::new(DispatchGate::new(
        stores.reminder_source.clone(),
        stores.ledger.clone(),
        messenger,
        clock,
        calendar,
        config.reminders.clone(),
    ));

    AppServices {
        verifier,
        issuer,
        credentials: stores.credentials,
        status_writer: stores.status_writer,
        engine,
        reminders,
        cookies: config.cookies.clone(),
    }
}

/// Pick the backend from `DATABASE_URL` and wire production collaborators.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let stores = match &config.database_url {
        Some(url) => {
            let pool = eventia_infra::postgres::connect(url).await?;
            tracing::info!("using postgres stores");
            Stores::postgres(Arc::new(PostgresStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");
            Stores::in_memory(Arc::new(InMemoryStore::new()))
        }
    };

    let messenger: Arc<dyn MessagingClient> = Arc::new(WhatsAppClient::new(config.whatsapp.clone()));
    Ok(build_services_with(config, stores, messenger, Arc::new(SystemClock)))
}

/// Start the status-sync and reminder loops.
pub fn spawn_jobs(services: &AppServices, config: &AppConfig) -> Vec<JobHandle> {
    vec![
        JobRunner::spawn(
            StatusSyncJob::new(services.engine.clone()),
            config.status_sync_interval,
        ),
        JobRunner::spawn(
            ReminderJob::new(services.reminders.clone()),
            config.reminder_interval,
        ),
    ]
}
