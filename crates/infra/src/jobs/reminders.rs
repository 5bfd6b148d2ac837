use std::sync::Arc;

use async_trait::async_trait;

use eventia_notify::{DispatchGate, MessagingClient, NotificationLedger, ReminderSource};

use super::PeriodicJob;

/// Runs the day-before reminder gate on each tick.
pub struct ReminderJob<S, L, M> {
    gate: Arc<DispatchGate<S, L, M>>,
}

impl<S, L, M> ReminderJob<S, L, M> {
    pub fn new(gate: Arc<DispatchGate<S, L, M>>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl<S, L, M> PeriodicJob for ReminderJob<S, L, M>
where
    S: ReminderSource + 'static,
    L: NotificationLedger + 'static,
    M: MessagingClient + 'static,
{
    fn name(&self) -> &'static str {
        "reminders"
    }

    async fn run(&self) -> anyhow::Result<()> {
        self.gate.run().await?;
        Ok(())
    }
}
