use std::sync::Arc;

use async_trait::async_trait;

use eventia_lifecycle::{LifecycleStore, StatusEngine};

use super::PeriodicJob;

/// Runs the status engine on each tick.
pub struct StatusSyncJob<S> {
    engine: Arc<StatusEngine<S>>,
}

impl<S> StatusSyncJob<S> {
    pub fn new(engine: Arc<StatusEngine<S>>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<S> PeriodicJob for StatusSyncJob<S>
where
    S: LifecycleStore + 'static,
{
    fn name(&self) -> &'static str {
        "status-sync"
    }

    async fn run(&self) -> anyhow::Result<()> {
        let report = self.engine.run().await?;
        if report.errors > 0 {
            anyhow::bail!("status sync finished with {} failed writes", report.errors);
        }
        Ok(())
    }
}
