use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn run(&self) -> anyhow::Result<()>;
}

#[async_trait]
impl<J> PeriodicJob for Arc<J>
where
    J: PeriodicJob + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn run(&self) -> anyhow::Result<()> {
        (**self).run().await
    }
}

/// Handle for a spawned job loop.
#[derive(Debug)]
pub struct JobHandle {
    name: &'static str,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl JobHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the loop, letting an in-flight run finish first.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JobRunner;

impl JobRunner {
    /// Spawn `job` on the current tokio runtime. The first run happens immediately.
    pub fn spawn<J>(job: J, interval: Duration) -> JobHandle
    where
        J: PeriodicJob,
    {
        let name = job.name();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(job_loop(job, interval, shutdown_rx));

        JobHandle {
            name,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }
}

async fn job_loop<J>(job: J, interval: Duration, mut shutdown_rx: oneshot::Receiver<()>)
where
    J: PeriodicJob,
{
    let name = job.name();
    info!(job = name, interval_secs = interval.as_secs(), "job started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {
                let started = Instant::now();
                match job.run().await {
                    Ok(()) => info!(job = name, elapsed_ms = started.elapsed().as_millis() as u64, "job run finished"),
                    Err(e) => warn!(job = name, error = %e, "job run failed"),
                }
            }
        }
    }

    info!(job = name, "job stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        runs: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl PeriodicJob for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn runs_immediately_then_on_each_tick_until_shutdown() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = JobRunner::spawn(
            Counting {
                runs: runs.clone(),
                fail: false,
            },
            Duration::from_millis(20),
        );
        assert_eq!(handle.name(), "counting");

        tokio::time::sleep(Duration::from_millis(110)).await;
        handle.shutdown().await;

        let seen = runs.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several runs, got {seen}");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn failing_runs_do_not_stop_the_loop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = JobRunner::spawn(
            Counting {
                runs: runs.clone(),
                fail: true,
            },
            Duration::from_millis(20),
        );

        tokio::time::sleep(Duration::from_millis(110)).await;
        handle.shutdown().await;

        assert!(runs.load(Ordering::SeqCst) >= 2);
    }
}
