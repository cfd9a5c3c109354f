//! Minute-by-minute notification sweep.

use crate::{bot::sweep::Sweeper, errors::Result};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Every minute, on the minute.
pub const SWEEP_SCHEDULE: &str = "0 * * * * *";

/// Starts a scheduler that runs `sweeper` on [`SWEEP_SCHEDULE`].
///
/// The returned handle must be kept alive for the job to keep firing.
pub async fn start_scheduler(sweeper: Arc<Sweeper>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job_sweeper = Arc::clone(&sweeper);
    let job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _lock| {
        let sweeper = Arc::clone(&job_sweeper);
        Box::pin(async move {
            if let Err(e) = sweeper.sweep().await {
                error!("Notification sweep failed: {e}");
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    sweeper.set_scheduler_running(true).await;

    info!("Notification scheduler started");
    Ok(scheduler)
}
