use spacetix_core::{
    utc_day_window, weekday_name, Booking, BookingRepository, LaunchRegistry, NewBooking,
    RegistryError, StoreError,
};
use chrono::NaiveDate;
use spacetix_shared::Masked;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Business reasons a booking request is turned down. These are answers, not
/// failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    OverlapsWithLaunch,
    DestinationNotServed,
}

impl RejectionReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::OverlapsWithLaunch => "overlaps with scheduled launch",
            RejectionReason::DestinationNotServed => {
                "pad does not serve this destination on the requested day"
            }
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Accepted(Booking),
    Rejected(RejectionReason),
}

/// Stage of the pipeline, used to say where a dependency gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    ResolveLaunchPad,
    RegistryOverlap,
    ScheduleLookup,
    Persist,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStep::ResolveLaunchPad => "launch pad lookup",
            PipelineStep::RegistryOverlap => "launch registry check",
            PipelineStep::ScheduleLookup => "schedule lookup",
            PipelineStep::Persist => "booking insert",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{step} failed: {source}")]
    Store {
        step: PipelineStep,
        #[source]
        source: StoreError,
    },
    #[error("launch registry check failed: {0}")]
    Registry(#[from] RegistryError),
    #[error("launch date {0} has no representable UTC day")]
    LaunchDateOutOfRange(NaiveDate),
}

impl PipelineError {
    pub fn step(&self) -> PipelineStep {
        match self {
            PipelineError::Store { step, .. } => *step,
            PipelineError::Registry(_) | PipelineError::LaunchDateOutOfRange(_) => {
                PipelineStep::RegistryOverlap
            }
        }
    }
}

fn store_failure(step: PipelineStep) -> impl FnOnce(StoreError) -> PipelineError {
    move |source| PipelineError::Store { step, source }
}

/// Validates booking candidates against the launch registry and the weekly
/// schedule, and persists the ones that pass.
///
/// Holds no state between calls; clones share the same collaborators.
#[derive(Clone)]
pub struct BookingPipeline {
    repo: Arc<dyn BookingRepository>,
    registry: Arc<dyn LaunchRegistry>,
}

impl BookingPipeline {
    pub fn new(repo: Arc<dyn BookingRepository>, registry: Arc<dyn LaunchRegistry>) -> Self {
        Self { repo, registry }
    }

    /// Runs the checks in order and stops at the first one that fails.
    ///
    /// 1. resolve the launch pad (missing pad is a dependency failure)
    /// 2. ask the registry for real launches on that pad that UTC day
    /// 3. look for a schedule entry for pad, destination and weekday
    /// 4. insert
    pub async fn propose(&self, candidate: NewBooking) -> Result<BookingOutcome, PipelineError> {
        debug!(
            launch_pad_id = %candidate.launch_pad_id,
            destination_id = %candidate.destination_id,
            launch_date = %candidate.launch_date,
            customer = %Masked(&candidate.customer.last_name),
            "Validating booking request"
        );

        let pad = self
            .repo
            .get_launch_pad(&candidate.launch_pad_id)
            .await
            .map_err(store_failure(PipelineStep::ResolveLaunchPad))
            .inspect_err(|e| error!("Booking validation aborted: {}", e))?;

        let window = utc_day_window(candidate.launch_date)
            .ok_or(PipelineError::LaunchDateOutOfRange(candidate.launch_date))
            .inspect_err(|e| error!("Booking validation aborted: {}", e))?;
        let launches = self
            .registry
            .count_launches(&pad.registry_pad_id, window.start, window.end)
            .await
            .inspect_err(|e| error!("Booking validation aborted: {}", e))?;

        if launches > 0 {
            info!(
                "Booking rejected: {} registry launch(es) from {} on {}",
                launches, pad.full_name, candidate.launch_date
            );
            return Ok(BookingOutcome::Rejected(RejectionReason::OverlapsWithLaunch));
        }

        let weekday = weekday_name(candidate.launch_date);
        let scheduled = self
            .repo
            .has_schedule_entry(&candidate.launch_pad_id, &candidate.destination_id, weekday)
            .await
            .map_err(store_failure(PipelineStep::ScheduleLookup))
            .inspect_err(|e| error!("Booking validation aborted: {}", e))?;

        if !scheduled {
            info!(
                "Booking rejected: {} does not fly to {} on {}",
                pad.full_name, candidate.destination_id, weekday
            );
            return Ok(BookingOutcome::Rejected(RejectionReason::DestinationNotServed));
        }

        let booking = self
            .repo
            .insert(candidate)
            .await
            .map_err(store_failure(PipelineStep::Persist))
            .inspect_err(|e| error!("Booking insert failed: {}", e))?;

        info!("Booking confirmed: {}", booking.id);
        Ok(BookingOutcome::Accepted(booking))
    }
}
