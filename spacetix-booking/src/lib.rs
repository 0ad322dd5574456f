pub mod pipeline;

pub use pipeline::{BookingOutcome, BookingPipeline, PipelineError, PipelineStep, RejectionReason};
