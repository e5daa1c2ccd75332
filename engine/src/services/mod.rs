pub mod generation_service;

pub use generation_service::{CancellationFlag, GenerationReport, GenerationRequest, GenerationService};
