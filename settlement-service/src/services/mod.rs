//! Services module for settlement-service.

pub mod aggregation;
pub mod audit_trail;
pub mod collaborators;
pub mod invoice_generator;
pub mod metrics;
pub mod orchestrator;
pub mod transition;

pub use metrics::{get_metrics, init_metrics};
pub use orchestrator::{OperationOutcome, WorkflowOrchestrator};
