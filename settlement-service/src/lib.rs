//! settlement-service: staged approval workflow for vendor freight
//! annexures and the settlement invoices derived from them.
//!
//! The core is the workflow state machine and its cascading orchestration:
//! transition validation, per-group approval/rejection cascades, aggregate
//! status derivation, invoice generation gating, and invoice/annexure
//! status synchronization. Everything else (HTTP surface, persistence
//! adapters, collaborator boundaries) is thin wiring around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;
pub mod startup;

pub use startup::AppState;
