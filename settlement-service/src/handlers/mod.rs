//! HTTP handlers for settlement-service.

pub mod workflow;
