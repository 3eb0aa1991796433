//! Domain models for settlement-service.

mod actor;
mod annexure;
mod audit;
mod comment;
mod file_group;
mod invoice;
mod line_item;
mod rejection;

pub use actor::{Actor, Role};
pub use annexure::{Annexure, AnnexureStatus};
pub use audit::{AuditEntry, EntityType};
pub use comment::Comment;
pub use file_group::{FileGroup, FileGroupStatus};
pub use invoice::{Invoice, InvoiceStatus};
pub use line_item::{LineItem, LineItemStatus};
pub use rejection::Rejection;
