//! Domain model definitions for certification documents.

pub mod certification;

pub use certification::{Certification, RecordDecodeError};
