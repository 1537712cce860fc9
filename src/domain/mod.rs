pub mod collect;
pub mod error;
pub mod model;
pub mod query;
