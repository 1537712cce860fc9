pub mod memory;
pub mod store;

pub use memory::InMemorySource;
pub use store::{DocumentContainer, DocumentSource, Page, QueryPager, StoreError};
