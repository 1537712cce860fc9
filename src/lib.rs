pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::certification_service::CertificationService;
pub use domain::error::{CertError, CertResult, QueryError};
pub use domain::model::Certification;
pub use infra::config::ServiceConfig;
pub use infra::cosmos::{CosmosClient, CosmosSettings};
pub use infra::credential::{AmbientCredential, TokenCredential};
pub use storage::documents::{DocumentSource, InMemorySource};
