pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod certs;
    pub mod health;
}

pub use router::{create_app, create_router, ApiDoc, API_PREFIX};
pub use types::AppState;
