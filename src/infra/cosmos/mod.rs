//! Azure Cosmos DB (NoSQL API) adapter over the REST protocol.

pub mod client;
pub mod pager;

pub use client::{CosmosClient, CosmosContainer};
pub use pager::CosmosQueryPager;

/// REST API version sent with every request.
pub const API_VERSION: &str = "2020-07-15";

#[derive(Debug, Clone)]
pub struct CosmosSettings {
    /// Account endpoint, e.g. `https://myaccount.documents.azure.com:443/`.
    pub endpoint: String,
    pub database: String,
    pub container: String,
    /// Value for `x-ms-max-item-count`; service default when `None`.
    pub page_size: Option<u32>,
}
