//! Validation and construction of certification queries.

pub mod builder;
pub mod field;
pub mod validator;

pub use builder::{
    build_query, listing_query, lookup_query, DocumentQuery, QueryParameter, LISTING_CATEGORY,
};
pub use field::LookupField;
pub use validator::{
    parse_limit, validate_lookup, LookupRequest, ResultLimit, MAX_LOOKUP_INPUT_LEN,
};
