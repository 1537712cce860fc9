//! Builds parameterized Cosmos SQL queries.
//!
//! Query text is assembled from `'static` fragments only. Request values and
//! limits travel in the parameter list.

use crate::domain::query::field::LookupField;
use crate::domain::query::validator::{LookupRequest, ResultLimit};
use serde::Serialize;
use serde_json::Value as JsonValue;

pub const VALUE_PLACEHOLDER: &str = "@value";
pub const LIMIT_PLACEHOLDER: &str = "@top";

/// Category stamped on every document that belongs in the public listing.
pub const LISTING_CATEGORY: &str = "certification";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParameter {
    pub name: &'static str,
    pub value: JsonValue,
}

/// A query template plus its ordered parameter bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    text: String,
    parameters: Vec<QueryParameter>,
    field: LookupField,
    limit: Option<ResultLimit>,
}

impl DocumentQuery {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }

    pub fn field(&self) -> LookupField {
        self.field
    }

    pub fn limit(&self) -> Option<ResultLimit> {
        self.limit
    }

    pub fn parameter(&self, name: &str) -> Option<&JsonValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

pub fn build_query(field: LookupField, value: &str, limit: Option<ResultLimit>) -> DocumentQuery {
    let projection = if limit.is_some() { "SELECT TOP @top *" } else { "SELECT *" };
    let text = format!(
        "{} FROM certifications c WHERE {}",
        projection,
        field.predicate()
    );

    let mut parameters = vec![QueryParameter {
        name: VALUE_PLACEHOLDER,
        value: JsonValue::from(value),
    }];
    if let Some(limit) = limit {
        parameters.push(QueryParameter {
            name: LIMIT_PLACEHOLDER,
            value: JsonValue::from(limit.get()),
        });
    }

    DocumentQuery {
        text,
        parameters,
        field,
        limit,
    }
}

pub fn lookup_query(request: &LookupRequest) -> DocumentQuery {
    build_query(request.field, &request.value, None)
}

pub fn listing_query(limit: Option<ResultLimit>) -> DocumentQuery {
    build_query(LookupField::Category, LISTING_CATEGORY, limit)
}
