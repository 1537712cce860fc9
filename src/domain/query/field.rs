//! Allow-listed lookup fields.
//!
//! Cosmos SQL has no parameter substitution for identifiers, so the field
//! name is the one piece of request input that ends up in query text. It only
//! gets there through [`LookupField::predicate`], whose fragments are
//! `'static` literals.

use crate::domain::error::QueryError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupField {
    Id,
    Category,
    Company,
}

impl LookupField {
    pub const ALL: [LookupField; 3] = [LookupField::Id, LookupField::Category, LookupField::Company];

    /// Name as it appears in URLs and in the stored documents.
    pub fn as_str(self) -> &'static str {
        match self {
            LookupField::Id => "id",
            LookupField::Category => "category",
            LookupField::Company => "company",
        }
    }

    /// Equality predicate against the `@value` placeholder.
    pub fn predicate(self) -> &'static str {
        match self {
            LookupField::Id => "c.id = @value",
            LookupField::Category => "c.category = @value",
            LookupField::Company => "c.company = @value",
        }
    }
}

impl FromStr for LookupField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookupField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| QueryError::InvalidField(s.to_string()))
    }
}

impl fmt::Display for LookupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
