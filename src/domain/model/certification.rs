//! The certification record as stored in the `certifications` collection.
//!
//! Records are written by an external loader. This service only decodes them,
//! so decoding is lenient: unknown document properties (including the Cosmos
//! system properties `_rid`, `_etag`, `_ts`, ...) are ignored and optional
//! descriptive fields may be missing.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    /// Document identifier. Never empty once decoded.
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordDecodeError {
    #[error("malformed certification document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("certification document has an empty id")]
    EmptyId,
}

impl Certification {
    /// Decodes one raw document returned by the store.
    pub fn from_document(document: JsonValue) -> Result<Self, RecordDecodeError> {
        let record: Certification = serde_json::from_value(document)?;
        if record.id.trim().is_empty() {
            return Err(RecordDecodeError::EmptyId);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_stored_document_ignoring_system_properties() {
        let doc = json!({
            "id": "az-900",
            "category": "Cloud",
            "company": "Microsoft",
            "name": "Azure Fundamentals",
            "issueDate": "2023-04-01",
            "credentialUrl": "https://learn.microsoft.com/credentials/az-900",
            "_rid": "abc==",
            "_etag": "\"0000\"",
            "_ts": 1700000000
        });

        let cert = Certification::from_document(doc).unwrap();
        assert_eq!(cert.id, "az-900");
        assert_eq!(cert.category, "Cloud");
        assert_eq!(cert.company, "Microsoft");
        assert_eq!(cert.name.as_deref(), Some("Azure Fundamentals"));
        assert_eq!(cert.issue_date.as_deref(), Some("2023-04-01"));
        assert!(cert.expiration_date.is_none());
    }

    #[test]
    fn missing_descriptive_fields_default() {
        let cert = Certification::from_document(json!({ "id": "x" })).unwrap();
        assert_eq!(cert.category, "");
        assert_eq!(cert.company, "");
        assert!(cert.name.is_none());
    }

    #[test]
    fn rejects_missing_or_empty_id() {
        assert!(matches!(
            Certification::from_document(json!({ "category": "Cloud" })),
            Err(RecordDecodeError::Malformed(_))
        ));
        assert!(matches!(
            Certification::from_document(json!({ "id": "  " })),
            Err(RecordDecodeError::EmptyId)
        ));
    }

    #[test]
    fn rejects_wrongly_typed_fields() {
        let err = Certification::from_document(json!({ "id": "x", "company": 42 })).unwrap_err();
        assert!(matches!(err, RecordDecodeError::Malformed(_)));
    }

    #[test]
    fn absent_optionals_are_omitted_on_encode() {
        let cert = Certification::from_document(json!({
            "id": "x",
            "category": "Security",
            "company": "CompTIA"
        }))
        .unwrap();
        let encoded = serde_json::to_value(&cert).unwrap();
        assert_eq!(
            encoded,
            json!({ "id": "x", "category": "Security", "company": "CompTIA" })
        );
    }
}
