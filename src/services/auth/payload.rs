//! The upstream query result the authorizer inspects.
//!
//! Expected shape:
//! ```json
//! {"RESULTSET": {"records": 1, "ROWS": [{"RESOURCE": "orders.list"}]}}
//! ```
//! Lower-case key spellings are accepted as well.
use serde::Deserialize;

use crate::services::auth::error::AuthError;

#[derive(Debug, Deserialize)]
struct ResultPayload {
    #[serde(rename = "RESULTSET", alias = "resultset", alias = "resultSet")]
    result_set: ResultSet,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(alias = "RECORDS")]
    records: i64,
    #[serde(rename = "ROWS", alias = "rows", default)]
    rows: Vec<serde_json::Value>,
}

/// Resource named by the first row of the payload.
///
/// - `Ok(None)` when the result set reports zero records
/// - `Err(MalformedPayload)` when the payload is empty or not of the expected shape
pub fn protected_resource(payload: &str) -> Result<Option<String>, AuthError> {
    if payload.trim().is_empty() {
        return Err(AuthError::MalformedPayload("empty payload".to_string()));
    }

    let parsed: ResultPayload =
        serde_json::from_str(payload).map_err(|e| AuthError::MalformedPayload(e.to_string()))?;

    if parsed.result_set.records <= 0 {
        return Ok(None);
    }

    let first = parsed
        .result_set
        .rows
        .first()
        .ok_or_else(|| AuthError::MalformedPayload("records > 0 but no rows".to_string()))?;

    let resource = first
        .get("RESOURCE")
        .or_else(|| first.get("resource"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| AuthError::MalformedPayload("first row has no resource".to_string()))?;

    Ok(Some(resource.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_resource_from_first_row() {
        let payload = r#"{"RESULTSET":{"records":2,"ROWS":[{"RESOURCE":"orders.list"},{"RESOURCE":"x"}]}}"#;
        assert_eq!(
            protected_resource(payload).unwrap().as_deref(),
            Some("orders.list")
        );

        let payload = r#"{"resultset":{"records":1,"rows":[{"resource":"orders.get"}]}}"#;
        assert_eq!(
            protected_resource(payload).unwrap().as_deref(),
            Some("orders.get")
        );
    }

    #[test]
    fn zero_records_names_no_resource() {
        let payload = r#"{"RESULTSET":{"records":0,"ROWS":[]}}"#;
        assert_eq!(protected_resource(payload).unwrap(), None);
    }

    #[test]
    fn malformed_payloads_are_errors() {
        for payload in [
            "",
            "not json",
            r#"{"records":1}"#,
            r#"{"RESULTSET":{"records":1,"ROWS":[]}}"#,
            r#"{"RESULTSET":{"records":1,"ROWS":[{"name":"x"}]}}"#,
        ] {
            assert!(
                matches!(
                    protected_resource(payload),
                    Err(AuthError::MalformedPayload(_))
                ),
                "{payload}"
            );
        }
    }
}
