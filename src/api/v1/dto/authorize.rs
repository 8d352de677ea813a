use serde::Deserialize;

/// Request body for `/authorize`.
///
/// - `args`: `[app]` or `[app, lock]`
/// - `payload`: the upstream query result, either as JSON or as a JSON-encoded string
#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub args: Vec<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl AuthorizeRequest {
    /// Payload text as the upstream pipeline produced it.
    pub fn payload_text(&self) -> String {
        match &self.payload {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_accepts_object_or_string() {
        let req: AuthorizeRequest = serde_json::from_str(
            r#"{"args":["orders"],"payload":{"RESULTSET":{"records":0}}}"#,
        )
        .unwrap();
        assert_eq!(req.payload_text(), r#"{"RESULTSET":{"records":0}}"#);

        let req: AuthorizeRequest = serde_json::from_str(
            r#"{"args":["orders"],"payload":"{\"RESULTSET\":{\"records\":0}}"}"#,
        )
        .unwrap();
        assert_eq!(req.payload_text(), r#"{"RESULTSET":{"records":0}}"#);

        let req: AuthorizeRequest = serde_json::from_str(r#"{"args":[]}"#).unwrap();
        assert_eq!(req.payload_text(), "");
    }
}
