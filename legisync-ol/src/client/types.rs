//! OpenLeg API response types
//!
//! Every endpoint wraps its payload in a common envelope:
//! `{ success, responseType, total, offsetStart, offsetEnd, limit, result }`.
//! List results nest one more level: `result: { items: [...], size }`.
//! The payload item shape differs per resource type, so list items and
//! document payloads stay as raw JSON values; the importers own their
//! interpretation.

use serde::Deserialize;

/// Common response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,

    #[serde(default)]
    pub response_type: Option<String>,

    /// Error description when success is false
    #[serde(default)]
    pub message: Option<String>,

    /// Total matching records across all pages (list endpoints only)
    #[serde(default)]
    pub total: Option<u32>,

    #[serde(default)]
    pub offset_start: Option<u32>,

    #[serde(default)]
    pub offset_end: Option<u32>,

    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Paginated list payload inside an envelope's `result`
#[derive(Debug, Deserialize)]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,

    #[serde(default)]
    pub size: Option<u32>,
}

/// One token from an updates feed, identifying a changed upstream record
///
/// The `id` object's fields differ per resource type (bills carry
/// `basePrintNo` + `session`, agendas carry `year` + `number`, ...), so it
/// stays raw and each importer extracts its own id shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateToken {
    pub id: serde_json::Value,

    #[serde(default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub source_date_time: Option<String>,

    #[serde(default)]
    pub processed_date_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_with_list_result() {
        let body = r#"{
            "success": true,
            "responseType": "update-token list",
            "total": 2,
            "offsetStart": 1,
            "offsetEnd": 2,
            "limit": 100,
            "result": {
                "items": [
                    {
                        "id": {"basePrintNo": "S123", "session": 2021},
                        "contentType": "BILL",
                        "sourceDateTime": "2021-06-01T12:00:00",
                        "processedDateTime": "2021-06-01T12:00:05"
                    },
                    {
                        "id": {"basePrintNo": "A456", "session": 2021}
                    }
                ],
                "size": 2
            }
        }"#;

        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.total, Some(2));

        let list: ItemList<UpdateToken> =
            serde_json::from_value(envelope.result.unwrap()).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].content_type.as_deref(), Some("BILL"));
        assert_eq!(
            list.items[0].id.get("basePrintNo").unwrap().as_str(),
            Some("S123")
        );
        // Optional token fields may be absent
        assert!(list.items[1].source_date_time.is_none());
    }

    #[test]
    fn test_envelope_failure_carries_message() {
        let body = r#"{
            "success": false,
            "message": "Invalid API key",
            "responseType": "error"
        }"#;

        let envelope: Envelope = serde_json::from_str(body).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("Invalid API key"));
        assert!(envelope.result.is_none());
    }

    #[test]
    fn test_empty_item_list() {
        let list: ItemList<UpdateToken> = serde_json::from_str(r#"{"size": 0}"#).unwrap();
        assert!(list.items.is_empty());
    }
}
