//! Response mapping
//!
//! Converts raw GraphQL payloads into typed pages and records. Structural
//! problems surface as [`SuperOpsError::SchemaMismatch`] carrying the path of
//! the offending field; nothing is silently coerced.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::SuperOpsError;

/// Wire-level GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<WireError>,
}

/// One entry of a GraphQL error list.
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub message: String,
    #[serde(default)]
    pub extensions: WireErrorExtensions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireErrorExtensions {
    pub code: Option<String>,
}

impl WireError {
    /// Classification code, or `UNKNOWN` when the service sent none.
    pub fn code(&self) -> &str {
        self.extensions.code.as_deref().unwrap_or("UNKNOWN")
    }

    #[cfg(test)]
    pub fn with_code(message: &str, code: &str) -> Self {
        Self {
            message: message.to_string(),
            extensions: WireErrorExtensions {
                code: Some(code.to_string()),
            },
        }
    }
}

/// One page of typed items plus its continuation state.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Opaque continuation cursor; absent on the final page.
    pub cursor: Option<String>,
    /// Total result count when the service reports one.
    pub total: Option<u64>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Map a payload field into a typed page.
///
/// The conventional envelope is `{ items: [...], pageInfo: { hasNextPage,
/// endCursor, total } }`. A bare array or single object is accepted as a
/// one-page result with no continuation cursor.
pub fn map_page<T: DeserializeOwned>(data: &Value, field: &str) -> Result<Page<T>, SuperOpsError> {
    let node = data
        .get(field)
        .ok_or_else(|| SuperOpsError::schema_mismatch(format!("data.{field}"), "field is missing"))?;

    match node {
        Value::Array(items) => Ok(Page {
            items: parse_items(items, field)?,
            cursor: None,
            total: None,
        }),
        Value::Object(object) => {
            if let Some(items_node) = object.get("items") {
                let items = items_node.as_array().ok_or_else(|| {
                    SuperOpsError::schema_mismatch(
                        format!("data.{field}.items"),
                        "expected an array",
                    )
                })?;
                let items = parse_items(items, field)?;
                let (cursor, total) = match object.get("pageInfo") {
                    Some(page_info) => parse_page_info(page_info, field)?,
                    None => (None, None),
                };
                Ok(Page { items, cursor, total })
            } else {
                // Envelope absent: a single object becomes a one-item page.
                let item = serde_json::from_value(node.clone()).map_err(|e| {
                    SuperOpsError::schema_mismatch(format!("data.{field}"), e.to_string())
                })?;
                Ok(Page {
                    items: vec![item],
                    cursor: None,
                    total: None,
                })
            }
        }
        _ => Err(SuperOpsError::schema_mismatch(
            format!("data.{field}"),
            format!("expected an object or array, got {}", type_name(node)),
        )),
    }
}

/// Map a payload field into a single typed record. `null` maps to `None` so
/// callers can raise their own not-found error.
pub fn map_single<T: DeserializeOwned>(
    data: &Value,
    field: &str,
) -> Result<Option<T>, SuperOpsError> {
    let node = data
        .get(field)
        .ok_or_else(|| SuperOpsError::schema_mismatch(format!("data.{field}"), "field is missing"))?;

    if node.is_null() {
        return Ok(None);
    }

    serde_json::from_value(node.clone())
        .map(Some)
        .map_err(|e| SuperOpsError::schema_mismatch(format!("data.{field}"), e.to_string()))
}

fn parse_items<T: DeserializeOwned>(items: &[Value], field: &str) -> Result<Vec<T>, SuperOpsError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item.clone()).map_err(|e| {
                SuperOpsError::schema_mismatch(format!("data.{field}.items[{i}]"), e.to_string())
            })
        })
        .collect()
}

fn parse_page_info(
    page_info: &Value,
    field: &str,
) -> Result<(Option<String>, Option<u64>), SuperOpsError> {
    let path = format!("data.{field}.pageInfo");
    let object = page_info
        .as_object()
        .ok_or_else(|| SuperOpsError::schema_mismatch(path.as_str(), "expected an object"))?;

    let has_next_page = object
        .get("hasNextPage")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            SuperOpsError::schema_mismatch(format!("{path}.hasNextPage"), "expected a boolean")
        })?;

    let total = object.get("total").and_then(Value::as_u64);

    if !has_next_page {
        return Ok((None, total));
    }

    let cursor = object
        .get("endCursor")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            SuperOpsError::schema_mismatch(
                format!("{path}.endCursor"),
                "hasNextPage is true but endCursor is missing",
            )
        })?;

    Ok((Some(cursor), total))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Ticket;
    use serde_json::json;

    fn ticket_payload(id: &str) -> Value {
        json!({
            "id": id,
            "title": "Printer down",
            "status": "OPEN",
            "priority": "NORMAL"
        })
    }

    #[test]
    fn test_map_page_with_envelope() {
        let data = json!({
            "tickets": {
                "items": [ticket_payload("T-1"), ticket_payload("T-2")],
                "pageInfo": {"hasNextPage": true, "endCursor": "abc", "total": 9}
            }
        });

        let page: Page<Ticket> = map_page(&data, "tickets").unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.cursor.as_deref(), Some("abc"));
        assert_eq!(page.total, Some(9));
        assert!(page.has_more());
    }

    #[test]
    fn test_map_final_page_has_no_cursor() {
        let data = json!({
            "tickets": {
                "items": [ticket_payload("T-3")],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }
        });

        let page: Page<Ticket> = map_page(&data, "tickets").unwrap();
        assert_eq!(page.len(), 1);
        assert!(page.cursor.is_none());
    }

    #[test]
    fn test_map_page_without_envelope() {
        let data = json!({"tickets": [ticket_payload("T-1")]});
        let page: Page<Ticket> = map_page(&data, "tickets").unwrap();
        assert_eq!(page.len(), 1);
        assert!(!page.has_more());
    }

    #[test]
    fn test_single_object_becomes_one_item_page() {
        let data = json!({"createTicket": ticket_payload("T-9")});
        let page: Page<Ticket> = map_page(&data, "createTicket").unwrap();
        assert_eq!(page.len(), 1);
        assert!(page.cursor.is_none());
    }

    #[test]
    fn test_missing_field_path_is_reported() {
        let data = json!({"other": []});
        let err = map_page::<Ticket>(&data, "tickets").unwrap_err();
        match err {
            SuperOpsError::SchemaMismatch { path, .. } => assert_eq!(path, "data.tickets"),
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_item_reports_index_path() {
        let data = json!({
            "tickets": {
                "items": [ticket_payload("T-1"), {"id": 42}],
                "pageInfo": {"hasNextPage": false}
            }
        });
        let err = map_page::<Ticket>(&data, "tickets").unwrap_err();
        match err {
            SuperOpsError::SchemaMismatch { path, .. } => {
                assert_eq!(path, "data.tickets.items[1]");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_date_is_schema_mismatch() {
        let mut payload = ticket_payload("T-1");
        payload["createdAt"] = json!("not-a-date");
        let data = json!({"ticket": payload});
        assert!(matches!(
            map_single::<Ticket>(&data, "ticket"),
            Err(SuperOpsError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_next_cursor_required_when_has_next() {
        let data = json!({
            "tickets": {
                "items": [],
                "pageInfo": {"hasNextPage": true}
            }
        });
        let err = map_page::<Ticket>(&data, "tickets").unwrap_err();
        match err {
            SuperOpsError::SchemaMismatch { path, .. } => {
                assert_eq!(path, "data.tickets.pageInfo.endCursor");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_map_single_null_is_none() {
        let data = json!({"ticket": null});
        let result: Option<Ticket> = map_single(&data, "ticket").unwrap();
        assert!(result.is_none());
    }
}
