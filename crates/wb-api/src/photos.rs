//! Photo link extraction from raw feedback payloads.

use serde_json::Value;

use crate::types::RawReview;

/// Extract photo URLs from a raw feedback.
///
/// The API has served the `photoLinks` field in three shapes over time:
/// a list of `{fullSize, miniSize}` objects (prefer `fullSize`, fall back
/// to `miniSize`), a flat list of URL strings, or a JSON-encoded string of
/// either. Unrecognized or empty shapes yield an empty list.
pub fn extract_photo_links(raw: &RawReview) -> Vec<String> {
    match raw.get("photoLinks") {
        Some(links) => links_from_value(links, false),
        None => Vec::new(),
    }
}

fn links_from_value(links: &Value, decoded: bool) -> Vec<String> {
    match links {
        Value::Array(items) => items.iter().filter_map(link_from_item).collect(),
        // A JSON-encoded string of either list shape; decode and re-examine once.
        Value::String(s) if !decoded => match serde_json::from_str::<Value>(s) {
            Ok(inner) => links_from_value(&inner, true),
            Err(_) => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn link_from_item(item: &Value) -> Option<String> {
    match item {
        Value::String(url) => Some(url.clone()),
        Value::Object(fields) => fields
            .get("fullSize")
            .or_else(|| fields.get("miniSize"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
