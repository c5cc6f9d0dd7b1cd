//! Field normalization from raw feedback payloads.
//!
//! The remote API is loose about its payloads: fields go missing, nested
//! records come back null, numbers arrive as strings. [`normalize`] maps
//! whatever arrives into one canonical shape with type-correct defaults so
//! a malformed record can never abort a batch.

use serde_json::Value;
use wb_api::{extract_photo_links, id_as_string, RawReview};

/// Placeholder the marketplace inserts for an empty pros/cons field.
pub const NOT_SPECIFIED: &str = "не указаны";

/// Canonical in-memory review shape; every field always populated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedReview {
    pub source_id: String,
    pub stars: i64,
    pub comment: String,
    pub pros: String,
    pub cons: String,
    pub has_photos: bool,
    pub photo_urls: Vec<String>,
    pub answered: bool,
    pub response: String,
    pub product_name: String,
    pub product_id: String,
    pub supplier_article: String,
    pub subject_name: String,
}

impl NormalizedReview {
    /// Photo URL list serialized for storage; `"[]"` when none.
    pub fn photo_urls_json(&self) -> String {
        serde_json::to_string(&self.photo_urls).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Map one raw feedback into the canonical shape.
///
/// Total: absent, null, or oddly-typed source fields become safe defaults
/// (`""`, `0`, `false`, empty list), never an error.
pub fn normalize(raw: &RawReview) -> NormalizedReview {
    let photo_urls = extract_photo_links(raw);
    let product = raw.get("productDetails");

    NormalizedReview {
        source_id: raw.get("id").map(id_as_string).unwrap_or_default(),
        stars: int_field(raw.get("productValuation")),
        comment: text_field(raw.get("text")),
        pros: text_field(raw.get("pros")),
        cons: text_field(raw.get("cons")),
        has_photos: !photo_urls.is_empty(),
        answered: raw
            .get("isAnswered")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        response: text_field(raw.get("answer").and_then(|a| a.get("text"))),
        product_name: text_field(product.and_then(|p| p.get("productName"))),
        product_id: product
            .and_then(|p| p.get("nmId"))
            .map(id_as_string)
            .unwrap_or_default(),
        supplier_article: text_field(product.and_then(|p| p.get("supplierArticle"))),
        subject_name: text_field(raw.get("subjectName")),
        photo_urls,
    }
}

/// Whether a normalized review carries anything worth persisting.
///
/// Reviews whose only content is the marketplace's "not specified"
/// placeholder are noise and contribute nothing to reply workflows.
pub fn has_content(review: &NormalizedReview) -> bool {
    !review.comment.trim().is_empty()
        || is_substantive(&review.pros)
        || is_substantive(&review.cons)
        || review.has_photos
}

/// Non-blank and not the "not specified" placeholder, case-insensitively.
pub fn is_substantive(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.to_lowercase() != NOT_SPECIFIED
}

fn text_field(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn int_field(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_complete_payload() {
        let raw = json!({
            "id": "fb-1",
            "productValuation": 4,
            "text": "Хорошая кружка",
            "pros": "качество",
            "cons": "цена",
            "isAnswered": true,
            "answer": {"text": "Спасибо!"},
            "photoLinks": [{"fullSize": "https://img/1.jpg"}],
            "productDetails": {
                "productName": "Кружка",
                "nmId": 1234567,
                "supplierArticle": "MUG-01"
            },
            "subjectName": "Посуда"
        });

        let n = normalize(&raw);
        assert_eq!(n.source_id, "fb-1");
        assert_eq!(n.stars, 4);
        assert_eq!(n.comment, "Хорошая кружка");
        assert_eq!(n.pros, "качество");
        assert_eq!(n.cons, "цена");
        assert!(n.has_photos);
        assert_eq!(n.photo_urls, vec!["https://img/1.jpg"]);
        assert_eq!(n.photo_urls_json(), r#"["https://img/1.jpg"]"#);
        assert!(n.answered);
        assert_eq!(n.response, "Спасибо!");
        assert_eq!(n.product_name, "Кружка");
        assert_eq!(n.product_id, "1234567");
        assert_eq!(n.supplier_article, "MUG-01");
        assert_eq!(n.subject_name, "Посуда");
    }

    #[test]
    fn total_on_malformed_input() {
        // Missing keys, null nested records, non-list photo field:
        // every field still lands type-correct.
        for raw in [
            json!({}),
            json!({"id": null, "answer": null, "productDetails": null}),
            json!({"productValuation": "not a number", "photoLinks": 42}),
            json!({"text": 17, "pros": null, "productDetails": "oops"}),
            json!([1, 2, 3]),
        ] {
            let n = normalize(&raw);
            assert_eq!(n.stars, 0);
            assert_eq!(n.comment, "");
            assert_eq!(n.pros, "");
            assert!(!n.has_photos);
            assert!(n.photo_urls.is_empty());
            assert!(!n.answered);
            assert_eq!(n.response, "");
            assert_eq!(n.photo_urls_json(), "[]");
        }
    }

    #[test]
    fn numeric_fields_coerced() {
        let n = normalize(&json!({"id": 555, "productValuation": "5"}));
        assert_eq!(n.source_id, "555");
        assert_eq!(n.stars, 5);
    }

    #[test]
    fn answer_record_must_be_object() {
        let n = normalize(&json!({"answer": "Спасибо!"}));
        assert_eq!(n.response, "");
    }

    #[test]
    fn content_filter_drops_placeholder_only_reviews() {
        let noise = NormalizedReview {
            pros: "не указаны".to_string(),
            ..Default::default()
        };
        assert!(!has_content(&noise));

        let noise_upper = NormalizedReview {
            pros: "Не указаны".to_string(),
            cons: "НЕ УКАЗАНЫ".to_string(),
            ..Default::default()
        };
        assert!(!has_content(&noise_upper));

        assert!(!has_content(&NormalizedReview::default()));
    }

    #[test]
    fn content_filter_keeps_substantive_reviews() {
        assert!(has_content(&NormalizedReview {
            comment: "Отлично".to_string(),
            ..Default::default()
        }));
        assert!(has_content(&NormalizedReview {
            cons: "плохая упаковка".to_string(),
            ..Default::default()
        }));
        assert!(has_content(&NormalizedReview {
            has_photos: true,
            ..Default::default()
        }));
    }
}
