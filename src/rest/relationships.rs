//! Relationship payloads and resource path segments.

use serde_json::{json, Map, Value};

/// Converts a resource type to its snake_case form (`main-image` → `main_image`).
#[must_use]
pub fn underscore(resource_type: &str) -> String {
    let mut out = String::with_capacity(resource_type.len() + 4);
    let mut prev_lower = false;
    for c in resource_type.chars() {
        if c == '-' || c == ' ' {
            out.push('_');
            prev_lower = false;
        } else if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Returns the URL segment for a relationship type.
///
/// Types are pluralized, except `main-image` which is a singular relationship.
///
/// ```rust
/// use elasticpath::rest::format_url_resource;
///
/// assert_eq!(format_url_resource("product"), "products");
/// assert_eq!(format_url_resource("products"), "products");
/// assert_eq!(format_url_resource("category"), "categories");
/// assert_eq!(format_url_resource("main-image"), "main-image");
/// ```
#[must_use]
pub fn format_url_resource(resource_type: &str) -> String {
    if resource_type == "main-image" {
        return resource_type.to_string();
    }
    pluralize(resource_type)
}

fn pluralize(word: &str) -> String {
    const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

    if word.is_empty() || word.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(VOWELS) {
            return format!("{stem}ies");
        }
    }
    if word.ends_with("ch") || word.ends_with("sh") || word.ends_with('x') || word.ends_with('z') {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Builds the `data` array for a relationship request.
///
/// `ids` may be a single ID string, an array of ID strings, or an array of
/// objects (merged with the `type` key). Anything else, including `null`, an
/// empty string or a bare number, produces an empty list.
///
/// ```rust
/// use elasticpath::rest::build_relationship_data;
/// use serde_json::json;
///
/// assert_eq!(
///     build_relationship_data("category", &json!(["a", {"id": "b", "meta": 1}])),
///     vec![
///         json!({"type": "category", "id": "a"}),
///         json!({"type": "category", "id": "b", "meta": 1}),
///     ]
/// );
/// ```
#[must_use]
pub fn build_relationship_data(resource_type: &str, ids: &Value) -> Vec<Value> {
    let kind = underscore(resource_type);

    let entry = |item: &Value| match item {
        Value::Object(fields) => {
            let mut merged = Map::new();
            merged.insert("type".to_string(), Value::String(kind.clone()));
            merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            Value::Object(merged)
        }
        other => json!({"type": kind, "id": other}),
    };

    match ids {
        Value::String(id) if !id.is_empty() => vec![entry(ids)],
        Value::Array(items) => items.iter().map(entry).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("main-image"), "main_image");
        assert_eq!(underscore("customerAddress"), "customer_address");
        assert_eq!(underscore("product"), "product");
    }

    #[test]
    fn test_pluralize_rules() {
        assert_eq!(format_url_resource("file"), "files");
        assert_eq!(format_url_resource("key"), "keys");
        assert_eq!(format_url_resource("category"), "categories");
        assert_eq!(format_url_resource("match"), "matches");
        assert_eq!(format_url_resource("tags"), "tags");
    }

    #[test]
    fn test_single_id_string() {
        assert_eq!(
            build_relationship_data("main-image", &json!("img-1")),
            vec![json!({"type": "main_image", "id": "img-1"})]
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(build_relationship_data("category", &Value::Null).is_empty());
        assert!(build_relationship_data("category", &json!([])).is_empty());
        assert!(build_relationship_data("category", &json!("")).is_empty());
    }

    #[test]
    fn test_non_string_scalars_are_ignored() {
        assert!(build_relationship_data("category", &json!(5)).is_empty());
        assert!(build_relationship_data("category", &json!(true)).is_empty());
        assert!(build_relationship_data("category", &json!({"id": "c1"})).is_empty());
    }

    #[test]
    fn test_object_items_keep_their_fields() {
        let data = build_relationship_data("product", &json!([{"id": "p1", "quantity": 2}]));
        assert_eq!(data, vec![json!({"type": "product", "id": "p1", "quantity": 2})]);
    }
}
