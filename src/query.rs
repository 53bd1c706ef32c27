//! Query-string flattening and merging
//!
//! HAFAS REST endpoints read nested parameters as dotted key paths
//! (`from.latitude=52.52`), not bracket notation. This module flattens
//! arbitrary JSON parameter maps into that dialect and appends them
//! behind a URL's already-embedded query pairs.

use serde_json::{Map, Value};
use url::Url;

/// Ordered query-parameter map.
///
/// Insertion order is preserved (`serde_json` with `preserve_order`) and
/// carries through to the encoded query string.
pub type Query = Map<String, Value>;

/// Merge `query` into the URL's query string.
///
/// The URL's existing pairs keep their original order and come first;
/// the flattened `query` entries follow in map iteration order. Entries
/// with the same key are kept side by side, never deduplicated.
pub(crate) fn merge_into_url(url: &mut Url, query: &Query) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for (key, value) in query {
        append_flattened(&mut pairs, key, value);
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }
}

/// Flatten a single parameter into `pairs`.
///
/// Objects recurse with dotted key paths, arrays repeat the key per
/// element, `null` values are dropped.
pub(crate) fn append_flattened(pairs: &mut Vec<(String, String)>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key.to_owned(), b.to_string())),
        Value::Number(n) => pairs.push((key.to_owned(), n.to_string())),
        Value::String(s) => pairs.push((key.to_owned(), s.clone())),
        Value::Array(items) => {
            for item in items {
                append_flattened(pairs, key, item);
            }
        }
        Value::Object(fields) => {
            for (name, nested) in fields {
                append_flattened(pairs, &format!("{key}.{name}"), nested);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn query_of(value: Value) -> Query {
        match value {
            Value::Object(fields) => fields,
            other => panic!("expected object, got {other}"),
        }
    }

    fn flattened(value: Value) -> Vec<(String, String)> {
        let mut url = Url::parse("https://example.test/x").unwrap();
        merge_into_url(&mut url, &query_of(value));
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_scalars() {
        let pairs = flattened(json!({"query": "alexanderplatz", "results": 5, "fuzzy": true}));
        assert_eq!(
            pairs,
            vec![
                ("query".to_owned(), "alexanderplatz".to_owned()),
                ("results".to_owned(), "5".to_owned()),
                ("fuzzy".to_owned(), "true".to_owned()),
            ]
        );
    }

    #[test]
    fn test_nested_objects_use_dotted_paths() {
        let pairs = flattened(json!({
            "from": {"latitude": 52.52, "longitude": 13.41},
            "to": "900100003",
        }));
        assert_eq!(
            pairs,
            vec![
                ("from.latitude".to_owned(), "52.52".to_owned()),
                ("from.longitude".to_owned(), "13.41".to_owned()),
                ("to".to_owned(), "900100003".to_owned()),
            ]
        );
    }

    #[test]
    fn test_deeply_nested_paths() {
        let pairs = flattened(json!({"a": {"b": {"c": 1}}}));
        assert_eq!(pairs, vec![("a.b.c".to_owned(), "1".to_owned())]);
    }

    #[test]
    fn test_arrays_repeat_the_key() {
        let pairs = flattened(json!({"id": ["1", "2", "3"]}));
        assert_eq!(
            pairs,
            vec![
                ("id".to_owned(), "1".to_owned()),
                ("id".to_owned(), "2".to_owned()),
                ("id".to_owned(), "3".to_owned()),
            ]
        );
    }

    #[test]
    fn test_null_values_are_dropped() {
        let pairs = flattened(json!({"a": null, "b": "x"}));
        assert_eq!(pairs, vec![("b".to_owned(), "x".to_owned())]);
    }

    #[test]
    fn test_embedded_pairs_come_first_and_survive() {
        let mut url = Url::parse("https://example.test/locations?poi=false&stops=true").unwrap();
        merge_into_url(&mut url, &query_of(json!({"query": "alex"})));
        assert_eq!(url.query(), Some("poi=false&stops=true&query=alex"));
    }

    #[test]
    fn test_duplicate_keys_are_not_deduplicated() {
        let mut url = Url::parse("https://example.test/x?results=1").unwrap();
        merge_into_url(&mut url, &query_of(json!({"results": 2})));
        assert_eq!(url.query(), Some("results=1&results=2"));
    }

    #[test]
    fn test_empty_query_leaves_url_untouched() {
        let mut url = Url::parse("https://example.test/stops/123").unwrap();
        merge_into_url(&mut url, &Query::new());
        assert_eq!(url.as_str(), "https://example.test/stops/123");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let mut url = Url::parse("https://example.test/locations").unwrap();
        merge_into_url(&mut url, &query_of(json!({"query": "s+u bahnhof"})));
        assert_eq!(url.query(), Some("query=s%2Bu+bahnhof"));
    }
}
