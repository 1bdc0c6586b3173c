use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::errors::StoreError;

/// A stored document. Every document carries a string `_id`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

pub fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(Value::as_str)
}

/// Serialize a value into a document; the value must serialize as an object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

pub fn from_document<T: for<'de> Deserialize<'de>>(document: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn direction(self) -> i8 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// Conjunction of equality conditions. A condition on an array field matches
/// when the array contains the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::empty().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub(crate) fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            match document.get(field) {
                Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
                Some(actual) => actual == expected,
                None => expected.is_null(),
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Option<(String, SortOrder)>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn sorted_by(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            sort: Some((field.into(), order)),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionOptions {
    /// A `$jsonSchema` validator applied on insert and replace.
    pub validator: Option<Value>,
}

impl CollectionOptions {
    pub fn with_validator(validator: Value) -> Self {
        Self {
            validator: Some(validator),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexModel {
    pub name: String,
    pub keys: Vec<(String, SortOrder)>,
    pub unique: bool,
}

impl IndexModel {
    pub fn ascending(field: &str) -> Self {
        Self::on(vec![(field.to_string(), SortOrder::Ascending)])
    }

    pub fn descending(field: &str) -> Self {
        Self::on(vec![(field.to_string(), SortOrder::Descending)])
    }

    pub fn on(keys: Vec<(String, SortOrder)>) -> Self {
        // Same naming scheme as MongoDB: field_1, field_-1, joined with '_'
        let name = keys
            .iter()
            .map(|(field, order)| format!("{}_{}", field, order.direction()))
            .collect::<Vec<_>>()
            .join("_");
        Self {
            name,
            keys,
            unique: false,
        }
    }

    pub fn then_ascending(self, field: &str) -> Self {
        let mut keys = self.keys;
        keys.push((field.to_string(), SortOrder::Ascending));
        Self {
            unique: self.unique,
            ..Self::on(keys)
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub(crate) fn key_of(&self, document: &Document) -> Vec<Value> {
        self.keys
            .iter()
            .map(|(field, _)| document.get(field).cloned().unwrap_or(Value::Null))
            .collect()
    }

    pub(crate) fn same_spec(&self, other: &IndexModel) -> bool {
        self.keys == other.keys && self.unique == other.unique
    }
}

/// Total order over JSON values used for sorting: null < bool < number < string.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        // Timestamps carry a variable number of fractional digits, so two
        // RFC 3339 strings compare as instants; anything else is ordinal
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        _ => rank(a).cmp(&rank(b)),
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    // Cheap shape check first; versions and names never start like a date
    let bytes = text.as_bytes();
    if bytes.len() < 20 || bytes[4] != b'-' || bytes[10] != b'T' {
        return None;
    }
    DateTime::parse_from_rfc3339(text).ok()
}

/// Filter, sort, skip and limit an ordered sequence of documents.
pub(crate) fn apply_find<I>(documents: I, filter: &Filter, options: &FindOptions) -> Vec<Document>
where
    I: IntoIterator<Item = Document>,
{
    let mut matched: Vec<Document> = documents
        .into_iter()
        .filter(|document| filter.matches(document))
        .collect();

    if let Some((field, order)) = &options.sort {
        // Stable sort keeps insertion order among equal keys
        matched.sort_by(|a, b| {
            let null = Value::Null;
            let ordering = compare_values(a.get(field).unwrap_or(&null), b.get(field).unwrap_or(&null));
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    let limit = options.limit.unwrap_or(usize::MAX);
    matched.into_iter().skip(options.skip).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn filter_matches_scalars_and_array_members() {
        let post = doc(json!({"_id": "p1", "authorId": "u1", "hashtags": ["rust", "db"]}));

        assert!(Filter::empty().matches(&post));
        assert!(Filter::eq("authorId", "u1").matches(&post));
        assert!(Filter::eq("hashtags", "rust").matches(&post));
        assert!(!Filter::eq("hashtags", "go").matches(&post));
        assert!(!Filter::eq("authorId", "u1").and("_id", "p2").matches(&post));
        assert!(Filter::eq("parentCommentId", Value::Null).matches(&post));
    }

    #[test]
    fn timestamps_sort_by_instant_regardless_of_precision() {
        use chrono::{TimeZone, Utc};

        let earlier = Utc.timestamp_opt(1_700_000_000, 100_000_000).unwrap();
        let later = Utc.timestamp_opt(1_700_000_000, 100_500_000).unwrap();
        let whole_second = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let docs = vec![
            doc(json!({"_id": "later", "createdAt": later})),
            doc(json!({"_id": "earlier", "createdAt": earlier})),
            doc(json!({"_id": "whole", "createdAt": whole_second})),
        ];

        let ascending = apply_find(
            docs.clone(),
            &Filter::empty(),
            &FindOptions::sorted_by("createdAt", SortOrder::Ascending),
        );
        let ids: Vec<&str> = ascending.iter().filter_map(document_id).collect();
        assert_eq!(ids, vec!["whole", "earlier", "later"]);

        let newest = apply_find(
            docs,
            &Filter::empty(),
            &FindOptions::sorted_by("createdAt", SortOrder::Descending).with_limit(1),
        );
        assert_eq!(document_id(&newest[0]), Some("later"));
    }

    #[test]
    fn versions_sort_lexically() {
        let docs = ["010", "002", "001", "2"]
            .iter()
            .map(|v| doc(json!({ "version": v })))
            .collect::<Vec<_>>();

        let sorted = apply_find(docs, &Filter::empty(), &FindOptions::sorted_by("version", SortOrder::Ascending));
        let versions: Vec<&str> = sorted.iter().map(|d| d["version"].as_str().unwrap()).collect();
        assert_eq!(versions, vec!["001", "002", "010", "2"]);
    }

    #[test]
    fn skip_and_limit_apply_after_sorting() {
        let docs = (1..=5).map(|n| doc(json!({ "n": n }))).collect::<Vec<_>>();
        let options = FindOptions::sorted_by("n", SortOrder::Descending)
            .with_skip(1)
            .with_limit(2);

        let page = apply_find(docs, &Filter::empty(), &options);
        let values: Vec<i64> = page.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(values, vec![4, 3]);
    }

    #[test]
    fn index_names_follow_key_spec() {
        assert_eq!(IndexModel::ascending("username").name, "username_1");
        assert_eq!(IndexModel::descending("createdAt").name, "createdAt_-1");

        let compound = IndexModel::ascending("followerId")
            .then_ascending("followeeId")
            .unique();
        assert_eq!(compound.name, "followerId_1_followeeId_1");
        assert!(compound.unique);
    }
}
