use crate::executor::OrderClause;
use ::chrono::{DateTime, NaiveDateTime};
use ::derivative::Derivative;
use ::derive_more::{Deref, From};
use ::itertools::Itertools;
use ::serde_json::Value;
use ::std::sync::Arc;

/// Sort direction of a single key, matching the wire strings `"ASC"`/`"DESC"`.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Custom encoding of one sort-key value into its cursor representation.
pub type KeySerializer = Arc<dyn Fn(&Value) -> String + Send + Sync>;
/// Inverse of [`KeySerializer`], applied to the raw cursor field on decode.
pub type KeyDeserializer = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// One axis of a multi-key ordering: a field, its direction, and an
/// optional value codec applied when the key participates in a cursor.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
    #[derivative(Debug = "ignore")]
    pub serialize: Option<KeySerializer>,
    #[derivative(Debug = "ignore")]
    pub deserialize: Option<KeyDeserializer>,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
            serialize: None,
            deserialize: None,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Key over a datetime column stored as ISO-8601 text, carried in
    /// cursors as epoch microseconds. Values that fail to parse pass
    /// through unchanged.
    pub fn datetime(field: impl Into<String>) -> Self {
        Self::asc(field)
            .serialize_with(|value| {
                match value
                    .as_str()
                    .and_then(|s| s.parse::<NaiveDateTime>().ok())
                {
                    Some(dt) => dt.and_utc().timestamp_micros().to_string(),
                    None => crate::cursor::raw_value_string(value),
                }
            })
            .deserialize_with(|raw| {
                match raw
                    .parse::<i64>()
                    .ok()
                    .and_then(DateTime::from_timestamp_micros)
                {
                    Some(dt) => Value::String(
                        dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
                    ),
                    None => Value::String(raw.to_owned()),
                }
            })
    }

    pub fn serialize_with(
        mut self,
        serialize: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Some(Arc::new(serialize));
        self
    }

    pub fn deserialize_with(
        mut self,
        deserialize: impl Fn(&str) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.deserialize = Some(Arc::new(deserialize));
        self
    }

    pub fn is_ascending(&self) -> bool {
        self.direction != SortDirection::Desc
    }
}

/// Declarative form of [`SortKey`]; custom codecs attach programmatically.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SortKeyDef {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Raw sort declaration as callers supply it: a bare field name, a single
/// descriptor, or a list mixing either form.
#[derive(Clone, Debug, Deserialize, From, Serialize)]
#[serde(untagged)]
pub enum OrderBy {
    Field(String),
    Key(SortKeyDef),
    List(Vec<OrderByItem>),
}

#[derive(Clone, Debug, Deserialize, From, Serialize)]
#[serde(untagged)]
pub enum OrderByItem {
    Field(String),
    Key(SortKeyDef),
}

/// The full ordered list of sort keys defining a total order over rows.
/// Normalized once per pagination call and never mutated afterwards.
#[derive(Clone, Debug, Default, Deref)]
pub struct OrderSpec(Vec<SortKey>);

impl OrderSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    /// Executor order clauses for a scan in the given direction; every
    /// key's effective direction flips when scanning backward.
    pub fn clauses(&self, ascending_scan: bool) -> Vec<OrderClause> {
        self.0
            .iter()
            .map(|key| OrderClause {
                field: key.field.clone(),
                ascending: key.is_ascending() == ascending_scan,
            })
            .collect_vec()
    }
}

impl From<SortKeyDef> for SortKey {
    fn from(def: SortKeyDef) -> Self {
        Self::new(def.field, def.direction)
    }
}

impl From<OrderByItem> for SortKey {
    fn from(item: OrderByItem) -> Self {
        match item {
            OrderByItem::Field(field) => Self::asc(field),
            OrderByItem::Key(def) => def.into(),
        }
    }
}

impl From<&str> for SortKey {
    fn from(field: &str) -> Self {
        Self::asc(field)
    }
}

impl From<OrderBy> for OrderSpec {
    fn from(order_by: OrderBy) -> Self {
        match order_by {
            OrderBy::Field(field) => Self(vec![SortKey::asc(field)]),
            OrderBy::Key(def) => Self(vec![def.into()]),
            OrderBy::List(items) => Self(items.into_iter().map_into().collect_vec()),
        }
    }
}

impl From<SortKey> for OrderSpec {
    fn from(key: SortKey) -> Self {
        Self(vec![key])
    }
}

impl From<Vec<SortKey>> for OrderSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }
}

impl From<&str> for OrderSpec {
    fn from(field: &str) -> Self {
        Self(vec![SortKey::asc(field)])
    }
}

impl From<String> for OrderSpec {
    fn from(field: String) -> Self {
        Self(vec![SortKey::asc(field)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::serde_json::json;

    #[test]
    fn bare_field_name_defaults_ascending() {
        let order = OrderSpec::from("id");
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].field, "id");
        assert!(order[0].is_ascending());
    }

    #[test]
    fn descriptor_direction_is_honored() {
        let order: OrderSpec = OrderBy::Key(SortKeyDef {
            field: "id".into(),
            direction: SortDirection::Desc,
        })
        .into();
        assert!(!order[0].is_ascending());
    }

    #[test]
    fn mixed_list_normalizes_in_declaration_order() {
        let order_by: OrderBy = serde_json::from_value(json!([
            "field",
            { "field": "id", "direction": "DESC" },
        ]))
        .unwrap();
        let order = OrderSpec::from(order_by);
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].field, "field");
        assert!(order[0].is_ascending());
        assert_eq!(order[1].field, "id");
        assert!(!order[1].is_ascending());
    }

    #[test]
    fn descriptor_without_direction_deserializes_ascending() {
        let order_by: OrderBy = serde_json::from_value(json!({ "field": "id" })).unwrap();
        let order = OrderSpec::from(order_by);
        assert!(order[0].is_ascending());
    }

    #[test]
    fn clauses_flip_every_key_on_backward_scan() {
        let order = OrderSpec::from(vec![SortKey::asc("field"), SortKey::desc("id")]);
        let forward = order.clauses(true);
        assert!(forward[0].ascending);
        assert!(!forward[1].ascending);
        let backward = order.clauses(false);
        assert!(!backward[0].ascending);
        assert!(backward[1].ascending);
    }

    #[test]
    fn datetime_key_round_trips_through_micros() {
        let key = SortKey::datetime("created_at");
        let serialize = key.serialize.as_ref().unwrap();
        let deserialize = key.deserialize.as_ref().unwrap();
        let raw = serialize(&json!("2023-01-02T03:04:05"));
        assert_eq!(raw, "1672628645000000");
        assert_eq!(deserialize(&raw), json!("2023-01-02T03:04:05"));
    }
}
