use crate::filter::Filter;
use ::serde_json::{Map, Value};
use ::std::collections::{BTreeMap, HashMap};

/// One `ORDER BY` element as handed to the executor, its direction already
/// resolved for the scan.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct OrderClause {
    pub field: String,
    pub ascending: bool,
}

/// A single filter+order+limit query against the backing store.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SelectQuery {
    pub filter: Option<Filter>,
    pub order: Vec<OrderClause>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Rows matching a query, plus the count of all rows matching its filter
/// with `limit`/`offset` ignored.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet<R> {
    pub results: Vec<R>,
    pub result_count: u64,
}

/// The backing-store boundary.
///
/// Implementations must support AND/OR composition of equality and
/// inequality predicates over named fields, multi-key ordering, and the
/// limit-independent match count. Statement building, parameter escaping
/// and connection handling all live behind this trait; failures surface
/// verbatim through the engine.
pub trait QueryExecutor {
    type Row;
    type Error: ::std::error::Error;

    fn execute(&self, query: SelectQuery) -> Result<ResultSet<Self::Row>, Self::Error>;
}

/// Named sort-key access into a row, used when encoding edge cursors.
pub trait Record {
    fn sort_value(&self, field: &str) -> Option<Value>;
}

impl Record for Value {
    fn sort_value(&self, field: &str) -> Option<Value> {
        self.as_object().and_then(|object| object.get(field)).cloned()
    }
}

impl Record for Map<String, Value> {
    fn sort_value(&self, field: &str) -> Option<Value> {
        self.get(field).cloned()
    }
}

impl Record for HashMap<String, Value> {
    fn sort_value(&self, field: &str) -> Option<Value> {
        self.get(field).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn sort_value(&self, field: &str) -> Option<Value> {
        self.get(field).cloned()
    }
}
