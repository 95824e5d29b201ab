use crate::order::OrderSpec;
use ::derive_more::IsVariant;
use ::serde_json::Value;

/// Comparison operator on a named field.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

/// Filter predicate over named fields: comparisons composed with AND/OR.
///
/// The engine never evaluates filters itself; they are handed to the
/// Query Executor as-is.
#[derive(Clone, Debug, Deserialize, IsVariant, PartialEq, Serialize)]
pub enum Filter {
    Cmp {
        field: String,
        op: CmpOp,
        value: Value,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn cmp(field: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Self {
        Self::Cmp {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Gt, value)
    }

    pub fn gt_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::GtEq, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Lt, value)
    }

    pub fn lt_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::LtEq, value)
    }

    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut filters) => {
                filters.push(other);
                Self::And(filters)
            }
            _ => Self::And(vec![self, other]),
        }
    }

    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut filters) => {
                filters.push(other);
                Self::Or(filters)
            }
            _ => Self::Or(vec![self, other]),
        }
    }
}

/// Which side of the cursor tuple a keyset window selects, in ascending
/// presentation order and independent of each key's own direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeysetBound {
    After,
    Before,
}

/// Build the compound inequality selecting rows strictly after/before
/// `tuple` in the order defined by `order`.
///
/// One disjunct per prefix length, shortest first: equality on the keys
/// preceding the point of divergence, then a strict comparison on the
/// divergent key. The comparator is `>` exactly when the key's own
/// direction agrees with the bound, `<` otherwise.
///
/// `tuple` must be aligned to `order`; [`crate::decode_cursor`] guarantees
/// that for cursor-derived tuples.
pub fn keyset_filter(order: &OrderSpec, tuple: &[Value], bound: KeysetBound) -> Filter {
    debug_assert_eq!(order.len(), tuple.len());
    let is_greater_than = bound == KeysetBound::After;

    let mut disjuncts = Vec::with_capacity(tuple.len());
    for pivot in 0..tuple.len() {
        let mut conjuncts = Vec::with_capacity(pivot + 1);
        for i in 0..pivot {
            conjuncts.push(Filter::eq(&*order[i].field, tuple[i].clone()));
        }
        let op = if order[pivot].is_ascending() == is_greater_than {
            CmpOp::Gt
        } else {
            CmpOp::Lt
        };
        conjuncts.push(Filter::cmp(&*order[pivot].field, op, tuple[pivot].clone()));
        disjuncts.push(match conjuncts.len() {
            1 => conjuncts.pop().unwrap(),
            _ => Filter::And(conjuncts),
        });
    }

    match disjuncts.len() {
        1 => disjuncts.pop().unwrap(),
        _ => Filter::Or(disjuncts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::SortKey;
    use ::serde_json::json;

    #[test]
    fn single_ascending_key_after_is_greater_than() {
        let order = OrderSpec::from("id");
        let filter = keyset_filter(&order, &[json!("1")], KeysetBound::After);
        assert_eq!(filter, Filter::gt("id", json!("1")));
    }

    #[test]
    fn single_ascending_key_before_is_less_than() {
        let order = OrderSpec::from("id");
        let filter = keyset_filter(&order, &[json!("3")], KeysetBound::Before);
        assert_eq!(filter, Filter::lt("id", json!("3")));
    }

    #[test]
    fn descending_key_inverts_the_comparator() {
        let order = OrderSpec::from(SortKey::desc("id"));
        let filter = keyset_filter(&order, &[json!("2")], KeysetBound::After);
        assert_eq!(filter, Filter::lt("id", json!("2")));
        let filter = keyset_filter(&order, &[json!("2")], KeysetBound::Before);
        assert_eq!(filter, Filter::gt("id", json!("2")));
    }

    #[test]
    fn compound_key_yields_one_disjunct_per_prefix() {
        let order = OrderSpec::from(vec![
            SortKey::asc("a"),
            SortKey::desc("b"),
            SortKey::asc("c"),
        ]);
        let filter = keyset_filter(
            &order,
            &[json!("1"), json!("2"), json!("3")],
            KeysetBound::After,
        );
        assert_eq!(
            filter,
            Filter::Or(vec![
                Filter::gt("a", json!("1")),
                Filter::And(vec![
                    Filter::eq("a", json!("1")),
                    Filter::lt("b", json!("2")),
                ]),
                Filter::And(vec![
                    Filter::eq("a", json!("1")),
                    Filter::eq("b", json!("2")),
                    Filter::gt("c", json!("3")),
                ]),
            ])
        );
    }

    #[test]
    fn and_flattens_left_chains() {
        let filter = Filter::eq("a", 1).and(Filter::eq("b", 2)).and(Filter::eq("c", 3));
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::eq("a", 1),
                Filter::eq("b", 2),
                Filter::eq("c", 3),
            ])
        );
    }
}
