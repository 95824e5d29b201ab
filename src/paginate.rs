use crate::cursor::{decode_cursor, encode_cursor, Cursor, CursorError};
use crate::env::pagination_max_count;
use crate::executor::{QueryExecutor, Record, ResultSet, SelectQuery};
use crate::filter::{keyset_filter, Filter, KeysetBound};
use crate::offset::paginate_offset;
use crate::order::OrderSpec;
use crate::Page;
use ::thiserror::Error;
use ::tracing::debug;

#[cfg(feature = "async-graphql-4")]
use async_graphql_4 as async_graphql;
#[cfg(feature = "async-graphql-5")]
use async_graphql_5 as async_graphql;
#[cfg(feature = "async-graphql-6")]
use async_graphql_6 as async_graphql;

#[derive(Debug, Error)]
pub enum PageError<E: ::std::error::Error> {
    /// Failure from the Query Executor, surfaced verbatim.
    #[error("query executor error: {0}")]
    Executor(E),
    #[error(transparent)]
    Cursor(#[from] CursorError),
    #[error("page count {count} is too large, must be less than or equal to {max}")]
    CountTooLarge { count: u32, max: u32 },
    #[error("pagination requires a non-empty order spec")]
    EmptyOrderBy,
}

/// A cursor-window pagination request.
///
/// `first` bounds the window from the front and `last` from the back; both
/// may be supplied, in which case `first` bounds the fetch and `last`
/// trims the fetched page. `after`/`before` are exclusive cursors and may
/// also be combined, narrowing the window to rows strictly between them.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(
    any(
        feature = "async-graphql-4",
        feature = "async-graphql-5",
        feature = "async-graphql-6"
    ),
    derive(async_graphql::InputObject)
)]
pub struct PageRequest {
    #[cfg_attr(
        any(
            feature = "async-graphql-4",
            feature = "async-graphql-5",
            feature = "async-graphql-6"
        ),
        graphql(validator(custom = "crate::GraphqlPaginationCountValidator"))
    )]
    pub first: Option<u32>,
    #[cfg_attr(
        any(
            feature = "async-graphql-4",
            feature = "async-graphql-5",
            feature = "async-graphql-6"
        ),
        graphql(validator(custom = "crate::GraphqlPaginationCountValidator"))
    )]
    pub last: Option<u32>,
    pub after: Option<Cursor>,
    pub before: Option<Cursor>,
}

/// Forward/backward page indicators.
///
/// Both flags derive from the count of rows in the directional window
/// (rows matching the cursor predicates), not from a probe of the
/// opposite direction: `has_next_page` is only meaningful when `first`
/// was requested, `has_previous_page` only when `last` was.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(
    any(
        feature = "async-graphql-4",
        feature = "async-graphql-5",
        feature = "async-graphql-6"
    ),
    derive(async_graphql::SimpleObject)
)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// One row of a connection, with its position under the active order spec.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Edge<R> {
    pub node: R,
    pub cursor: Cursor,
}

/// A connection-style pagination result.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<R> {
    pub result_count: u64,
    pub page_info: PageInfo,
    pub edges: Vec<Edge<R>>,
}

/// Result of a [`Page`] request: a cursor connection or an offset page.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paged<R> {
    Cursor(Connection<R>),
    Offset(crate::offset::OffsetResult<R>),
}

impl<R> Paged<R> {
    pub fn as_cursor(&self) -> Option<&Connection<R>> {
        match self {
            Self::Cursor(connection) => Some(connection),
            Self::Offset(_) => None,
        }
    }

    pub fn as_offset(&self) -> Option<&crate::offset::OffsetResult<R>> {
        match self {
            Self::Cursor(_) => None,
            Self::Offset(page) => Some(page),
        }
    }
}

/// Run a keyset pagination request against `executor`.
pub fn paginate<E, O>(
    executor: &E,
    order_by: O,
    request: &PageRequest,
) -> Result<Connection<E::Row>, PageError<E::Error>>
where
    E: QueryExecutor,
    E::Row: Record,
    O: Into<OrderSpec>,
{
    paginate_filtered(executor, None, order_by, request)
}

/// Run a keyset pagination request with a caller filter AND-combined with
/// the cursor predicates.
pub fn paginate_filtered<E, O>(
    executor: &E,
    filter: Option<Filter>,
    order_by: O,
    request: &PageRequest,
) -> Result<Connection<E::Row>, PageError<E::Error>>
where
    E: QueryExecutor,
    E::Row: Record,
    O: Into<OrderSpec>,
{
    let order = order_by.into();
    if order.is_empty() {
        return Err(PageError::EmptyOrderBy);
    }
    ensure_within_max([request.first, request.last])?;

    // Query construction. A `last`-only request scans backward so the
    // limit selects the window nearest the end.
    let is_ascending = !(request.last.is_some() && request.first.is_none());
    let mut filter = filter;
    if let Some(after) = &request.after {
        let tuple = decode_cursor(&order, after)?;
        filter = and_with(filter, keyset_filter(&order, &tuple, KeysetBound::After));
    }
    if let Some(before) = &request.before {
        let tuple = decode_cursor(&order, before)?;
        filter = and_with(filter, keyset_filter(&order, &tuple, KeysetBound::Before));
    }
    let limit = if is_ascending {
        request.first
    } else {
        request.last
    };
    debug!(is_ascending, ?limit, keys = order.len(), "executing keyset page query");
    let ResultSet {
        mut results,
        result_count,
    } = executor
        .execute(SelectQuery {
            filter,
            order: order.clauses(is_ascending),
            limit: limit.map(u64::from),
            offset: None,
        })
        .map_err(PageError::Executor)?;

    // Post-processing: trim to `last` from the correct end, then restore
    // ascending presentation order.
    if let Some(last) = request.last {
        let last = last as usize;
        if last < results.len() {
            if is_ascending {
                let excess = results.len() - last;
                results.drain(..excess);
            } else {
                results.truncate(last);
            }
        }
    }
    if !is_ascending {
        results.reverse();
    }

    let page_info = PageInfo {
        has_next_page: request
            .first
            .is_some_and(|first| result_count > u64::from(first)),
        has_previous_page: request
            .last
            .is_some_and(|last| result_count > u64::from(last)),
    };
    let edges = results
        .into_iter()
        .map(|node| encode_cursor(&order, &node).map(|cursor| Edge { node, cursor }))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Connection {
        result_count,
        page_info,
        edges,
    })
}

/// Run either pagination mode, dispatching on the [`Page`] variant.
pub fn paginate_page<E, O>(
    executor: &E,
    filter: Option<Filter>,
    order_by: O,
    page: &Page,
) -> Result<Paged<E::Row>, PageError<E::Error>>
where
    E: QueryExecutor,
    E::Row: Record,
    O: Into<OrderSpec>,
{
    match page {
        Page::Cursor(request) => {
            paginate_filtered(executor, filter, order_by, request).map(Paged::Cursor)
        }
        Page::Offset(offset_page) => {
            paginate_offset(executor, filter, order_by, offset_page).map(Paged::Offset)
        }
    }
}

pub(crate) fn ensure_within_max<E: ::std::error::Error>(
    counts: [Option<u32>; 2],
) -> Result<(), PageError<E>> {
    if let Some(max) = pagination_max_count() {
        for count in counts.into_iter().flatten() {
            if count > *max {
                return Err(PageError::CountTooLarge { count, max: *max });
            }
        }
    }
    Ok(())
}

fn and_with(filter: Option<Filter>, extra: Filter) -> Option<Filter> {
    Some(match filter {
        Some(filter) => filter.and(extra),
        None => extra,
    })
}
