use crate::executor::{QueryExecutor, ResultSet, SelectQuery};
use crate::filter::Filter;
use crate::order::OrderSpec;
use crate::paginate::{ensure_within_max, PageError};
use ::std::cmp::Ordering;
use ::tracing::debug;

#[cfg(feature = "async-graphql-4")]
use async_graphql_4 as async_graphql;
#[cfg(feature = "async-graphql-5")]
use async_graphql_5 as async_graphql;
#[cfg(feature = "async-graphql-6")]
use async_graphql_6 as async_graphql;

/// An offset pagination request: 1-based page number and page size.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(
    any(
        feature = "async-graphql-4",
        feature = "async-graphql-5",
        feature = "async-graphql-6"
    ),
    derive(async_graphql::InputObject)
)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage {
    pub page: u32,
    #[cfg_attr(
        any(
            feature = "async-graphql-4",
            feature = "async-graphql-5",
            feature = "async-graphql-6"
        ),
        graphql(validator(custom = "crate::GraphqlPaginationCountValidator"))
    )]
    pub results_per_page: u32,
}

impl OffsetPage {
    /// The first page of `count` rows.
    pub fn with_count(count: u32) -> Self {
        Self {
            page: 1,
            results_per_page: count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results_per_page == 0
    }

    pub(crate) fn limit(&self) -> u64 {
        u64::from(self.results_per_page)
    }

    // page is 1-based
    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.results_per_page)
    }
}

impl Ord for OffsetPage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl PartialOrd for OffsetPage {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        if self.page != rhs.page {
            self.page.partial_cmp(&rhs.page)
        } else {
            self.results_per_page.partial_cmp(&rhs.results_per_page)
        }
    }
}

/// One page of results with the bookkeeping the offset mode reports.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetResult<R> {
    pub result_count: u64,
    pub page_count: u64,
    pub current_page: u32,
    pub results: Vec<R>,
}

/// Run an offset pagination request against `executor`.
pub fn paginate_offset<E, O>(
    executor: &E,
    filter: Option<Filter>,
    order_by: O,
    page: &OffsetPage,
) -> Result<OffsetResult<E::Row>, PageError<E::Error>>
where
    E: QueryExecutor,
    O: Into<OrderSpec>,
{
    let order = order_by.into();
    if order.is_empty() {
        return Err(PageError::EmptyOrderBy);
    }
    ensure_within_max([Some(page.results_per_page), None])?;

    debug!(
        current_page = page.page,
        results_per_page = page.results_per_page,
        "executing offset page query"
    );
    let ResultSet {
        results,
        result_count,
    } = executor
        .execute(SelectQuery {
            filter,
            order: order.clauses(true),
            limit: Some(page.limit()),
            offset: Some(page.offset()),
        })
        .map_err(PageError::Executor)?;

    let page_count = match page.results_per_page {
        0 => 0,
        per_page => result_count.div_ceil(u64::from(per_page)),
    };
    Ok(OffsetResult {
        result_count,
        page_count,
        current_page: page.page,
        results,
    })
}
