#[macro_use]
extern crate cfg_if;
#[macro_use]
extern crate serde;

use ::derive_more::{From, IsVariant};

mod cursor;
mod env;
mod executor;
mod filter;
mod offset;
mod order;
mod paginate;

pub use crate::cursor::*;
pub use crate::env::*;
pub use crate::executor::*;
pub use crate::filter::*;
pub use crate::offset::*;
pub use crate::order::*;
pub use crate::paginate::*;

cfg_if! { if #[cfg(any(
    feature = "async-graphql-4",
    feature = "async-graphql-5",
    feature = "async-graphql-6"
))] {
    mod graphql;
    pub(crate) use crate::graphql::*;

    #[cfg(feature = "async-graphql-4")]
    pub(crate) use async_graphql_4 as async_graphql;
    #[cfg(feature = "async-graphql-5")]
    pub(crate) use async_graphql_5 as async_graphql;
    #[cfg(feature = "async-graphql-6")]
    pub(crate) use async_graphql_6 as async_graphql;
} }

/// A pagination request in either mode.
#[derive(
    Clone, Debug, Deserialize, Eq, From, Hash, IsVariant, PartialEq, Serialize,
)]
#[cfg_attr(
    any(
        feature = "async-graphql-4",
        feature = "async-graphql-5",
        feature = "async-graphql-6"
    ),
    derive(async_graphql::OneofObject)
)]
pub enum Page {
    Cursor(PageRequest),
    Offset(OffsetPage),
}

impl Page {
    /// The declared page size: the larger of `first`/`last` for cursor
    /// requests, the page size for offset requests.
    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Cursor(request) => request.first.max(request.last),
            Self::Offset(offset) => Some(offset.results_per_page),
        }
    }
}
