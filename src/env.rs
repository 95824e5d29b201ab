/// Process-wide maximum page size, read once from the
/// `PAGINATION_MAX_COUNT` environment variable. Unset means uncapped.
///
/// The cap applies to `first`/`last` on cursor requests and to
/// `results_per_page` on offset requests, both at the library entry points
/// and (when a graphql feature is enabled) at the schema boundary.
pub fn pagination_max_count() -> &'static Option<u32> {
    use std::sync::OnceLock;
    static PAGINATION_MAX_COUNT: OnceLock<Option<u32>> = OnceLock::new();
    PAGINATION_MAX_COUNT.get_or_init(|| {
        std::env::var("PAGINATION_MAX_COUNT").ok().map(|count| {
            count
                .parse::<u32>()
                .expect("PAGINATION_MAX_COUNT environment variable must be a semi-positive integer")
        })
    })
}
