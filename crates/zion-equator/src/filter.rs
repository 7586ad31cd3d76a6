//! Query filter composition.
//!
//! A [`QueryFilter`] collects filter-groups (path constraints) and query
//! parameters, then turns them into one request URL for a resource.
//!
//! **Last filter wins.** Without filters the path is the resource listing
//! (`/payments`). Each filter-group is a complete replacement path
//! (`/accounts/{id}/payments`), and when several were added only the most
//! recent one is used. [`FilterPolicy::Strict`] rejects that situation instead.
//!
//! Query parameters are independent of filters and always applied.

use std::fmt;

use tracing::debug;
use url::Url;

use crate::error::QueryError;

// ── Segments ──────────────────────────────────────────────────────────────────

/// One path segment. Integers are rendered in plain decimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment(String);

impl Segment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment(s.to_owned())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment(s)
    }
}

impl From<&String> for Segment {
    fn from(s: &String) -> Self {
        Segment(s.clone())
    }
}

macro_rules! int_segment {
    ($($t:ty),*) => {
        $(impl From<$t> for Segment {
            fn from(n: $t) -> Self {
                Segment(n.to_string())
            }
        })*
    };
}

int_segment!(u32, u64, i32, i64, usize);

// ── Options ───────────────────────────────────────────────────────────────────

/// What to do when more than one filter-group was added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Use the most recently added filter-group.
    #[default]
    LastWins,
    /// Fail with [`QueryError::TooManyFilters`].
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

// ── Composer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    filters: Vec<Vec<Segment>>,
    params: Vec<(String, String)>,
    policy: FilterPolicy,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one filter-group.
    pub fn push_filter<I, S>(&mut self, segments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        self.filters.push(segments.into_iter().map(Into::into).collect());
    }

    /// Set a query parameter, replacing an earlier value for the same key.
    /// New keys keep insertion order.
    pub fn set_param(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.params.push((key.to_owned(), value)),
        }
    }

    pub fn set_policy(&mut self, policy: FilterPolicy) {
        self.policy = policy;
    }

    pub fn filters(&self) -> &[Vec<Segment>] {
        &self.filters
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Build the request URL for `resource` under `base`.
    ///
    /// `base` may carry a path prefix (`https://host/folder`); it is kept in
    /// front of the resource or filter path.
    pub fn compose(&self, base: &Url, resource: &str) -> Result<Url, QueryError> {
        let path: Vec<&str> = match self.filters.as_slice() {
            [] => vec![resource],
            [.., last] => {
                let count = self.filters.len();
                if count > 1 {
                    if self.policy == FilterPolicy::Strict {
                        return Err(QueryError::TooManyFilters { count });
                    }
                    debug!(count, "Multiple filters on /{}; using the last one", resource);
                }
                last.iter().map(Segment::as_str).collect()
            }
        };

        let mut url = base.clone();
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| QueryError::InvalidBaseUrl(base.to_string()))?
            .pop_if_empty()
            .extend(path);

        if !self.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn no_filters_lists_the_resource() {
        let url = QueryFilter::new().compose(&base("https://acme.com:1337"), "accounts").unwrap();
        assert_eq!(url.as_str(), "https://acme.com:1337/accounts");
    }

    #[test]
    fn last_filter_wins() {
        let mut q = QueryFilter::new();
        q.push_filter(["accounts", "X"]);
        q.push_filter(["accounts", "X", "payments"]);
        let url = q.compose(&base("https://acme.com"), "payments").unwrap();
        assert_eq!(url.path(), "/accounts/X/payments");
    }

    #[test]
    fn strict_policy_rejects_second_filter() {
        let mut q = QueryFilter::new();
        q.set_policy(FilterPolicy::Strict);
        q.push_filter(["accounts", "X"]);
        assert!(q.compose(&base("https://acme.com"), "accounts").is_ok());

        q.push_filter(["accounts", "Y"]);
        assert_eq!(
            q.compose(&base("https://acme.com"), "accounts"),
            Err(QueryError::TooManyFilters { count: 2 })
        );
    }

    #[test]
    fn integer_segments_are_decimal() {
        let mut q = QueryFilter::new();
        q.push_filter([Segment::from("ledgers"), Segment::from(1_000_000u64), Segment::from("effects")]);
        let url = q.compose(&base("https://acme.com"), "effects").unwrap();
        assert_eq!(url.path(), "/ledgers/1000000/effects");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let mut q = QueryFilter::new();
        q.push_filter(["accounts", "fooAccountId"]);
        for prefix in ["https://acme.com:1337/folder", "https://acme.com:1337/folder/"] {
            let url = q.compose(&base(prefix), "accounts").unwrap();
            assert_eq!(url.as_str(), "https://acme.com:1337/folder/accounts/fooAccountId");
        }
    }

    #[test]
    fn params_are_independent_of_filters() {
        let mut q = QueryFilter::new();
        q.set_param("limit", 10);
        q.push_filter(["accounts", "X", "payments"]);
        q.set_param("order", Order::Desc.as_str());
        q.set_param("limit", 20);
        let url = q.compose(&base("https://acme.com"), "payments").unwrap();
        assert_eq!(url.as_str(), "https://acme.com/accounts/X/payments?limit=20&order=desc");
    }

    #[test]
    fn segments_are_percent_encoded() {
        let mut q = QueryFilter::new();
        q.push_filter(["accounts", "a/b c"]);
        let url = q.compose(&base("https://acme.com"), "accounts").unwrap();
        assert_eq!(url.path(), "/accounts/a%2Fb%20c");
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        let err = QueryFilter::new().compose(&base("mailto:ops@acme.com"), "accounts").unwrap_err();
        assert!(matches!(err, QueryError::InvalidBaseUrl(_)));
    }

    proptest! {
        #[test]
        fn prop_only_the_last_filter_matters(
            earlier in prop::collection::vec(prop::collection::vec("[a-z0-9]{1,8}", 1..4), 0..4),
            last in prop::collection::vec("[a-z0-9]{1,8}", 1..4),
        ) {
            let mut with_history = QueryFilter::new();
            for group in &earlier {
                with_history.push_filter(group.iter().map(String::as_str));
            }
            with_history.push_filter(last.iter().map(String::as_str));

            let mut alone = QueryFilter::new();
            alone.push_filter(last.iter().map(String::as_str));

            let b = base("https://acme.com/api");
            prop_assert_eq!(with_history.compose(&b, "x").unwrap(), alone.compose(&b, "x").unwrap());
        }
    }
}
