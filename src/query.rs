//! Gallery query evaluation.
//!
//! Evaluation is a pure function of a request and a catalog snapshot:
//!
//! 1. [`filter`] selects extensions using [`criterion`] matching,
//! 2. [`sort`] orders them,
//! 3. [`rewrite`] copies them with asset URIs pointing at the mirror,
//! 4. [`metadata`] computes facets over the full result set,
//! 5. [`paginate`] cuts out the requested page.

use tracing::debug;

use stockroom_core::{Extension, QueryFilter, QueryRequest, QueryResponse};

use crate::error::{Error, Result};

pub mod criterion;
pub mod filter;
pub mod metadata;
pub mod paginate;
pub mod rewrite;
pub mod sort;

pub use criterion::ExtensionNamePolicy;
pub use sort::Direction;

/// Per-server settings that shape query results.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Public origin asset URIs are rewritten to
    pub origin: String,
    /// What `ExtensionName` criteria compare against
    pub extension_name: ExtensionNamePolicy,
}

/// Check a request's shape and return the filter to evaluate.
///
/// Only the first filter is evaluated; the others must still carry
/// criteria but are otherwise ignored.
pub fn validate(request: &QueryRequest) -> Result<&QueryFilter> {
    let Some(first) = request.filters.first() else {
        return Err(Error::MalformedRequest("no filters specified".into()));
    };
    if request.flags.is_empty() {
        return Err(Error::MalformedRequest("no flags specified".into()));
    }
    if request.filters.iter().any(|f| f.criteria.is_empty()) {
        return Err(Error::MalformedRequest(
            "no criteria specified on filter".into(),
        ));
    }

    if request.filters.len() > 1 {
        debug!("Ignoring {} additional filter(s)", request.filters.len() - 1);
    }
    if first.paging_token.is_some() {
        debug!("Paging tokens are not supported, ignoring");
    }
    Ok(first)
}

/// Evaluate `filter` against `extensions`.
pub fn execute(filter: &QueryFilter, extensions: &[Extension], options: &QueryOptions) -> QueryResponse {
    let mut matched = filter::evaluate(filter, extensions, options.extension_name);

    let direction = filter::resolve_direction(filter.sort_by, filter.sort_order);
    sort::sort(&mut matched, filter.sort_by, direction);

    let rewritten = rewrite::rewrite_all(&matched, &options.origin);
    let result_metadata = metadata::aggregate(&rewritten);
    let extensions = paginate::paginate(rewritten, filter.page_number, filter.page_size);

    debug!(
        page = filter.page_number,
        returned = extensions.len(),
        ?direction,
        "Query executed"
    );

    QueryResponse {
        extensions,
        paging_token: None,
        result_metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{FilterCriterion, FilterType, QueryFlags};

    fn request(filters: Vec<QueryFilter>, flags: u32) -> QueryRequest {
        QueryRequest {
            filters,
            flags: QueryFlags(flags),
            ..QueryRequest::default()
        }
    }

    fn with_criteria(criteria: Vec<FilterCriterion>) -> QueryFilter {
        QueryFilter {
            criteria,
            ..QueryFilter::default()
        }
    }

    #[test]
    fn rejects_missing_filters() {
        let err = validate(&request(vec![], 0x2)).unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(msg) if msg == "no filters specified"));
    }

    #[test]
    fn rejects_missing_flags() {
        let f = with_criteria(vec![FilterCriterion::new(FilterType::SearchText, "*")]);
        let err = validate(&request(vec![f], 0)).unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(msg) if msg == "no flags specified"));
    }

    #[test]
    fn rejects_any_empty_filter() {
        let good = with_criteria(vec![FilterCriterion::new(FilterType::SearchText, "*")]);
        let err = validate(&request(vec![good, with_criteria(vec![])], 0x2)).unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[test]
    fn returns_first_filter() {
        let first = with_criteria(vec![FilterCriterion::new(FilterType::Id, "one")]);
        let second = with_criteria(vec![FilterCriterion::new(FilterType::Id, "two")]);
        let req = request(vec![first.clone(), second], 0x2);
        assert_eq!(validate(&req).unwrap(), &first);
    }
}
