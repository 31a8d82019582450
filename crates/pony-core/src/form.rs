//! Search form
//!
//! One text field, pre-filled from the `query` parameter. Submitting writes
//! the trimmed value back into the URL; the list reacts to the navigation.

use crate::router::{Router, QUERY_PARAM};

/// Search form bound to a router
#[derive(Debug, Clone)]
pub struct SearchForm {
    router: Router,
    query: String,
}

impl SearchForm {
    /// Create form pre-filled from the router's current `query` (empty if absent)
    #[must_use]
    pub fn new(router: Router) -> Self {
        let query = router
            .snapshot()
            .query()
            .map(str::to_string)
            .unwrap_or_default();
        Self { router, query }
    }

    /// Current field value
    #[inline]
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replace the field value
    pub fn set_query(&mut self, value: impl Into<String>) {
        self.query = value.into();
    }

    /// Submit: navigate with the trimmed field value as `query`
    ///
    /// Returns whether the location changed.
    pub fn search(&self) -> bool {
        let query = self.query.trim();
        tracing::debug!(query, "search form submitted");
        self.router.set_query_param(QUERY_PARAM, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{Location, Route};

    #[test]
    fn prefills_from_query_param() {
        let form = SearchForm::new(Router::new(Location::ponies("b")));
        assert_eq!(form.query(), "b");
    }

    #[test]
    fn prefills_empty_when_absent() {
        let form = SearchForm::new(Router::new(Location::new(Route::Ponies)));
        assert_eq!(form.query(), "");
    }

    #[test]
    fn search_writes_trimmed_query() {
        let router = Router::new(Location::new(Route::Ponies));
        let mut form = SearchForm::new(router.clone());

        form.set_query("  b ");
        assert!(form.search());

        assert_eq!(router.snapshot(), Location::ponies("b"));
    }

    #[test]
    fn search_with_blank_field_sets_empty_query() {
        let router = Router::new(Location::new(Route::Ponies));
        let mut form = SearchForm::new(router.clone());

        form.set_query("   ");
        assert!(form.search());

        assert_eq!(router.snapshot().query(), Some(""));
    }

    #[test]
    fn resubmitting_same_query_does_not_navigate() {
        let router = Router::new(Location::ponies("b"));
        let form = SearchForm::new(router);

        assert!(!form.search());
    }
}
