//! Navigation
//!
//! The router owns the current location and publishes changes:
//! - `Route`: the two addressable views (landing, ponies)
//! - `QueryParams`: the URL query parameters (first value per key wins)
//! - `Router`: shared handle; subscribers only see distinct locations

use crate::error::NavigationError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use url::{form_urlencoded, Url};

/// Query parameter carrying the search filter
pub const QUERY_PARAM: &str = "query";

const BASE_URL: &str = "http://localhost/";

/// Addressable views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// Landing view at `/`
    #[default]
    Home,
    /// Search/list view at `/ponies`
    Ponies,
}

impl Route {
    /// Path this route is served at
    #[inline]
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Ponies => "/ponies",
        }
    }

    /// Match a URL path against the routes
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Self::Home),
            "/ponies" => Some(Self::Ponies),
            _ => None,
        }
    }
}

/// URL query parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Empty parameter set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw `a=1&b=2` query string
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Value of `key`, if present (possibly empty)
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set `key`, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// With `key` set
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Remove `key`
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Whether no parameter is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.0.entry(key.into()).or_insert_with(|| value.into());
        }
        params
    }
}

/// Route plus query parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub route: Route,
    pub params: QueryParams,
}

impl Location {
    /// Location without parameters
    #[inline]
    #[must_use]
    pub fn new(route: Route) -> Self {
        Self {
            route,
            params: QueryParams::new(),
        }
    }

    /// With parameters
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// The ponies view filtered by `query`
    #[must_use]
    pub fn ponies(query: impl Into<String>) -> Self {
        Self::new(Route::Ponies).with_params(QueryParams::new().with(QUERY_PARAM, query))
    }

    /// Parse a path-and-query (`/ponies?query=b`) or absolute URL
    ///
    /// # Errors
    /// - `NavigationError::InvalidUrl` if the input is not a URL
    /// - `NavigationError::UnknownRoute` if the path matches no route
    pub fn parse(input: &str) -> Result<Self, NavigationError> {
        let invalid = |reason: String| NavigationError::InvalidUrl {
            url: input.to_string(),
            reason,
        };
        let base = Url::parse(BASE_URL).map_err(|e| invalid(e.to_string()))?;
        let url = base.join(input).map_err(|e| invalid(e.to_string()))?;

        let route = Route::from_path(url.path())
            .ok_or_else(|| NavigationError::UnknownRoute(url.path().to_string()))?;
        let params = QueryParams::parse(url.query().unwrap_or_default());

        Ok(Self { route, params })
    }

    /// The current search filter; `None` when the parameter is absent
    #[inline]
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.params.get(QUERY_PARAM)
    }

    /// Path and encoded query string
    #[must_use]
    pub fn to_url(&self) -> String {
        let mut url = self.route.path().to_string();
        if !self.params.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.params.iter())
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// Shared navigation handle
///
/// Clones share one location. Subscribers are woken only when a navigation
/// actually changes it.
#[derive(Debug, Clone)]
pub struct Router {
    location: Arc<watch::Sender<Location>>,
}

impl Router {
    /// Create router at `initial`
    #[must_use]
    pub fn new(initial: Location) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            location: Arc::new(tx),
        }
    }

    /// Create router at a parsed URL
    ///
    /// # Errors
    /// Same as [`Location::parse`]
    pub fn at(url: &str) -> Result<Self, NavigationError> {
        Location::parse(url).map(Self::new)
    }

    /// Current location
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Location {
        self.location.borrow().clone()
    }

    /// Receiver of location changes, starting at the current location
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }

    /// Navigate to `location`
    ///
    /// Returns `false` (and notifies nobody) when already there.
    pub fn navigate(&self, location: Location) -> bool {
        let changed = self.location.send_if_modified(|current| {
            if *current == location {
                false
            } else {
                *current = location;
                true
            }
        });
        if changed {
            tracing::debug!(url = %self.location.borrow().to_url(), "navigated");
        }
        changed
    }

    /// Navigate to a parsed URL
    ///
    /// # Errors
    /// Same as [`Location::parse`]
    pub fn navigate_by_url(&self, url: &str) -> Result<bool, NavigationError> {
        Location::parse(url).map(|location| self.navigate(location))
    }

    /// Stay on the current route, replacing one query parameter
    pub fn set_query_param(&self, key: &str, value: impl Into<String>) -> bool {
        let mut next = self.snapshot();
        next.params.set(key, value);
        self.navigate(next)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Location::default())
    }
}
