//! Browser session
//!
//! The server drives one router and at most one mounted ponies page, the
//! way a single browser tab would. Requests are serialized on the page lock
//! so every rendered view comes from a settled list.
//!
//! Loading the ponies view searches again, like a page reload would, unless
//! the load follows a form post that already searched.

use crate::error::WebError;
use crate::render::PoniesView;
use pony_core::{
    DeleteOutcome, DeleteRequest, ListState, Location, PoniesPage, PonyId, PonyItem, PonyService,
    Route, Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Router plus the currently mounted page
pub struct Session {
    router: Router,
    service: Arc<dyn PonyService>,
    tab: Mutex<Tab>,
}

#[derive(Default)]
struct Tab {
    page: Option<PoniesPage>,
    /// The next load is the redirect after a post that already searched
    follows_post: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("location", &self.router.snapshot())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session at `/` with nothing mounted
    #[must_use]
    pub fn new(service: Arc<dyn PonyService>) -> Self {
        Self {
            router: Router::default(),
            service,
            tab: Mutex::new(Tab::default()),
        }
    }

    /// Current location
    #[inline]
    #[must_use]
    pub fn location(&self) -> Location {
        self.router.snapshot()
    }

    /// Navigate to the landing view, tearing the ponies page down
    pub async fn show_home(&self) {
        let mut tab = self.tab.lock().await;
        self.router.navigate(Location::new(Route::Home));
        tab.follows_post = false;
        if let Some(page) = tab.page.take() {
            page.unmount();
        }
    }

    /// Load the ponies view at `location` and render once settled
    ///
    /// A mounted list searches again even when the query is unchanged, so a
    /// reload picks up outside deletes and retries a failed search.
    pub async fn show_ponies(&self, location: Location) -> PoniesView {
        let mut tab = self.tab.lock().await;
        let follows_post = std::mem::take(&mut tab.follows_post);
        let query = location.query().map(str::to_string);
        let before = tab.page.as_ref().map(|page| page.list().state());

        self.router.navigate(location);
        let page = tab.page.get_or_insert_with(|| self.mount());
        page.form_mut().set_query(query.clone().unwrap_or_default());

        let state = match before {
            // Freshly mounted: the mount itself searched.
            None => page.list().settled().await,
            Some(before) if before.query != query => {
                page.list().settled_after(before.revision).await
            }
            Some(before) if query.is_some() && !follows_post && page.list().refresh() => {
                page.list().settled_after(before.revision).await
            }
            Some(_) => page.list().settled().await,
        };
        view_of(page, &state)
    }

    /// Submit the search form; returns where the browser should go next
    pub async fn submit_search(&self, query: &str) -> Location {
        let mut tab = self.tab.lock().await;
        let page = tab.page.get_or_insert_with(|| {
            self.router.navigate(Location::new(Route::Ponies));
            self.mount()
        });

        if !page.submit_search(query) {
            tracing::debug!(query, "search submitted for the current query");
        }
        tab.follows_post = true;
        self.router.snapshot()
    }

    /// Click the delete button of a rendered pony and wait for the refresh
    ///
    /// # Errors
    /// Returns `WebError::NotFound` if no rendered pony has `id`.
    pub async fn delete(&self, id: &PonyId) -> Result<DeleteOutcome, WebError> {
        let mut tab = self.tab.lock().await;
        let page = tab
            .page
            .as_ref()
            .ok_or_else(|| WebError::NotFound(id.clone()))?;

        let before = page.list().state();
        let item = page
            .list()
            .items()
            .into_iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| WebError::NotFound(id.clone()))?;

        let outcome = match page.list().dispatch(item.click_delete()) {
            DeleteRequest::Accepted(ticket) => ticket.outcome().await,
            DeleteRequest::Dropped => {
                tracing::debug!(%id, "delete dropped");
                return Ok(DeleteOutcome::Cancelled);
            }
        };

        if outcome == DeleteOutcome::Deleted {
            page.list().settled_after(before.revision).await;
            tab.follows_post = true;
        }
        Ok(outcome)
    }

    fn mount(&self) -> PoniesPage {
        PoniesPage::mount(&self.router, Arc::clone(&self.service))
    }
}

fn view_of(page: &PoniesPage, state: &ListState) -> PoniesView {
    let items: Vec<PonyItem> = state.ponies().iter().cloned().map(PonyItem::new).collect();
    PoniesView::new(page.form().query(), state, &items)
}
