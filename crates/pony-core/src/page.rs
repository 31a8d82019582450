//! Ponies page
//!
//! Composes the search form and the result list under one task scope. The
//! page's lifetime is the scope's lifetime: unmounting (or dropping) the page
//! abandons every pending search and delete.

use crate::form::SearchForm;
use crate::list::PonyList;
use crate::router::Router;
use crate::scope::TaskScope;
use crate::service::PonyService;
use std::sync::Arc;

/// The search/list screen
#[derive(Debug)]
pub struct PoniesPage {
    scope: TaskScope,
    form: SearchForm,
    list: PonyList,
}

impl PoniesPage {
    /// Mount the page on `router`, backed by `service`
    #[must_use]
    pub fn mount(router: &Router, service: Arc<dyn PonyService>) -> Self {
        let scope = TaskScope::new();
        let form = SearchForm::new(router.clone());
        let list = PonyList::mount(&scope, router, service);
        tracing::debug!(url = %router.snapshot(), "ponies page mounted");

        Self { scope, form, list }
    }

    /// The search form
    #[inline]
    #[must_use]
    pub fn form(&self) -> &SearchForm {
        &self.form
    }

    /// The search form, for typing into the field
    #[inline]
    pub fn form_mut(&mut self) -> &mut SearchForm {
        &mut self.form
    }

    /// The result list
    #[inline]
    #[must_use]
    pub fn list(&self) -> &PonyList {
        &self.list
    }

    /// Fill the field and submit, as a user would
    pub fn submit_search(&mut self, query: impl Into<String>) -> bool {
        self.form.set_query(query);
        self.form.search()
    }

    /// Tear the page down, aborting pending work
    pub fn unmount(self) {
        tracing::debug!("ponies page unmounted");
        self.scope.cancel();
    }
}

impl Drop for PoniesPage {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}
