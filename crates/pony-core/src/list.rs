//! Result list
//!
//! Derives the current query from the router and keeps the rendered result in
//! sync with it:
//! - Searches are switch-to-latest: a new query (or a refresh) replaces the
//!   in-flight search, whose result is never published
//! - An absent query shows nothing and calls nothing
//! - Deletes are exhaust-drop: while one is pending, new requests are dropped
//! - A successful delete refreshes the current query; a failed one is swallowed
//! - A failed search is surfaced as `SearchPhase::Failed` and the pipeline
//!   keeps running

use crate::error::ServiceError;
use crate::item::{ItemAction, PonyItem};
use crate::router::{Location, Router};
use crate::scope::TaskScope;
use crate::service::PonyService;
use crate::types::{Pony, PonyId};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Where the current search stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// No query: nothing to search
    #[default]
    Idle,
    /// Search in flight; the previous result stays rendered
    Searching,
    /// Latest search resolved
    Ready,
    /// Latest search failed
    Failed(String),
}

/// Snapshot of the list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    /// Current query, `None` when the parameter is absent
    pub query: Option<String>,
    /// Search phase
    pub phase: SearchPhase,
    /// Latest rendered result, `None` when nothing should be shown
    pub ponies: Option<Vec<Pony>>,
    /// Bumped every time a search is issued or the query becomes absent
    pub revision: u64,
}

impl ListState {
    /// Whether no search is in flight
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.phase != SearchPhase::Searching
    }

    /// Rendered ponies (empty when nothing is shown)
    #[inline]
    #[must_use]
    pub fn ponies(&self) -> &[Pony] {
        self.ponies.as_deref().unwrap_or_default()
    }
}

/// Result of asking the list to delete a pony
#[derive(Debug)]
pub enum DeleteRequest {
    /// Delete sent to the backend
    Accepted(DeleteTicket),
    /// Another delete is pending (or the view is torn down); nothing sent
    Dropped,
}

impl DeleteRequest {
    /// Whether the delete was sent to the backend
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// How an accepted delete ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Backend confirmed; a refresh was requested
    Deleted,
    /// Backend failed; nothing changed
    Failed,
    /// View torn down before the backend answered
    Cancelled,
}

/// Handle on an accepted delete
#[derive(Debug)]
pub struct DeleteTicket {
    id: PonyId,
    outcome: oneshot::Receiver<DeleteOutcome>,
}

impl DeleteTicket {
    /// Pony being deleted
    #[inline]
    #[must_use]
    pub fn id(&self) -> &PonyId {
        &self.id
    }

    /// Wait for the delete to end
    pub async fn outcome(self) -> DeleteOutcome {
        self.outcome.await.unwrap_or(DeleteOutcome::Cancelled)
    }
}

/// The result list of the ponies screen
pub struct PonyList {
    service: Arc<dyn PonyService>,
    scope: TaskScope,
    state: watch::Receiver<ListState>,
    refresh: mpsc::UnboundedSender<()>,
    deleting: Arc<AtomicBool>,
}

impl std::fmt::Debug for PonyList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PonyList")
            .field("state", &*self.state.borrow())
            .field("deleting", &self.deleting.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl PonyList {
    /// Start following `router`, running the query pipeline inside `scope`
    #[must_use]
    pub fn mount(scope: &TaskScope, router: &Router, service: Arc<dyn PonyService>) -> Self {
        let locations = router.subscribe();
        let query = current_query(&locations.borrow());
        let live = !scope.is_cancelled();
        let initial = ListState {
            phase: if query.is_some() && live {
                SearchPhase::Searching
            } else {
                SearchPhase::Idle
            },
            query,
            ..ListState::default()
        };

        let (state_tx, state_rx) = watch::channel(initial);
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        let pipeline = QueryPipeline {
            service: Arc::clone(&service),
            state: state_tx,
        };
        if !scope.spawn(pipeline.run(locations, refresh_rx)) {
            tracing::debug!("list mounted on a torn-down scope, nothing will be searched");
        }

        Self {
            service,
            scope: scope.clone(),
            state: state_rx,
            refresh: refresh_tx,
            deleting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Receiver of list changes
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.clone()
    }

    /// One item per rendered pony, in result order
    #[must_use]
    pub fn items(&self) -> Vec<PonyItem> {
        self.state
            .borrow()
            .ponies()
            .iter()
            .cloned()
            .map(PonyItem::new)
            .collect()
    }

    /// Whether a delete is pending
    #[inline]
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::Acquire)
    }

    /// Search the current query again
    ///
    /// Returns `false` when the pipeline is gone (view torn down).
    pub fn refresh(&self) -> bool {
        self.refresh.send(()).is_ok()
    }

    /// Handle an item event
    pub fn dispatch(&self, action: ItemAction) -> DeleteRequest {
        match action {
            ItemAction::Delete(pony) => self.delete(&pony),
        }
    }

    /// Delete `pony`, then refresh the current query
    ///
    /// Dropped (not queued) while another delete is pending.
    pub fn delete(&self, pony: &Pony) -> DeleteRequest {
        if self
            .deleting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(id = %pony.id, "delete dropped, another delete is pending");
            return DeleteRequest::Dropped;
        }

        let busy = BusyGuard(Arc::clone(&self.deleting));
        let (tx, rx) = oneshot::channel();
        let service = Arc::clone(&self.service);
        let refresh = self.refresh.clone();
        let id = pony.id.clone();

        let task_id = id.clone();
        let spawned = self.scope.spawn(async move {
            let _busy = busy;
            let outcome = match service.delete(&task_id).await {
                Ok(()) => {
                    tracing::debug!(id = %task_id, "deleted, refreshing");
                    // The pipeline may already be gone on teardown.
                    let _ = refresh.send(());
                    DeleteOutcome::Deleted
                }
                Err(err) => {
                    tracing::warn!(id = %task_id, error = %err, "delete failed, list left unchanged");
                    DeleteOutcome::Failed
                }
            };
            let _ = tx.send(outcome);
        });

        if !spawned {
            tracing::debug!(%id, "delete dropped, view torn down");
            return DeleteRequest::Dropped;
        }

        DeleteRequest::Accepted(DeleteTicket { id, outcome: rx })
    }

    /// Wait until no search is in flight
    pub async fn settled(&self) -> ListState {
        self.wait_for(ListState::is_settled).await
    }

    /// Wait until a search issued after `revision` has resolved
    pub async fn settled_after(&self, revision: u64) -> ListState {
        self.wait_for(|state| state.revision > revision && state.is_settled())
            .await
    }

    async fn wait_for(&self, predicate: impl FnMut(&ListState) -> bool) -> ListState {
        let mut rx = self.state.clone();
        let reached = rx.wait_for(predicate).await.map(|state| ListState::clone(&state));
        // Pipeline gone (torn down): the last published state is final.
        reached.unwrap_or_else(|_| rx.borrow().clone())
    }
}

/// Clears the delete flag when the delete task ends, however it ends
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

type PendingSearch = BoxFuture<'static, Result<Vec<Pony>, ServiceError>>;

enum PipelineEvent {
    Navigated,
    LocationsClosed,
    Refresh,
    RefreshClosed,
    Resolved(Result<Vec<Pony>, ServiceError>),
}

struct QueryPipeline {
    service: Arc<dyn PonyService>,
    state: watch::Sender<ListState>,
}

impl QueryPipeline {
    async fn run(
        self,
        mut locations: watch::Receiver<Location>,
        mut refresh: mpsc::UnboundedReceiver<()>,
    ) {
        let mut query = current_query(&locations.borrow_and_update());
        let mut pending = None;
        self.reissue(&mut pending, query.clone());

        // Only the task scope ends the pipeline early. A closed input is
        // dropped from the select and pending work still completes.
        let mut locations_open = true;
        let mut refresh_open = true;

        while locations_open || refresh_open || pending.is_some() {
            let event = tokio::select! {
                changed = locations.changed(), if locations_open => match changed {
                    Ok(()) => PipelineEvent::Navigated,
                    Err(_) => PipelineEvent::LocationsClosed,
                },
                signal = refresh.recv(), if refresh_open => match signal {
                    Some(()) => PipelineEvent::Refresh,
                    None => PipelineEvent::RefreshClosed,
                },
                result = next_result(&mut pending) => PipelineEvent::Resolved(result),
            };

            match event {
                PipelineEvent::Navigated => {
                    let next = current_query(&locations.borrow_and_update());
                    if next != query {
                        query = next;
                        self.reissue(&mut pending, query.clone());
                    }
                }
                PipelineEvent::Refresh => {
                    tracing::debug!(query = ?query, "refresh requested");
                    self.reissue(&mut pending, query.clone());
                }
                PipelineEvent::Resolved(result) => {
                    pending = None;
                    self.publish(result);
                }
                PipelineEvent::LocationsClosed => {
                    tracing::debug!("router dropped, query frozen");
                    locations_open = false;
                }
                PipelineEvent::RefreshClosed => refresh_open = false,
            }
        }

        tracing::debug!("query pipeline stopped");
    }

    /// Replace the in-flight search with one for `query`
    fn reissue(&self, pending: &mut Option<PendingSearch>, query: Option<String>) {
        if pending.take().is_some() {
            tracing::debug!("in-flight search superseded");
        }

        self.state.send_modify(|state| {
            state.revision += 1;
            state.query.clone_from(&query);
            if query.is_some() {
                state.phase = SearchPhase::Searching;
            } else {
                state.phase = SearchPhase::Idle;
                state.ponies = None;
            }
        });

        *pending = query.map(|query| {
            tracing::debug!(query = %query, "searching");
            let service = Arc::clone(&self.service);
            async move { service.search(&query).await }.boxed()
        });
    }

    fn publish(&self, result: Result<Vec<Pony>, ServiceError>) {
        match result {
            Ok(ponies) => {
                tracing::debug!(found = ponies.len(), "search resolved");
                self.state.send_modify(|state| {
                    state.phase = SearchPhase::Ready;
                    state.ponies = Some(ponies);
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                self.state.send_modify(|state| {
                    state.phase = SearchPhase::Failed(err.to_string());
                    state.ponies = None;
                });
            }
        }
    }
}

async fn next_result(pending: &mut Option<PendingSearch>) -> Result<Vec<Pony>, ServiceError> {
    match pending {
        Some(search) => search.await,
        None => std::future::pending().await,
    }
}

fn current_query(location: &Location) -> Option<String> {
    location.query().map(str::to_string)
}
