//! Testing utilities for the ponies workspace
//!
//! Shared fixtures and a scripted record service whose calls stay pending
//! until the test answers them.

#![allow(missing_docs)]

use parking_lot::Mutex;
use pony_core::{Pony, PonyColor, PonyId, PonyService, ServiceError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// How long `next_*` waits for a call before failing the test
pub const CALL_TIMEOUT: Duration = Duration::from_secs(5);

pub fn blue_mystery() -> Pony {
    Pony::new("p1", "Blue mystery", PonyColor::Blue)
}

pub fn purple_rain() -> Pony {
    Pony::new("p2", "Purple rain", PonyColor::Purple)
}

pub fn two_ponies() -> Vec<Pony> {
    vec![blue_mystery(), purple_rain()]
}

/// Let every spawned task run until it blocks
///
/// Meant for runtimes started with `start_paused = true`, where the clock
/// only advances once all tasks are idle.
pub async fn let_tasks_run() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// A search waiting for the test's answer
#[derive(Debug)]
pub struct SearchCall {
    pub query: String,
    responder: oneshot::Sender<Result<Vec<Pony>, ServiceError>>,
}

impl SearchCall {
    /// Resolve with `ponies`; `false` if the caller stopped waiting
    pub fn respond(self, ponies: Vec<Pony>) -> bool {
        self.responder.send(Ok(ponies)).is_ok()
    }

    /// Resolve with `error`; `false` if the caller stopped waiting
    pub fn fail(self, error: ServiceError) -> bool {
        self.responder.send(Err(error)).is_ok()
    }

    /// Whether the caller dropped the search
    pub fn is_abandoned(&self) -> bool {
        self.responder.is_closed()
    }
}

/// A delete waiting for the test's answer
#[derive(Debug)]
pub struct DeleteCall {
    pub id: PonyId,
    responder: oneshot::Sender<Result<(), ServiceError>>,
}

impl DeleteCall {
    pub fn complete(self) -> bool {
        self.responder.send(Ok(())).is_ok()
    }

    pub fn fail(self, error: ServiceError) -> bool {
        self.responder.send(Err(error)).is_ok()
    }

    pub fn is_abandoned(&self) -> bool {
        self.responder.is_closed()
    }
}

/// Record service driven by the test
///
/// Every call is logged and parked until the test picks it up with
/// `next_search`/`next_delete` and answers it.
#[derive(Debug)]
pub struct ScriptedPonyService {
    search_log: Mutex<Vec<String>>,
    delete_log: Mutex<Vec<PonyId>>,
    search_tx: mpsc::UnboundedSender<SearchCall>,
    search_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<SearchCall>>,
    delete_tx: mpsc::UnboundedSender<DeleteCall>,
    delete_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<DeleteCall>>,
}

impl ScriptedPonyService {
    pub fn new() -> Self {
        let (search_tx, search_rx) = mpsc::unbounded_channel();
        let (delete_tx, delete_rx) = mpsc::unbounded_channel();
        Self {
            search_log: Mutex::new(Vec::new()),
            delete_log: Mutex::new(Vec::new()),
            search_tx,
            search_rx: tokio::sync::Mutex::new(search_rx),
            delete_tx,
            delete_rx: tokio::sync::Mutex::new(delete_rx),
        }
    }

    /// Queries searched so far, in call order
    pub fn search_calls(&self) -> Vec<String> {
        self.search_log.lock().clone()
    }

    /// Ids deleted so far, in call order
    pub fn delete_calls(&self) -> Vec<PonyId> {
        self.delete_log.lock().clone()
    }

    /// Next parked search; panics after `CALL_TIMEOUT`
    pub async fn next_search(&self) -> SearchCall {
        let mut rx = self.search_rx.lock().await;
        tokio::time::timeout(CALL_TIMEOUT, rx.recv())
            .await
            .expect("expected a search call")
            .expect("sender lives as long as the service")
    }

    /// Next parked delete; panics after `CALL_TIMEOUT`
    pub async fn next_delete(&self) -> DeleteCall {
        let mut rx = self.delete_rx.lock().await;
        tokio::time::timeout(CALL_TIMEOUT, rx.recv())
            .await
            .expect("expected a delete call")
            .expect("sender lives as long as the service")
    }

    /// Parked search, if any, without waiting
    pub fn try_next_search(&self) -> Option<SearchCall> {
        self.search_rx.try_lock().ok()?.try_recv().ok()
    }

    /// Parked delete, if any, without waiting
    pub fn try_next_delete(&self) -> Option<DeleteCall> {
        self.delete_rx.try_lock().ok()?.try_recv().ok()
    }
}

impl Default for ScriptedPonyService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PonyService for ScriptedPonyService {
    async fn search(&self, query: &str) -> Result<Vec<Pony>, ServiceError> {
        self.search_log.lock().push(query.to_string());
        let (responder, answer) = oneshot::channel();
        let _ = self.search_tx.send(SearchCall {
            query: query.to_string(),
            responder,
        });
        answer
            .await
            .unwrap_or_else(|_| Err(ServiceError::Unavailable("search left unanswered".to_string())))
    }

    async fn delete(&self, id: &PonyId) -> Result<(), ServiceError> {
        self.delete_log.lock().push(id.clone());
        let (responder, answer) = oneshot::channel();
        let _ = self.delete_tx.send(DeleteCall {
            id: id.clone(),
            responder,
        });
        answer
            .await
            .unwrap_or_else(|_| Err(ServiceError::Unavailable("delete left unanswered".to_string())))
    }
}
