//! Record service
//!
//! The backend boundary of the ponies screen:
//! - `PonyService`: search by text, delete by identifier
//! - `InMemoryPonyService`: seeded in-memory collection with a fixed latency

use crate::error::{ConfigError, ServiceError};
use crate::types::{default_seed, Pony, PonyId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;

/// Latency the in-memory backend waits before answering
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(100);

/// Record service trait
///
/// Implement this trait to back the screen with a different store.
#[async_trait::async_trait]
pub trait PonyService: Send + Sync {
    /// Ponies whose name contains `query` (case-insensitive), in store order
    async fn search(&self, query: &str) -> Result<Vec<Pony>, ServiceError>;

    /// Remove the pony with `id`. Deleting an absent id succeeds.
    async fn delete(&self, id: &PonyId) -> Result<(), ServiceError>;
}

/// In-memory record service
///
/// Owns the collection exclusively. Every call reads or mutates the
/// collection under one lock, then waits the configured latency.
#[derive(Debug)]
pub struct InMemoryPonyService {
    ponies: Mutex<Vec<Pony>>,
    latency: Duration,
}

impl InMemoryPonyService {
    /// Create service with the default seed and latency
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            ponies: Mutex::new(default_seed()),
            latency: DEFAULT_LATENCY,
        }
    }

    /// Create service seeded with `ponies`
    ///
    /// # Errors
    /// - `ConfigError::DuplicateSeedId` if two ponies share an id
    pub fn with_ponies(ponies: Vec<Pony>) -> Result<Self, ConfigError> {
        if let Some(dup) = first_duplicate(&ponies) {
            return Err(ConfigError::DuplicateSeedId(dup.clone()));
        }

        Ok(Self {
            ponies: Mutex::new(ponies),
            latency: DEFAULT_LATENCY,
        })
    }

    /// With answer latency
    #[inline]
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Configured latency
    #[inline]
    #[must_use]
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Copy of the current collection
    #[must_use]
    pub fn snapshot(&self) -> Vec<Pony> {
        self.ponies.lock().clone()
    }

    /// Number of ponies left
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ponies.lock().len()
    }

    /// Whether every pony was deleted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ponies.lock().is_empty()
    }

    async fn wait_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn first_duplicate(ponies: &[Pony]) -> Option<&PonyId> {
    let mut seen = HashSet::with_capacity(ponies.len());
    ponies.iter().map(|p| &p.id).find(|id| !seen.insert(*id))
}

impl Default for InMemoryPonyService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PonyService for InMemoryPonyService {
    async fn search(&self, query: &str) -> Result<Vec<Pony>, ServiceError> {
        let found: Vec<Pony> = self
            .ponies
            .lock()
            .iter()
            .filter(|pony| pony.matches(query))
            .cloned()
            .collect();
        tracing::debug!(query, found = found.len(), "in-memory search");

        self.wait_latency().await;
        Ok(found)
    }

    async fn delete(&self, id: &PonyId) -> Result<(), ServiceError> {
        let removed = {
            let mut ponies = self.ponies.lock();
            let before = ponies.len();
            ponies.retain(|pony| &pony.id != id);
            before - ponies.len()
        };
        tracing::debug!(%id, removed, "in-memory delete");

        self.wait_latency().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PonyColor;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn names(ponies: &[Pony]) -> Vec<&str> {
        ponies.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn search_is_case_insensitive_and_ordered() {
        let service = InMemoryPonyService::new();

        let found = service.search("R").await.unwrap();
        assert_eq!(
            names(&found),
            vec!["Blue mystery", "Green landscape", "Orange light", "Purple rain"]
        );

        let found = service.search("rain").await.unwrap();
        assert_eq!(names(&found), vec!["Purple rain"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_matches_all() {
        let service = InMemoryPonyService::new();
        assert_eq!(service.search("").await.unwrap().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn search_waits_the_latency() {
        let service = InMemoryPonyService::new().with_latency(Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        service.search("b").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_removes_only_that_pony() {
        let service = InMemoryPonyService::new();

        service.delete(&PonyId::from("p1")).await.unwrap();

        assert_eq!(service.len(), 4);
        assert!(service.search("blue").await.unwrap().is_empty());
        assert_eq!(service.search("purple").await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_is_idempotent() {
        let service = InMemoryPonyService::new();

        service.delete(&PonyId::from("p1")).await.unwrap();
        service.delete(&PonyId::from("p1")).await.unwrap();
        service.delete(&PonyId::from("nope")).await.unwrap();

        assert_eq!(service.len(), 4);
    }

    #[test]
    fn with_ponies_rejects_duplicate_ids() {
        let result = InMemoryPonyService::with_ponies(vec![
            Pony::new("p1", "Blue mystery", PonyColor::Blue),
            Pony::new("p1", "Purple rain", PonyColor::Purple),
        ]);

        assert!(matches!(result, Err(ConfigError::DuplicateSeedId(id)) if id.as_str() == "p1"));
    }

    fn arb_pony() -> impl Strategy<Value = Pony> {
        (
            "[a-zA-Z ]{0,12}",
            proptest::sample::select(PonyColor::ALL.to_vec()),
        )
            .prop_map(|(name, color)| Pony::new("tmp", name, color))
    }

    proptest! {
        #[test]
        fn search_count_matches_filter(
            ponies in proptest::collection::vec(arb_pony(), 0..12),
            query in "[a-zA-Z ]{0,3}",
        ) {
            let ponies: Vec<Pony> = ponies
                .into_iter()
                .enumerate()
                .map(|(i, p)| Pony::new(format!("p{i}"), p.name, p.color))
                .collect();
            let expected = ponies
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&query.to_lowercase()))
                .count();

            let service = InMemoryPonyService::with_ponies(ponies)
                .unwrap()
                .with_latency(Duration::ZERO);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let found = runtime.block_on(service.search(&query)).unwrap();

            prop_assert_eq!(found.len(), expected);
        }
    }
}
