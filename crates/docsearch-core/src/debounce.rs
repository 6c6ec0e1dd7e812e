use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::SearchResult;
use crate::store::DocumentStore;

/// Runs a job after a quiet period.
///
/// Every [`Debouncer::schedule`] supersedes the ones before it: a job whose
/// delay elapses after a newer schedule does not run. Jobs that already
/// started are not interrupted.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `job` after the delay unless superseded. The handle resolves to
    /// whether the job ran. Must be called inside a tokio runtime.
    pub fn schedule<F>(&self, job: F) -> JoinHandle<bool>
    where
        F: FnOnce() + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != ticket {
                return false;
            }
            job();
            true
        })
    }

    /// Supersede every pending job.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Search-as-you-type over a [`DocumentStore`].
///
/// Results are replaced as a whole each time a search finishes; subscribe
/// to be told when that happens.
pub struct LiveSearch {
    store: Arc<DocumentStore>,
    debouncer: Debouncer,
    results: Arc<watch::Sender<Vec<SearchResult>>>,
}

impl LiveSearch {
    pub fn new(store: Arc<DocumentStore>, delay: Duration) -> Self {
        let (results, _) = watch::channel(Vec::new());
        LiveSearch {
            store,
            debouncer: Debouncer::new(delay),
            results: Arc::new(results),
        }
    }

    /// The query text changed. A blank query clears the results at once;
    /// anything else is searched after the debounce delay.
    pub fn set_query(&self, query: &str) -> Option<JoinHandle<bool>> {
        if query.trim().is_empty() {
            self.debouncer.cancel();
            self.results.send_replace(Vec::new());
            return None;
        }

        let store = Arc::clone(&self.store);
        let results = Arc::clone(&self.results);
        let query = query.to_string();
        Some(self.debouncer.schedule(move || {
            let found = store.search(&query);
            tracing::debug!(query = %query, hits = found.len(), "live search finished");
            results.send_replace(found);
        }))
    }

    /// Search right away, bypassing the delay.
    pub fn search_now(&self, query: &str) -> Vec<SearchResult> {
        self.debouncer.cancel();
        let found = self.store.search(query);
        self.results.send_replace(found.clone());
        found
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<SearchResult>> {
        self.results.subscribe()
    }
}
