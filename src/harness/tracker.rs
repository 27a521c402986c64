//! harness::tracker
//!
//! Registry of produced artifacts and their reversal paths.
//!
//! Every side effect a build step produces registers a scheme-qualified
//! identifier (`file://bin/cape`, `docker://cape/coordinator`,
//! `kind://cape-dev`) together with an async cleanup. A single global
//! clean drains the registry, invoking each cleanup exactly once in
//! registration order and aggregating failures.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use tracing::info;

use crate::core::errors::{causes, Error};

use super::runner::AggregateError;

type CleanupFuture = Pin<Box<dyn Future<Output = Result<(), Error>> + Send>>;

type Cleanup = Box<dyn FnOnce() -> CleanupFuture + Send>;

struct Artifact {
    id: String,
    cleanup: Cleanup,
}

/// Ordered artifact registry.
#[derive(Default)]
pub struct Tracker {
    artifacts: Mutex<Vec<Artifact>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact with its cleanup.
    ///
    /// # Errors
    ///
    /// Bad-request when the id lacks a scheme; conflict when the id is
    /// already registered.
    pub fn add<F, Fut>(&self, id: impl Into<String>, cleanup: F) -> Result<(), Error>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let cleanup: Cleanup = Box::new(move || {
            let fut: CleanupFuture = Box::pin(cleanup());
            fut
        });
        let id = id.into();
        if !id.contains("://") {
            return Err(Error::bad_request(
                causes::DUPLICATE_ARTIFACT,
                format!("artifact id '{}' is not scheme-qualified", id),
            ));
        }
        let mut artifacts = self.artifacts.lock().unwrap();
        if artifacts.iter().any(|a| a.id == id) {
            return Err(Error::conflict(
                causes::DUPLICATE_ARTIFACT,
                format!("artifact '{}' is already registered", id),
            ));
        }
        artifacts.push(Artifact { id, cleanup });
        Ok(())
    }

    /// Registered artifact ids, in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.artifacts
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.id.clone())
            .collect()
    }

    /// Invoke every registered cleanup, sequentially in registration
    /// order, and report all failures.
    ///
    /// The registry is drained up front, so each cleanup runs exactly
    /// once even when some of them fail.
    pub async fn clean(&self) -> Result<(), AggregateError> {
        let drained: Vec<Artifact> = self.artifacts.lock().unwrap().drain(..).collect();

        let mut errors = Vec::new();
        for artifact in drained {
            info!(artifact = %artifact.id, "cleaning artifact");
            if let Err(err) = (artifact.cleanup)().await {
                errors.push(err.with_message(format!("while cleaning '{}'", artifact.id)));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AggregateError::new(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn noop() -> Result<(), Error> {
        Ok(())
    }

    #[test]
    fn unqualified_ids_rejected() {
        let tracker = Tracker::new();
        assert!(tracker.add("bin/cape", noop).is_err());
        assert!(tracker.add("file://bin/cape", noop).is_ok());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let tracker = Tracker::new();
        tracker.add("docker://cape/coordinator", noop).unwrap();
        let err = tracker.add("docker://cape/coordinator", noop).unwrap_err();
        assert!(err.is(causes::DUPLICATE_ARTIFACT));
    }

    #[tokio::test]
    async fn clean_runs_each_cleanup_once_in_order() {
        let tracker = Tracker::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let runs = Arc::new(AtomicUsize::new(0));

        for id in ["file://one", "kind://two", "docker://three"] {
            let order = order.clone();
            let runs = runs.clone();
            tracker
                .add(id, move || async move {
                    order.lock().unwrap().push(id);
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap();
        }

        tracker.clean().await.unwrap();
        assert_eq!(
            *order.lock().unwrap(),
            vec!["file://one", "kind://two", "docker://three"]
        );
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        // A second clean has nothing left to do.
        tracker.clean().await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn clean_aggregates_failures_and_keeps_going() {
        let tracker = Tracker::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let failing_runs = runs.clone();
        tracker
            .add("docker://broken", move || async move {
                failing_runs.fetch_add(1, Ordering::SeqCst);
                Err(Error::internal(causes::COMMAND_FAILED, "rmi failed"))
            })
            .unwrap();
        let passing_runs = runs.clone();
        tracker
            .add("file://fine", move || async move {
                passing_runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        let err = tracker.clean().await.unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert!(err.any(causes::COMMAND_FAILED));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
