//! harness::runner
//!
//! Concurrent lifecycle fan-out with aggregated error reporting.
//!
//! # Design
//!
//! `run` spawns one tokio task per dependency and joins them all
//! before returning. Tasks are independent; no ordering exists between
//! them. Every failure lands in a shared [`Buffer`] in completion
//! order and the caller receives the whole set as an
//! [`AggregateError`]; the first entry decides the category and cause
//! when the aggregate is flattened to a single error.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tracing::warn;

use crate::core::errors::{Cause, Error};

use super::Dependency;

/// Mutex-guarded append-only list.
#[derive(Debug, Default)]
pub struct Buffer<T> {
    items: Mutex<Vec<T>>,
}

impl<T: Clone> Buffer<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Append one item.
    pub fn add(&self, item: T) {
        self.items.lock().unwrap().push(item);
    }

    /// Snapshot of the current contents.
    pub fn get(&self) -> Vec<T> {
        self.items.lock().unwrap().clone()
    }
}

/// Every failure from one fan-out, in completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    errors: Vec<Error>,
}

impl AggregateError {
    /// Build from a non-empty error list.
    pub fn new(errors: Vec<Error>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    /// The first failure to complete.
    pub fn first(&self) -> &Error {
        &self.errors[0]
    }

    /// All failures.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Whether any failure carries the given cause.
    pub fn any(&self, cause: Cause) -> bool {
        self.errors.iter().any(|e| e.is(cause))
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl std::error::Error for AggregateError {}

impl From<AggregateError> for Error {
    /// Flatten to a single error keyed by the first failure, keeping
    /// every message.
    fn from(aggregate: AggregateError) -> Self {
        let first = aggregate.first();
        let mut error = Error::new(first.category(), first.cause(), first.to_string());
        for other in &aggregate.errors[1..] {
            error = error.with_message(other.to_string());
        }
        error
    }
}

/// Fan `f` out across the dependencies, one task each, and join them
/// all before returning.
pub async fn run<F, Fut>(
    deps: Vec<Arc<dyn Dependency>>,
    f: F,
) -> Result<(), AggregateError>
where
    F: Fn(Arc<dyn Dependency>) -> Fut,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    let errors = Arc::new(Buffer::new());
    let mut tasks = JoinSet::new();

    for dep in deps {
        let errors = errors.clone();
        let name = dep.name().to_string();
        let fut = f(dep);
        tasks.spawn(async move {
            if let Err(err) = fut.await {
                warn!(dependency = %name, error = %err, "lifecycle step failed");
                errors.add(err);
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if joined.is_err() {
            // A panicked task still fails the run as a whole.
            errors.add(Error::internal(
                crate::core::errors::causes::COMMAND_FAILED,
                "a lifecycle task panicked",
            ));
        }
    }

    let collected = errors.get();
    if collected.is_empty() {
        Ok(())
    } else {
        Err(AggregateError::new(collected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::causes;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Counting {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Dependency for Counting {
        fn name(&self) -> &str {
            self.name
        }
        async fn check(&self) -> Result<(), Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::internal(
                    causes::TOOL_MISSING,
                    format!("{} is not installed", self.name),
                ))
            } else {
                Ok(())
            }
        }
        async fn setup(&self) -> Result<(), Error> {
            Ok(())
        }
        async fn clean(&self) -> Result<(), Error> {
            Ok(())
        }
    }

    fn dep(name: &'static str, calls: &Arc<AtomicUsize>, fail: bool) -> Arc<dyn Dependency> {
        Arc::new(Counting {
            name,
            calls: calls.clone(),
            fail,
        })
    }

    #[tokio::test]
    async fn every_dependency_runs_even_after_a_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deps = vec![
            dep("alpha", &calls, true),
            dep("beta", &calls, false),
            dep("gamma", &calls, true),
        ];

        let err = run(deps, |d| async move { d.check().await })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.errors().len(), 2);
        assert!(err.any(causes::TOOL_MISSING));
    }

    #[tokio::test]
    async fn success_when_nothing_fails() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deps = vec![dep("alpha", &calls, false), dep("beta", &calls, false)];
        run(deps, |d| async move { d.check().await })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn flattening_keeps_the_first_error_authoritative() {
        let aggregate = AggregateError::new(vec![
            Error::internal(causes::TOOL_MISSING, "docker is not installed"),
            Error::internal(causes::COMMAND_FAILED, "kind exited with status 1"),
        ]);
        let flat: Error = aggregate.into();
        assert!(flat.is(causes::TOOL_MISSING));
        assert!(flat.to_string().contains("kind exited"));
    }

    #[test]
    fn buffer_snapshots_in_insertion_order() {
        let buffer = Buffer::new();
        buffer.add(1);
        buffer.add(2);
        buffer.add(3);
        assert_eq!(buffer.get(), vec![1, 2, 3]);
    }
}
