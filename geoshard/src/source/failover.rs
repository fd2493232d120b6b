//! Round-robin mirror rotation with a bounded retry budget.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use super::types::SourceError;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Well-known public Overpass API mirrors.
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];

/// Shared rotation counter. Every attempt advances it, successful or not,
/// so concurrent callers spread across mirrors.
#[derive(Debug, Default)]
pub struct MirrorRotation {
    next: AtomicUsize,
}

impl MirrorRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mirror index for this attempt and advances the counter.
    pub fn advance(&self, mirror_count: usize) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % mirror_count
    }

    /// Total number of attempts routed so far.
    pub fn attempts(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }
}

/// Routes calls across equivalent mirrors, retrying on the next mirror when
/// an attempt fails with a retryable error.
#[derive(Debug, Clone)]
pub struct FailoverRouter {
    mirrors: Vec<String>,
    max_retries: usize,
    rotation: Arc<MirrorRotation>,
}

impl FailoverRouter {
    /// Creates a router with its own rotation state.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if `mirrors` is empty.
    pub fn new(mirrors: Vec<String>) -> Result<Self, SourceError> {
        if mirrors.is_empty() {
            return Err(SourceError::MalformedInput(
                "at least one mirror is required".to_string(),
            ));
        }

        Ok(Self {
            mirrors,
            max_retries: DEFAULT_MAX_RETRIES,
            rotation: Arc::new(MirrorRotation::new()),
        })
    }

    /// Router over [`DEFAULT_MIRRORS`].
    pub fn with_default_mirrors() -> Self {
        Self {
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            max_retries: DEFAULT_MAX_RETRIES,
            rotation: Arc::new(MirrorRotation::new()),
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Shares `rotation` with other routers over the same mirror list.
    pub fn with_rotation(mut self, rotation: Arc<MirrorRotation>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn rotation(&self) -> &Arc<MirrorRotation> {
        &self.rotation
    }

    /// Runs `attempt` against successive mirrors until one succeeds.
    ///
    /// Makes at most `max_retries + 1` attempts. Non-retryable errors are
    /// returned immediately; otherwise the last error is returned once the
    /// budget is spent.
    pub async fn route<T, F, Fut>(&self, mut attempt: F) -> Result<T, SourceError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let budget = self.max_retries + 1;
        let mut last_error = None;

        for attempt_no in 1..=budget {
            let mirror = &self.mirrors[self.rotation.advance(self.mirrors.len())];
            debug!(mirror = %mirror, attempt = attempt_no, budget, "Routing request");

            match attempt(mirror.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(
                        mirror = %mirror,
                        attempt = attempt_no,
                        error = %e,
                        "Mirror attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| SourceError::Transport("no attempts were made".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn router(n: usize) -> FailoverRouter {
        let mirrors = (1..=n).map(|i| format!("https://m{}.example", i)).collect();
        FailoverRouter::new(mirrors).unwrap()
    }

    #[test]
    fn test_empty_mirror_list_rejected() {
        assert!(matches!(
            FailoverRouter::new(Vec::new()),
            Err(SourceError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_rotation_wraps() {
        let rotation = MirrorRotation::new();
        let picks: Vec<_> = (0..5).map(|_| rotation.advance(3)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1]);
        assert_eq!(rotation.attempts(), 5);
    }

    #[tokio::test]
    async fn test_success_still_advances_rotation() {
        let router = router(3);
        let seen = Mutex::new(Vec::new());

        for _ in 0..4 {
            router
                .route(|mirror| {
                    seen.lock().push(mirror);
                    async { Ok::<_, SourceError>(()) }
                })
                .await
                .unwrap();
        }

        assert_eq!(
            *seen.lock(),
            vec![
                "https://m1.example",
                "https://m2.example",
                "https://m3.example",
                "https://m1.example"
            ]
        );
    }

    #[tokio::test]
    async fn test_fails_over_to_next_mirror() {
        let router = router(3);
        let seen = Mutex::new(Vec::new());

        let result = router
            .route(|mirror| {
                seen.lock().push(mirror.clone());
                async move {
                    if mirror.ends_with("m3.example") {
                        Ok(mirror)
                    } else {
                        Err(SourceError::Transport("503".into()))
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "https://m3.example");
        assert_eq!(seen.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_last_error() {
        let router = router(3).with_max_retries(1);
        let mut calls = 0;

        let result: Result<(), _> = router
            .route(|mirror| {
                calls += 1;
                async move { Err(SourceError::Transport(mirror)) }
            })
            .await;

        assert_eq!(calls, 2);
        assert_eq!(result, Err(SourceError::Transport("https://m2.example".into())));
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let router = router(3);
        let mut calls = 0;

        let result: Result<(), _> = router
            .route(|_| {
                calls += 1;
                async { Err(SourceError::MalformedInput("bad bbox".into())) }
            })
            .await;

        assert_eq!(calls, 1);
        assert!(matches!(result, Err(SourceError::MalformedInput(_))));
    }

    #[tokio::test]
    async fn test_shared_rotation_across_routers() {
        let rotation = Arc::new(MirrorRotation::new());
        let a = router(2).with_rotation(rotation.clone());
        let b = router(2).with_rotation(rotation.clone());

        let first = a.route(|m| async move { Ok::<_, SourceError>(m) }).await.unwrap();
        let second = b.route(|m| async move { Ok::<_, SourceError>(m) }).await.unwrap();

        assert_eq!(first, "https://m1.example");
        assert_eq!(second, "https://m2.example");
        assert_eq!(rotation.attempts(), 2);
    }
}
