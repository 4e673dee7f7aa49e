use tokio::task::JoinHandle;

/// Run a blocking task on a dedicated thread while keeping the caller's span.
/// Password hashing is CPU bound and must not block the async executor.
pub fn spawn_blocking_with_tracing<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let current_span = tracing::Span::current();
    tokio::task::spawn_blocking(move || current_span.in_scope(f))
}
