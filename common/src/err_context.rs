//! Minimal error context plumbing.
//!
//! Every error enum in the workspace is built by hand, so instead of a
//! backtrace crate each fallible call tags its error with a short
//! human-readable context string. `From<ErrorContext<E>>` impls on the
//! enums then turn the pair into the right variant.

/// An error of type `E` paired with the context string of the call
/// site that produced it.
pub struct ErrorContext<E>(pub String, pub E);

/// Extends `Result` with a `context` method, mirroring how the
/// workspace's error enums consume `ErrorContext` through `From`.
pub trait ErrorContextExt<T, E> {
    fn context<C: AsRef<str> + 'static>(self, c: C) -> Result<T, ErrorContext<E>>;
}

impl<T, E> ErrorContextExt<T, E> for Result<T, E> {
    fn context<C: AsRef<str> + 'static>(self, c: C) -> Result<T, ErrorContext<E>> {
        let s = c.as_ref();
        self.map_err(|e| ErrorContext(s.into(), e))
    }
}
