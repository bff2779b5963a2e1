//! User-facing notification side channel.

/// Fire-and-forget user notifications.
///
/// Messages are transient: never persisted, never queryable, and must not
/// block the caller. At most one notification is emitted per failed API
/// call, and none on success.
pub trait Notifier: Send + Sync {
    /// Surface a success message.
    fn success(&self, message: &str);

    /// Surface a failure message.
    fn error(&self, message: &str);
}

/// Notifier that emits structured tracing events.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "resona::notify", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "resona::notify", "{message}");
    }
}
