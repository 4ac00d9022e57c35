use domain::{Notice, Notifier};

/// Notification sink that forwards outcomes to the log. The real UI toast
/// widget lives outside this system; anything implementing [`Notifier`]
/// can be swapped in at wiring time.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn report(&self, notice: Notice) {
        match notice {
            Notice::Success(message) => tracing::info!(%message, "cart notice"),
            Notice::Failure(message) => tracing::warn!(%message, "cart notice"),
        }
    }
}
