/// Outcome message pushed to the user-visible notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

/// Fire-and-forget outcome reporting. Never queried for state; a report
/// has no result and no acknowledgement.
pub trait Notifier: Send + Sync {
    fn report(&self, notice: Notice);
}
