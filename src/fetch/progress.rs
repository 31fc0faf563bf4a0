/// Sink for progress updates while countries are retrieved.
pub trait Progress: Send + Sync {
    /// Label shown next to the indicator, e.g. "Fetching".
    fn set_phase(&self, phase: &str);

    /// Switch to a bounded indicator.
    ///
    /// The callback is polled for `(total, completed, message)`.
    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>);

    /// Switch to a spinner whose message is polled from the callback.
    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>);

    /// Remove the indicator.
    fn done(&self);
}

/// Progress sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn set_phase(&self, _phase: &str) {}
    fn set_determinate(&self, _callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {}
    fn set_indeterminate(&self, _callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {}
    fn done(&self) {}
}
