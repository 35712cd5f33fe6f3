/// Receives the side effects the pipeline produces for failed requests.
///
/// The host decides how to present a notification and what navigating to a
/// route means for it.
pub trait PipelineListener: Send + Sync {
    fn notify(&self, message: &str);
    fn navigate(&self, route: &str);
}

/// Drops every side effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentListener;

impl PipelineListener for SilentListener {
    fn notify(&self, _message: &str) {}
    fn navigate(&self, _route: &str) {}
}
