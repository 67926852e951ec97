use thiserror::Error;

/// Errors that can occur while preparing a task for execution.
#[derive(Debug, Error)]
pub enum TaskError {
  /// A prompt template failed to render.
  #[error("failed to render {template} prompt: {message}")]
  Template {
    template: &'static str,
    message: String,
  },
}
