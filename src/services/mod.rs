pub mod ai_service; // Completion client seam
pub mod metrics;
pub mod openrouter; // OpenRouter chat completions
pub mod prompt;

pub use ai_service::{CompletionError, CompletionService};
pub use metrics::compute_metrics;
pub use openrouter::OpenRouterService;
