//! Runtime configuration.
//!
//! Everything the chat client and visualizer would otherwise read from
//! globals lives here and is handed over at construction.

use std::time::Duration;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Sampling options forwarded with every chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling cutoff.
    pub top_p: f64,
    /// Maximum tokens to generate.
    pub num_predict: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            num_predict: 2048,
        }
    }
}

/// Configuration for the tutor chat client.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the inference server, without trailing slash.
    pub base_url: String,
    /// System prompt prepended to every conversation.
    pub system_prompt: String,
    /// Number of prior turns sent along with a new message.
    pub history_window: usize,
    /// Sampling options.
    pub options: ChatOptions,
    /// Model to select when the server lists it.
    pub preferred_model: Option<String>,
    /// Largest image attachment accepted, in bytes.
    pub max_image_bytes: u64,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Timeout for the liveness and model-listing calls.
    pub probe_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            history_window: 10,
            options: ChatOptions::default(),
            preferred_model: None,
            max_image_bytes: 10 * 1024 * 1024,
            connect_timeout: Duration::from_secs(3),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl ChatConfig {
    /// Set the base URL, trimming any trailing slashes.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Join an API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Configuration for the visualizer panel.
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    /// Target frame interval while the animation clock runs.
    pub frame_interval: Duration,
    /// Input poll interval while idle.
    pub idle_poll: Duration,
    /// Fraction of the visible span moved per pan step.
    pub pan_step: f64,
    /// Zoom multiplier per zoom step.
    pub zoom_step: f64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            idle_poll: Duration::from_millis(100),
            pan_step: 0.1,
            zoom_step: 1.25,
        }
    }
}

/// Combined application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Chat client settings.
    pub chat: ChatConfig,
    /// Visualizer settings.
    pub visualizer: VisualizerConfig,
    /// Start with the light palette.
    pub light_theme: bool,
}

/// The tutor persona sent as the first message of every conversation.
pub const SYSTEM_PROMPT: &str = "You are a calculus tutor AI assistant built into a terminal calculus \
learning application. Your role is to help students understand calculus concepts, formulas, and \
problem-solving techniques across all 7 modules of calculus.

MODULES YOU SHOULD KNOW:
1. Limits and Continuity - limits, one-sided limits, continuity, squeeze theorem
2. Derivatives - rates of change, differentiation rules, basic formulas
3. Advanced Differentiation - implicit differentiation, related rates, linear approximations
4. Exponential & Logarithmic Functions - exponential/log derivatives, inverse functions
5. Applications of Derivatives - L'Hôpital's rule, optimization, mean value theorem, graph analysis
6. Optimization & Antiderivatives - optimization problems, antiderivatives, areas and distances
7. Definite Integrals - definite integrals, evaluation techniques, Fundamental Theorem of Calculus

MATHEMATICAL FORMATTING:
Write mathematics in LaTeX notation: $expression$ for inline math and $$expression$$ for display \
math, \\frac{a}{b} for fractions, \\lim_{x \\to a} for limits, \\int_a^b for integrals.

IMAGE ANALYSIS:
When the student attaches an image (a problem, a graph, handwritten work, a calculator screen), \
describe what you see in mathematical terms, name the calculus concepts involved, solve it step by \
step if it is a problem, and point out errors in the work.

TEACHING STYLE:
Explain clearly, break problems into steps, pair intuition with rigor, prefer understanding over \
memorization, and be patient and encouraging.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ChatConfig::default().with_base_url("http://127.0.0.1:9999///");
        assert_eq!(config.endpoint("/api/chat"), "http://127.0.0.1:9999/api/chat");
        assert_eq!(config.endpoint("api/tags"), "http://127.0.0.1:9999/api/tags");
    }

    #[test]
    fn defaults_match_tutor_settings() {
        let config = ChatConfig::default();
        assert_eq!(config.history_window, 10);
        assert_eq!(config.options.num_predict, 2048);
        assert!(config.system_prompt.starts_with("You are a calculus tutor"));
    }
}
