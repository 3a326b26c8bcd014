// Error types shared by all download engines

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Engine is installed but not usable right now (e.g. the file-host
    /// manager application is not running). Triggers the one-shot fallback.
    Unavailable(String),

    /// Required external tool is missing entirely
    ToolNotFound(String),

    /// Network timeout while talking to the remote site
    NetworkTimeout,

    /// The remote site throttled or blocked the request (429, bot checks)
    RateLimited,

    /// URL rejected by the engine
    InvalidUrl(String),

    /// Failed to parse engine output
    ParseError(String),

    /// Engine ran but the invocation itself failed
    ExecutionFailed(String),

    /// Cloud upload failed; the local artifact is retained
    UploadFailed(String),

    /// Anything that does not match a known pattern
    Unknown(String),
}

impl EngineError {
    /// Whether the orchestrator should substitute the fallback engine.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::ToolNotFound(_))
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(engine) => write!(f, "Engine unavailable: {}", engine),
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
            Self::NetworkTimeout => write!(f, "Network timeout: remote site is not responding"),
            Self::RateLimited => write!(
                f,
                "Remote site is throttling requests; wait or switch networks"
            ),
            Self::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::ExecutionFailed(msg) => write!(f, "Execution error: {}", msg),
            Self::UploadFailed(msg) => write!(f, "Upload failed: {}", msg),
            Self::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

// Classify raw tool output into a variant
impl From<String> for EngineError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("not running") || lower.contains("unavailable") {
            return Self::Unavailable(s);
        }

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::NetworkTimeout;
        }

        if lower.contains("429") || lower.contains("bot") || lower.contains("blocked") {
            return Self::RateLimited;
        }

        if lower.contains("not found")
            || lower.contains("no such file")
            || lower.contains("command not found")
        {
            return Self::ToolNotFound(s);
        }

        if lower.contains("parse") || lower.contains("json") {
            return Self::ParseError(s);
        }

        if lower.contains("invalid url") || lower.contains("unsupported url") {
            return Self::InvalidUrl(s);
        }

        Self::Unknown(s)
    }
}
