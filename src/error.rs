use thiserror::Error;

/// Internal-misuse errors. Ordinary user input never produces these: empty
/// clicks, undersized selections, and missed link targets are silent no-ops.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    /// A tool name arrived that no mode answers to. Tool names come from the
    /// host's toolbar wiring, so this is a configuration defect.
    #[error("unknown tool mode `{0}`")]
    UnknownMode(String),

    /// The link type of a mode that does not draw links was requested.
    #[error("tool mode `{0}` has no link type")]
    NotLinkMode(&'static str),
}
