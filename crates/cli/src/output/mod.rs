//! Output configuration and formatting

mod formatter;

pub use formatter::Formatter;

/// Output configuration shared by all commands, filled from global flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON instead of human output.
    pub json: bool,
    /// Suppress informational output and progress bars.
    pub quiet: bool,
    /// Disable ANSI styling.
    pub no_color: bool,
}
