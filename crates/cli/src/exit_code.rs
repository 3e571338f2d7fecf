//! Process exit codes
//!
//! The CLI has a deliberately small exit code contract: 0 on success, 1 on
//! any failure. Scripts should parse the `[<ErrorKind>]` prefix of the
//! failure output when they need the error class.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Failure,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failure => 1,
        }
    }
}
