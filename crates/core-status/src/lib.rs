//! Status-code type and well-known error kinds.
//!
//! `Status` is the single currency both the HSP driver and the thread group
//! use to report outcomes to their caller: zero means success, positive
//! values are caller-defined non-fatal codes, and negative values name one of
//! the well-known error kinds below.

/// Signed status code. `0` is success, `>0` is a caller-defined non-fatal
/// code, `<0` is one of the [`ErrorKind`] values below.
pub type Status = i32;

/// Status returned when an operation completed without error.
pub const OK: Status = 0;

/// Well-known negative status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller violated a precondition (null entry, double action, `batch_size == 0`, ...).
    Misuse,
    /// The HSP frame stack exceeded its maximum depth.
    StackOverflow,
    /// The OS could not create a thread, mutex, or condition variable.
    Resource,
    /// A wait was aborted externally. Reserved; unused by the core itself.
    Interrupted,
}

impl ErrorKind {
    /// The [`Status`] value this error kind is encoded as.
    pub const fn code(self) -> Status {
        match self {
            ErrorKind::Misuse => -1,
            ErrorKind::StackOverflow => -2,
            ErrorKind::Resource => -3,
            ErrorKind::Interrupted => -4,
        }
    }

    /// Recover an [`ErrorKind`] from a negative status code, if it is one of
    /// the well-known kinds.
    pub const fn from_code(code: Status) -> Option<Self> {
        match code {
            -1 => Some(ErrorKind::Misuse),
            -2 => Some(ErrorKind::StackOverflow),
            -3 => Some(ErrorKind::Resource),
            -4 => Some(ErrorKind::Interrupted),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ErrorKind::Misuse => "caller violated a precondition",
            ErrorKind::StackOverflow => "frame stack exceeded its maximum depth",
            ErrorKind::Resource => "OS resource (thread/mutex/cond) could not be created",
            ErrorKind::Interrupted => "wait was interrupted",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ErrorKind {}
