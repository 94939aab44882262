use std::error;
use std::fmt;

/// Classifies engine failures for the embedding host.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed input, e.g. an invalid record content type.
    InvalidInput,
    /// Allocation failure.
    NoMemory,
    /// Operation not allowed in the current session state.
    BadState,
    /// The session was closed by the peer mid-operation.
    Cancelled,
    /// Feature not implemented.
    Unsupported,
}

/// A failure record carrying its origin in the engine source.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Fault {
    pub kind: ErrorKind,
    pub msg: String,
    pub file: &'static str,
    pub line: u32,
}

impl Fault {
    #[inline]
    pub fn new(kind: ErrorKind, msg: String, file: &'static str, line: u32) -> Fault {
        Fault { kind, msg, file, line }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}:{}] {:?}: {}", self.file, self.line, self.kind, self.msg)
    }
}

impl error::Error for Fault {}

/// Constructs a `Fault` capturing the raise site.
#[macro_export]
macro_rules! fault {
    ($kind:expr, $($arg:tt)*) => {
        $crate::error::Fault::new($kind, format!($($arg)*), file!(), line!())
    };
}

/// Internal result plumbing. `Wait` is not a failure, it signals that the
/// operation cannot make progress until the host feeds more bytes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EngineError {
    Wait,
    Fatal(Fault),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Unwraps the fault of a fatal error, `None` for `Wait`.
    #[inline]
    pub fn into_fault(self) -> Option<Fault> {
        match self {
            EngineError::Wait => None,
            EngineError::Fatal(fault) => Some(fault),
        }
    }
}

impl From<Fault> for EngineError {
    #[inline]
    fn from(fault: Fault) -> Self {
        EngineError::Fatal(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_macro_captures_site() {
        let fault = fault!(ErrorKind::InvalidInput, "Invalid content type: {}", 255);

        assert_eq!(fault.kind, ErrorKind::InvalidInput);
        assert_eq!(fault.msg, "Invalid content type: 255");
        assert_eq!(fault.file, file!());
        assert!(fault.line > 0);
    }

    #[test]
    fn test_wait_is_not_a_fault() {
        assert_eq!(EngineError::Wait.into_fault(), None);

        let err: EngineError = fault!(ErrorKind::BadState, "session already started").into();
        assert_eq!(err.into_fault().unwrap().kind, ErrorKind::BadState);
    }
}
