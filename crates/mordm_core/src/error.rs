use std::fmt;

/// Errors raised while validating a problem definition
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemError {
    NoVariables,
    NoObjectives,
    BoundsLength {
        expected: usize,
        actual: usize,
    },
    InvertedBounds {
        index: usize,
        lower: f64,
        upper: f64,
    },
    NamesLength {
        expected: usize,
        actual: usize,
    },
    DuplicateName(String),
    EpsilonsLength {
        expected: usize,
        actual: usize,
    },
    NonPositiveEpsilon {
        index: usize,
        value: f64,
    },
    MaximizeOutOfRange {
        index: usize,
        n_objs: usize,
    },
    MissingTarget,
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemError::NoVariables => write!(f, "problem must have at least one variable"),
            ProblemError::NoObjectives => write!(f, "problem must have at least one objective"),
            ProblemError::BoundsLength { expected, actual } => {
                write!(f, "expected {expected} bounds, got {actual}")
            }
            ProblemError::InvertedBounds {
                index,
                lower,
                upper,
            } => write!(
                f,
                "lower bound {lower} exceeds upper bound {upper} for variable {index}"
            ),
            ProblemError::NamesLength { expected, actual } => {
                write!(f, "expected {expected} names, got {actual}")
            }
            ProblemError::DuplicateName(name) => write!(f, "duplicate name '{name}'"),
            ProblemError::EpsilonsLength { expected, actual } => {
                write!(f, "expected {expected} epsilons, got {actual}")
            }
            ProblemError::NonPositiveEpsilon { index, value } => {
                write!(f, "epsilon {index} must be positive, got {value}")
            }
            ProblemError::MaximizeOutOfRange { index, n_objs } => write!(
                f,
                "maximize index {index} out of range for {n_objs} objectives"
            ),
            ProblemError::MissingTarget => {
                write!(f, "problem needs an evaluation function or command")
            }
        }
    }
}

impl std::error::Error for ProblemError {}

/// Errors raised by sampling, evaluation, sensitivity and robustness operations
#[derive(Debug)]
pub enum MordmError {
    /// Design or response arity does not match the problem
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    /// External evaluation output could not be parsed
    ProtocolViolation { line: usize, reason: String },
    /// Design generation produced unusable cells
    InvalidDesign { method: String, reason: String },
    UnknownColumn {
        name: String,
        available: Vec<String>,
    },
    UnknownMethod {
        name: String,
        available: Vec<&'static str>,
    },
    UnsupportedInput(String),
    InvalidProblem(ProblemError),
    Io(std::io::Error),
    /// External process exited unsuccessfully
    ProcessFailed { program: String, status: String },
}

impl fmt::Display for MordmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MordmError::DimensionMismatch {
                context,
                expected,
                actual,
            } => write!(
                f,
                "dimension mismatch in {context}: expected {expected}, got {actual}"
            ),
            MordmError::ProtocolViolation { line, reason } => {
                write!(f, "protocol violation on output line {line}: {reason}")
            }
            MordmError::InvalidDesign { method, reason } => write!(
                f,
                "invalid design for method '{method}': {reason}; try a different method or sample count"
            ),
            MordmError::UnknownColumn { name, available } => write!(
                f,
                "unknown column '{name}', expected one of: {}",
                available.join(", ")
            ),
            MordmError::UnknownMethod { name, available } => write!(
                f,
                "unknown method '{name}', expected one of: {}",
                available.join(", ")
            ),
            MordmError::UnsupportedInput(msg) => write!(f, "unsupported input: {msg}"),
            MordmError::InvalidProblem(e) => write!(f, "invalid problem: {e}"),
            MordmError::Io(e) => write!(f, "io error: {e}"),
            MordmError::ProcessFailed { program, status } => {
                write!(f, "process '{program}' failed: {status}")
            }
        }
    }
}

impl std::error::Error for MordmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MordmError::InvalidProblem(e) => Some(e),
            MordmError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProblemError> for MordmError {
    fn from(e: ProblemError) -> Self {
        MordmError::InvalidProblem(e)
    }
}

impl From<std::io::Error> for MordmError {
    fn from(e: std::io::Error) -> Self {
        MordmError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, MordmError>;
