use hdl_codegen::BitcodeError;
use thiserror::Error;

/// A fault raised while running native code.
///
/// During folding these only mean "evaluate at run time instead"; the
/// simulation will report the same fault with proper context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("assertion failed in {function}")]
    AssertionFailed { function: String },
    #[error("value {value} outside {low} to {high} in {function}")]
    OutOfRange {
        function: String,
        value: i64,
        low: i64,
        high: i64,
    },
    #[error("array of length {found} where {expected} elements are required in {function}")]
    LengthMismatch {
        function: String,
        expected: u64,
        found: u64,
    },
    #[error("integer overflow in {function}")]
    Overflow { function: String },
    #[error("call to unresolved function {0}")]
    Unresolved(String),
    #[error("wait executed inside function {function}")]
    WaitInFunction { function: String },
    #[error("call depth limit of {0} exceeded")]
    CallDepth(usize),
    #[error("step limit of {0} exceeded")]
    StepLimit(u64),
    #[error("function {function} returned an array")]
    NonScalarResult { function: String },
    #[error("malformed native code in {function}: {reason}")]
    Malformed {
        function: String,
        reason: &'static str,
    },
}

/// A condition that must abort compilation.
#[derive(Debug, Error)]
pub enum FoldError {
    /// The artifact of a unit the front end says exists cannot be read.
    #[error("error reading bitcode {0}")]
    Bitcode(#[from] BitcodeError),
    /// A unit's artifact does not define the symbol the front end assigned.
    #[error("cannot find native code for {symbol} in unit {unit}")]
    MissingSymbol { symbol: String, unit: String },
    /// A freshly compiled thunk is not resolvable after linking.
    #[error("cannot find native code for thunk {0}")]
    MissingThunk(String),
}
