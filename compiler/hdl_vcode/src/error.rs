use thiserror::Error;

use crate::VBlock;

/// Why an emission call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidState {
    #[error("no unit selected")]
    NoUnit,
    #[error("no such block in the selected unit")]
    NoBlock,
    #[error("block {0} is already terminated")]
    BlockFinished(VBlock),
    #[error("parameters are only allowed in function units")]
    ParamOutsideFunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VcodeError {
    #[error("invalid vcode state: {0}")]
    InvalidState(#[from] InvalidState),
}
