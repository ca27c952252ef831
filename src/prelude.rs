use thiserror::Error;

/// Error type for relu_net
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Some vector length disagrees with the width it is used against.
    #[error("dimension mismatch: expected length {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// A class label does not index into the prediction.
    #[error("label {label} out of range for {outputs} outputs")]
    LabelOutOfRange { label: usize, outputs: usize },
    /// A network, layer or unit was built with an unusable shape.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
}

pub type Result<T> = std::result::Result<T, Error>;
