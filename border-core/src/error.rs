//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// Fallible functions return [`anyhow::Result`]; these variants can be
/// recovered with `err.downcast_ref::<BorderError>()`.
#[derive(Error, Debug, PartialEq)]
pub enum BorderError {
    /// Writing rows at the cursor would exceed the capacity of a buffer.
    #[error("Capacity overflow: {requested} rows at cursor {cursor} exceed capacity {capacity}")]
    CapacityOverflow {
        /// Capacity of the buffer.
        capacity: usize,
        /// Write cursor when the write was attempted.
        cursor: usize,
        /// Number of rows requested.
        requested: usize,
    },

    /// Shapes or step counts of a field disagree.
    #[error("Shape mismatch in {field}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Name of the field.
        field: String,
        /// Expected shape or step count.
        expected: String,
        /// Actual shape or step count.
        actual: String,
    },

    /// Split indices were assigned to a buffer more than once.
    #[error("Split indices are already assigned to the buffer")]
    AlreadySplit,

    /// Split indices are not disjoint or fall outside of the populated range.
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// An action window does not fit in the populated range of a buffer.
    #[error("Action window [{offset}, {offset} + {context_length}) exceeds populated length {len}")]
    ActionWindowOutOfRange {
        /// First step of the window.
        offset: usize,
        /// Length of the window.
        context_length: usize,
        /// Number of populated steps.
        len: usize,
    },

    /// Index is out of the populated range.
    #[error("Index {index} is out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of available items.
        len: usize,
    },

    /// Configuration value is invalid.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
