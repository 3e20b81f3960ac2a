//! Batch storage.
use anyhow::Result;
use std::fmt::Debug;

/// Storage for one group of parallel fields, indexed by row.
///
/// A value of this type is used both as preallocated storage inside a buffer
/// and as the rows being written into it: [`BatchBase::push`] copies all rows
/// of `data` into `self` starting at row `ix`.
///
/// ```ignore
/// struct ActBatch {
///     action: Array2<f32>,
/// }
///
/// impl BatchBase for ActBatch {
///     type Shape = usize;
///
///     fn new(capacity: usize, shape: &usize) -> Self {
///         Self { action: Array2::zeros((capacity, *shape)) }
///     }
///     // ...
/// }
/// ```
pub trait BatchBase: Sized {
    /// Shape of a single row, excluding the row dimension.
    type Shape: Clone + Debug + PartialEq;

    /// Creates zero-filled storage with `capacity` rows.
    fn new(capacity: usize, shape: &Self::Shape) -> Self;

    /// Returns the number of rows.
    fn len(&self) -> usize;

    /// Returns `true` if there is no row.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the shape of a single row.
    fn shape(&self) -> Self::Shape;

    /// Writes the rows of `data` starting at row `ix`.
    ///
    /// Fails if the row shape of `data` differs from that of `self`, or if the
    /// rows do not fit.
    fn push(&mut self, ix: usize, data: Self) -> Result<()>;

    /// Gathers the rows at `ixs` into a new batch.
    fn sample(&self, ixs: &[usize]) -> Self;
}
