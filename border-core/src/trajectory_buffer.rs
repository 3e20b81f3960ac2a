//! Fixed-capacity buffers holding the transitions of a single trajectory.
//!
//! The lifecycle of a buffer has two phases:
//!
//! 1. [`TrajectoryBufferBuilder`] is created empty with declared row shapes and
//!    populated by pushing [`GenericTransition`]s, one step at a time. The write
//!    cursor never wraps and never exceeds the capacity.
//! 2. [`TrajectoryBufferBuilder::freeze`] turns it into a read-only
//!    [`TrajectoryBuffer`]. The only remaining mutation is a one-time
//!    assignment of train/validation indices, done by [`split_buffers`].
mod base;
mod config;
mod split;
mod transition;
pub use base::{TrajectoryBuffer, TrajectoryBufferBuilder};
pub use config::TrajectoryBufferConfig;
pub use split::{split_buffers, split_index, IndexSplit, SplitConfig};
pub use transition::GenericTransition;
