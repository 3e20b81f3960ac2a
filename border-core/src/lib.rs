#![warn(missing_docs)]
//! Core components for turning recorded demonstrations into training examples.
//!
//! A demonstration trajectory is copied step by step into a fixed-capacity
//! [`TrajectoryBufferBuilder`]. Once populated, the builder is frozen into a
//! read-only [`TrajectoryBuffer`], whose usable step offsets are then sampled
//! and partitioned into train/validation index lists by [`split_buffers`].
//!
//! ```
//! # use anyhow::Result;
//! use border_core::trajectory_buffer::{split_index, SplitConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # fn main() -> Result<()> {
//! let config = SplitConfig::default()
//!     .context_length(10)
//!     .scale(150)
//!     .train_split(0.8);
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! // A buffer holding 160 transitions leaves 150 usable offsets.
//! let split = split_index(160, &config, &mut rng).unwrap();
//! assert_eq!(split.train.len(), 120);
//! assert_eq!(split.valid.len(), 30);
//! # Ok(())
//! # }
//! ```
//!
//! [`TrajectoryBufferBuilder`]: trajectory_buffer::TrajectoryBufferBuilder
//! [`TrajectoryBuffer`]: trajectory_buffer::TrajectoryBuffer
//! [`split_buffers`]: trajectory_buffer::split_buffers
pub mod error;
pub mod trajectory_buffer;

mod base;
pub use base::{BatchBase, ExperienceBufferBase};
pub use error::BorderError;
