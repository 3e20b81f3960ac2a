//! Training examples from [ManiSkill](https://maniskill.readthedocs.io) demonstrations.
//!
//! This crate turns recorded robot-manipulation trajectories into examples for
//! a model predicting a sequence of actions from a camera image and the
//! proprioceptive state of the robot. The pipeline is:
//!
//! 1. A [`DemoLoader`] reads trajectories from a demonstration archive.
//! 2. [`build_buffers`] copies each trajectory into its own
//!    [`ManiSkillBuffer`], one transition per step.
//! 3. [`split_buffers`] samples usable step offsets of each buffer and
//!    partitions them into train/validation indices.
//! 4. [`assemble`] flattens the indices of all buffers into a train
//!    [`ExampleSet`] and a validation [`ExampleSet`].
//! 5. [`ExampleDataset`] serves the examples one at a time, converting images
//!    with an [`ImageTransform`].
//!
//! [`get_dataset`] runs steps 1 to 4.
//!
//! # Example
//!
//! ```ignore
//! # use anyhow::Result;
//! use border_maniskill::{get_dataset_seeded, ExampleDataset, H5pyLoader, ManiSkillDatasetConfig, ToTensor};
//!
//! fn main() -> Result<()> {
//!     let config = ManiSkillDatasetConfig::default()
//!         .demo_path("trajectory.rgb.pd_ee_delta_pos.physx_cpu.h5")
//!         .num_queries(2)
//!         .scale(150)
//!         .train_split(0.8)
//!         .context_length(10)
//!         .seed(Some(42));
//!
//!     let (train_set, _valid_set) = get_dataset_seeded(&config, &H5pyLoader::default())?;
//!     let dataset = ExampleDataset::new(train_set, ToTensor::default());
//!     let example = dataset.get(2)?;
//!     println!("{:?}", example.action_sequence.shape());
//!
//!     Ok(())
//! }
//! ```
//!
//! The example requires the `h5py` feature, which reads archives through
//! Python's `h5py` package.
//!
//! [`split_buffers`]: border_core::trajectory_buffer::split_buffers
mod assembler;
mod batch;
mod builder;
mod config;
mod dataset;
mod loader;
mod transform;
pub mod util;
pub use assembler::{assemble, ExampleSet};
pub use batch::{ManiSkillActBatch, ManiSkillObsBatch, ObsShape};
pub use builder::{build_buffers, trajectory_to_buffer, ManiSkillBuffer};
pub use config::ManiSkillDatasetConfig;
pub use dataset::{get_dataset, get_dataset_seeded, Example, ExampleDataset};
#[cfg(feature = "h5py")]
pub use loader::H5pyLoader;
pub use loader::{DemoLoader, DemoTrajectory, InMemoryLoader};
pub use transform::{ImageTransform, Normalize, ToTensor, ToTensorConfig};
