//! Train/validation split of step offsets.
use super::TrajectoryBuffer;
use crate::{BatchBase, BorderError};
use anyhow::Result;
use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Step offsets of a buffer assigned to training and validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexSplit {
    /// Offsets used for training, in sampled order.
    pub train: Vec<usize>,

    /// Offsets used for validation, in sampled order.
    pub valid: Vec<usize>,
}

impl IndexSplit {
    /// Returns the total number of offsets.
    pub fn len(&self) -> usize {
        self.train.len() + self.valid.len()
    }

    /// Returns `true` if no offset is assigned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration of the index split.
///
/// ```
/// use border_core::trajectory_buffer::SplitConfig;
///
/// let config = SplitConfig::default()
///     .context_length(10)
///     .scale(150)
///     .train_split(0.8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SplitConfig {
    /// Length of the action window attached to each sampled offset.
    pub context_length: usize,

    /// Maximum number of offsets sampled per buffer.
    pub scale: usize,

    /// Fraction of the sampled offsets used for training.
    pub train_split: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            context_length: 10,
            scale: 150,
            train_split: 0.8,
        }
    }
}

impl SplitConfig {
    /// Sets the length of the action window.
    pub fn context_length(mut self, v: usize) -> Self {
        self.context_length = v;
        self
    }

    /// Sets the maximum number of offsets sampled per buffer.
    pub fn scale(mut self, v: usize) -> Self {
        self.scale = v;
        self
    }

    /// Sets the fraction of the sampled offsets used for training.
    pub fn train_split(mut self, v: f64) -> Self {
        self.train_split = v;
        self
    }

    /// Checks that `train_split` is in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.train_split) {
            return Err(BorderError::InvalidConfig(format!(
                "train_split must be in [0, 1], got {}",
                self.train_split
            ))
            .into());
        }
        Ok(())
    }

    /// Loads [`SplitConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SplitConfig`] to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Samples and partitions the usable offsets of a buffer with `len` transitions.
///
/// Returns `None` if `len <= context_length`, as no offset has a complete
/// action window. Otherwise `min(scale, len - context_length)` distinct
/// offsets are drawn uniformly from `[0, len - context_length)`. The first
/// `floor(n * train_split)` of them, in sampled order, go to training and the
/// rest to validation.
pub fn split_index<R: Rng + ?Sized>(
    len: usize,
    config: &SplitConfig,
    rng: &mut R,
) -> Option<IndexSplit> {
    if len <= config.context_length {
        return None;
    }

    let total = len - config.context_length;
    let scale = config.scale.min(total);
    let mut train = index::sample(rng, total, scale).into_vec();
    let n_train = (scale as f64 * config.train_split).floor() as usize;
    let valid = train.split_off(n_train);

    Some(IndexSplit { train, valid })
}

/// Assigns train/validation offsets to every buffer with enough transitions.
///
/// Buffers not longer than `context_length` are skipped and contribute no
/// example. Returns the number of buffers that were split.
///
/// The result depends only on the state of `rng`, so seeding it (e.g. with
/// `StdRng::seed_from_u64`) makes the split reproducible.
pub fn split_buffers<O, A, R>(
    buffers: &mut [TrajectoryBuffer<O, A>],
    config: &SplitConfig,
    rng: &mut R,
) -> Result<usize>
where
    O: BatchBase,
    A: BatchBase,
    R: Rng + ?Sized,
{
    config.validate()?;

    let mut n_split = 0;
    let (mut n_train, mut n_valid) = (0, 0);

    for (i, buffer) in buffers.iter_mut().enumerate() {
        match split_index(buffer.len(), config, rng) {
            Some(split) => {
                n_train += split.train.len();
                n_valid += split.valid.len();
                buffer.set_split(split)?;
                n_split += 1;
            }
            None => {
                log::debug!(
                    "Skipped buffer {}: {} transitions <= context length {}",
                    i,
                    buffer.len(),
                    config.context_length
                );
            }
        }
    }

    log::info!("The demo dataset in the replay buffer has been split.");
    log::info!(
        "{} of {} buffers split, {} train and {} validation indices",
        n_split,
        buffers.len(),
        n_train,
        n_valid
    );

    Ok(n_split)
}
