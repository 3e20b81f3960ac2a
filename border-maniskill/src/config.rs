//! Configuration of the dataset pipeline.
use anyhow::Result;
use border_core::trajectory_buffer::{SplitConfig, TrajectoryBufferConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`get_dataset`](crate::get_dataset).
///
/// The same value is passed to every stage of the pipeline and is never
/// modified by it.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ManiSkillDatasetConfig {
    /// Path to the demonstration archive.
    pub demo_path: PathBuf,

    /// The number of trajectories to load.
    pub num_queries: usize,

    /// Maximum number of examples sampled per trajectory.
    pub scale: usize,

    /// Fraction of the sampled examples used for training.
    pub train_split: f64,

    /// Length of the action sequence of an example.
    pub context_length: usize,

    /// Capacity of the buffer of each trajectory.
    pub capacity: usize,

    /// Channel-first shape of the camera image, `[3, H, W]`.
    pub image_shape: [usize; 3],

    /// Seed of the random split. If `None`, the seed is taken from entropy.
    pub seed: Option<u64>,
}

impl Default for ManiSkillDatasetConfig {
    fn default() -> Self {
        Self {
            demo_path: PathBuf::new(),
            num_queries: 2,
            scale: 150,
            train_split: 0.8,
            context_length: 10,
            capacity: 300,
            image_shape: [3, 128, 128],
            seed: None,
        }
    }
}

impl ManiSkillDatasetConfig {
    /// Sets the path to the demonstration archive.
    pub fn demo_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.demo_path = v.into();
        self
    }

    /// Sets the number of trajectories to load.
    pub fn num_queries(mut self, v: usize) -> Self {
        self.num_queries = v;
        self
    }

    /// Sets the maximum number of examples sampled per trajectory.
    pub fn scale(mut self, v: usize) -> Self {
        self.scale = v;
        self
    }

    /// Sets the fraction of the sampled examples used for training.
    pub fn train_split(mut self, v: f64) -> Self {
        self.train_split = v;
        self
    }

    /// Sets the length of the action sequence.
    pub fn context_length(mut self, v: usize) -> Self {
        self.context_length = v;
        self
    }

    /// Sets the capacity of the buffer of each trajectory.
    pub fn capacity(mut self, v: usize) -> Self {
        self.capacity = v;
        self
    }

    /// Sets the shape of the camera image.
    pub fn image_shape(mut self, v: [usize; 3]) -> Self {
        self.image_shape = v;
        self
    }

    /// Sets the seed of the random split.
    pub fn seed(mut self, v: Option<u64>) -> Self {
        self.seed = v;
        self
    }

    /// Returns the configuration of the buffers.
    pub fn buffer_config(&self) -> TrajectoryBufferConfig {
        TrajectoryBufferConfig::default().capacity(self.capacity)
    }

    /// Returns the configuration of the index split.
    pub fn split_config(&self) -> SplitConfig {
        SplitConfig::default()
            .context_length(self.context_length)
            .scale(self.scale)
            .train_split(self.train_split)
    }

    /// Constructs [`ManiSkillDatasetConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ManiSkillDatasetConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_dataset_config() -> Result<()> {
        let config = ManiSkillDatasetConfig::default()
            .demo_path("/tmp/PickCube-v1/trajectory.h5")
            .num_queries(4)
            .context_length(16)
            .seed(Some(7));

        let dir = TempDir::new("maniskill_dataset_config")?;
        let path = dir.path().join("dataset_config.yaml");

        config.save(&path)?;
        let config_ = ManiSkillDatasetConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_stage_configs() {
        let config = ManiSkillDatasetConfig::default()
            .scale(20)
            .train_split(0.5)
            .context_length(4)
            .capacity(64);

        assert_eq!(config.buffer_config().capacity, 64);

        let split_config = config.split_config();
        assert_eq!(split_config.scale, 20);
        assert_eq!(split_config.train_split, 0.5);
        assert_eq!(split_config.context_length, 4);
    }
}
