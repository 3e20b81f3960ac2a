//! Configuration of [`TrajectoryBufferBuilder`](super::TrajectoryBufferBuilder).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TrajectoryBufferBuilder`](super::TrajectoryBufferBuilder).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrajectoryBufferConfig {
    /// Maximum number of transitions. It must be larger than the length of
    /// any trajectory to be stored.
    pub capacity: usize,
}

impl Default for TrajectoryBufferConfig {
    fn default() -> Self {
        Self { capacity: 300 }
    }
}

impl TrajectoryBufferConfig {
    /// Sets the capacity of the buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
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
    fn test_serde_trajectory_buffer_config() -> Result<()> {
        let config = TrajectoryBufferConfig::default().capacity(512);

        let dir = TempDir::new("trajectory_buffer_config")?;
        let path = dir.path().join("trajectory_buffer_config.yaml");

        config.save(&path)?;
        let config_ = TrajectoryBufferConfig::load(&path)?;
        assert_eq!(config, config_);
        assert_eq!(config_.capacity, 512);
        Ok(())
    }
}
