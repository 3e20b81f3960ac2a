use super::{DemoLoader, DemoTrajectory};
use crate::util::ndarray::pyobj_to_arrayd;
use anyhow::{anyhow, Result};
use ndarray::{Ix2, Ix4};
use numpy::Element;
use num_traits::AsPrimitive;
use pyo3::{PyAny, PyResult, Python};
use std::path::Path;

/// Loads ManiSkill demonstration archives (`trajectory.*.h5`) with Python's `h5py`.
///
/// Trajectories are read from the groups `traj_0`, `traj_1`, ... in index
/// order. In each group, the following datasets are used:
///
/// * `obs/agent/qpos`
/// * `obs/agent/qvel`
/// * `obs/sensor_data/base_camera/rgb`
/// * `actions`
#[derive(Clone, Debug)]
pub struct H5pyLoader {
    /// Name of the camera in `obs/sensor_data`.
    pub camera: String,
}

impl Default for H5pyLoader {
    fn default() -> Self {
        Self {
            camera: "base_camera".to_string(),
        }
    }
}

impl H5pyLoader {
    /// Sets the name of the camera.
    pub fn camera(mut self, v: impl Into<String>) -> Self {
        self.camera = v.into();
        self
    }

    /// Returns the names of the trajectory groups, sorted by index.
    fn trajectory_keys(file: &PyAny) -> Result<Vec<String>> {
        let keys = file
            .call_method0("keys")?
            .iter()?
            .map(|k| k.and_then(|k| k.extract::<String>()))
            .collect::<PyResult<Vec<_>>>()?;
        let mut keys = keys
            .into_iter()
            .filter_map(|k| {
                let ix = k.strip_prefix("traj_")?.parse::<usize>().ok()?;
                Some((ix, k))
            })
            .collect::<Vec<_>>();
        keys.sort();
        Ok(keys.into_iter().map(|(_, k)| k).collect())
    }

    fn read_trajectory(&self, np: &PyAny, traj: &PyAny) -> Result<DemoTrajectory> {
        let obs = traj.get_item("obs")?;
        let agent = obs.get_item("agent")?;
        let camera = obs.get_item("sensor_data")?.get_item(self.camera.as_str())?;

        Ok(DemoTrajectory {
            qpos: read_dataset::<f32>(np, agent.get_item("qpos")?, "float32")?
                .into_dimensionality::<Ix2>()?,
            qvel: read_dataset::<f32>(np, agent.get_item("qvel")?, "float32")?
                .into_dimensionality::<Ix2>()?,
            rgb: read_dataset::<u8>(np, camera.get_item("rgb")?, "uint8")?
                .into_dimensionality::<Ix4>()?,
            actions: read_dataset::<f32>(np, traj.get_item("actions")?, "float32")?
                .into_dimensionality::<Ix2>()?,
        })
    }
}

/// Reads an h5py dataset into memory as a numpy array of `dtype`.
fn read_dataset<T>(np: &PyAny, dataset: &PyAny, dtype: &str) -> Result<ndarray::ArrayD<T>>
where
    T: Element + AsPrimitive<T>,
{
    let arr = np.call_method1("asarray", (dataset, dtype))?;
    pyobj_to_arrayd::<T, T>(arr)
}

impl DemoLoader for H5pyLoader {
    fn load(&self, path: &Path, num_traj: Option<usize>) -> Result<Vec<DemoTrajectory>> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Non UTF-8 path: {:?}", path))?;

        Python::with_gil(|py| {
            let h5py = py.import("h5py")?;
            let np = py.import("numpy")?;
            let file = h5py.getattr("File")?.call1((path_str, "r"))?;

            let mut keys = Self::trajectory_keys(file)?;
            if let Some(n) = num_traj {
                keys.truncate(n);
            }

            let mut trajectories = Vec::with_capacity(keys.len());
            for key in keys.iter() {
                let traj = self.read_trajectory(np, file.get_item(key.as_str())?)?;
                log::debug!(
                    "{}: {} steps, {} actions",
                    key,
                    traj.num_steps(),
                    traj.actions.nrows()
                );
                trajectories.push(traj);
            }
            file.call_method0("close")?;

            log::info!("Loaded {} trajectories from {}", trajectories.len(), path_str);
            Ok(trajectories)
        })
    }
}
