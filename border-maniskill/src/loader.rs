//! Demonstration trajectories and their loaders.
#[cfg(feature = "h5py")]
mod h5py;
use crate::util::ndarray::cast_array;
use anyhow::Result;
use border_core::BorderError;
use ndarray::{concatenate, Array1, Array2, Array3, Array4, Axis};
use std::path::Path;
#[cfg(feature = "h5py")]
pub use h5py::H5pyLoader;

/// Arrays of a single demonstration trajectory with `T` steps.
#[derive(Clone, Debug, PartialEq)]
pub struct DemoTrajectory {
    /// Joint positions, `(T, n_q)`.
    pub qpos: Array2<f32>,

    /// Joint velocities, `(T, n_v)`.
    pub qvel: Array2<f32>,

    /// Camera images as stored in the archive, `(T, H, W, C)`.
    pub rgb: Array4<u8>,

    /// Actions, `(T, n_a)` or `(T - 1, n_a)`.
    ///
    /// ManiSkill records one more observation than actions, the last one
    /// being the state after the final action.
    pub actions: Array2<f32>,
}

impl DemoTrajectory {
    /// Returns the number of steps `T`.
    pub fn num_steps(&self) -> usize {
        self.qpos.nrows()
    }

    /// Returns the dimension of the proprioception vector.
    pub fn proprioception_dim(&self) -> usize {
        self.qpos.ncols() + self.qvel.ncols()
    }

    /// Returns the dimension of the action vector.
    pub fn action_dim(&self) -> usize {
        self.actions.ncols()
    }

    /// Checks the step counts of all fields and the size of the images.
    ///
    /// `image_shape` is the channel-first shape the images are reshaped into,
    /// so each stored image must hold exactly as many elements.
    pub fn validate(&self, image_shape: [usize; 3]) -> Result<()> {
        let n_steps = self.num_steps();

        let counts = [
            ("qvel", self.qvel.nrows()),
            ("rgb", self.rgb.len_of(Axis(0))),
        ];
        for (field, n) in counts.iter() {
            if *n != n_steps {
                return Err(step_count_mismatch(field, n_steps, *n));
            }
        }

        let n_actions = self.actions.nrows();
        if n_actions > n_steps || n_actions + 1 < n_steps {
            return Err(BorderError::ShapeMismatch {
                field: "actions".to_string(),
                expected: format!("{} or {} steps", n_steps, n_steps.saturating_sub(1)),
                actual: format!("{} steps", n_actions),
            }
            .into());
        }

        let (_, h, w, c) = self.rgb.dim();
        let n_elems = image_shape.iter().product::<usize>();
        if h * w * c != n_elems {
            return Err(BorderError::ShapeMismatch {
                field: "rgb".to_string(),
                expected: format!("{:?} ({} elements)", image_shape, n_elems),
                actual: format!("{:?} ({} elements)", [h, w, c], h * w * c),
            }
            .into());
        }

        Ok(())
    }

    /// Returns the concatenation of joint positions and velocities at step `t`.
    pub fn proprioception(&self, t: usize) -> Result<Array1<f32>> {
        let pro = concatenate(Axis(0), &[self.qpos.row(t), self.qvel.row(t)])?;
        Ok(pro)
    }

    /// Returns the image at step `t` reshaped into `image_shape`.
    ///
    /// The elements are reinterpreted in row-major order; no axis is permuted.
    pub fn image(&self, t: usize, image_shape: [usize; 3]) -> Result<Array3<f32>> {
        let [c, h, w] = image_shape;
        let flat = self.rgb.index_axis(Axis(0), t).iter().copied().collect::<Vec<u8>>();
        let image = Array3::from_shape_vec((c, h, w), flat)?;
        Ok(cast_array(&image))
    }

    /// Returns the action at step `t`.
    pub fn action(&self, t: usize) -> Array1<f32> {
        self.actions.row(t).to_owned()
    }
}

fn step_count_mismatch(field: &str, expected: usize, actual: usize) -> anyhow::Error {
    BorderError::ShapeMismatch {
        field: field.to_string(),
        expected: format!("{} steps", expected),
        actual: format!("{} steps", actual),
    }
    .into()
}

/// Reads demonstration trajectories from an archive.
pub trait DemoLoader {
    /// Loads the first `num_traj` trajectories, or all of them if `None`.
    fn load(&self, path: &Path, num_traj: Option<usize>) -> Result<Vec<DemoTrajectory>>;
}

/// Loader serving trajectories that are already in memory.
///
/// The path given to [`DemoLoader::load`] is ignored.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLoader {
    trajectories: Vec<DemoTrajectory>,
}

impl InMemoryLoader {
    /// Creates a loader serving `trajectories`.
    pub fn new(trajectories: Vec<DemoTrajectory>) -> Self {
        Self { trajectories }
    }
}

impl DemoLoader for InMemoryLoader {
    fn load(&self, _path: &Path, num_traj: Option<usize>) -> Result<Vec<DemoTrajectory>> {
        let n = num_traj.unwrap_or(self.trajectories.len());
        Ok(self.trajectories.iter().take(n).cloned().collect())
    }
}
