//! Storage of observations and actions, represented by ndarray.
use anyhow::Result;
use border_core::{BatchBase, BorderError};
use ndarray::{s, Array1, Array2, Array3, Array4, Axis};

/// Shape of a single observation row.
#[derive(Clone, Debug, PartialEq)]
pub struct ObsShape {
    /// Dimension of the proprioception vector.
    pub proprioception: usize,

    /// Channel-first shape of the camera image.
    pub image: [usize; 3],
}

/// Batch of observations: proprioception vectors and channel-first images.
#[derive(Clone, Debug, PartialEq)]
pub struct ManiSkillObsBatch {
    /// Proprioception, `(n, d)`.
    pub proprioception: Array2<f32>,

    /// Camera images, `(n, c, h, w)`.
    pub image: Array4<f32>,
}

impl ManiSkillObsBatch {
    /// Creates a batch holding a single step.
    pub fn from_step(proprioception: Array1<f32>, image: Array3<f32>) -> Self {
        Self {
            proprioception: proprioception.insert_axis(Axis(0)),
            image: image.insert_axis(Axis(0)),
        }
    }

    /// Returns the proprioception vector at row `ix`.
    pub fn proprioception_at(&self, ix: usize) -> Array1<f32> {
        self.proprioception.index_axis(Axis(0), ix).to_owned()
    }

    /// Returns the image at row `ix`.
    pub fn image_at(&self, ix: usize) -> Array3<f32> {
        self.image.index_axis(Axis(0), ix).to_owned()
    }
}

impl BatchBase for ManiSkillObsBatch {
    type Shape = ObsShape;

    fn new(capacity: usize, shape: &ObsShape) -> Self {
        let [c, h, w] = shape.image;
        Self {
            proprioception: Array2::zeros((capacity, shape.proprioception)),
            image: Array4::zeros((capacity, c, h, w)),
        }
    }

    fn len(&self) -> usize {
        self.proprioception.nrows()
    }

    fn shape(&self) -> ObsShape {
        let (_, c, h, w) = self.image.dim();
        ObsShape {
            proprioception: self.proprioception.ncols(),
            image: [c, h, w],
        }
    }

    fn push(&mut self, ix: usize, data: Self) -> Result<()> {
        let n = data.len();
        if data.image.len_of(Axis(0)) != n {
            return Err(BorderError::ShapeMismatch {
                field: "image".to_string(),
                expected: format!("{} rows", n),
                actual: format!("{} rows", data.image.len_of(Axis(0))),
            }
            .into());
        }
        if data.shape() != self.shape() {
            return Err(BorderError::ShapeMismatch {
                field: "obs".to_string(),
                expected: format!("{:?}", self.shape()),
                actual: format!("{:?}", data.shape()),
            }
            .into());
        }
        if ix + n > self.len() {
            return Err(BorderError::CapacityOverflow {
                capacity: self.len(),
                cursor: ix,
                requested: n,
            }
            .into());
        }

        self.proprioception
            .slice_mut(s![ix..ix + n, ..])
            .assign(&data.proprioception);
        self.image
            .slice_mut(s![ix..ix + n, .., .., ..])
            .assign(&data.image);
        Ok(())
    }

    fn sample(&self, ixs: &[usize]) -> Self {
        Self {
            proprioception: self.proprioception.select(Axis(0), ixs),
            image: self.image.select(Axis(0), ixs),
        }
    }
}

/// Batch of actions.
#[derive(Clone, Debug, PartialEq)]
pub struct ManiSkillActBatch {
    /// Actions, `(n, d)`.
    pub action: Array2<f32>,
}

impl ManiSkillActBatch {
    /// Creates a batch holding a single step.
    pub fn from_step(action: Array1<f32>) -> Self {
        Self {
            action: action.insert_axis(Axis(0)),
        }
    }
}

impl BatchBase for ManiSkillActBatch {
    type Shape = usize;

    fn new(capacity: usize, shape: &usize) -> Self {
        Self {
            action: Array2::zeros((capacity, *shape)),
        }
    }

    fn len(&self) -> usize {
        self.action.nrows()
    }

    fn shape(&self) -> usize {
        self.action.ncols()
    }

    fn push(&mut self, ix: usize, data: Self) -> Result<()> {
        let n = data.len();
        if data.shape() != self.shape() {
            return Err(BorderError::ShapeMismatch {
                field: "act".to_string(),
                expected: format!("{}", self.shape()),
                actual: format!("{}", data.shape()),
            }
            .into());
        }
        if ix + n > self.len() {
            return Err(BorderError::CapacityOverflow {
                capacity: self.len(),
                cursor: ix,
                requested: n,
            }
            .into());
        }

        self.action.slice_mut(s![ix..ix + n, ..]).assign(&data.action);
        Ok(())
    }

    fn sample(&self, ixs: &[usize]) -> Self {
        Self {
            action: self.action.select(Axis(0), ixs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array};

    fn obs_shape() -> ObsShape {
        ObsShape {
            proprioception: 2,
            image: [3, 2, 2],
        }
    }

    #[test]
    fn test_obs_push_and_sample() -> Result<()> {
        let mut batch = ManiSkillObsBatch::new(4, &obs_shape());
        let image = Array::from_shape_fn((3, 2, 2), |(c, h, w)| (c * 4 + h * 2 + w) as f32);
        batch.push(1, ManiSkillObsBatch::from_step(arr1(&[1., 2.]), image.clone()))?;

        let sampled = batch.sample(&[1, 0]);
        assert_eq!(sampled.len(), 2);
        assert_eq!(sampled.proprioception_at(0), arr1(&[1., 2.]));
        assert_eq!(sampled.image_at(0), image);
        assert_eq!(sampled.proprioception_at(1), arr1(&[0., 0.]));
        Ok(())
    }

    #[test]
    fn test_obs_push_wrong_shape() {
        let mut batch = ManiSkillObsBatch::new(4, &obs_shape());
        let data = ManiSkillObsBatch::from_step(arr1(&[1., 2., 3.]), Array3::zeros((3, 2, 2)));
        assert!(batch.push(0, data).is_err());
    }

    #[test]
    fn test_act_push_overflow() -> Result<()> {
        let mut batch = ManiSkillActBatch::new(2, &3);
        batch.push(0, ManiSkillActBatch::from_step(arr1(&[1., 2., 3.])))?;
        batch.push(1, ManiSkillActBatch::from_step(arr1(&[4., 5., 6.])))?;

        let err = batch
            .push(2, ManiSkillActBatch::from_step(arr1(&[7., 8., 9.])))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BorderError>(),
            Some(BorderError::CapacityOverflow { .. })
        ));
        assert_eq!(batch.sample(&[1]).action.row(0).to_vec(), vec![4., 5., 6.]);
        Ok(())
    }
}
