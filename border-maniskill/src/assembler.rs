//! Flattens the split indices of all buffers into example sets.
use crate::ManiSkillBuffer;
use anyhow::Result;
use border_core::BorderError;
use ndarray::{Array1, Array2, Array3};

/// Aligned sequences of images, proprioception vectors and action sequences.
///
/// Position `i` of the three sequences refers to the same sampled step. The
/// sequences grow together through [`ExampleSet::push`], so they always have
/// the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExampleSet {
    images: Vec<Array3<f32>>,
    proprioceptions: Vec<Array1<f32>>,
    action_sequences: Vec<Array2<f32>>,
}

impl ExampleSet {
    /// Creates a set from aligned sequences.
    ///
    /// # Errors
    ///
    /// Fails with [`BorderError::ShapeMismatch`] if the sequences differ in
    /// length.
    pub fn from_parts(
        images: Vec<Array3<f32>>,
        proprioceptions: Vec<Array1<f32>>,
        action_sequences: Vec<Array2<f32>>,
    ) -> Result<Self> {
        let n = images.len();
        let counts = [
            ("proprioceptions", proprioceptions.len()),
            ("action_sequences", action_sequences.len()),
        ];
        for (field, len) in counts.iter() {
            if *len != n {
                return Err(BorderError::ShapeMismatch {
                    field: field.to_string(),
                    expected: format!("{} examples", n),
                    actual: format!("{} examples", len),
                }
                .into());
            }
        }

        Ok(Self {
            images,
            proprioceptions,
            action_sequences,
        })
    }

    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` if there is no example.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Channel-first images, not yet transformed.
    pub fn images(&self) -> &[Array3<f32>] {
        &self.images
    }

    /// Proprioception vectors.
    pub fn proprioceptions(&self) -> &[Array1<f32>] {
        &self.proprioceptions
    }

    /// Action sequences, `(context_length, n_a)` each.
    pub fn action_sequences(&self) -> &[Array2<f32>] {
        &self.action_sequences
    }

    /// Appends an example.
    pub fn push(
        &mut self,
        image: Array3<f32>,
        proprioception: Array1<f32>,
        action_sequence: Array2<f32>,
    ) {
        self.images.push(image);
        self.proprioceptions.push(proprioception);
        self.action_sequences.push(action_sequence);
    }

    fn extend_from_buffer(
        &mut self,
        buffer: &ManiSkillBuffer,
        ixs: &[usize],
        context_length: usize,
    ) -> Result<()> {
        let obs = buffer.sample_obs(ixs)?;
        for (k, &ix) in ixs.iter().enumerate() {
            let act = buffer.action_window(ix, context_length)?;
            self.push(obs.image_at(k), obs.proprioception_at(k), act.action);
        }
        Ok(())
    }
}

/// Creates the train and validation example sets.
///
/// For each buffer, in order, every train (resp. validation) index `i` yields
/// the image and proprioception at `i` and the actions in
/// `[i, i + context_length)`. Buffers without a split contribute nothing.
///
/// # Errors
///
/// Fails with [`ActionWindowOutOfRange`] if an action window does not fit in
/// the populated range of its buffer.
///
/// [`ActionWindowOutOfRange`]: border_core::BorderError::ActionWindowOutOfRange
pub fn assemble(
    buffers: &[ManiSkillBuffer],
    context_length: usize,
) -> Result<(ExampleSet, ExampleSet)> {
    let mut train_set = ExampleSet::default();
    let mut valid_set = ExampleSet::default();

    for buffer in buffers.iter() {
        train_set.extend_from_buffer(buffer, buffer.train_index(), context_length)?;
        valid_set.extend_from_buffer(buffer, buffer.valid_index(), context_length)?;
    }

    log::info!(
        "{} train examples, {} validation examples",
        train_set.len(),
        valid_set.len()
    );

    Ok((train_set, valid_set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{trajectory_to_buffer, DemoTrajectory, ManiSkillDatasetConfig};
    use border_core::trajectory_buffer::IndexSplit;
    use ndarray::Array;

    fn buffer(n_steps: usize) -> Result<ManiSkillBuffer> {
        let config = ManiSkillDatasetConfig::default().image_shape([3, 1, 1]);
        let traj = DemoTrajectory {
            qpos: Array::from_shape_fn((n_steps, 1), |(t, _)| t as f32),
            qvel: Array::from_shape_fn((n_steps, 1), |(t, _)| -(t as f32)),
            rgb: Array::from_shape_fn((n_steps, 1, 1, 3), |(t, _, _, c)| (t + c) as u8),
            actions: Array::from_shape_fn((n_steps - 1, 2), |(t, j)| (t * 2 + j) as f32),
        };
        trajectory_to_buffer(&traj, &config)
    }

    #[test]
    fn test_assemble_in_buffer_then_index_order() -> Result<()> {
        let mut b1 = buffer(8)?;
        let mut b2 = buffer(6)?;
        b1.set_split(IndexSplit {
            train: vec![4, 1],
            valid: vec![0],
        })?;
        b2.set_split(IndexSplit {
            train: vec![2],
            valid: vec![],
        })?;
        let unsplit = buffer(3)?;

        let (train, valid) = assemble(&[b1, unsplit, b2], 3)?;
        assert_eq!(train.len(), 3);
        assert_eq!(valid.len(), 1);

        let pro = train.proprioceptions().iter().map(|p| p[0]).collect::<Vec<_>>();
        assert_eq!(pro, vec![4., 1., 2.]);
        assert_eq!(train.images()[1].iter().copied().collect::<Vec<_>>(), vec![1., 2., 3.]);
        assert_eq!(train.action_sequences()[0].dim(), (3, 2));
        assert_eq!(train.action_sequences()[0].column(0).to_vec(), vec![8., 10., 12.]);
        assert_eq!(valid.proprioceptions()[0].to_vec(), vec![0., 0.]);
        Ok(())
    }

    #[test]
    fn test_window_exceeding_populated_range() -> Result<()> {
        let mut b = buffer(8)?;
        b.set_split(IndexSplit {
            train: vec![5],
            valid: vec![],
        })?;

        let err = assemble(&[b], 3).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BorderError>(),
            Some(&BorderError::ActionWindowOutOfRange {
                offset: 5,
                context_length: 3,
                len: 7
            })
        );
        Ok(())
    }

    #[test]
    fn test_from_parts_rejects_misaligned_sequences() -> Result<()> {
        let err = ExampleSet::from_parts(vec![Array3::zeros((3, 1, 1))], vec![], vec![])
            .unwrap_err();
        match err.downcast_ref::<BorderError>() {
            Some(BorderError::ShapeMismatch { field, .. }) => assert_eq!(field, "proprioceptions"),
            e => panic!("unexpected error: {:?}", e),
        }

        let set = ExampleSet::from_parts(
            vec![Array3::zeros((3, 1, 1))],
            vec![Array1::zeros(2)],
            vec![Array2::zeros((3, 2))],
        )?;
        assert_eq!(set.len(), 1);
        Ok(())
    }
}
