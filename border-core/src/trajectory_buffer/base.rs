//! Write phase and read-only phase of a trajectory buffer.
use super::{GenericTransition, IndexSplit, TrajectoryBufferConfig};
use crate::{BatchBase, BorderError, ExperienceBufferBase};
use anyhow::Result;
use std::collections::HashSet;

/// Append-only storage for the transitions of a single trajectory.
///
/// All fields are preallocated with `capacity` rows when the builder is
/// created. Each push writes at the cursor `idx` and advances it; the cursor
/// never wraps, so there is no eviction or overwrite. Pushing past the
/// capacity fails with [`BorderError::CapacityOverflow`] and leaves the
/// builder untouched.
///
/// # Examples
///
/// ```ignore
/// let config = TrajectoryBufferConfig::default().capacity(300);
/// let mut builder = TrajectoryBufferBuilder::<ObsBatch, ActBatch>::build(&config, &obs_shape, &act_shape);
///
/// for tr in transitions {
///     builder.push(tr)?;
/// }
///
/// let buffer = builder.freeze();
/// ```
#[derive(Debug)]
pub struct TrajectoryBufferBuilder<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Maximum number of transitions.
    capacity: usize,

    /// Write cursor, equal to the number of populated transitions.
    idx: usize,

    /// Storage for observations.
    obs: O,

    /// Storage for actions.
    act: A,

    /// Storage for rewards.
    reward: Vec<f32>,

    /// Storage for next observations.
    next_obs: O,

    /// Storage for rewards at the next step.
    next_reward: Vec<f32>,
}

impl<O, A> TrajectoryBufferBuilder<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Creates an empty buffer with the given row shapes.
    ///
    /// * `obs_shape`: shape of a single observation row.
    /// * `act_shape`: shape of a single action row.
    pub fn build(
        config: &TrajectoryBufferConfig,
        obs_shape: &O::Shape,
        act_shape: &A::Shape,
    ) -> Self {
        let capacity = config.capacity;

        Self {
            capacity,
            idx: 0,
            obs: O::new(capacity, obs_shape),
            act: A::new(capacity, act_shape),
            reward: vec![0.; capacity],
            next_obs: O::new(capacity, obs_shape),
            next_reward: vec![0.; capacity],
        }
    }

    /// Returns the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Finishes the write phase.
    pub fn freeze(self) -> TrajectoryBuffer<O, A> {
        TrajectoryBuffer {
            capacity: self.capacity,
            idx: self.idx,
            obs: self.obs,
            act: self.act,
            reward: self.reward,
            next_obs: self.next_obs,
            next_reward: self.next_reward,
            split: None,
        }
    }

    /// Checks that `tr` can be written at the cursor, without writing anything.
    fn check_transition(&self, tr: &GenericTransition<O, A>) -> Result<()> {
        let len = tr.len();

        for (field, n) in tr.row_counts().iter() {
            if *n != len {
                return Err(BorderError::ShapeMismatch {
                    field: field.to_string(),
                    expected: format!("{} rows", len),
                    actual: format!("{} rows", n),
                }
                .into());
            }
        }

        let shapes = [
            ("obs", self.obs.shape(), tr.obs.shape()),
            ("next_obs", self.next_obs.shape(), tr.next_obs.shape()),
        ];
        for (field, expected, actual) in shapes.iter() {
            if expected != actual {
                return Err(BorderError::ShapeMismatch {
                    field: field.to_string(),
                    expected: format!("{:?}", expected),
                    actual: format!("{:?}", actual),
                }
                .into());
            }
        }
        if self.act.shape() != tr.act.shape() {
            return Err(BorderError::ShapeMismatch {
                field: "act".to_string(),
                expected: format!("{:?}", self.act.shape()),
                actual: format!("{:?}", tr.act.shape()),
            }
            .into());
        }

        if self.idx + len > self.capacity {
            return Err(BorderError::CapacityOverflow {
                capacity: self.capacity,
                cursor: self.idx,
                requested: len,
            }
            .into());
        }

        Ok(())
    }
}

impl<O, A> ExperienceBufferBase for TrajectoryBufferBuilder<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Item = GenericTransition<O, A>;

    /// Returns the number of populated transitions.
    fn len(&self) -> usize {
        self.idx
    }

    /// Writes `tr` at the cursor and advances it.
    ///
    /// # Errors
    ///
    /// Returns [`BorderError::ShapeMismatch`] if the fields of `tr` disagree in
    /// row count or row shape, and [`BorderError::CapacityOverflow`] if the
    /// rows do not fit. Nothing is written in either case.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.check_transition(&tr)?;

        let i = self.idx;
        let len = tr.len();
        let GenericTransition {
            obs,
            act,
            reward,
            next_obs,
            next_reward,
        } = tr;

        self.obs.push(i, obs)?;
        self.act.push(i, act)?;
        self.next_obs.push(i, next_obs)?;
        self.reward[i..i + len].copy_from_slice(&reward);
        self.next_reward[i..i + len].copy_from_slice(&next_reward);
        self.idx += len;

        Ok(())
    }
}

/// Read-only transitions of a single trajectory.
///
/// Created by [`TrajectoryBufferBuilder::freeze`]. Reads are restricted to the
/// populated range `[0, len())`. Train/validation indices can be assigned
/// exactly once, with [`TrajectoryBuffer::set_split`].
#[derive(Debug)]
pub struct TrajectoryBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    capacity: usize,
    idx: usize,
    obs: O,
    act: A,
    reward: Vec<f32>,
    next_obs: O,
    next_reward: Vec<f32>,
    split: Option<IndexSplit>,
}

impl<O, A> TrajectoryBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Returns the number of populated transitions.
    pub fn len(&self) -> usize {
        self.idx
    }

    /// Returns `true` if no transition was populated.
    pub fn is_empty(&self) -> bool {
        self.idx == 0
    }

    /// Returns the capacity the buffer was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the observation storage, including unpopulated rows.
    pub fn obs(&self) -> &O {
        &self.obs
    }

    /// Returns the action storage, including unpopulated rows.
    pub fn act(&self) -> &A {
        &self.act
    }

    /// Returns the next observation storage, including unpopulated rows.
    pub fn next_obs(&self) -> &O {
        &self.next_obs
    }

    /// Returns the populated rewards.
    pub fn reward(&self) -> &[f32] {
        &self.reward[..self.idx]
    }

    /// Returns the populated rewards at the next step.
    pub fn next_reward(&self) -> &[f32] {
        &self.next_reward[..self.idx]
    }

    /// Returns the assigned split, if any.
    pub fn split(&self) -> Option<&IndexSplit> {
        self.split.as_ref()
    }

    /// Returns the train indices, empty if the buffer has not been split.
    pub fn train_index(&self) -> &[usize] {
        match &self.split {
            Some(s) => s.train.as_slice(),
            None => &[],
        }
    }

    /// Returns the validation indices, empty if the buffer has not been split.
    pub fn valid_index(&self) -> &[usize] {
        match &self.split {
            Some(s) => s.valid.as_slice(),
            None => &[],
        }
    }

    /// Assigns train/validation indices.
    ///
    /// # Errors
    ///
    /// Returns [`BorderError::AlreadySplit`] on the second call, and
    /// [`BorderError::InvalidSplit`] if the indices are duplicated, shared
    /// between the two lists, or outside of the populated range.
    pub fn set_split(&mut self, split: IndexSplit) -> Result<()> {
        if self.split.is_some() {
            return Err(BorderError::AlreadySplit.into());
        }

        let mut seen = HashSet::with_capacity(split.len());
        for &ix in split.train.iter().chain(split.valid.iter()) {
            if ix >= self.idx {
                return Err(BorderError::InvalidSplit(format!(
                    "index {} is out of the populated range {}",
                    ix, self.idx
                ))
                .into());
            }
            if !seen.insert(ix) {
                return Err(BorderError::InvalidSplit(format!("index {} appears twice", ix)).into());
            }
        }

        self.split = Some(split);
        Ok(())
    }

    /// Gathers the observations at `ixs`.
    pub fn sample_obs(&self, ixs: &[usize]) -> Result<O> {
        self.check_indices(ixs)?;
        Ok(self.obs.sample(ixs))
    }

    /// Gathers the next observations at `ixs`.
    pub fn sample_next_obs(&self, ixs: &[usize]) -> Result<O> {
        self.check_indices(ixs)?;
        Ok(self.next_obs.sample(ixs))
    }

    /// Returns the actions in `[offset, offset + context_length)`.
    ///
    /// # Errors
    ///
    /// Returns [`BorderError::ActionWindowOutOfRange`] if the window does not
    /// fit in the populated range. The window is never truncated.
    pub fn action_window(&self, offset: usize, context_length: usize) -> Result<A> {
        if offset + context_length > self.idx {
            return Err(BorderError::ActionWindowOutOfRange {
                offset,
                context_length,
                len: self.idx,
            }
            .into());
        }
        let ixs = (offset..offset + context_length).collect::<Vec<_>>();
        Ok(self.act.sample(&ixs))
    }

    fn check_indices(&self, ixs: &[usize]) -> Result<()> {
        match ixs.iter().find(|&&ix| ix >= self.idx) {
            Some(&index) => Err(BorderError::IndexOutOfRange {
                index,
                len: self.idx,
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rows of fixed-width `f32` vectors.
    #[derive(Debug, Clone, PartialEq)]
    struct VecBatch {
        width: usize,
        data: Vec<f32>,
    }

    impl VecBatch {
        fn row(v: &[f32]) -> Self {
            Self {
                width: v.len(),
                data: v.to_vec(),
            }
        }
    }

    impl BatchBase for VecBatch {
        type Shape = usize;

        fn new(capacity: usize, shape: &usize) -> Self {
            Self {
                width: *shape,
                data: vec![0.; capacity * shape],
            }
        }

        fn len(&self) -> usize {
            self.data.len() / self.width
        }

        fn shape(&self) -> usize {
            self.width
        }

        fn push(&mut self, ix: usize, data: Self) -> Result<()> {
            let start = ix * self.width;
            self.data[start..start + data.data.len()].copy_from_slice(&data.data);
            Ok(())
        }

        fn sample(&self, ixs: &[usize]) -> Self {
            let data = ixs
                .iter()
                .flat_map(|&ix| self.data[ix * self.width..(ix + 1) * self.width].to_vec())
                .collect();
            Self {
                width: self.width,
                data,
            }
        }
    }

    type Builder = TrajectoryBufferBuilder<VecBatch, VecBatch>;

    fn step(t: usize) -> GenericTransition<VecBatch, VecBatch> {
        let t = t as f32;
        GenericTransition {
            obs: VecBatch::row(&[t, t]),
            act: VecBatch::row(&[-t]),
            reward: vec![0.0],
            next_obs: VecBatch::row(&[t + 1., t + 1.]),
            next_reward: vec![0.0],
        }
    }

    fn builder(capacity: usize) -> Builder {
        let config = TrajectoryBufferConfig::default().capacity(capacity);
        Builder::build(&config, &2, &1)
    }

    #[test]
    fn test_push_advances_cursor() -> Result<()> {
        let mut builder = builder(4);
        assert!(builder.is_empty());
        for t in 0..3 {
            builder.push(step(t))?;
        }
        assert_eq!(builder.len(), 3);

        let buffer = builder.freeze();
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.reward(), &[0.0, 0.0, 0.0]);
        assert_eq!(buffer.sample_obs(&[2])?, VecBatch::row(&[2., 2.]));
        assert_eq!(buffer.sample_next_obs(&[0])?, VecBatch::row(&[1., 1.]));
        Ok(())
    }

    #[test]
    fn test_debug_format() -> Result<()> {
        let mut builder = builder(4);
        builder.push(step(0))?;
        assert!(format!("{:?}", builder).contains("idx: 1"));

        let buffer = builder.freeze();
        assert!(format!("{:?}", buffer).contains("split: None"));
        Ok(())
    }

    #[test]
    fn test_push_beyond_capacity() -> Result<()> {
        let mut builder = builder(2);
        builder.push(step(0))?;
        builder.push(step(1))?;

        let err = builder.push(step(2)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BorderError>(),
            Some(&BorderError::CapacityOverflow {
                capacity: 2,
                cursor: 2,
                requested: 1
            })
        );
        assert_eq!(builder.len(), 2);
        Ok(())
    }

    #[test]
    fn test_push_inconsistent_rows() {
        let mut builder = builder(4);
        let mut tr = step(0);
        tr.next_reward = vec![0.0, 0.0];

        let err = builder.push(tr).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BorderError>(),
            Some(BorderError::ShapeMismatch { .. })
        ));
        assert_eq!(builder.len(), 0);
    }

    #[test]
    fn test_push_wrong_row_shape() {
        let mut builder = builder(4);
        let mut tr = step(0);
        tr.obs = VecBatch::row(&[0., 0., 0.]);

        let err = builder.push(tr).unwrap_err();
        match err.downcast_ref::<BorderError>() {
            Some(BorderError::ShapeMismatch { field, .. }) => assert_eq!(field, "obs"),
            e => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_action_window() -> Result<()> {
        let mut builder = builder(8);
        for t in 0..5 {
            builder.push(step(t))?;
        }
        let buffer = builder.freeze();

        let window = VecBatch {
            width: 1,
            data: vec![-1., -2., -3.],
        };
        assert_eq!(buffer.action_window(1, 3)?, window);
        assert!(buffer.action_window(2, 3).is_ok());

        let err = buffer.action_window(3, 3).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BorderError>(),
            Some(&BorderError::ActionWindowOutOfRange {
                offset: 3,
                context_length: 3,
                len: 5
            })
        );
        Ok(())
    }

    #[test]
    fn test_reads_outside_populated_range() -> Result<()> {
        let mut builder = builder(8);
        builder.push(step(0))?;
        let buffer = builder.freeze();

        let err = buffer.sample_obs(&[0, 1]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BorderError>(),
            Some(&BorderError::IndexOutOfRange { index: 1, len: 1 })
        );
        Ok(())
    }

    #[test]
    fn test_set_split_once() -> Result<()> {
        let mut builder = builder(8);
        for t in 0..6 {
            builder.push(step(t))?;
        }
        let mut buffer = builder.freeze();
        assert!(buffer.train_index().is_empty());
        assert!(buffer.valid_index().is_empty());

        buffer.set_split(IndexSplit {
            train: vec![3, 0],
            valid: vec![1],
        })?;
        assert_eq!(buffer.train_index(), &[3, 0]);
        assert_eq!(buffer.valid_index(), &[1]);

        let err = buffer.set_split(IndexSplit::default()).unwrap_err();
        assert_eq!(err.downcast_ref::<BorderError>(), Some(&BorderError::AlreadySplit));
        Ok(())
    }

    #[test]
    fn test_set_split_rejects_overlap_and_range() -> Result<()> {
        let mut builder = builder(8);
        for t in 0..4 {
            builder.push(step(t))?;
        }
        let mut buffer = builder.freeze();

        let overlap = IndexSplit {
            train: vec![0, 1],
            valid: vec![1],
        };
        assert!(buffer.set_split(overlap).is_err());

        let out_of_range = IndexSplit {
            train: vec![4],
            valid: vec![],
        };
        assert!(buffer.set_split(out_of_range).is_err());

        assert!(buffer.split().is_none());
        Ok(())
    }
}
