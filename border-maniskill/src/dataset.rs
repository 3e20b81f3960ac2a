//! Indexed access to examples and the whole dataset pipeline.
use crate::{
    assemble, build_buffers, DemoLoader, ExampleSet, ImageTransform, ManiSkillDatasetConfig,
    ToTensor,
};
use anyhow::Result;
use border_core::{trajectory_buffer::split_buffers, BorderError};
use ndarray::{Array1, Array2, Array3};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A single example: `(image, proprioception, action_sequence)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Example {
    /// Transformed image.
    pub image: Array3<f32>,

    /// Proprioception vector.
    pub proprioception: Array1<f32>,

    /// Action sequence, `(context_length, n_a)`.
    pub action_sequence: Array2<f32>,
}

/// Finite, randomly accessible sequence of examples.
///
/// Images are transformed when an example is accessed; the proprioception
/// vector and the action sequence are returned as stored.
pub struct ExampleDataset<T = ToTensor> {
    set: ExampleSet,
    transform: T,
}

impl<T: ImageTransform> ExampleDataset<T> {
    /// Wraps an example set.
    pub fn new(set: ExampleSet, transform: T) -> Self {
        Self { set, transform }
    }

    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns `true` if there is no example.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Returns the example at `ix`.
    ///
    /// # Errors
    ///
    /// Fails with [`BorderError::IndexOutOfRange`] if `ix >= len()`, or if the
    /// image transform fails.
    pub fn get(&self, ix: usize) -> Result<Example> {
        if ix >= self.len() {
            return Err(BorderError::IndexOutOfRange {
                index: ix,
                len: self.len(),
            }
            .into());
        }

        Ok(Example {
            image: self.transform.apply(&self.set.images()[ix])?,
            proprioception: self.set.proprioceptions()[ix].clone(),
            action_sequence: self.set.action_sequences()[ix].clone(),
        })
    }

    /// Returns an iterator over all examples.
    pub fn iter(&self) -> impl Iterator<Item = Result<Example>> + '_ {
        (0..self.len()).map(move |ix| self.get(ix))
    }

    /// Returns the wrapped example set.
    pub fn into_inner(self) -> ExampleSet {
        self.set
    }
}

/// Creates the train and validation example sets.
///
/// Loads `num_queries` trajectories from `demo_path`, copies each into its own
/// buffer, splits the buffers with `rng` and assembles the examples.
pub fn get_dataset<L, R>(
    config: &ManiSkillDatasetConfig,
    loader: &L,
    rng: &mut R,
) -> Result<(ExampleSet, ExampleSet)>
where
    L: DemoLoader + ?Sized,
    R: Rng + ?Sized,
{
    let trajectories = loader.load(&config.demo_path, Some(config.num_queries))?;
    let mut buffers = build_buffers(&trajectories, config)?;
    split_buffers(&mut buffers, &config.split_config(), rng)?;
    assemble(&buffers, config.context_length)
}

/// Same as [`get_dataset`], with [`StdRng`] seeded from `config.seed`.
///
/// If `config.seed` is `None`, the seed is taken from entropy and the split
/// differs between runs.
pub fn get_dataset_seeded<L>(
    config: &ManiSkillDatasetConfig,
    loader: &L,
) -> Result<(ExampleSet, ExampleSet)>
where
    L: DemoLoader + ?Sized,
{
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    get_dataset(config, loader, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array};

    struct Identity;

    impl ImageTransform for Identity {
        fn apply(&self, image: &Array3<f32>) -> Result<Array3<f32>> {
            Ok(image.clone())
        }
    }

    fn example_set(n: usize) -> ExampleSet {
        let mut set = ExampleSet::default();
        for i in 0..n {
            set.push(
                Array::from_elem((3, 2, 2), 51.0 * i as f32),
                arr1(&[i as f32]),
                Array2::from_elem((4, 2), i as f32),
            );
        }
        set
    }

    #[test]
    fn test_get() -> Result<()> {
        let dataset = ExampleDataset::new(example_set(3), ToTensor::default());
        assert_eq!(dataset.len(), 3);

        let example = dataset.get(2)?;
        assert!(example.image.iter().all(|&v| (v - 102.0 / 255.0).abs() < 1e-6));
        assert_eq!(example.proprioception, arr1(&[2.0]));
        assert_eq!(example.action_sequence, Array2::from_elem((4, 2), 2.0));
        Ok(())
    }

    #[test]
    fn test_get_out_of_range() {
        let dataset = ExampleDataset::new(example_set(2), Identity);
        let err = dataset.get(2).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BorderError>(),
            Some(&BorderError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_iter() -> Result<()> {
        let set = example_set(4);
        let dataset = ExampleDataset::new(set.clone(), Identity);
        let examples = dataset.iter().collect::<Result<Vec<_>>>()?;
        assert_eq!(examples.len(), 4);
        assert_eq!(examples[3].image, set.images()[3]);
        assert_eq!(dataset.into_inner(), set);
        Ok(())
    }

    #[test]
    fn test_empty() {
        let dataset = ExampleDataset::new(ExampleSet::default(), Identity);
        assert!(dataset.is_empty());
        assert!(dataset.get(0).is_err());
    }

    #[test]
    fn test_every_index_below_len_is_served() -> Result<()> {
        let set = ExampleSet::from_parts(
            vec![Array3::zeros((3, 1, 1)); 2],
            vec![arr1(&[0.]), arr1(&[1.])],
            vec![Array2::zeros((4, 2)); 2],
        )?;
        let dataset = ExampleDataset::new(set, Identity);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1)?.proprioception, arr1(&[1.]));
        assert!(dataset.get(2).is_err());
        Ok(())
    }
}
