//! Buffer interface.
use anyhow::Result;

/// Interface for buffers that accumulate experiences.
pub trait ExperienceBufferBase {
    /// The type of items pushed into the buffer.
    type Item;

    /// Pushes an item into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the number of steps currently stored.
    fn len(&self) -> usize;

    /// Returns `true` if nothing has been stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
