use crate::BatchBase;

/// Rows of consecutive transitions `(o_t, a_t, r_t, o_t+1, r_t+1)`.
///
/// All fields must hold the same number of rows. In most cases a transition
/// holds a single step.
pub struct GenericTransition<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observations.
    pub obs: O,

    /// Actions.
    pub act: A,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Next observations.
    pub next_obs: O,

    /// Rewards at the next step.
    pub next_reward: Vec<f32>,
}

impl<O, A> GenericTransition<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Returns the number of steps, taken from the reward field.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the transition holds no step.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the row counts of all fields, in declaration order.
    pub(crate) fn row_counts(&self) -> [(&'static str, usize); 5] {
        [
            ("obs", self.obs.len()),
            ("act", self.act.len()),
            ("reward", self.reward.len()),
            ("next_obs", self.next_obs.len()),
            ("next_reward", self.next_reward.len()),
        ]
    }
}
