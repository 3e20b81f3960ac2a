//! Copies demonstration trajectories into trajectory buffers.
use crate::{DemoTrajectory, ManiSkillActBatch, ManiSkillDatasetConfig, ManiSkillObsBatch, ObsShape};
use anyhow::Result;
use border_core::{
    trajectory_buffer::{GenericTransition, TrajectoryBuffer, TrajectoryBufferBuilder},
    BorderError, ExperienceBufferBase,
};

/// Buffer holding the transitions of a ManiSkill trajectory.
pub type ManiSkillBuffer = TrajectoryBuffer<ManiSkillObsBatch, ManiSkillActBatch>;

/// Copies a trajectory with `T` steps into a buffer of `T - 1` transitions.
///
/// The transition at `t - 1`, for `t` in `1..T`, holds the proprioception and
/// image at `t - 1`, the action at `t - 1`, and the proprioception and image at
/// `t` as the next observation. Rewards are recorded as `0.0`; termination
/// and truncation flags of the archive are not used.
///
/// The trajectory is validated before anything is written.
pub fn trajectory_to_buffer(
    trajectory: &DemoTrajectory,
    config: &ManiSkillDatasetConfig,
) -> Result<ManiSkillBuffer> {
    let image_shape = config.image_shape;
    trajectory.validate(image_shape)?;

    let n_steps = trajectory.num_steps();
    let n_transitions = n_steps.saturating_sub(1);
    if n_transitions > config.capacity {
        return Err(BorderError::CapacityOverflow {
            capacity: config.capacity,
            cursor: 0,
            requested: n_transitions,
        }
        .into());
    }

    let obs_shape = ObsShape {
        proprioception: trajectory.proprioception_dim(),
        image: image_shape,
    };
    let mut builder = TrajectoryBufferBuilder::<ManiSkillObsBatch, ManiSkillActBatch>::build(
        &config.buffer_config(),
        &obs_shape,
        &trajectory.action_dim(),
    );

    for t in 1..n_steps {
        let obs = ManiSkillObsBatch::from_step(
            trajectory.proprioception(t - 1)?,
            trajectory.image(t - 1, image_shape)?,
        );
        let next_obs = ManiSkillObsBatch::from_step(
            trajectory.proprioception(t)?,
            trajectory.image(t, image_shape)?,
        );
        let act = ManiSkillActBatch::from_step(trajectory.action(t - 1));

        builder.push(GenericTransition {
            obs,
            act,
            reward: vec![0.0],
            next_obs,
            next_reward: vec![0.0],
        })?;
    }

    Ok(builder.freeze())
}

/// Creates one buffer per trajectory.
pub fn build_buffers(
    trajectories: &[DemoTrajectory],
    config: &ManiSkillDatasetConfig,
) -> Result<Vec<ManiSkillBuffer>> {
    let buffers = trajectories
        .iter()
        .map(|trajectory| trajectory_to_buffer(trajectory, config))
        .collect::<Result<Vec<_>>>()?;

    log::info!("Put the demo dataset to the replay buffer");
    log::info!(
        "{} buffers, {} transitions",
        buffers.len(),
        buffers.iter().map(|b| b.len()).sum::<usize>()
    );

    Ok(buffers)
}
