use anyhow::Result;
use border_maniskill::{
    get_dataset_seeded, ExampleDataset, H5pyLoader, ManiSkillDatasetConfig, ToTensor,
};
use clap::Parser;
use std::path::PathBuf;

/// Builds train/validation examples from a ManiSkill demonstration archive.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file of `ManiSkillDatasetConfig`. Overrides the other options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the demonstration archive.
    #[arg(long, default_value = "trajectory.rgb.pd_ee_delta_pos.physx_cpu.h5")]
    demo_path: PathBuf,

    /// The number of trajectories to load.
    #[arg(long, default_value_t = 2)]
    num_queries: usize,

    /// Maximum number of examples sampled per trajectory.
    #[arg(long, default_value_t = 150)]
    scale: usize,

    /// Fraction of examples used for training.
    #[arg(long, default_value_t = 0.8)]
    train_split: f64,

    /// Length of the action sequence.
    #[arg(long, default_value_t = 10)]
    context_length: usize,

    /// Seed of the split.
    #[arg(long)]
    seed: Option<u64>,

    /// Index of the training example to print.
    #[arg(long, default_value_t = 2)]
    index: usize,

    /// Saves the configuration to this file.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn config(args: &Args) -> Result<ManiSkillDatasetConfig> {
    match &args.config {
        Some(path) => ManiSkillDatasetConfig::load(path),
        None => Ok(ManiSkillDatasetConfig::default()
            .demo_path(args.demo_path.clone())
            .num_queries(args.num_queries)
            .scale(args.scale)
            .train_split(args.train_split)
            .context_length(args.context_length)
            .seed(args.seed)),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = config(&args)?;

    if let Some(path) = &args.save_config {
        config.save(path)?;
    }

    let (train_set, valid_set) = get_dataset_seeded(&config, &H5pyLoader::default())?;
    println!("{} train examples, {} validation examples", train_set.len(), valid_set.len());

    let dataset = ExampleDataset::new(train_set, ToTensor::default());
    let example = dataset.get(args.index)?;
    println!("image: {:?}", example.image.shape());
    println!("proprioception: {}", example.proprioception);
    println!("action sequence:\n{}", example.action_sequence);

    Ok(())
}
