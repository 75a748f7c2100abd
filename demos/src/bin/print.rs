use std::path::PathBuf;

use anyhow::Result;
use burn::{prelude::*, tensor::Distribution};
use clap::Parser;
use colorgan_demos::{init_logging, load_config, DemoBackend};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print the colorgan networks and their output shapes", long_about = None)]
struct Args {
    /// JSON model configuration; the default topology is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Height and width of the sample image
    #[arg(long, default_value = "256")]
    size: usize,

    /// Batch size of the sample image
    #[arg(long, default_value = "1")]
    batch: usize,

    /// Skip printing the module trees
    #[arg(long)]
    shapes_only: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let device = Default::default();
    let config = load_config(args.config.as_deref())?;
    let model = config.init::<DemoBackend>(&device)?;

    if !args.shapes_only {
        println!("{}", model.generator);
        println!("{}", model.critic);
    }
    println!("Generator parameters: {}", model.generator.num_params());
    println!("Critic parameters: {}", model.critic.num_params());

    let gen_in = [args.batch, config.generator.in_channels, args.size, args.size];
    let x = Tensor::<DemoBackend, 4>::random(gen_in, Distribution::Default, &device);
    let y = model.generator.try_forward(x)?;
    println!("Generator: {:?} -> {:?}", gen_in, y.dims());

    let critic_in = [args.batch, config.critic.in_channels, args.size, args.size];
    let x = Tensor::<DemoBackend, 4>::random(critic_in, Distribution::Default, &device);
    match model.critic.try_forward(x) {
        Ok(scores) => println!("Critic: {:?} -> {:?}", critic_in, scores.dims()),
        Err(err) => println!("Critic: {err}"),
    }

    Ok(())
}
