use std::{path::PathBuf, time::Instant};

use anyhow::Result;
use burn::{prelude::*, tensor::Distribution};
use clap::Parser;
use colorgan_demos::{init_logging, load_config, DemoBackend};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Time forward passes of the colorgan networks", long_about = None)]
struct Args {
    /// JSON model configuration; the default topology is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Height and width of the benchmark image
    #[arg(long, default_value = "256")]
    size: usize,

    /// Number of timed passes per network
    #[arg(short, long, default_value = "20")]
    iterations: usize,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let device = Default::default();
    let config = load_config(args.config.as_deref())?;
    let model = config.init::<DemoBackend>(&device)?;

    let lightness = Tensor::<DemoBackend, 4>::random(
        [1, config.generator.in_channels, args.size, args.size],
        Distribution::Default,
        &device,
    );
    model.generator.check_input(lightness.dims())?;
    let pair = Tensor::<DemoBackend, 4>::random(
        [1, config.critic.in_channels, args.size, args.size],
        Distribution::Default,
        &device,
    );
    model.critic.check_input(pair.dims())?;

    let mut generator_times = Vec::with_capacity(args.iterations);
    let mut critic_times = Vec::with_capacity(args.iterations);
    let start = Instant::now();
    for _ in 0..args.iterations {
        let start_ = Instant::now();
        // Reading the values back forces the backend to finish the pass.
        let _ = model.generator.forward(lightness.clone()).into_data();
        generator_times.push(start_.elapsed());

        let start_ = Instant::now();
        let _ = model.critic.forward(pair.clone()).into_data();
        critic_times.push(start_.elapsed());
    }
    let total = start.elapsed();

    println!(
        "Total time: {:?}, Speed: {:.3} iterations/s",
        total,
        args.iterations as f32 / total.as_secs_f32()
    );
    println!("Generator: {:?}", generator_times);
    println!("Critic: {:?}", critic_times);

    Ok(())
}
