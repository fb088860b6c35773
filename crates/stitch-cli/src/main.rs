//! stitch command-line entrypoint.
//!
//! Downloads every strip of a server-fragmented PNG concurrently and writes
//! the assembled image to disk:
//!
//! ```text
//! stitch -b 5 -p 4 -c 4 -x 0 -n 1
//! ```

#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stitch_fetch::{HttpFetcher, DEFAULT_ENDPOINT};
use stitch_pipeline::{Pipeline, PipelineConfig, PipelineError, StripGeometry};
use tracing::error;

/// Exit code for configuration failures, distinct from runtime failures.
const EXIT_CONFIG: u8 = 2;

/// Fetch a strip-fragmented PNG and assemble it into one image.
#[derive(Parser, Debug)]
#[command(name = "stitch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Queue capacity in fragments.
    #[arg(short = 'b', long, default_value_t = 5,
          value_parser = clap::value_parser!(u32).range(1..=50))]
    buffer_size: u32,

    /// Producer worker count.
    #[arg(short = 'p', long, default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..=20))]
    producers: u32,

    /// Consumer worker count.
    #[arg(short = 'c', long, default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..=20))]
    consumers: u32,

    /// Per-fragment consumer sleep in milliseconds.
    #[arg(short = 'x', long, default_value_t = 0,
          value_parser = clap::value_parser!(u64).range(0..=1000))]
    delay_ms: u64,

    /// Image to fetch.
    #[arg(short = 'n', long, default_value_t = 1,
          value_parser = clap::value_parser!(u8).range(1..=3))]
    image: u8,

    /// Fragment endpoint.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Output file.
    #[arg(short, long, default_value = "all.png")]
    output: PathBuf,

    /// Print a machine-readable summary instead of the timing line.
    #[arg(long)]
    json: bool,
}

fn build_config(cli: &Cli) -> PipelineConfig {
    PipelineConfig {
        buffer_size: cli.buffer_size as usize,
        num_producers: cli.producers as usize,
        num_consumers: cli.consumers as usize,
        consumer_delay_ms: cli.delay_ms,
        image_num: cli.image,
        geometry: StripGeometry::default(),
    }
}

#[tokio::main]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli);
    let fetcher = Arc::new(HttpFetcher::new(cli.endpoint).context("building HTTP client")?);

    let result = Pipeline::new(config, fetcher)?.run().await?;
    result
        .png
        .save(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    let elapsed = result.elapsed.as_secs_f64();
    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "elapsed_seconds": elapsed,
                "output": cli.output,
                "width": result.png.width(),
                "height": result.png.height(),
                "abandoned": result.abandoned,
            })
        );
    } else {
        println!("stitch execution time: {elapsed:.2} seconds");
    }
    Ok(())
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for program output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            match error.downcast_ref::<PipelineError>() {
                Some(PipelineError::Config(_)) => ExitCode::from(EXIT_CONFIG),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_build_a_valid_config() {
        let cli = Cli::try_parse_from(["stitch"]).unwrap();
        assert!(build_config(&cli).validate().is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected_at_parse() {
        assert!(Cli::try_parse_from(["stitch", "-b", "51"]).is_err());
        assert!(Cli::try_parse_from(["stitch", "-p", "0"]).is_err());
        assert!(Cli::try_parse_from(["stitch", "-c", "21"]).is_err());
        assert!(Cli::try_parse_from(["stitch", "-x", "1001"]).is_err());
        assert!(Cli::try_parse_from(["stitch", "-n", "4"]).is_err());
    }

    #[test]
    fn short_flags_mirror_the_classic_interface() {
        let cli =
            Cli::try_parse_from(["stitch", "-b", "5", "-p", "4", "-c", "4", "-x", "10", "-n", "2"])
                .unwrap();
        let config = build_config(&cli);
        assert_eq!(config.buffer_size, 5);
        assert_eq!(config.num_producers, 4);
        assert_eq!(config.num_consumers, 4);
        assert_eq!(config.consumer_delay_ms, 10);
        assert_eq!(config.image_num, 2);
    }
}
