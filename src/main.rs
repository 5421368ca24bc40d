use std::{
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use log::{debug, info};

mod data;
mod error;
mod model;
mod search;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Find the cheapest mix of packages covering a sequence of connection
/// requests.
#[derive(Parser)]
struct Args {
    /// Request file: a count, then `0 distance duration` or `1 duration` per request
    input: PathBuf,
    /// Output file, defaults to the input path with extension `out`
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON catalog replacing the built-in packages
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Use the unmemoized exponential search
    #[arg(long)]
    exhaustive: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let requests = data::parse_requests(&text)?;
    let waits = requests
        .iter()
        .filter(|request| request.kind == model::RequestKind::Wait)
        .count();
    info!(
        "{} requests, {} use, {} wait, total duration {}",
        requests.len(),
        requests.len() - waits,
        waits,
        search::total_duration(&requests),
    );

    let catalog = match &args.catalog {
        Some(path) => data::parse_catalog(
            &fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        )?,
        None => model::Catalog::reference(),
    };
    info!(
        "  {} fixed packages, pay-per-use {}",
        catalog.fixed().len(),
        catalog
            .pay_per_use()
            .map_or("unavailable".to_string(), |package| package.name.clone()),
    );
    for package in catalog.fixed() {
        debug!(
            "  {} #{}: price {}, fee {}, volume {}, duration {}",
            package.name,
            package.id,
            package.price,
            package.fee,
            package.volume_budget,
            package.duration_budget,
        );
    }

    let purchase = if args.exhaustive {
        info!("Exhaustive search");
        search::exhaustive_purchase(&requests, &catalog)?
    } else {
        info!("Suffix table search");
        search::optimal_purchase(&requests, &catalog)?
    };
    info!(
        "Optimal cost {} with {} purchases",
        purchase.total_cost,
        purchase.lines.len()
    );

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("out"));
    info!("Write {}", output.display());
    let mut output_file = BufWriter::new(
        File::create(&output).with_context(|| format!("creating {}", output.display()))?,
    );
    match args.format {
        Format::Text => write!(
            &mut output_file,
            "{}",
            model::Receipt {
                purchase: &purchase,
                catalog: &catalog,
            }
        )?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut output_file, &purchase)?;
            writeln!(&mut output_file)?
        }
    }
    output_file.flush()?;
    Ok(())
}
