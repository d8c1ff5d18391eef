use anyhow::{Error, Result};
use clap::Parser;
use oisst::{
    cli::{command, Cli, Commands},
    domain::RegionSet,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Download {
            year,
            output_dir,
            try_thredds,
            timeout_secs,
        } => command::download(year, output_dir, try_thredds, timeout_secs).await,
        Commands::Subset {
            input,
            domain,
            fill_nan,
            output,
        } => command::subset(&input, domain, fill_nan, output),
        Commands::Climatology {
            input,
            start,
            end,
            harmonics,
            leap_day,
            fill_nan,
            output,
        } => command::climatology(&input, start, end, harmonics, leap_day, fill_nan, output),
        Commands::Index {
            input,
            regions,
            start,
            end,
            cutoff,
            leap_day,
            output,
        } => {
            let regions = RegionSet::flatten(&regions);
            command::index(&input, &regions, start, end, cutoff, leap_day, output)
        }
    };

    match outcome {
        Ok(filename) => println!("File saved to `{}`", filename),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
