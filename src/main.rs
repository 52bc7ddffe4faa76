use std::{fs, path::Path};

use anyhow::{Context, Result};
use armadillo::{
    cli::{Args, Command},
    core::{
        classify::classify,
        engine::{Estimator, IndexedMode},
        rate_structure::RateStructure,
        usage::UsageHistory,
    },
    tables,
};
use clap::{Parser, crate_version};
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Estimate(args) => {
            let plan: RateStructure = read_json(&args.plan)?;
            let usage: Option<UsageHistory> = args.usage.as_deref().map(read_json).transpose()?;

            let estimate = Estimator::builder()
                .rate_structure(&plan)
                .tdsp(args.tdsp.rates())
                .annual_kwh(args.annual_kwh)
                .maybe_usage(usage.as_ref())
                .months(args.months)
                .indexed_mode(
                    args.indexed_approximation
                        .map_or(IndexedMode::Refuse, IndexedMode::Approximate),
                )
                .debug(args.debug)
                .estimate();

            println!("{}", tables::summary_table(&estimate));
            if let Some(breakdown) = &estimate.breakdown {
                println!("{}", tables::breakdown_table(breakdown));
            }
            for note in &estimate.notes {
                println!("  · {note}");
            }
            if let Some(debug) = &estimate.debug {
                println!("{}", serde_json::to_string_pretty(debug)?);
            }
            Ok(())
        }

        Command::Classify(args) => {
            let plan: RateStructure = read_json(&args.plan)?;
            let classification = classify(&plan);
            info!(kind = classification.name(), "classified");
            println!("{classification:#?}");
            Ok(())
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
