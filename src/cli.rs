use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::{
    core::{engine::AnchorMethod, tdsp::TdspRates},
    quantity::{Cents, CentsPerKwh, KilowattHours},
};

#[derive(Parser)]
#[command(version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Estimate the true yearly cost of a plan.
    Estimate(Box<EstimateArgs>),

    /// Classify a plan's rate structure without pricing it.
    Classify(ClassifyArgs),
}

#[derive(Parser)]
pub struct EstimateArgs {
    /// Rate-structure JSON produced by the EFL parsing pipeline.
    #[clap(long = "plan", env = "PLAN_PATH")]
    pub plan: PathBuf,

    /// Monthly usage buckets JSON (`YYYY-MM` → bucket key → kWh).
    #[clap(long = "usage", env = "USAGE_PATH")]
    pub usage: Option<PathBuf>,

    /// Annual household consumption in kilowatt-hours.
    #[clap(long = "annual-kwh", env = "ANNUAL_KWH")]
    pub annual_kwh: KilowattHours,

    /// Billing months covered by the estimate.
    #[clap(long, default_value = "12", env = "MONTHS")]
    pub months: u32,

    /// Opt in to approximating indexed plans from disclosed price anchors.
    #[clap(long = "indexed-approximation", value_enum)]
    pub indexed_approximation: Option<AnchorMethod>,

    /// Include the non-contractual debug trace in the output.
    #[clap(long)]
    pub debug: bool,

    #[clap(flatten)]
    pub tdsp: TdspArgs,
}

#[derive(Clone, Copy, Parser)]
pub struct TdspArgs {
    /// Delivery charge in cents per kilowatt-hour.
    #[clap(long = "tdsp-delivery-cents", env = "TDSP_DELIVERY_CENTS")]
    pub delivery_cents: CentsPerKwh,

    /// Monthly customer charge in dollars.
    #[clap(long = "tdsp-monthly-dollars", env = "TDSP_MONTHLY_DOLLARS")]
    pub monthly_dollars: f64,

    /// Effective date of the applied delivery tariff.
    #[clap(long = "tdsp-effective-date", env = "TDSP_EFFECTIVE_DATE")]
    pub effective_date: NaiveDate,
}

impl TdspArgs {
    #[must_use]
    pub fn rates(self) -> TdspRates {
        TdspRates {
            per_kwh_delivery: self.delivery_cents,
            monthly_customer_charge: Cents::from_dollars(self.monthly_dollars),
            effective_date: self.effective_date,
        }
    }
}

#[derive(Parser)]
pub struct ClassifyArgs {
    /// Rate-structure JSON produced by the EFL parsing pipeline.
    #[clap(long = "plan", env = "PLAN_PATH")]
    pub plan: PathBuf,
}
