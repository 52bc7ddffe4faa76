use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::quantity::{Cents, CentsPerKwh};

/// Delivery tariff applied for the whole billing window, as resolved by the
/// utility lookup for the relevant effective date. No mid-window changes.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct TdspRates {
    pub per_kwh_delivery: CentsPerKwh,
    pub monthly_customer_charge: Cents,
    pub effective_date: NaiveDate,
}
