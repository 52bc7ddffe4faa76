pub mod energy;
pub mod money;
pub mod rate;

pub use self::{energy::KilowattHours, money::Cents, rate::CentsPerKwh};
