pub mod anchors;
pub mod charges;
pub mod credits;
pub mod minimum;
pub mod tiers;
pub mod tou;
