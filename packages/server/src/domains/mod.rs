// Business domains
pub mod analysis;
pub mod intake;
