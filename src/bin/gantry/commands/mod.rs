//! Command implementations

pub mod analyze;
pub mod fix;
pub mod patch;
