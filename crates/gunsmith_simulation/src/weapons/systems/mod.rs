//! Weapon systems (attachment, stats, handling, firing, cleaning)

pub mod attachment;
pub mod cleaning;
pub mod firing;
pub mod handling;
pub mod stats;

#[cfg(test)]
mod firing_tests;
#[cfg(test)]
mod handling_tests;

// Re-export all systems
pub use attachment::*;
pub use cleaning::*;
pub use firing::*;
pub use handling::*;
pub use stats::*;
