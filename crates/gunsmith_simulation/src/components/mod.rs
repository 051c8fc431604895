//! ECS Components, общие для оружия и целей
//!
//! - actor: Health (+ броня)
//! - equipment: QuickSlots, EquippedWeapon, WieldedBy

pub mod actor;
pub mod equipment;

pub use actor::*;
pub use equipment::*;
