//! Weapon components (data model)

pub mod cleaning;
pub mod definition;
pub mod part;
pub mod state;


// Re-export all components
pub use cleaning::*;
pub use definition::*;
pub use part::*;
pub use state::*;
