//! Inventory counting on numbered cards.

pub mod desk;
pub mod model;
pub mod outcome;

pub use desk::InventoryDesk;
pub use model::{Article, InventoryCard, Position, PositionDraft, Unit};
pub use outcome::{CardStatus, PositionStatus};
