//! Zeichen-/Mess-Modus als reiner Reducer über diskreten Actions.

pub mod action;
mod reducer;
mod state;
mod store;

pub use action::DrawingAction;
pub use reducer::reduce;
pub use state::{DrawingModeState, Interaction, MeasuredFeature};
pub use store::{DrawingDispatcher, DrawingStore};
