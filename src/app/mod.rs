//! Application-Layer: Controller, Interaktionen, Events und Zeichen-Modus.

pub mod controller;
pub mod dirty;
pub mod drawing;
pub mod events;
pub mod interactions;
mod intent_mapping;
pub mod transaction_log;

pub use controller::InteractionController;
pub use dirty::DirtyTracker;
pub use events::{
    DeleteOutcome, EditCommand, EditIntent, EditOutcome, InsertOutcome, IntentReceiver,
    IntentSender, UpdateOutcome, intent_channel,
};
pub use interactions::{
    ArmState, DrawInteraction, InteractionArena, InteractionKind, MapInteraction,
    ModifyInteraction, SelectInteraction,
};
pub use transaction_log::{TransactionLog, TransactionRecord, TransactionResult};
