//! Durable session records that survive a restart.

mod saved_state;
mod state_store;
mod writer;


pub use saved_state::{SavedAlarmState, SavedControlState, restore_plan};
pub use state_store::{FileStateStore, PersistenceError};
pub use writer::PersistenceWriter;
