//! Ordered, timed command bursts with per-control supersession.

mod sequencer;
pub mod sequences;


pub use sequencer::{SequenceHandle, SequenceResult, SequenceSlot, Sequencer, Superseded};
