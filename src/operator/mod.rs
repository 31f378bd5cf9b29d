//! Operator input surface of the client.
//!
//! `intake_endpoint` accepts front-end connections and decodes their message lines,
//! `operator_intake` applies the messages to the cockpit and the target alarm and
//! `operator_messages` defines the line protocol.

mod intake_endpoint;
mod operator_intake;
mod operator_messages;


pub use intake_endpoint::IntakeEndpoint;
pub use operator_intake::OperatorIntake;
pub use operator_messages::{OperatorMessage, OperatorReply};
