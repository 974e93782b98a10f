pub mod countdown;
pub mod turn_gate;

pub use countdown::{CountdownEvent, Participant};
pub use turn_gate::{Turn, TurnGate};
