pub mod aggregate;

pub use aggregate::{ChatMessage, Sender, Transcript};
