pub mod client;
pub mod ui;
