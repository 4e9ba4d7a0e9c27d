pub mod prompt;
pub mod service;
