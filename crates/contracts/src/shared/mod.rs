pub mod chat_api;
pub mod serde_utils;
