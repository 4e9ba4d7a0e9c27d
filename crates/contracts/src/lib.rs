//! Types shared by the chat widget (frontend) and the chat endpoint (backend).
//!
//! - `domain::a001_chat` - conversation data model (messages and transcript)
//! - `shared::chat_api` - wire format of `POST /api/chat`

pub mod domain;
pub mod shared;
