//! Chat Widget UI Module (MVVM Standard)
//!
//! Structure:
//! - model.rs: HTTP transport for `/api/chat`
//! - view_model.rs: ChatWidgetVm with RwSignals, implements `ChatView`
//! - view.rs: Main component ChatWidget

mod model;
mod view;
mod view_model;

pub use model::HttpChatTransport;
pub use view::ChatWidget;
pub use view_model::{ChatWidgetVm, RenderedBubble};
