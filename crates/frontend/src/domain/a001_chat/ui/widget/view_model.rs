//! Chat Widget - View Model

use crate::domain::a001_chat::client::ChatView;
use contracts::domain::a001_chat::Sender;
use leptos::prelude::*;
use uuid::Uuid;

/// Один отрисованный пузырь сообщения
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBubble {
    pub id: Uuid,
    pub sender: Sender,
    /// Sanitized HTML
    pub markup: String,
}

#[derive(Clone, Copy)]
pub struct ChatWidgetVm {
    pub bubbles: RwSignal<Vec<RenderedBubble>>,
    pub draft: RwSignal<String>,
    pub is_busy: RwSignal<bool>,
    pub window_ref: NodeRef<leptos::html::Div>,
}

impl ChatWidgetVm {
    pub fn new() -> Self {
        Self {
            bubbles: RwSignal::new(Vec::new()),
            draft: RwSignal::new(String::new()),
            is_busy: RwSignal::new(false),
            window_ref: NodeRef::new(),
        }
    }
}

impl Default for ChatWidgetVm {
    fn default() -> Self {
        Self::new()
    }
}

/// Take the draft for sending and clear the input.
///
/// While a request is in flight nothing is taken and the draft stays as typed.
pub fn take_draft(busy: bool, draft: &mut String) -> Option<String> {
    if busy {
        return None;
    }
    Some(std::mem::take(draft))
}

/// Ctrl+Enter / Cmd+Enter в поле ввода
pub fn is_send_shortcut(key: &str, ctrl: bool, meta: bool) -> bool {
    key == "Enter" && (ctrl || meta)
}

impl ChatView for ChatWidgetVm {
    fn append_bubble(&self, sender: Sender, markup: String) {
        self.bubbles.update(|bubbles| {
            bubbles.push(RenderedBubble {
                id: Uuid::new_v4(),
                sender,
                markup,
            })
        });
    }

    fn set_busy(&self, busy: bool) {
        if self.is_busy.get_untracked() != busy {
            self.is_busy.set(busy);
        }
    }

    fn scroll_to_latest(&self) {
        // DOM обновится после эффектов, поэтому скроллим в следующем кадре
        if let Some(container) = self.window_ref.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    }
}
