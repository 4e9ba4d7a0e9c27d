//! Chat Widget - View Component

use super::model::HttpChatTransport;
use super::view_model::{is_send_shortcut, take_draft, ChatWidgetVm};
use crate::domain::a001_chat::client::ConversationClient;
use crate::shared::api_utils::api_url;
use crate::shared::markdown::CmarkRenderer;
use contracts::shared::chat_api::CHAT_ENDPOINT;
use leptos::prelude::*;

type WidgetClient = ConversationClient<HttpChatTransport, ChatWidgetVm, CmarkRenderer>;

/// Чат-виджет: лента сообщений, индикатор набора и форма ввода.
///
/// Element ids (`chat-window`, `chat-form`, `user-input`, `send-button`,
/// `typing-indicator`) are stable and used by the page stylesheet.
#[component]
#[allow(non_snake_case)]
pub fn ChatWidget(
    /// Chat endpoint URL, `/api/chat` on the backend by default
    #[prop(optional, into)]
    endpoint: Option<String>,
) -> impl IntoView {
    let vm = ChatWidgetVm::new();
    // Page origin by default; set `endpoint` when the widget is hosted elsewhere
    let endpoint = endpoint.unwrap_or_else(|| api_url(CHAT_ENDPOINT));
    let client: WidgetClient = ConversationClient::new(
        HttpChatTransport::new(endpoint),
        vm,
        CmarkRenderer::default(),
    );
    client.start();
    let client = StoredValue::new_local(client);

    // Form submit и Ctrl/Cmd+Enter приходят сюда.
    // While a request is in flight the trigger is dropped and the draft kept.
    let submit = move || {
        let client = client.get_value();
        let busy = client.is_busy();
        let Some(message) = vm.draft.try_update(|draft| take_draft(busy, draft)).flatten() else {
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            client.send_message(&message).await;
        });
    };

    view! {
        <div class="chat-container">
            <div id="chat-window" class="chat-window" node_ref=vm.window_ref aria-live="polite">
                <For
                    each=move || vm.bubbles.get()
                    key=|bubble| bubble.id
                    let:bubble
                >
                    {{
                        let class = format!("message {}", bubble.sender.as_str());
                        view! {
                            <div class=class>
                                <div class="message-bubble" inner_html=bubble.markup></div>
                            </div>
                        }
                    }}
                </For>
            </div>

            <div
                id="typing-indicator"
                class="typing-indicator"
                class:hidden=move || !vm.is_busy.get()
            >
                <span></span>
                <span></span>
                <span></span>
            </div>

            <form
                id="chat-form"
                class="chat-form"
                on:submit=move |ev: leptos::ev::SubmitEvent| {
                    ev.prevent_default();
                    submit();
                }
            >
                <textarea
                    id="user-input"
                    rows="2"
                    placeholder="Escribe tu pregunta... (Ctrl+Enter para enviar)"
                    prop:value=move || vm.draft.get()
                    on:input=move |ev| vm.draft.set(event_target_value(&ev))
                    on:keydown=move |ev: leptos::ev::KeyboardEvent| {
                        if is_send_shortcut(&ev.key(), ev.ctrl_key(), ev.meta_key()) {
                            ev.prevent_default();
                            submit();
                        }
                    }
                ></textarea>
                <button id="send-button" type="submit" disabled=move || vm.is_busy.get()>
                    "Enviar"
                </button>
            </form>
        </div>
    }
}
