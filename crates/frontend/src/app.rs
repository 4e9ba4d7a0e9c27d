use crate::domain::a001_chat::ui::widget::ChatWidget;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="chat-page">
            <header class="chat-header">
                <h1>"Chatbot ADSO"</h1>
                <p>"Asistente de desarrollo de software"</p>
            </header>
            <ChatWidget />
        </main>
    }
}
