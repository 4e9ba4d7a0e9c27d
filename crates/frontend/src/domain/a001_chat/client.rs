//! Conversation client: transcript, busy state and the send/receive exchange.
//!
//! The client does not know about the DOM or about HTTP. It talks to three
//! injected collaborators:
//! - [`ChatTransport`] - performs one `POST /api/chat` exchange
//! - [`ChatView`] - shows rendered bubbles and the busy indicator
//! - [`MarkdownRenderer`] - turns raw message text into safe markup
//!
//! [`ConversationClient`] is a cheap `Clone` handle over single-threaded
//! shared state, so the UI can keep one copy while a send is in flight.
//! No `RefCell` borrow is ever held across an `.await`.

use crate::shared::markdown::MarkdownRenderer;
use async_trait::async_trait;
use contracts::domain::a001_chat::{Sender, Transcript};
use contracts::shared::chat_api::{ChatRequest, ChatResponse};
use std::cell::RefCell;
use std::rc::Rc;

/// Приветствие, которое виджет показывает при запуске
pub const WELCOME_MESSAGE: &str = "Hola, soy tu chatbot ADSO especializado en desarrollo de software.\n\
Pregúntame sobre programación, buenas prácticas, arquitectura, APIs, etc.";

/// Shown when the server answers successfully with no text
pub const EMPTY_REPLY_PLACEHOLDER: &str = "(Respuesta vacía del modelo)";

/// Shown when the server reports a failure without an error text
pub const DEFAULT_FAILURE_MESSAGE: &str = "Ocurrió un error al comunicarse con el agente.";

/// Shown when the exchange itself fails (network error, unreadable body)
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "No se pudo contactar al servidor. Verifica que el backend esté en ejecución.";

/// One request/response exchange with the chat endpoint.
///
/// `Err` means a transport-level failure: the server was unreachable or its
/// body could not be decoded. Application failures come back as
/// `Ok(ChatResponse { success: false, .. })`.
#[async_trait(?Send)]
pub trait ChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, String>;
}

#[async_trait(?Send)]
impl<C: ChatTransport + ?Sized> ChatTransport for Rc<C> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, String> {
        (**self).send(request).await
    }
}

/// Visible surface of the widget.
pub trait ChatView {
    /// Append one already-rendered message block at the bottom of the chat.
    fn append_bubble(&self, sender: Sender, markup: String);
    /// Show or hide the typing indicator and toggle the submit control.
    fn set_busy(&self, busy: bool);
    fn scroll_to_latest(&self);
}

impl<V: ChatView + ?Sized> ChatView for Rc<V> {
    fn append_bubble(&self, sender: Sender, markup: String) {
        (**self).append_bubble(sender, markup)
    }

    fn set_busy(&self, busy: bool) {
        (**self).set_busy(busy)
    }

    fn scroll_to_latest(&self) {
        (**self).scroll_to_latest()
    }
}

/// How the assistant reply of a completed send was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Answer,
    EmptyAnswer,
    ApplicationError,
    TransportError,
}

/// Result of [`ConversationClient::send_message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input: nothing appended, no request made.
    Ignored,
    /// Another send was still in flight: nothing appended, no request made.
    Rejected,
    /// One user entry and exactly one assistant entry were appended.
    Replied(ReplyKind),
}

/// Map a decoded server response to the assistant text that gets displayed.
pub fn reply_for(response: ChatResponse) -> (ReplyKind, String) {
    if !response.success {
        let text = response
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        return (ReplyKind::ApplicationError, text);
    }

    match response.response.filter(|r| !r.is_empty()) {
        Some(text) => (ReplyKind::Answer, text),
        None => (ReplyKind::EmptyAnswer, EMPTY_REPLY_PLACEHOLDER.to_string()),
    }
}

#[derive(Default)]
struct ClientState {
    transcript: Transcript,
    busy: bool,
}

struct Inner<T, V, R> {
    transport: T,
    view: V,
    renderer: R,
    state: RefCell<ClientState>,
}

pub struct ConversationClient<T, V, R> {
    inner: Rc<Inner<T, V, R>>,
}

impl<T, V, R> Clone for ConversationClient<T, V, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, V, R> ConversationClient<T, V, R>
where
    T: ChatTransport,
    V: ChatView,
    R: MarkdownRenderer,
{
    pub fn new(transport: T, view: V, renderer: R) -> Self {
        Self {
            inner: Rc::new(Inner {
                transport,
                view,
                renderer,
                state: RefCell::new(ClientState::default()),
            }),
        }
    }

    /// Widget startup: record and show the welcome message.
    ///
    /// The greeting is part of the transcript, so it is sent as context with
    /// every later request.
    pub fn start(&self) {
        self.record(Sender::Assistant, WELCOME_MESSAGE.to_string());
    }

    /// Render `text` into the chat area and scroll to it.
    ///
    /// Display only: the transcript is not touched.
    pub fn append_message(&self, sender: Sender, text: &str) {
        let markup = self.inner.renderer.render(text);
        self.inner.view.append_bubble(sender, markup);
        self.inner.view.scroll_to_latest();
    }

    pub fn set_busy(&self, busy: bool) {
        self.inner.state.borrow_mut().busy = busy;
        self.inner.view.set_busy(busy);
    }

    pub fn is_busy(&self) -> bool {
        self.inner.state.borrow().busy
    }

    /// Snapshot of the transcript
    pub fn transcript(&self) -> Transcript {
        self.inner.state.borrow().transcript.clone()
    }

    /// Send one user message and display the assistant's answer.
    ///
    /// Every failure ends up as an ordinary assistant message, and the busy
    /// state is cleared on every exit path once the request was dispatched.
    pub async fn send_message(&self, message: &str) -> SendOutcome {
        if message.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        if self.is_busy() {
            log::warn!("send rejected: a request is already in flight");
            return SendOutcome::Rejected;
        }

        self.record(Sender::User, message.to_string());
        self.set_busy(true);
        let _busy = BusyGuard { client: self };

        let request = ChatRequest {
            message: message.to_string(),
            history: self.inner.state.borrow().transcript.to_history(),
        };
        log::debug!("sending chat message ({} history entries)", request.history.len());

        let (kind, text) = match self.inner.transport.send(&request).await {
            Ok(response) => reply_for(response),
            Err(e) => {
                log::error!("chat request failed: {}", e);
                (ReplyKind::TransportError, TRANSPORT_FAILURE_MESSAGE.to_string())
            }
        };
        self.record(Sender::Assistant, text);

        SendOutcome::Replied(kind)
    }

    fn record(&self, sender: Sender, text: String) {
        self.append_message(sender, &text);
        self.inner.state.borrow_mut().transcript.push(sender, text);
    }
}

/// Clears the busy state when the send future finishes or is dropped.
struct BusyGuard<'a, T, V, R>
where
    T: ChatTransport,
    V: ChatView,
    R: MarkdownRenderer,
{
    client: &'a ConversationClient<T, V, R>,
}

impl<T, V, R> Drop for BusyGuard<'_, T, V, R>
where
    T: ChatTransport,
    V: ChatView,
    R: MarkdownRenderer,
{
    fn drop(&mut self) {
        // No borrow of the state outlives a statement in `send_message`.
        self.client.inner.state.borrow_mut().busy = false;
        self.client.inner.view.set_busy(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_chat::ChatMessage;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::task::{Context, Poll};

    #[derive(Default)]
    struct FakeView {
        bubbles: RefCell<Vec<(Sender, String)>>,
        busy: Cell<bool>,
        scrolls: Cell<usize>,
    }

    impl ChatView for FakeView {
        fn append_bubble(&self, sender: Sender, markup: String) {
            self.bubbles.borrow_mut().push((sender, markup));
        }

        fn set_busy(&self, busy: bool) {
            self.busy.set(busy);
        }

        fn scroll_to_latest(&self) {
            self.scrolls.set(self.scrolls.get() + 1);
        }
    }

    struct TagRenderer;

    impl MarkdownRenderer for TagRenderer {
        fn render(&self, text: &str) -> String {
            format!("<p>{}</p>", text)
        }
    }

    /// Replays canned results and records what it was asked, including the
    /// busy flag the view showed at dispatch time.
    struct ScriptedTransport {
        replies: RefCell<VecDeque<Result<ChatResponse, String>>>,
        requests: RefCell<Vec<ChatRequest>>,
        view: Rc<FakeView>,
        busy_at_dispatch: RefCell<Vec<bool>>,
    }

    #[async_trait(?Send)]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, String> {
            self.requests.borrow_mut().push(request.clone());
            self.busy_at_dispatch.borrow_mut().push(self.view.busy.get());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted reply".to_string()))
        }
    }

    type TestClient = ConversationClient<Rc<ScriptedTransport>, Rc<FakeView>, TagRenderer>;

    fn setup(
        replies: Vec<Result<ChatResponse, String>>,
    ) -> (TestClient, Rc<ScriptedTransport>, Rc<FakeView>) {
        let view = Rc::new(FakeView::default());
        let transport = Rc::new(ScriptedTransport {
            replies: RefCell::new(replies.into()),
            requests: RefCell::new(Vec::new()),
            view: Rc::clone(&view),
            busy_at_dispatch: RefCell::new(Vec::new()),
        });
        let client = ConversationClient::new(Rc::clone(&transport), Rc::clone(&view), TagRenderer);
        client.start();
        (client, transport, view)
    }

    fn failure_without_text() -> ChatResponse {
        ChatResponse {
            success: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_start_records_welcome() {
        let (client, _, view) = setup(vec![]);

        let transcript = client.transcript();
        assert_eq!(transcript.entries(), &[ChatMessage::assistant(WELCOME_MESSAGE)]);
        assert_eq!(view.bubbles.borrow().len(), 1);
        assert_eq!(view.bubbles.borrow()[0].0, Sender::Assistant);
        assert!(!client.is_busy());
    }

    #[test]
    fn test_round_trip_success() {
        let (client, transport, view) =
            setup(vec![Ok(ChatResponse::success("Hi!", vec![]))]);

        let outcome = block_on(client.send_message("Hello"));

        assert_eq!(outcome, SendOutcome::Replied(ReplyKind::Answer));
        let transcript = client.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(
            &transcript.entries()[1..],
            &[ChatMessage::user("Hello"), ChatMessage::assistant("Hi!")]
        );
        let bubbles = view.bubbles.borrow();
        assert_eq!(bubbles.last(), Some(&(Sender::Assistant, "<p>Hi!</p>".to_string())));
        assert_eq!(view.scrolls.get(), 3);

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "Hello");
        assert_eq!(
            requests[0].history,
            vec![ChatMessage::assistant(WELCOME_MESSAGE), ChatMessage::user("Hello")]
        );
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let (client, transport, view) = setup(vec![]);

        for blank in ["", "   ", "\n\t "] {
            assert_eq!(block_on(client.send_message(blank)), SendOutcome::Ignored);
        }

        assert_eq!(client.transcript().len(), 1);
        assert!(transport.requests.borrow().is_empty());
        assert!(!client.is_busy());
        assert!(!view.busy.get());
        assert_eq!(view.bubbles.borrow().len(), 1);
    }

    #[test]
    fn test_busy_only_while_request_pending() {
        let (client, transport, view) =
            setup(vec![Ok(ChatResponse::success("ok", vec![]))]);

        assert!(!client.is_busy());
        block_on(client.send_message("question"));

        assert_eq!(*transport.busy_at_dispatch.borrow(), vec![true]);
        assert!(!client.is_busy());
        assert!(!view.busy.get());
    }

    #[test]
    fn test_application_error_text() {
        let (client, _, _) = setup(vec![Ok(ChatResponse::failure("rate limited"))]);

        let outcome = block_on(client.send_message("Hello"));

        assert_eq!(outcome, SendOutcome::Replied(ReplyKind::ApplicationError));
        assert_eq!(
            client.transcript().last(),
            Some(&ChatMessage::assistant("rate limited"))
        );
    }

    #[test]
    fn test_application_error_default_text() {
        let (client, _, view) = setup(vec![Ok(failure_without_text())]);

        block_on(client.send_message("Hello"));

        assert_eq!(
            client.transcript().last(),
            Some(&ChatMessage::assistant(DEFAULT_FAILURE_MESSAGE))
        );
        assert!(!view.busy.get());
    }

    #[test]
    fn test_transport_error() {
        let (client, _, view) = setup(vec![Err("connection refused".to_string())]);

        let outcome = block_on(client.send_message("Hello"));

        assert_eq!(outcome, SendOutcome::Replied(ReplyKind::TransportError));
        assert_eq!(client.transcript().len(), 3);
        assert_eq!(
            client.transcript().last(),
            Some(&ChatMessage::assistant(TRANSPORT_FAILURE_MESSAGE))
        );
        assert!(!client.is_busy());
        assert!(!view.busy.get());
    }

    #[test]
    fn test_empty_reply_placeholder() {
        let (client, _, _) = setup(vec![
            Ok(ChatResponse::success("", vec![])),
            Ok(ChatResponse {
                success: true,
                ..Default::default()
            }),
        ]);

        assert_eq!(
            block_on(client.send_message("one")),
            SendOutcome::Replied(ReplyKind::EmptyAnswer)
        );
        assert_eq!(
            client.transcript().last(),
            Some(&ChatMessage::assistant(EMPTY_REPLY_PLACEHOLDER))
        );

        block_on(client.send_message("two"));
        assert_eq!(
            client.transcript().last(),
            Some(&ChatMessage::assistant(EMPTY_REPLY_PLACEHOLDER))
        );
    }

    #[test]
    fn test_every_send_adds_exactly_two_entries() {
        let (client, _, _) = setup(vec![
            Ok(ChatResponse::success("a", vec![])),
            Ok(ChatResponse::failure("b")),
            Err("offline".to_string()),
            Ok(failure_without_text()),
        ]);

        let mut expected = client.transcript().len();
        for message in ["1", "2", "3", "4"] {
            block_on(client.send_message(message));
            expected += 2;
            let transcript = client.transcript();
            assert_eq!(transcript.len(), expected);
            assert_eq!(transcript.entries()[expected - 2], ChatMessage::user(message));
            assert_eq!(transcript.entries()[expected - 1].sender, Sender::Assistant);
        }
    }

    #[test]
    fn test_second_request_carries_full_history() {
        let (client, transport, _) = setup(vec![
            Ok(ChatResponse::success("first reply", vec![])),
            Ok(ChatResponse::success("second reply", vec![])),
        ]);

        block_on(client.send_message("first"));
        block_on(client.send_message("second"));

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].history,
            vec![
                ChatMessage::assistant(WELCOME_MESSAGE),
                ChatMessage::user("first"),
                ChatMessage::assistant("first reply"),
                ChatMessage::user("second"),
            ]
        );
    }

    struct GatedTransport {
        gate: RefCell<Option<oneshot::Receiver<Result<ChatResponse, String>>>>,
        calls: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl ChatTransport for GatedTransport {
        async fn send(&self, _request: &ChatRequest) -> Result<ChatResponse, String> {
            self.calls.set(self.calls.get() + 1);
            let gate = self.gate.borrow_mut().take();
            match gate {
                Some(rx) => rx.await.map_err(|_| "gate closed".to_string())?,
                None => Err("gate already used".to_string()),
            }
        }
    }

    #[test]
    fn test_overlapping_send_is_rejected() {
        let (tx, rx) = oneshot::channel();
        let transport = Rc::new(GatedTransport {
            gate: RefCell::new(Some(rx)),
            calls: Cell::new(0),
        });
        let view = Rc::new(FakeView::default());
        let client = ConversationClient::new(Rc::clone(&transport), Rc::clone(&view), TagRenderer);
        client.start();

        let mut first = Box::pin(client.send_message("first"));
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(first.as_mut().poll(&mut cx).is_pending());
        assert!(client.is_busy());
        assert!(view.busy.get());

        let second = block_on(client.send_message("second"));
        assert_eq!(second, SendOutcome::Rejected);
        assert_eq!(client.transcript().len(), 2);
        assert_eq!(transport.calls.get(), 1);
        assert!(client.is_busy());

        tx.send(Ok(ChatResponse::success("done", vec![]))).unwrap();
        assert_eq!(
            first.as_mut().poll(&mut cx),
            Poll::Ready(SendOutcome::Replied(ReplyKind::Answer))
        );
        assert_eq!(client.transcript().len(), 3);
        assert!(!client.is_busy());
        assert!(!view.busy.get());
    }

    #[test]
    fn test_dropped_send_clears_busy() {
        let (_tx, rx) = oneshot::channel();
        let transport = Rc::new(GatedTransport {
            gate: RefCell::new(Some(rx)),
            calls: Cell::new(0),
        });
        let view = Rc::new(FakeView::default());
        let client = ConversationClient::new(transport, Rc::clone(&view), TagRenderer);

        let mut pending = Box::pin(client.send_message("hello"));
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(pending.as_mut().poll(&mut cx).is_pending());
        assert!(view.busy.get());

        drop(pending);
        assert!(!client.is_busy());
        assert!(!view.busy.get());

        // The next send goes through instead of being rejected.
        let next = block_on(client.send_message("again"));
        assert_eq!(next, SendOutcome::Replied(ReplyKind::TransportError));
        assert!(!client.is_busy());
    }

    #[test]
    fn test_reply_for_ignores_empty_error_text() {
        let (kind, text) = reply_for(ChatResponse {
            success: false,
            error: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(kind, ReplyKind::ApplicationError);
        assert_eq!(text, DEFAULT_FAILURE_MESSAGE);
    }
}
