//! Markdown rendering for chat bubbles.
//!
//! Message text is converted with `pulldown-cmark`, fenced code blocks go
//! through a [`CodeHighlighter`], and the final HTML is cleaned with `ammonia`
//! before it is handed to `inner_html`.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use wasm_bindgen::prelude::*;

/// Converts raw message text into markup that is safe to inject into the DOM.
pub trait MarkdownRenderer {
    fn render(&self, text: &str) -> String;
}

/// Highlights the body of a code block.
pub trait CodeHighlighter {
    /// HTML for `code` (already escaped), or `None` to keep the plain block.
    fn highlight(&self, code: &str) -> Option<String>;
}

/// Leaves code blocks as plain escaped text
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHighlight;

impl CodeHighlighter for NoHighlight {
    fn highlight(&self, _code: &str) -> Option<String> {
        None
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = hljs, js_name = highlightAuto)]
    fn hljs_highlight_auto(code: &str) -> Result<JsValue, JsValue>;
}

/// highlight.js with automatic language detection.
///
/// Falls back to a plain block when the `hljs` global is not loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct HljsHighlighter;

impl CodeHighlighter for HljsHighlighter {
    fn highlight(&self, code: &str) -> Option<String> {
        let result = hljs_highlight_auto(code).ok()?;
        js_sys::Reflect::get(&result, &JsValue::from_str("value"))
            .ok()?
            .as_string()
    }
}

/// CommonMark (+ tables, strikethrough, task lists) renderer
pub struct CmarkRenderer<H = HljsHighlighter> {
    highlighter: H,
    options: Options,
}

impl<H: CodeHighlighter> CmarkRenderer<H> {
    pub fn new(highlighter: H) -> Self {
        Self {
            highlighter,
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }

    /// Unsanitized HTML
    fn to_html(&self, text: &str) -> String {
        let mut events: Vec<Event<'_>> = Vec::new();
        let mut block: Option<(CodeBlockKind<'_>, String)> = None;

        for event in Parser::new_ext(text, self.options) {
            if let Some((_, code)) = block.as_mut() {
                match event {
                    Event::Text(t) => code.push_str(&t),
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((kind, code)) = block.take() {
                            self.push_code_block(&mut events, kind, code);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => block = Some((kind, String::new())),
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn push_code_block<'a>(
        &self,
        events: &mut Vec<Event<'a>>,
        kind: CodeBlockKind<'a>,
        code: String,
    ) {
        match self.highlighter.highlight(&code) {
            Some(highlighted) => {
                let class = match &kind {
                    CodeBlockKind::Fenced(info) => language_class(info),
                    CodeBlockKind::Indented => String::new(),
                };
                events.push(Event::Html(
                    format!(
                        "<pre><code class=\"hljs{}\">{}</code></pre>\n",
                        class, highlighted
                    )
                    .into(),
                ));
            }
            None => {
                events.push(Event::Start(Tag::CodeBlock(kind)));
                events.push(Event::Text(code.into()));
                events.push(Event::End(TagEnd::CodeBlock));
            }
        }
    }
}

impl Default for CmarkRenderer<HljsHighlighter> {
    fn default() -> Self {
        Self::new(HljsHighlighter)
    }
}

impl<H: CodeHighlighter> MarkdownRenderer for CmarkRenderer<H> {
    fn render(&self, text: &str) -> String {
        sanitize(&self.to_html(text))
    }
}

/// ` language-xxx` from a fence info string such as "rust ignore"
fn language_class(info: &str) -> String {
    let lang: String = info
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#'))
        .collect();
    if lang.is_empty() {
        String::new()
    } else {
        format!(" language-{}", lang)
    }
}

/// Санитизация HTML ответа модели.
///
/// ammonia defaults (no scripts, no `on*` attributes, no `javascript:` URLs)
/// plus `class` for highlight.js spans and `align` for centered headers.
pub fn sanitize(html: &str) -> String {
    ammonia::Builder::default()
        .add_generic_attributes(&["class"])
        .add_tag_attributes("div", &["align"])
        .clean(html)
        .to_string()
}
