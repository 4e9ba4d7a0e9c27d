use super::prompt::SYSTEM_PROMPT;
use crate::shared::config::{self, LlmConfig};
use crate::shared::llm::{ChatMessage as LlmMessage, LlmError, LlmProvider, OpenAiProvider};
use contracts::domain::a001_chat::{ChatMessage, Sender};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Агент чата: системный промпт + модель (+ резервная модель)
pub struct ChatService {
    provider: Arc<dyn LlmProvider>,
    fallback: Option<Arc<dyn LlmProvider>>,
    system_prompt: String,
}

static CHAT_SERVICE: OnceCell<ChatService> = OnceCell::new();

/// Register the process-wide chat service used by the `/api/chat` handler.
pub fn initialize(service: ChatService) -> anyhow::Result<()> {
    CHAT_SERVICE
        .set(service)
        .map_err(|_| anyhow::anyhow!("chat service is already initialized"))
}

pub fn get_service() -> Option<&'static ChatService> {
    CHAT_SERVICE.get()
}

/// Build the service from `[llm]`: OpenAI-compatible provider for `model`,
/// plus one for `fallback_model` when it names a different model.
///
/// A configured model the key cannot use is replaced by `fallback_model`.
/// If the model list cannot be fetched the configured model is kept.
pub async fn build_from_config(llm: &LlmConfig) -> anyhow::Result<ChatService> {
    let api_key = config::get_api_key(llm)?;
    let system_prompt = load_system_prompt(llm)?;
    let fallback_model = llm.fallback_model.trim();

    let configured = provider_for(llm, &api_key, &llm.model);
    let model = match configured.list_models().await {
        Ok(available) => choose_model(&llm.model, fallback_model, &available).to_string(),
        Err(e) => {
            tracing::warn!("Cannot list models ({}), keeping '{}'", e, llm.model);
            llm.model.clone()
        }
    };

    let primary = if model == llm.model {
        configured
    } else {
        provider_for(llm, &api_key, &model)
    };
    let mut service = ChatService::new(Arc::new(primary), system_prompt);

    if !fallback_model.is_empty() && fallback_model != model {
        let fallback = provider_for(llm, &api_key, fallback_model);
        service = service.with_fallback(Arc::new(fallback));
    }

    tracing::info!(
        "Chat service ready: {} model '{}', fallback '{}'",
        service.provider.provider_name(),
        model,
        service.fallback.as_ref().map(|f| f.model()).unwrap_or("-")
    );
    Ok(service)
}

/// Модели, доступные для настроенного ключа (`--list-models`)
pub async fn list_models(llm: &LlmConfig) -> anyhow::Result<Vec<String>> {
    let api_key = config::get_api_key(llm)?;
    let mut models = provider_for(llm, &api_key, &llm.model).list_models().await?;
    models.sort();
    Ok(models)
}

fn provider_for(llm: &LlmConfig, api_key: &str, model: &str) -> OpenAiProvider {
    OpenAiProvider::new_with_endpoint(
        &llm.api_endpoint,
        api_key,
        model,
        llm.temperature,
        llm.max_tokens,
    )
}

/// `configured` when the key can use it, otherwise `fallback` (if set).
///
/// Ids are compared without the `models/` prefix some APIs report.
pub fn choose_model<'a>(configured: &'a str, fallback: &'a str, available: &[String]) -> &'a str {
    let bare = |id: &str| id.trim_start_matches("models/").to_string();
    if fallback.is_empty() || available.iter().any(|id| bare(id) == bare(configured)) {
        return configured;
    }
    tracing::warn!(
        "Model '{}' is not available for this key, using fallback '{}'",
        configured,
        fallback
    );
    fallback
}

fn load_system_prompt(llm: &LlmConfig) -> anyhow::Result<String> {
    if llm.system_prompt_path.trim().is_empty() {
        return Ok(SYSTEM_PROMPT.trim().to_string());
    }
    let path = config::resolve_path(&llm.system_prompt_path);
    let prompt = std::fs::read_to_string(&path).map_err(|e| {
        anyhow::anyhow!("Cannot read system prompt '{}': {}", path.display(), e)
    })?;
    tracing::info!("Loaded system prompt from {}", path.display());
    Ok(prompt.trim().to_string())
}

impl ChatService {
    pub fn new(provider: Arc<dyn LlmProvider>, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            fallback: None,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn LlmProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Сгенерировать ответ агента на сообщение пользователя с учетом истории.
    ///
    /// A rate-limited primary model is retried once on the fallback model.
    /// A blank reply is returned as an empty string.
    pub async fn generate_response(
        &self,
        user_message: &str,
        history: &[ChatMessage],
    ) -> Result<String, LlmError> {
        let user_message = user_message.trim();
        if user_message.is_empty() {
            return Err(LlmError::InvalidRequest("user message is empty".to_string()));
        }

        let messages = build_messages(&self.system_prompt, user_message, history);

        let response = match (
            self.provider.chat_completion(messages.clone()).await,
            &self.fallback,
        ) {
            (Err(LlmError::RateLimitExceeded), Some(fallback)) => {
                tracing::warn!(
                    "Rate limit on '{}', retrying with fallback '{}'",
                    self.provider.model(),
                    fallback.model()
                );
                fallback.chat_completion(messages).await?
            }
            (result, _) => result?,
        };

        let text = response.content.trim();
        if text.is_empty() {
            tracing::warn!("Model '{}' returned an empty reply", response.model);
        }

        tracing::debug!(
            "Reply from '{}' ({} tokens)",
            response.model,
            response.tokens_used.unwrap_or_default()
        );
        Ok(text.to_string())
    }
}

/// Собрать диалог для модели: system prompt, история, текущее сообщение.
///
/// History entries with empty text are skipped. The widget sends the current
/// message as the last history entry too, so that trailing copy is dropped.
pub fn build_messages(
    system_prompt: &str,
    user_message: &str,
    history: &[ChatMessage],
) -> Vec<LlmMessage> {
    let history = match history.split_last() {
        Some((last, rest)) if last.sender == Sender::User && last.text.trim() == user_message => {
            rest
        }
        _ => history,
    };

    let mut messages = Vec::with_capacity(history.len() + 2);
    if !system_prompt.is_empty() {
        messages.push(LlmMessage::system(system_prompt));
    }

    for item in history.iter().filter(|item| !item.text.is_empty()) {
        messages.push(match item.sender {
            Sender::Assistant => LlmMessage::assistant(item.text.as_str()),
            Sender::User => LlmMessage::user(item.text.as_str()),
        });
    }

    messages.push(LlmMessage::user(user_message));
    messages
}
