//! 이슈별 수정 제안
//!
//! 모든 제안은 사람의 검토를 전제로 합니다.
//! [`ChatCompletionSuggester`]는 어떤 실패에서도 에러를 돌려주지 않고
//! 해당 이슈에 대해 규칙 기반 제안으로 대체합니다.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use a11ylens_core::types::Issue;

use crate::error::ReportError;

/// 규칙 기반 제안의 신뢰도
pub const FALLBACK_CONFIDENCE: f32 = 0.7;

/// 응답에 신뢰도가 없을 때 사용하는 값
const DEFAULT_COMPLETION_CONFIDENCE: f32 = 0.8;

/// 이슈에 수정 안내가 없을 때의 일반 안내
pub const GENERIC_INSTRUCTION: &str =
    "Review and add alternative text or ARIA attributes as appropriate for WCAG 2.1 Level AA.";

/// 프롬프트에 넣는 스니펫 최대 길이 (문자)
const MAX_SNIPPET_CHARS: usize = 500;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 수정 제안
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixSuggestion {
    pub issue_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_code: Option<String>,
    pub suggested_description: String,
    /// 0.0 ~ 1.0
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
}

/// 수정 제안기
///
/// 입력 이슈마다 정확히 하나의 제안을 같은 순서로 반환합니다.
pub trait FixSuggester: Send + Sync {
    fn name(&self) -> &str;

    fn suggest(&self, issues: &[Issue]) -> impl Future<Output = Vec<FixSuggestion>> + Send;
}

/// 이슈 자체의 수정 안내를 사용하는 제안
pub fn fallback_suggestion(issue: &Issue) -> FixSuggestion {
    let description = match &issue.suggested_fix {
        Some(fix) => format!("Apply: {fix}"),
        None => GENERIC_INSTRUCTION.to_owned(),
    };
    FixSuggestion {
        issue_id: issue.id.clone(),
        suggested_code: issue.suggested_fix.clone(),
        suggested_description: description,
        confidence: FALLBACK_CONFIDENCE,
        alternatives: Vec::new(),
    }
}

/// 규칙 기반 제안기
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSuggester;

impl FixSuggester for RuleBasedSuggester {
    fn name(&self) -> &str {
        "rule-based"
    }

    async fn suggest(&self, issues: &[Issue]) -> Vec<FixSuggestion> {
        issues.iter().map(fallback_suggestion).collect()
    }
}

/// chat completion 엔드포인트 설정
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: 300,
            timeout: Duration::from_secs(30),
        }
    }

    /// `OPENAI_API_KEY`가 설정된 경우에만 설정을 만듭니다.
    ///
    /// `A11YLENS_SUGGEST_ENDPOINT`, `A11YLENS_SUGGEST_MODEL`로 기본값을 덮어쓸 수 있습니다.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(endpoint) = std::env::var("A11YLENS_SUGGEST_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("A11YLENS_SUGGEST_MODEL") {
            config.model = model;
        }
        Some(config)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// 모델이 돌려주는 JSON 형식
#[derive(Deserialize)]
struct SuggestionReply {
    description: Option<String>,
    code: Option<String>,
    confidence: Option<f32>,
}

/// OpenAI 호환 chat completion 제안기
pub struct ChatCompletionSuggester {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl ChatCompletionSuggester {
    pub fn new(config: CompletionConfig) -> Result<Self, ReportError> {
        if config.endpoint.trim().is_empty() {
            return Err(ReportError::invalid_input("endpoint", "must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    async fn suggest_one(&self, issue: &Issue) -> Result<FixSuggestion, ReportError> {
        let prompt = build_prompt(issue);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Completion(format!(
                "endpoint responded with status {}",
                status.as_u16()
            )));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        let reply = parse_reply(&content)
            .ok_or_else(|| ReportError::Completion("reply has no JSON object".to_owned()))?;

        Ok(FixSuggestion {
            issue_id: issue.id.clone(),
            suggested_code: reply.code.filter(|c| !c.trim().is_empty()),
            suggested_description: reply
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| fallback_suggestion(issue).suggested_description),
            confidence: reply
                .confidence
                .unwrap_or(DEFAULT_COMPLETION_CONFIDENCE)
                .clamp(0.0, 1.0),
            alternatives: Vec::new(),
        })
    }
}

impl FixSuggester for ChatCompletionSuggester {
    fn name(&self) -> &str {
        "chat-completion"
    }

    async fn suggest(&self, issues: &[Issue]) -> Vec<FixSuggestion> {
        let mut suggestions = Vec::with_capacity(issues.len());
        for issue in issues {
            match self.suggest_one(issue).await {
                Ok(suggestion) => {
                    debug!(issue_id = %issue.id, confidence = suggestion.confidence, "suggestion received");
                    suggestions.push(suggestion);
                }
                Err(e) => {
                    warn!(issue_id = %issue.id, error = %e, "completion failed, using rule-based suggestion");
                    suggestions.push(fallback_suggestion(issue));
                }
            }
        }
        suggestions
    }
}

/// 환경에 따라 선택되는 제안기
pub enum Suggester {
    RuleBased(RuleBasedSuggester),
    Chat(ChatCompletionSuggester),
}

impl Suggester {
    /// API 키가 있으면 chat completion, 없으면 규칙 기반 제안기를 사용합니다.
    pub fn from_env() -> Self {
        match CompletionConfig::from_env().map(ChatCompletionSuggester::new) {
            Some(Ok(chat)) => Self::Chat(chat),
            Some(Err(e)) => {
                warn!(error = %e, "chat completion suggester unavailable, using rule-based");
                Self::RuleBased(RuleBasedSuggester)
            }
            None => Self::RuleBased(RuleBasedSuggester),
        }
    }
}

impl FixSuggester for Suggester {
    fn name(&self) -> &str {
        match self {
            Self::RuleBased(s) => s.name(),
            Self::Chat(s) => s.name(),
        }
    }

    async fn suggest(&self, issues: &[Issue]) -> Vec<FixSuggestion> {
        match self {
            Self::RuleBased(s) => s.suggest(issues).await,
            Self::Chat(s) => s.suggest(issues).await,
        }
    }
}

/// 이슈 하나에 대한 프롬프트
pub fn build_prompt(issue: &Issue) -> String {
    let mut lines = vec![
        "You are an accessibility expert helping fix WCAG 2.1 / AODA compliance issues.".to_owned(),
        String::new(),
        "Issue:".to_owned(),
        format!("- Rule: {}", issue.title),
        format!("- Description: {}", issue.description),
        format!("- Impact: {}", issue.impact),
    ];
    if let Some(selector) = issue.selector() {
        lines.push(format!("- Selector: {selector}"));
    }
    if let Some(snippet) = &issue.snippet {
        let snippet: String = snippet.chars().take(MAX_SNIPPET_CHARS).collect();
        lines.push(format!("- Code snippet: {snippet}"));
    }
    if let Some(path) = issue.file_path() {
        lines.push(format!("- File: {path}"));
    }
    lines.push(String::new());
    lines.push(
        "Provide a concise, actionable fix. Format your response as JSON:\n\
         {\"description\": \"1-2 sentence fix instruction\", \"code\": \"optional code fix if applicable\", \"confidence\": 0.0-1.0}"
            .to_owned(),
    );
    lines.join("\n")
}

/// 응답 본문에서 첫 `{`부터 마지막 `}`까지를 JSON으로 해석합니다.
fn parse_reply(content: &str) -> Option<SuggestionReply> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&content[start..=end]).ok()
}
