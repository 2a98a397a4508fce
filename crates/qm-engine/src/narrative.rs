//! Narrative collaborator: a short story tying memory, place and emotion.
//!
//! Unlike geocoding there is no fallback; a narrator error fails the request.

use std::time::Duration;

use async_trait::async_trait;
use qm_core::emotion::normalize_label;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::NarrativeConfig;
use crate::error::{EngineError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub location: String,
    pub memory: String,
    pub emotion: String,
}

#[async_trait]
pub trait Narrator: Send + Sync {
    fn name(&self) -> &str;
    async fn narrate(&self, request: &NarrativeRequest) -> Result<String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Part {
    Lit(&'static str),
    Location,
    MemoryElement,
}

use Part::{Lit, Location, MemoryElement};

static STORY_TEMPLATES: &[(&str, &[Part])] = &[
    (
        "nostalgic",
        &[
            Lit("古い"),
            Location,
            Lit("に響く、あなたの足音。"),
            MemoryElement,
            Lit("が、記憶の中で静かに光っている。その瞬間、時が止まったような感覚とともに、心の奥深くで何かが優しく微笑みかけている..."),
        ],
    ),
    (
        "melancholy",
        &[
            Lit("風に揺れる"),
            Location,
            Lit("が、遠い記憶を呼び覚ます。"),
            MemoryElement,
            Lit("と共に、忘れかけていた誰かの温かい声が聞こえてくる..."),
        ],
    ),
    (
        "peaceful",
        &[
            Lit("夕暮れ時の"),
            Location,
            Lit("に、温かな光が反射している。そこには、あなたが探していた安らぎと、懐かしい感情が静かに宿っている..."),
        ],
    ),
    (
        "warm",
        &[
            Location,
            Lit("に漂う、どこか懐かしい香り。"),
            MemoryElement,
            Lit("が、この場所での時間をゆっくりと流れさせている..."),
        ],
    ),
    (
        "mysterious",
        &[
            Lit("薄暗い"),
            Location,
            Lit("に、神秘的な雰囲気が漂っている。"),
            MemoryElement,
            Lit("が、隠された記憶の扉を静かに開いている..."),
        ],
    ),
    (
        "anxious",
        &[
            Lit("不安な気持ちが"),
            Location,
            Lit("で和らいでいく。"),
            MemoryElement,
            Lit("が、心の奥の緊張を優しく解きほぐしている..."),
        ],
    ),
];

const DEFAULT_MEMORY_ELEMENT: &str = "その風景";

/// Built-in narrator filling per-emotion templates. Unknown emotions use the
/// nostalgic template.
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn render(request: &NarrativeRequest) -> String {
        let emotion = normalize_label(&request.emotion);
        let template = STORY_TEMPLATES
            .iter()
            .find(|(name, _)| *name == emotion)
            .unwrap_or(&STORY_TEMPLATES[0])
            .1;

        // the part after the first "の" names the place itself
        let location = request
            .location
            .split_once('の')
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&request.location);
        let memory_element = request
            .memory
            .split_whitespace()
            .next()
            .unwrap_or(DEFAULT_MEMORY_ELEMENT);

        template
            .iter()
            .map(|part| match part {
                Lit(text) => *text,
                Location => location,
                MemoryElement => memory_element,
            })
            .collect()
    }
}

#[async_trait]
impl Narrator for TemplateNarrator {
    fn name(&self) -> &str {
        "template"
    }

    async fn narrate(&self, request: &NarrativeRequest) -> Result<String> {
        Ok(Self::render(request))
    }
}

/// Story generation through the Gemini `generateContent` endpoint.
pub struct GeminiNarrator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    text: Option<String>,
}

impl GeminiNarrator {
    pub fn new(config: &NarrativeConfig, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key,
        }
    }

    fn prompt(request: &NarrativeRequest) -> String {
        format!(
            "You are a quantum memory reconstruction AI that helps people rediscover meaningful places.\n\
             Location: \"{}\"\nMemory fragment: \"{}\"\nEmotional context: \"{}\"\n\n\
             Write a 2-3 sentence, deeply emotional and poetic story in Japanese connecting the memory to this place. \
             Reply with the story text only.",
            request.location, request.memory, request.emotion
        )
    }

    /// First non-empty text part, with any code fences stripped.
    fn extract_text(body: GenerateResponse) -> Result<String> {
        let text = body
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .map(|t| t.replace("```json", "").replace("```", "").trim().to_string())
            .find(|t| !t.is_empty());
        text.ok_or_else(|| EngineError::Narrative("response carried no text".into()))
    }
}

#[async_trait]
impl Narrator for GeminiNarrator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn narrate(&self, request: &NarrativeRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": Self::prompt(request)}]}],
        });
        tracing::debug!(model = %self.model, "gemini narrative request");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Narrative(format!("request failed: {}", e.without_url())))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();
            return Err(EngineError::Narrative(format!("API error {status}: {snippet}")));
        }
        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| EngineError::Narrative(format!("malformed response: {}", e.without_url())))?;
        Self::extract_text(parsed)
    }
}
