use crate::composer::{compose_chapter, compose_title};
use crate::config::ModelSelection;
use crate::llm::{ChatMessage, ChatRequest, ContentPart, LlmClient, LlmError};
use crate::story::{roster, ChapterRequest, TitleRequest};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::Arc;

/// Produces a fresh generator for each fallback composition.
pub type RngSource = Arc<dyn Fn() -> StdRng + Send + Sync>;

pub fn os_rng_source() -> RngSource {
    Arc::new(StdRng::from_os_rng)
}

pub fn seeded_rng_source(seed: u64) -> RngSource {
    Arc::new(move || StdRng::seed_from_u64(seed))
}

/// Outcome of one generation: the model's text, or template text plus the
/// reason the model call failed.
#[derive(Debug)]
pub enum Generation {
    Remote(String),
    Fallback { text: String, cause: LlmError },
}

impl Generation {
    pub fn text(&self) -> &str {
        match self {
            Generation::Remote(text) | Generation::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Generation::Remote(text) | Generation::Fallback { text, .. } => text,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Generation::Remote(_) => "model",
            Generation::Fallback { .. } => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generation::Fallback { .. })
    }
}

const CHAPTER_TEMPERATURE: f32 = 0.8;
const CHAPTER_PRESENCE_PENALTY: f32 = 0.1;
const CHAPTER_FREQUENCY_PENALTY: f32 = 0.1;

const TITLE_MAX_TOKENS: u32 = 50;
const TITLE_TEMPERATURE: f32 = 0.9;
const TITLE_PRESENCE_PENALTY: f32 = 0.2;
const TITLE_FREQUENCY_PENALTY: f32 = 0.3;

const IMAGE_DETAIL: &str = "high";

pub struct StoryGateway {
    llm: Box<dyn LlmClient>,
    models: ModelSelection,
    rng_source: RngSource,
}

impl fmt::Debug for StoryGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryGateway")
            .field("llm", &self.llm)
            .field("models", &self.models)
            .finish_non_exhaustive()
    }
}

impl StoryGateway {
    pub fn new(llm: Box<dyn LlmClient>, models: ModelSelection) -> Self {
        Self {
            llm,
            models,
            rng_source: os_rng_source(),
        }
    }

    pub fn with_rng_source(mut self, rng_source: RngSource) -> Self {
        self.rng_source = rng_source;
        self
    }

    pub fn chapter_request(&self, req: &ChapterRequest) -> ChatRequest {
        let mood = req.mood.to_lowercase();
        let chapter_number = u64::from(req.chapter_index) + 1;

        let mut system = format!(
            "You are a master storyteller specializing in {genre} stories with {mood} atmosphere.\n\
             Create engaging, vivid narratives that:\n\
             - Match the {genre} genre perfectly\n\
             - Maintain a {mood} tone throughout\n\
             - Build on previous story elements\n\
             - Incorporate visual details from the provided image\n\
             - Keep character consistency\n\
             - Write 200-400 words of compelling narrative\n\
             - Use rich, descriptive language appropriate for the genre\n\n\
             This is chapter {chapter_number} of the story.",
            genre = req.genre,
        );
        if !req.characters.is_empty() {
            system.push_str("\nCharacters: ");
            system.push_str(&roster(&req.characters));
        }

        let prompt = if req.prompt.trim().is_empty() {
            format!("Write chapter {} of the story.", chapter_number)
        } else {
            req.prompt.clone()
        };

        let mut parts = vec![ContentPart::Text(prompt)];
        if is_image_reference(&req.image_url) {
            parts.push(ContentPart::ImageUrl {
                url: req.image_url.trim().to_string(),
                detail: IMAGE_DETAIL.to_string(),
            });
        } else if !req.image_url.is_empty() {
            debug!("Ignoring unusable image reference: {}", req.image_url);
        }

        ChatRequest {
            model: self.models.chapter.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(parts)],
            max_tokens: req.max_tokens.max(1),
            temperature: CHAPTER_TEMPERATURE,
            presence_penalty: CHAPTER_PRESENCE_PENALTY,
            frequency_penalty: CHAPTER_FREQUENCY_PENALTY,
        }
    }

    pub fn title_request(&self, req: &TitleRequest) -> ChatRequest {
        let genre = &req.genre;
        let mood = req.mood.to_lowercase();

        let system = format!(
            "You are an expert title creator for {genre} literature. \
             Create compelling, genre-appropriate titles that capture the {mood} essence perfectly."
        );
        let user = format!(
            "Create a compelling, memorable title for a {genre} story with a {mood} atmosphere.\n\n\
             Story context: {prompt}\n\n\
             Requirements:\n\
             - Perfect for the {genre} genre\n\
             - Captures the {mood} mood\n\
             - Memorable and engaging\n\
             - 2-6 words long\n\
             - No quotation marks in response\n\
             - Return ONLY the title, nothing else\n\n\
             Genre-specific style:\n\
             - Fantasy: Mystical, epic, with references to quests, magic, or ancient powers\n\
             - Sci-Fi: Futuristic, technological, cosmic, or dystopian themes\n\
             - Mystery: Intriguing, secretive, with hints of danger or puzzles\n\
             - Romance: Emotional, passionate, with themes of love and connection\n\
             - Horror: Dark, ominous, spine-chilling atmosphere\n\
             - Adventure: Bold, exciting, journey-focused themes",
            prompt = req.prompt,
        );

        ChatRequest {
            model: self.models.title.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user_text(user)],
            max_tokens: TITLE_MAX_TOKENS,
            temperature: TITLE_TEMPERATURE,
            presence_penalty: TITLE_PRESENCE_PENALTY,
            frequency_penalty: TITLE_FREQUENCY_PENALTY,
        }
    }

    pub async fn generate_chapter(&self, req: &ChapterRequest) -> Generation {
        let chapter_number = u64::from(req.chapter_index) + 1;
        info!("Generating {} chapter {} with the model...", req.genre, chapter_number);

        let remote = self
            .llm
            .chat(&self.chapter_request(req))
            .await
            .and_then(|text| non_empty(text.trim().to_string()));

        match remote {
            Ok(text) => {
                info!("Generated {} characters for chapter {}", text.len(), chapter_number);
                Generation::Remote(text)
            }
            Err(cause) => {
                warn!(
                    "Model call failed [{}] ({}), falling back to template generation for chapter {}",
                    cause.kind(),
                    cause,
                    chapter_number
                );
                let mut rng = (self.rng_source)();
                let text = compose_chapter(
                    &mut rng,
                    req.chapter_index,
                    &req.genre,
                    &req.mood,
                    &req.characters,
                );
                Generation::Fallback { text, cause }
            }
        }
    }

    pub async fn generate_title(&self, req: &TitleRequest) -> Generation {
        info!("Generating {} title with {} mood...", req.genre, req.mood);

        let remote = self
            .llm
            .chat(&self.title_request(req))
            .await
            .and_then(|raw| non_empty(clean_title(&raw)));

        match remote {
            Ok(title) => {
                info!("Generated title: {}", title);
                Generation::Remote(title)
            }
            Err(cause) => {
                warn!(
                    "Model title generation failed [{}] ({}), using template title",
                    cause.kind(),
                    cause
                );
                let mut rng = (self.rng_source)();
                let text = compose_title(&mut rng, &req.genre, &req.mood);
                Generation::Fallback { text, cause }
            }
        }
    }
}

fn non_empty(text: String) -> Result<String, LlmError> {
    if text.is_empty() {
        Err(LlmError::MalformedResponse("model returned empty text".to_string()))
    } else {
        Ok(text)
    }
}

/// Strips surrounding whitespace and any enclosing quote characters.
pub fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}'))
        .trim()
        .to_string()
}

/// Absolute URLs (including `data:` URIs) can be forwarded to the model.
fn is_image_reference(image_url: &str) -> bool {
    let trimmed = image_url.trim();
    !trimmed.is_empty() && url::Url::parse(trimmed).is_ok()
}
