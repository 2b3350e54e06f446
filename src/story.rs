use serde::{Deserialize, Serialize};

pub const DEFAULT_GENRE: &str = "Fantasy";
pub const DEFAULT_MOOD: &str = "Epic";
pub const DEFAULT_MAX_TOKENS: u32 = 500;

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Character {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Character {
    pub fn named(name: &str, role: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            role: Some(role.to_string()),
        }
    }

    /// The character's name, or `Character<index>` when it has none.
    pub fn display_name(&self, index: usize) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Character{}", index),
        }
    }
}

/// One-line roster for prompts, e.g. `Aria (protagonist), Character1`.
pub fn roster(characters: &[Character]) -> String {
    characters
        .iter()
        .enumerate()
        .map(|(i, c)| match c.role.as_deref().map(str::trim) {
            Some(role) if !role.is_empty() => format!("{} ({})", c.display_name(i), role),
            _ => c.display_name(i),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ChapterRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub chapter_index: u32,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_mood")]
    pub mood: String,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ChapterRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            image_url: String::new(),
            chapter_index: 0,
            genre: default_genre(),
            mood: default_mood(),
            characters: Vec::new(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TitleRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_mood")]
    pub mood: String,
}

impl Default for TitleRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            genre: default_genre(),
            mood: default_mood(),
        }
    }
}

fn default_genre() -> String {
    DEFAULT_GENRE.to_string()
}
fn default_mood() -> String {
    DEFAULT_MOOD.to_string()
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
