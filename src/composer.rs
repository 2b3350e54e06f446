//! Template story generation used when no model is reachable.
//!
//! Both composers take the random source as a parameter so callers decide
//! between an OS-seeded generator and a fixed seed.

use crate::catalog::{lookup, CatalogEntry};
use crate::story::Character;
use rand::seq::IndexedRandom;
use rand::Rng;

pub const PLACEHOLDER_PROTAGONIST: &str = "the protagonist";

/// Narrative position of a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterArc {
    Introduction,
    RisingTension,
    Climax,
    Resolution,
    Continuation,
}

impl ChapterArc {
    pub fn for_index(chapter_index: u32) -> Self {
        match chapter_index {
            0 => ChapterArc::Introduction,
            1 => ChapterArc::RisingTension,
            2 => ChapterArc::Climax,
            3 => ChapterArc::Resolution,
            _ => ChapterArc::Continuation,
        }
    }
}

fn pick<R: Rng>(rng: &mut R, items: &'static [&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

fn protagonist(characters: &[Character]) -> String {
    characters
        .first()
        .map(|c| c.display_name(0))
        .unwrap_or_else(|| PLACEHOLDER_PROTAGONIST.to_string())
}

pub fn compose_chapter<R: Rng>(
    rng: &mut R,
    chapter_index: u32,
    genre: &str,
    mood: &str,
    characters: &[Character],
) -> String {
    let entry: &CatalogEntry = lookup(genre);
    let hero = protagonist(characters);
    let mood = mood.to_lowercase();

    match ChapterArc::for_index(chapter_index) {
        ChapterArc::Introduction => format!(
            "In the {setting}, {hero} discovered something that would change everything. \
             The {mood} atmosphere was thick with anticipation as shadows danced across ancient stones. \
             What started as a simple journey had become something far more significant. \
             The image before them revealed secrets that had been hidden for centuries, \
             and {hero} knew there was no turning back.",
            setting = pick(rng, entry.settings),
        ),
        ChapterArc::RisingTension => {
            let setting = pick(rng, entry.settings);
            let conflict = pick(rng, entry.conflicts);
            format!(
                "As {hero} delved deeper into the mystery, the {mood} tension grew unbearable. \
                 Every step forward brought new challenges, and the {setting} seemed to pulse with hidden energy. \
                 Allies became uncertain, and enemies revealed themselves in unexpected ways. \
                 The {conflict} that had been brewing was finally beginning to surface."
            )
        }
        ChapterArc::Climax => {
            let conflict = pick(rng, entry.conflicts);
            let setting = pick(rng, entry.settings);
            format!(
                "The confrontation was inevitable. {hero} stood face to face with the {conflict}, \
                 and the {mood} atmosphere crackled with power. \
                 Everything they had learned, every ally they had made, every sacrifice along the way \
                 had led to this moment. The fate of the {setting} hung in the balance."
            )
        }
        ChapterArc::Resolution => {
            let resolution = pick(rng, entry.resolutions);
            let setting = pick(rng, entry.settings);
            format!(
                "In the aftermath of the great trial, {hero} reflected on how much had changed. \
                 The {mood} journey had transformed not just the world around them, but their very soul. \
                 Through {resolution}, a new dawn had broken. \
                 The {setting} was safe, but the adventure had only just begun."
            )
        }
        ChapterArc::Continuation => {
            let setting = pick(rng, entry.settings);
            let conflict = pick(rng, entry.conflicts);
            format!(
                "Chapter {number} continued the {mood} tale of {hero}. \
                 In the {setting}, new challenges arose that tested every lesson learned so far. \
                 The {conflict} grew stronger, but so did the resolve to overcome it. \
                 This was {hero}'s moment to shine, and the world watched with bated breath.",
                number = u64::from(chapter_index) + 1,
            )
        }
    }
}

pub fn compose_title<R: Rng>(rng: &mut R, genre: &str, mood: &str) -> String {
    let entry = lookup(genre);
    let skeleton = &entry.titles[rng.random_range(0..entry.titles.len())];
    let word = pick(rng, skeleton.words);

    // An empty mood would otherwise leave a double space behind.
    skeleton
        .render(mood.trim(), word)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
