//! Fixed per-genre vocabulary for template generation.
//!
//! Everything here is `'static` data: lookups borrow from the binary and
//! there is nothing to initialize or mutate at runtime.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Genre {
    #[default]
    Fantasy,
    SciFi,
    Mystery,
}

impl Genre {
    pub const ALL: [Genre; 3] = [Genre::Fantasy, Genre::SciFi, Genre::Mystery];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fantasy => "Fantasy",
            Genre::SciFi => "Sci-Fi",
            Genre::Mystery => "Mystery",
        }
    }

    /// Resolves a free-form genre name, mapping anything unknown to the default.
    pub fn resolve(name: &str) -> Genre {
        name.parse().unwrap_or_default()
    }

    pub fn entry(&self) -> &'static CatalogEntry {
        match self {
            Genre::Fantasy => &FANTASY,
            Genre::SciFi => &SCI_FI,
            Genre::Mystery => &MYSTERY,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown genre: {0}")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fantasy" => Ok(Genre::Fantasy),
            "sci-fi" | "scifi" | "sci fi" => Ok(Genre::SciFi),
            "mystery" => Ok(Genre::Mystery),
            _ => Err(UnknownGenre(s.to_string())),
        }
    }
}

/// A title pattern with `{mood}` and `{word}` slots. `{word}` is drawn from
/// `words`.
#[derive(Debug, PartialEq, Eq)]
pub struct TitleSkeleton {
    pub pattern: &'static str,
    pub words: &'static [&'static str],
}

impl TitleSkeleton {
    pub fn render(&self, mood: &str, word: &str) -> String {
        self.pattern.replace("{mood}", mood).replace("{word}", word)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub genre: Genre,
    pub archetypes: &'static [&'static str],
    pub settings: &'static [&'static str],
    pub conflicts: &'static [&'static str],
    pub resolutions: &'static [&'static str],
    pub titles: [TitleSkeleton; 3],
}

/// Catalog entry for `genre`, or the Fantasy entry when the name is unknown.
pub fn lookup(genre: &str) -> &'static CatalogEntry {
    Genre::resolve(genre).entry()
}

static FANTASY: CatalogEntry = CatalogEntry {
    genre: Genre::Fantasy,
    archetypes: &[
        "brave knight",
        "wise wizard",
        "cunning rogue",
        "noble princess",
        "ancient dragon",
    ],
    settings: &[
        "enchanted forest",
        "mystical kingdom",
        "floating castle",
        "crystal caves",
        "magical academy",
    ],
    conflicts: &[
        "ancient curse",
        "dark prophecy",
        "evil sorcerer",
        "mythical beast",
        "forbidden magic",
    ],
    resolutions: &[
        "heroic sacrifice",
        "magical transformation",
        "divine intervention",
        "true love's power",
        "inner strength",
    ],
    titles: [
        TitleSkeleton {
            pattern: "The {mood} Chronicles of {word}",
            words: &["Eldoria", "Mystania", "Arcanum", "Valeria"],
        },
        TitleSkeleton {
            pattern: "Legends of the {mood} {word}",
            words: &["Sword", "Crown", "Crystal", "Flame"],
        },
        TitleSkeleton {
            pattern: "The {mood} Quest for {word}",
            words: &["Truth", "Power", "Peace", "Redemption"],
        },
    ],
};

static SCI_FI: CatalogEntry = CatalogEntry {
    genre: Genre::SciFi,
    archetypes: &[
        "space explorer",
        "AI researcher",
        "rebel pilot",
        "alien diplomat",
        "cybernetic engineer",
    ],
    settings: &[
        "distant planet",
        "space station",
        "cyberpunk city",
        "alien world",
        "time portal",
    ],
    conflicts: &[
        "alien invasion",
        "AI uprising",
        "time paradox",
        "corporate conspiracy",
        "dimensional rift",
    ],
    resolutions: &[
        "technological breakthrough",
        "peaceful contact",
        "quantum solution",
        "sacrifice for humanity",
        "evolution",
    ],
    titles: [
        TitleSkeleton {
            pattern: "Beyond the {mood} {word}",
            words: &["Void", "Stars", "Galaxy", "Nebula"],
        },
        TitleSkeleton {
            pattern: "The {mood} {word}",
            words: &["Protocol", "Experiment", "Discovery", "Signal"],
        },
        TitleSkeleton {
            pattern: "{mood} Horizons: {word}",
            words: &["New Earth", "Final Frontier", "Lost Colony"],
        },
    ],
};

static MYSTERY: CatalogEntry = CatalogEntry {
    genre: Genre::Mystery,
    archetypes: &["detective", "suspect", "witness", "victim", "investigator"],
    settings: &[
        "crime scene",
        "old mansion",
        "foggy street",
        "locked room",
        "courthouse",
    ],
    conflicts: &[
        "murder mystery",
        "missing person",
        "theft",
        "conspiracy",
        "cover-up",
    ],
    resolutions: &[
        "clever deduction",
        "hidden evidence",
        "confession",
        "unexpected twist",
        "justice served",
    ],
    titles: [
        TitleSkeleton {
            pattern: "The {mood} {word}",
            words: &["Case", "Secret", "Mystery", "Evidence"],
        },
        TitleSkeleton {
            pattern: "{mood} Shadows of {word}",
            words: &["Truth", "Deception", "Justice", "Guilt"],
        },
        TitleSkeleton {
            pattern: "The {mood} {word}",
            words: &["Detective", "Investigation", "Confession", "Witness"],
        },
    ],
};
