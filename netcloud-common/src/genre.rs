//! Recognized genres and their destination topics
//!
//! The destination channel is a forum: every genre has its own topic
//! (thread) id. The compiled defaults match the live NetCloud_Films layout;
//! a `[topics]` table in the TOML config can override individual entries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Topic (forum thread) identifier in the destination channel
pub type TopicId = i64;

/// The 11 genres accepted in announcements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Drame,
    ScienceFiction,
    Animation,
    Policier,
    Documentaire,
    Thriller,
    Aventure,
    Horreur,
    Comedie,
    Fantastique,
}

impl Genre {
    /// Every recognized genre, in display order
    pub const ALL: [Genre; 11] = [
        Genre::Action,
        Genre::Drame,
        Genre::ScienceFiction,
        Genre::Animation,
        Genre::Policier,
        Genre::Documentaire,
        Genre::Thriller,
        Genre::Aventure,
        Genre::Horreur,
        Genre::Comedie,
        Genre::Fantastique,
    ];

    /// Label as written in announcements and in the ledger's Genre column
    pub fn label(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Drame => "Drame",
            Genre::ScienceFiction => "Science-Fiction",
            Genre::Animation => "Animation",
            Genre::Policier => "Policier",
            Genre::Documentaire => "Documentaire",
            Genre::Thriller => "Thriller",
            Genre::Aventure => "Aventure",
            Genre::Horreur => "Horreur",
            Genre::Comedie => "Comédie",
            Genre::Fantastique => "Fantastique",
        }
    }

    /// Compiled-in topic id for this genre
    pub fn default_topic(self) -> TopicId {
        match self {
            Genre::Comedie => 4,
            Genre::Action => 5,
            Genre::Drame => 6,
            Genre::ScienceFiction => 7,
            Genre::Aventure => 8,
            Genre::Fantastique => 9,
            Genre::Thriller => 10,
            Genre::Horreur => 11,
            Genre::Animation => 12,
            Genre::Policier => 13,
            Genre::Documentaire => 14,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = Error;

    /// Case-insensitive match against the canonical labels, after trimming.
    /// Accents are significant: "Comedie" is not "Comédie".
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Genre::ALL
            .into_iter()
            .find(|g| g.label().to_lowercase() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("unrecognized genre '{}'", s.trim())))
    }
}

/// Genre → topic routing table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMap {
    topics: BTreeMap<Genre, TopicId>,
}

impl Default for TopicMap {
    fn default() -> Self {
        Self {
            topics: Genre::ALL.into_iter().map(|g| (g, g.default_topic())).collect(),
        }
    }
}

impl TopicMap {
    /// Build the table from compiled defaults plus label-keyed overrides
    ///
    /// Override keys use the announcement labels (e.g. `"Science-Fiction"`).
    /// An unknown label is a configuration error rather than silently ignored.
    pub fn with_overrides(overrides: &BTreeMap<String, TopicId>) -> Result<Self> {
        let mut map = Self::default();
        for (label, topic) in overrides {
            let genre: Genre = label
                .parse()
                .map_err(|_| Error::Config(format!("[topics] has unknown genre '{}'", label)))?;
            map.topics.insert(genre, *topic);
        }
        Ok(map)
    }

    /// Destination topic for a genre
    pub fn topic_for(&self, genre: Genre) -> TopicId {
        self.topics
            .get(&genre)
            .copied()
            .unwrap_or_else(|| genre.default_topic())
    }
}
