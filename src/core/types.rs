//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for actors that own a progression ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Magic school, each with its own point pool and perk tree
///
/// Declaration order is the fixed enumeration order used for persistence
/// and for tie-breaking in the tier activation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum School {
    Fire,
    Water,
    Earth,
    Air,
    Abjuration,
    Necromancy,
    Conjuration,
    Manipulation,
}

impl School {
    /// All schools in enumeration order
    pub const ALL: [School; 8] = [
        School::Fire,
        School::Water,
        School::Earth,
        School::Air,
        School::Abjuration,
        School::Necromancy,
        School::Conjuration,
        School::Manipulation,
    ];

    /// Short id used in persisted ledgers and catalog file names
    pub fn short_id(&self) -> &'static str {
        match self {
            School::Fire => "fire",
            School::Water => "water",
            School::Earth => "earth",
            School::Air => "air",
            School::Abjuration => "abjuration",
            School::Necromancy => "necromancy",
            School::Conjuration => "conjuration",
            School::Manipulation => "manipulation",
        }
    }

    /// Parse a school id
    ///
    /// Accepts the short form (`fire`) as well as namespaced host ids
    /// (`ars_nouveau:elemental_fire`).
    pub fn from_id(id: &str) -> Option<School> {
        let name = id.rsplit(':').next().unwrap_or(id).to_ascii_lowercase();
        let name = name.strip_prefix("elemental_").unwrap_or(name.as_str());
        School::ALL.into_iter().find(|s| s.short_id() == name)
    }

    /// Position in enumeration order
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for School {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_id())
    }
}
