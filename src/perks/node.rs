//! Perk node definitions and their decoding from catalog documents

use crate::core::types::School;
use crate::perks::payload::PerkPayload;
use crate::perks::types::{PerkCategory, PerkType};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// One node of a school's perk tree
#[derive(Debug, Clone, PartialEq)]
pub struct PerkNode {
    pub id: String,
    pub perk_type: PerkType,
    pub school: School,
    pub tier: u32,
    pub point_cost: u32,
    /// Node ids in the same school that must be unlocked first
    pub prerequisites: Vec<String>,
    /// Opaque token the host must report as satisfied (e.g. a known glyph)
    pub external_requirement: Option<String>,
    pub category: PerkCategory,
    pub payload: PerkPayload,
}

impl PerkNode {
    pub fn is_root(&self) -> bool {
        self.prerequisites.is_empty()
    }

    pub fn requires(&self, node_id: &str) -> bool {
        self.prerequisites.iter().any(|p| p == node_id)
    }
}

/// A node entry exactly as it appears in a catalog document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkDefinition {
    pub id: String,
    pub perk: String,
    pub tier: i64,
    pub point_cost: i64,
    pub category: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default, rename = "prerequisite_external", alias = "prerequisite_glyph")]
    pub external_requirement: Option<String>,
    /// Everything else: the perk type's tuning fields
    #[serde(flatten)]
    pub tuning: Map<String, Value>,
}

/// Why a single catalog entry was rejected
#[derive(Debug, Error)]
pub enum NodeIssue {
    #[error("entry is not a valid node definition: {0}")]
    Malformed(serde_json::Error),

    #[error("unknown perk type '{0}'")]
    UnknownPerkType(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("tier must be positive, got {0}")]
    InvalidTier(i64),

    #[error("pointCost must be positive, got {0}")]
    InvalidPointCost(i64),

    #[error("{perk_type} payload: {source}")]
    Payload {
        perk_type: PerkType,
        source: serde_json::Error,
    },
}

impl PerkDefinition {
    /// Validate the definition and build a node for `school`
    pub fn into_node(self, school: School) -> Result<PerkNode, NodeIssue> {
        let perk_type =
            PerkType::from_tag(&self.perk).ok_or_else(|| NodeIssue::UnknownPerkType(self.perk.clone()))?;

        let category = PerkCategory::from_tag(&self.category)
            .ok_or_else(|| NodeIssue::UnknownCategory(self.category.clone()))?;

        let tier = u32::try_from(self.tier)
            .ok()
            .filter(|t| *t > 0)
            .ok_or(NodeIssue::InvalidTier(self.tier))?;

        let point_cost = u32::try_from(self.point_cost)
            .ok()
            .filter(|c| *c > 0)
            .ok_or(NodeIssue::InvalidPointCost(self.point_cost))?;

        let payload = PerkPayload::decode(perk_type.payload_kind(), &self.tuning)
            .map_err(|source| NodeIssue::Payload { perk_type, source })?;

        Ok(PerkNode {
            id: self.id,
            perk_type,
            school,
            tier,
            point_cost,
            prerequisites: self.prerequisites,
            external_requirement: self.external_requirement,
            category,
            payload,
        })
    }
}

/// Decode one raw JSON entry
pub fn decode_entry(entry: Value, school: School) -> Result<PerkNode, NodeIssue> {
    let definition: PerkDefinition = serde_json::from_value(entry).map_err(NodeIssue::Malformed)?;
    definition.into_node(school)
}
