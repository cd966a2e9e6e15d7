//! Perk catalog: every node of every school's tree
//!
//! The catalog is built once from definition documents and is read-only
//! afterwards. Lookups go through a flat id map, a per-school ordered id list
//! and a `(school, perk type, tier)` composite index.
//!
//! Bad entries never abort a load. Each one is logged, recorded in the
//! [`CatalogLoadReport`] and skipped, so a single typo in a data file costs
//! one node instead of a whole school.

use crate::core::types::School;
use crate::perks::node::{decode_entry, PerkNode};
use crate::perks::types::PerkType;
use ahash::AHashMap;
use serde::Deserialize;
use serde_json::Value;

/// How serious a load issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Data was kept but looks wrong
    Warning,
    /// Data was discarded
    Skipped,
}

/// One problem found while loading definitions
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogIssue {
    pub school: School,
    /// Offending node id, when the entry got far enough to have one
    pub node_id: Option<String>,
    pub severity: IssueSeverity,
    pub message: String,
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(f, "[{}] {}: {}", self.school, id, self.message),
            None => write!(f, "[{}] {}", self.school, self.message),
        }
    }
}

/// Everything that went wrong (but did not abort) during a catalog load
#[derive(Debug, Clone, Default)]
pub struct CatalogLoadReport {
    pub issues: Vec<CatalogIssue>,
}

impl CatalogLoadReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of entries that were dropped
    pub fn skipped(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Skipped)
            .count()
    }

    pub fn for_school(&self, school: School) -> impl Iterator<Item = &CatalogIssue> {
        self.issues.iter().filter(move |i| i.school == school)
    }

    pub(crate) fn warn(&mut self, school: School, node_id: Option<&str>, message: String) {
        self.record(school, node_id, IssueSeverity::Warning, message);
    }

    pub(crate) fn skip(&mut self, school: School, node_id: Option<&str>, message: String) {
        self.record(school, node_id, IssueSeverity::Skipped, message);
    }

    fn record(&mut self, school: School, node_id: Option<&str>, severity: IssueSeverity, message: String) {
        tracing::warn!(
            "Perk catalog [{}]{}: {}",
            school,
            node_id.map(|id| format!(" {}", id)).unwrap_or_default(),
            message
        );
        self.issues.push(CatalogIssue {
            school,
            node_id: node_id.map(str::to_string),
            severity,
            message,
        });
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    perks: Vec<Value>,
}

/// Immutable lookup table of perk nodes
#[derive(Debug, Clone, Default)]
pub struct PerkCatalog {
    nodes: AHashMap<String, PerkNode>,
    /// Node ids per school, in definition order
    by_school: [Vec<String>; 8],
    by_key: AHashMap<(School, PerkType, u32), String>,
    /// Node id -> ids of same-school nodes that list it as a prerequisite
    dependents: AHashMap<String, Vec<String>>,
    max_tier: [u32; 8],
}

impl PerkCatalog {
    /// Catalog with no nodes; every school has zero max points
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from one JSON document per school
    ///
    /// A school whose document does not parse loads empty. Later documents
    /// for the same school add to (and override ids of) earlier ones.
    pub fn load_documents<'a, I>(documents: I) -> (Self, CatalogLoadReport)
    where
        I: IntoIterator<Item = (School, &'a str)>,
    {
        let mut catalog = Self::default();
        let mut report = CatalogLoadReport::default();

        for (school, text) in documents {
            match serde_json::from_str::<CatalogDocument>(text) {
                Ok(document) => {
                    for entry in document.perks {
                        let entry_id = entry.get("id").and_then(Value::as_str).map(str::to_string);
                        match decode_entry(entry, school) {
                            Ok(node) => catalog.insert(node, &mut report),
                            Err(issue) => report.skip(school, entry_id.as_deref(), issue.to_string()),
                        }
                    }
                }
                Err(e) => report.skip(school, None, format!("malformed definition document: {}", e)),
            }
        }

        catalog.finish(&mut report);

        tracing::info!(
            "Loaded perk catalog: {} nodes across {} schools ({} issues)",
            catalog.len(),
            catalog.schools().count(),
            report.issues.len()
        );

        (catalog, report)
    }

    fn insert(&mut self, node: PerkNode, report: &mut CatalogLoadReport) {
        if let Some(previous) = self.nodes.remove(&node.id) {
            report.warn(
                node.school,
                Some(&node.id),
                format!("duplicate id (previously in {}), later definition wins", previous.school),
            );
            self.by_school[previous.school.index()].retain(|id| id != &previous.id);
            let old_key = (previous.school, previous.perk_type, previous.tier);
            if self.by_key.get(&old_key) == Some(&previous.id) {
                self.by_key.remove(&old_key);
            }
        }

        let key = (node.school, node.perk_type, node.tier);
        if let Some(existing) = self.by_key.get(&key) {
            report.warn(
                node.school,
                Some(&node.id),
                format!("{} tier {} already defined by '{}', later definition wins", node.perk_type, node.tier, existing),
            );
        }

        self.by_key.insert(key, node.id.clone());
        self.by_school[node.school.index()].push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }

    /// Derive per-school data and check prerequisite references
    fn finish(&mut self, report: &mut CatalogLoadReport) {
        self.dependents.clear();
        self.max_tier = [0; 8];

        for school in School::ALL {
            for id in &self.by_school[school.index()] {
                let Some(node) = self.nodes.get(id) else {
                    continue;
                };
                self.max_tier[school.index()] = self.max_tier[school.index()].max(node.tier);

                for prerequisite in &node.prerequisites {
                    match self.nodes.get(prerequisite) {
                        Some(parent) if parent.school == school && parent.id != node.id => {
                            self.dependents
                                .entry(prerequisite.clone())
                                .or_default()
                                .push(node.id.clone());
                        }
                        _ => report.warn(
                            school,
                            Some(&node.id),
                            format!("prerequisite '{}' is not a node of this school; node cannot be allocated", prerequisite),
                        ),
                    }
                }
            }
        }
    }

    pub fn node(&self, id: &str) -> Option<&PerkNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes of one school in definition order
    pub fn nodes_for_school(&self, school: School) -> impl Iterator<Item = &PerkNode> {
        self.by_school[school.index()]
            .iter()
            .filter_map(move |id| self.nodes.get(id))
    }

    pub fn node_by_key(&self, school: School, perk_type: PerkType, tier: u32) -> Option<&PerkNode> {
        self.by_key
            .get(&(school, perk_type, tier))
            .and_then(|id| self.nodes.get(id))
    }

    /// Point cap for a school: one point per node in its tree
    pub fn max_points(&self, school: School) -> u32 {
        self.by_school[school.index()].len() as u32
    }

    /// Highest tier defined anywhere in a school's tree
    pub fn max_tier(&self, school: School) -> u32 {
        self.max_tier[school.index()]
    }

    /// Entry points of a school's tree
    pub fn root_nodes(&self, school: School) -> impl Iterator<Item = &PerkNode> {
        self.nodes_for_school(school).filter(|n| n.is_root())
    }

    /// Nodes that list `id` as a prerequisite
    pub fn dependents_of(&self, id: &str) -> impl Iterator<Item = &PerkNode> {
        self.dependents
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(move |child| self.nodes.get(child))
    }

    /// Schools with at least one node
    pub fn schools(&self) -> impl Iterator<Item = School> + '_ {
        School::ALL
            .into_iter()
            .filter(move |s| !self.by_school[s.index()].is_empty())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
