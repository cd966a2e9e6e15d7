//! Perk definitions: node types, payloads and the catalog that holds them

pub mod catalog;
pub mod handle;
pub mod loader;
pub mod node;
pub mod payload;
pub mod types;

pub use catalog::{CatalogIssue, CatalogLoadReport, IssueSeverity, PerkCatalog};
pub use handle::CatalogHandle;
pub use node::{NodeIssue, PerkDefinition, PerkNode};
pub use payload::{AbilityTuning, PerkPayload};
pub use types::{PayloadKind, PerkCategory, PerkType};
