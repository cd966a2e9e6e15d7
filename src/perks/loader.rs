//! Load perk trees from a directory of `<school>.json` files

use crate::core::types::School;
use crate::perks::catalog::{CatalogLoadReport, PerkCatalog};
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the definition document for one school
pub fn school_file(dir: &Path, school: School) -> PathBuf {
    dir.join(format!("{}.json", school.short_id()))
}

impl PerkCatalog {
    /// Load every school's tree from `dir`
    ///
    /// A missing or unreadable file leaves that school empty and is recorded
    /// in the report alongside any per-entry issues.
    pub fn load_dir(dir: &Path) -> (PerkCatalog, CatalogLoadReport) {
        let mut texts = Vec::with_capacity(School::ALL.len());
        let mut unreadable = CatalogLoadReport::default();

        for school in School::ALL {
            let path = school_file(dir, school);
            match fs::read_to_string(&path) {
                Ok(text) => texts.push((school, text)),
                Err(e) => unreadable.skip(
                    school,
                    None,
                    format!("failed to read {}: {}", path.display(), e),
                ),
            }
        }

        let (catalog, mut report) =
            PerkCatalog::load_documents(texts.iter().map(|(school, text)| (*school, text.as_str())));

        unreadable.issues.append(&mut report.issues);
        (catalog, unreadable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dir_with_missing_schools() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            school_file(dir.path(), School::Air),
            r#"{"perks": [{"id": "free_jump_1", "perk": "PASSIVE_FREE_JUMP", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 1}]}"#,
        )
        .unwrap();

        let (catalog, report) = PerkCatalog::load_dir(dir.path());
        assert_eq!(catalog.max_points(School::Air), 1);
        assert_eq!(catalog.max_points(School::Fire), 0);
        assert_eq!(report.skipped(), 7);
        assert_eq!(report.for_school(School::Air).count(), 0);
    }

    #[test]
    fn test_school_file_name() {
        let path = school_file(Path::new("trees"), School::Necromancy);
        assert_eq!(path, Path::new("trees").join("necromancy.json"));
    }
}
