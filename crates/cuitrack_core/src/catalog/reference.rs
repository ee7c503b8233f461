//! Embedded reference catalogs.
//!
//! # Responsibility
//! - Ship the shipped assessment scopes as compile-time JSON assets so the
//!   engine works without any external data files.
//!
//! # Invariants
//! - Assets are validated through the same registration path as caller
//!   supplied documents; a bad asset fails `builtin()` instead of
//!   surfacing later during scoring.

use super::{CatalogResult, StaticCatalogProvider};

const CATALOG_L2_REV2: &str = include_str!("assets/catalog_l2_rev2.json");
const CATALOG_L2_REV3: &str = include_str!("assets/catalog_l2_rev3.json");
const CATALOG_L1_REV2: &str = include_str!("assets/catalog_l1_rev2.json");

/// Provider pre-loaded with the embedded reference catalogs:
/// (L2, Rev2), (L2, Rev3) and (L1, Rev2).
pub fn builtin() -> CatalogResult<StaticCatalogProvider> {
    let mut provider = StaticCatalogProvider::new();
    provider.register_json(CATALOG_L2_REV2)?;
    provider.register_json(CATALOG_L2_REV3)?;
    provider.register_json(CATALOG_L1_REV2)?;
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::builtin;
    use crate::catalog::CatalogProvider;
    use crate::model::catalog::{CatalogLevel, CatalogRevision};

    #[test]
    fn builtin_assets_register_cleanly() {
        let provider = builtin().unwrap();
        for (level, revision) in [
            (CatalogLevel::L2, CatalogRevision::Rev2),
            (CatalogLevel::L2, CatalogRevision::Rev3),
            (CatalogLevel::L1, CatalogRevision::Rev2),
        ] {
            assert!(provider.catalog(level, revision).is_ok());
        }
    }

    #[test]
    fn level_two_rev2_holds_the_full_control_set() {
        let provider = builtin().unwrap();
        let families = provider
            .catalog(CatalogLevel::L2, CatalogRevision::Rev2)
            .unwrap();
        assert_eq!(families.len(), 14);
        let controls: usize = families.iter().map(|f| f.controls.len()).sum();
        assert_eq!(controls, 110);
    }

    #[test]
    fn level_one_scope_is_seventeen_controls() {
        let provider = builtin().unwrap();
        let families = provider
            .catalog(CatalogLevel::L1, CatalogRevision::Rev2)
            .unwrap();
        let controls: usize = families.iter().map(|f| f.controls.len()).sum();
        assert_eq!(controls, 17);
    }

    #[test]
    fn rev3_controls_declare_lineage_back_to_rev2() {
        let provider = builtin().unwrap();
        let rev2 = provider
            .catalog(CatalogLevel::L2, CatalogRevision::Rev2)
            .unwrap();
        let rev3 = provider
            .catalog(CatalogLevel::L2, CatalogRevision::Rev3)
            .unwrap();

        let rev2_ids: Vec<&str> = rev2
            .iter()
            .flat_map(|f| f.controls.iter())
            .map(|c| c.id.as_str())
            .collect();

        for control in rev3.iter().flat_map(|f| f.controls.iter()) {
            if let Some(prior) = &control.prior_revision_id {
                assert!(
                    rev2_ids.contains(&prior.as_str()),
                    "control {} points at unknown prior {prior}",
                    control.id
                );
            }
        }
    }
}
