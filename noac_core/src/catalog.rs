//! Catalog of the NOACs covered by the rule set.
//!
//! Holds display names and the reference list of strong P-gp inhibitors
//! shown during co-medication intake.

use crate::Drug;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Names a drug is known by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrugInfo {
    pub drug: Drug,
    pub generic_name: &'static str,
    pub brand_name: &'static str,
}

static DRUGS: [DrugInfo; 4] = [
    DrugInfo {
        drug: Drug::Dabigatran,
        generic_name: "Dabigatran",
        brand_name: "Pradaxa",
    },
    DrugInfo {
        drug: Drug::Rivaroxaban,
        generic_name: "Rivaroxaban",
        brand_name: "Xarelto",
    },
    DrugInfo {
        drug: Drug::Edoxaban,
        generic_name: "Edoxaban",
        brand_name: "Lixiana",
    },
    DrugInfo {
        drug: Drug::Apixaban,
        generic_name: "Apixaban",
        brand_name: "Eliquis",
    },
];

/// Strong P-gp inhibitors the clinician is asked about
pub const STRONG_PGP_INHIBITORS: [&str; 5] = [
    "Verapamil",
    "Dronedarone",
    "Erythromycin",
    "Ketoconazole",
    "Ciclosporin",
];

/// Lowercase generic and brand names, built once
static NAME_INDEX: Lazy<HashMap<String, Drug>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for info in &DRUGS {
        index.insert(info.generic_name.to_lowercase(), info.drug);
        index.insert(info.brand_name.to_lowercase(), info.drug);
    }
    index
});

/// All catalog entries in enumeration order
pub fn all_drugs() -> &'static [DrugInfo] {
    &DRUGS
}

/// Catalog entry for a drug
pub fn drug_info(drug: Drug) -> &'static DrugInfo {
    match drug {
        Drug::Dabigatran => &DRUGS[0],
        Drug::Rivaroxaban => &DRUGS[1],
        Drug::Edoxaban => &DRUGS[2],
        Drug::Apixaban => &DRUGS[3],
    }
}

/// Resolve a generic or brand name, ignoring case and surrounding whitespace
pub fn lookup_drug(name: &str) -> Option<Drug> {
    NAME_INDEX.get(&name.trim().to_lowercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_enumeration_order() {
        let drugs: Vec<Drug> = all_drugs().iter().map(|d| d.drug).collect();
        assert_eq!(drugs, Drug::ALL.to_vec());
    }

    #[test]
    fn test_drug_info_is_consistent() {
        for drug in Drug::ALL {
            assert_eq!(drug_info(drug).drug, drug);
        }
    }

    #[test]
    fn test_lookup_by_generic_and_brand() {
        assert_eq!(lookup_drug("dabigatran"), Some(Drug::Dabigatran));
        assert_eq!(lookup_drug("  XARELTO "), Some(Drug::Rivaroxaban));
        assert_eq!(lookup_drug("Lixiana"), Some(Drug::Edoxaban));
        assert_eq!(lookup_drug("warfarin"), None);
        assert_eq!(lookup_drug(""), None);
    }
}
