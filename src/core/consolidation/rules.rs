//! Rule tables driving consolidation
//!
//! The built-in tables reflect the current national procedure table for the
//! municipal network. Each one can be replaced from `[consolidation]` in the
//! configuration file.

use crate::config::{AddressConfig, ConsolidationConfig, FallbackAddressConfig};
use crate::domain::ProductionRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Procedures aggregated by (facility, procedure, cbo, competence)
pub const GROUPED_PROCEDURES: &[&str] = &[
    "0414020243", "0301100012", "0414020146", "0102010498", "0307030032", "0401010066",
    "0101010036", "0101010010", "0404020674", "0404020577", "0101020074", "0307030040",
    "0301060037", "0307020010", "0301060118", "0301060100", "0414020383", "0414020405",
    "0307020070", "0301060029", "0307010015", "0414020120", "0101020090", "0414020138",
    "0301060096", "0101040024", "0102010056", "0201010020", "0201010470", "0211070041",
    "0211070203", "0211070211", "0301040079", "0301100039", "0401010023", "0307010023",
    "0301010153", "0414020278", "0205020100", "0309050049", "0205020186", "0102010293",
    "0301080399", "0202030776", "0307020118", "0401010031", "0309050022", "0307040151",
    "0102010510", "0211080055", "0102010072", "0102010218", "0301080259", "0301080267",
    "0102010242", "0414020073", "0102010323", "0301040036", "0101020040", "0102010226",
    "0101020015", "0101020023", "0102010528", "0101020082", "0102010307", "0102010064",
    "0101020066", "0101020058", "0404020615", "0307040135", "0401010074", "0414020170",
    "0211020036", "0211020052", "0301100101", "0301080160", "0301100152", "0301100179",
    "0202010473", "0201020041", "0211060275", "0307010040", "0101020031", "0102010340",
    "0102010501", "0214010015", "0414020359", "0307030059", "0307010031", "0202060446",
    "0204010071",
];

/// Procedures aggregated by (facility, procedure, cbo, competence, age)
pub const AGE_GROUPED_PROCEDURES: &[&str] = &[
    "0301010110", "0301010030", "0301010056", "0301010064", "0301010137",
];

/// Procedures no longer accepted in individualized form
pub const DEPRECATED_PROCEDURES: &[&str] = &[
    "0101020104", "0101030010", "0214010201", "0301010269", "0309010063", "0301040141",
    "0301050139", "0301050147", "0301010277", "0309010047", "0301100195", "0301100209",
    "0301100217", "0301100225", "0301100233", "0301100241", "0301100276", "0301100284",
    "0307010155", "0214010082",
];

/// Fragments marking locally coded procedures that never leave the municipality
pub const DEPRECATED_FRAGMENTS: &[&str] = &["ABPG", "ABEX"];

pub const FACILITY_REMAP: &[(&str, &str)] = &[("0000001", "6896847"), ("0491381", "6430163")];

pub const FACILITY_DIAGNOSIS: &[(&str, &str)] = &[("0491381", "G804")];

pub const PROCEDURE_DIAGNOSIS: &[(&str, &str)] = &[
    ("0302070036", "T951"),
    ("0302010025", "N319"),
    ("0302070010", "T302"),
    ("0302060057", "S141"),
    ("0302060030", "G838"),
    ("0302060014", "I694"),
    ("0302050027", "M255"),
    ("0302050019", "T932"),
    ("0302040056", "I988"),
    ("0302040030", "Q048"),
    ("0302040021", "J998"),
    ("0302060022", "I694"),
    ("0201010046", "K629"),
];

/// Resolved consolidation tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationRules {
    pub grouped_procedures: BTreeSet<String>,
    pub age_grouped_procedures: BTreeSet<String>,
    pub deprecated_procedures: BTreeSet<String>,
    pub deprecated_fragments: Vec<String>,
    pub facility_remap: BTreeMap<String, String>,
    pub facility_diagnosis: BTreeMap<String, String>,
    pub procedure_diagnosis: BTreeMap<String, String>,
}

impl Default for ConsolidationRules {
    fn default() -> Self {
        Self {
            grouped_procedures: to_set(GROUPED_PROCEDURES),
            age_grouped_procedures: to_set(AGE_GROUPED_PROCEDURES),
            deprecated_procedures: to_set(DEPRECATED_PROCEDURES),
            deprecated_fragments: DEPRECATED_FRAGMENTS.iter().map(|s| s.to_string()).collect(),
            facility_remap: to_map(FACILITY_REMAP),
            facility_diagnosis: to_map(FACILITY_DIAGNOSIS),
            procedure_diagnosis: to_map(PROCEDURE_DIAGNOSIS),
        }
    }
}

impl ConsolidationRules {
    /// Built-in tables with every configured table swapped in
    pub fn from_config(config: &ConsolidationConfig) -> Self {
        let mut rules = Self::default();
        if let Some(list) = &config.grouped_procedures {
            rules.grouped_procedures = list.iter().cloned().collect();
        }
        if let Some(list) = &config.age_grouped_procedures {
            rules.age_grouped_procedures = list.iter().cloned().collect();
        }
        if let Some(list) = &config.deprecated_procedures {
            rules.deprecated_procedures = list.iter().cloned().collect();
        }
        if let Some(list) = &config.deprecated_fragments {
            rules.deprecated_fragments = list.clone();
        }
        if let Some(map) = &config.facility_remap {
            rules.facility_remap = map.clone();
        }
        if let Some(map) = &config.facility_diagnosis {
            rules.facility_diagnosis = map.clone();
        }
        if let Some(map) = &config.procedure_diagnosis {
            rules.procedure_diagnosis = map.clone();
        }
        rules
    }

    /// Individualized rows with this procedure are dropped by the first pass
    pub fn is_removed_in_first_pass(&self, procedure_code: &str) -> bool {
        self.grouped_procedures.contains(procedure_code)
            || self.deprecated_procedures.contains(procedure_code)
            || self
                .deprecated_fragments
                .iter()
                .any(|f| procedure_code.contains(f.as_str()))
    }
}

/// Replacement address for rows the resolver can never fix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBackstop {
    pub placeholder_postal_codes: BTreeSet<String>,
    /// Empty disables the municipality check
    pub home_municipality_code: String,
    pub fallback: FallbackAddressConfig,
}

impl AddressBackstop {
    pub fn from_config(config: &AddressConfig) -> Self {
        Self {
            placeholder_postal_codes: config.placeholder_postal_codes.iter().cloned().collect(),
            home_municipality_code: config.home_municipality_code.clone(),
            fallback: config.fallback.clone(),
        }
    }

    /// True when the record's address must be replaced by the fallback
    pub fn applies_to(&self, record: &ProductionRecord) -> bool {
        if record.has_incomplete_address() {
            return true;
        }
        if self.placeholder_postal_codes.contains(record.postal_code.trim()) {
            return true;
        }
        !self.home_municipality_code.is_empty()
            && record.municipality_code.trim() != self.home_municipality_code
    }

    pub fn apply(&self, record: &mut ProductionRecord) {
        record.postal_code = self.fallback.postal_code.clone();
        record.street = self.fallback.street.clone();
        record.address_number = self.fallback.number.clone();
        record.neighborhood = self.fallback.neighborhood.clone();
        record.municipality_code = self.fallback.municipality_code.clone();
    }
}

impl Default for AddressBackstop {
    fn default() -> Self {
        Self::from_config(&AddressConfig::default())
    }
}

fn to_set(codes: &[&str]) -> BTreeSet<String> {
    codes.iter().map(|s| s.to_string()).collect()
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrgType;

    #[test]
    fn test_builtin_tables() {
        let rules = ConsolidationRules::default();
        assert_eq!(rules.grouped_procedures.len(), 91);
        assert_eq!(rules.age_grouped_procedures.len(), 5);
        assert_eq!(rules.deprecated_procedures.len(), 20);
        assert_eq!(rules.facility_remap["0491381"], "6430163");
        assert_eq!(rules.procedure_diagnosis["0201010046"], "K629");
    }

    #[test]
    fn test_builtin_tables_do_not_overlap() {
        let rules = ConsolidationRules::default();
        assert!(rules
            .grouped_procedures
            .is_disjoint(&rules.age_grouped_procedures));
    }

    #[test]
    fn test_from_config_replaces_only_given_tables() {
        let config = ConsolidationConfig {
            grouped_procedures: Some(vec!["0301010110".to_string()]),
            deprecated_fragments: Some(vec!["LOCAL".to_string()]),
            ..Default::default()
        };
        let rules = ConsolidationRules::from_config(&config);
        assert_eq!(rules.grouped_procedures.len(), 1);
        assert_eq!(rules.deprecated_fragments, vec!["LOCAL"]);
        assert_eq!(rules.deprecated_procedures.len(), 20);
    }

    #[test]
    fn test_first_pass_removal() {
        let rules = ConsolidationRules::default();
        assert!(rules.is_removed_in_first_pass("0414020243"));
        assert!(rules.is_removed_in_first_pass("0214010082"));
        assert!(rules.is_removed_in_first_pass("ABPG001"));
        assert!(rules.is_removed_in_first_pass("XXABEXYY"));
        assert!(!rules.is_removed_in_first_pass("0301010110"));
    }

    fn addressed() -> ProductionRecord {
        let mut r = ProductionRecord::new(OrgType::Individualized);
        r.postal_code = "07401050".to_string();
        r.street = "Rua Brasil".to_string();
        r.neighborhood = "Centro".to_string();
        r.municipality_code = "350390".to_string();
        r
    }

    #[test]
    fn test_backstop_triggers() {
        let backstop = AddressBackstop::default();
        assert!(!backstop.applies_to(&addressed()));

        let mut placeholder = addressed();
        placeholder.postal_code = "07400000".to_string();
        assert!(backstop.applies_to(&placeholder));

        let mut outside = addressed();
        outside.municipality_code = "355030".to_string();
        assert!(backstop.applies_to(&outside));

        let mut blank = addressed();
        blank.neighborhood.clear();
        assert!(backstop.applies_to(&blank));
    }

    #[test]
    fn test_backstop_without_home_municipality() {
        let mut backstop = AddressBackstop::default();
        backstop.home_municipality_code.clear();
        let mut outside = addressed();
        outside.municipality_code = "355030".to_string();
        assert!(!backstop.applies_to(&outside));
    }

    #[test]
    fn test_backstop_apply() {
        let backstop = AddressBackstop::default();
        let mut record = addressed();
        backstop.apply(&mut record);
        assert_eq!(record.postal_code, "07400959");
        assert_eq!(record.street, "dos Expedicionários");
        assert_eq!(record.address_number, "290");
        assert_eq!(record.neighborhood, "Jardim Rincão");
        assert!(!record.has_incomplete_address());
    }
}
