//! Browsing filters over a catalog snapshot.

use crate::catalog::store::CatalogModel;
use crate::core::hardware::HardwareRecord;

/// Temperature (°C) at or above which a cell counts as high-temperature capable
pub const HIGH_TEMPERATURE_C: f64 = 100.0;

/// Ambient temperature assumed for records that do not state a range
pub const AMBIENT_TEMPERATURE_C: f64 = 25.0;

/// Criteria for narrowing a catalog listing or export.
///
/// Technique and instrument lists are any-of; an empty list does not filter.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub techniques: Vec<String>,
    pub instruments: Vec<String>,
    pub cad_only: bool,
    pub high_temperature_only: bool,
    pub pressure_control_only: bool,
}

impl CatalogFilter {
    pub fn matches(&self, record: &HardwareRecord) -> bool {
        if !self.techniques.is_empty()
            && !self.techniques.iter().any(|t| record.supports_technique(t))
        {
            return false;
        }

        if !self.instruments.is_empty()
            && !self.instruments.iter().any(|i| record.qualified_on(i))
        {
            return false;
        }

        if self.cad_only && !record.cad_available {
            return false;
        }

        if self.pressure_control_only && !record.pressure_control {
            return false;
        }

        if self.high_temperature_only && !is_high_temperature(record) {
            return false;
        }

        true
    }

    /// Matching records in catalog order
    pub fn apply<'a>(&self, catalog: &'a CatalogModel) -> Vec<&'a HardwareRecord> {
        catalog.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Records without a stated range are treated as ambient-only
pub fn is_high_temperature(record: &HardwareRecord) -> bool {
    record.max_temperature().unwrap_or(AMBIENT_TEMPERATURE_C) >= HIGH_TEMPERATURE_C
}

/// Sorted, de-duplicated technique names across the catalog
pub fn all_techniques(catalog: &CatalogModel) -> Vec<String> {
    let mut techniques: Vec<String> = catalog
        .iter()
        .flat_map(|r| r.techniques.iter().cloned())
        .collect();
    techniques.sort();
    techniques.dedup();
    techniques
}

/// Sorted, de-duplicated instrument names across the catalog
pub fn all_instruments(catalog: &CatalogModel) -> Vec<String> {
    let mut instruments: Vec<String> = catalog
        .iter()
        .flat_map(|r| r.instruments.iter().cloned())
        .collect();
    instruments.sort();
    instruments.dedup();
    instruments
}
