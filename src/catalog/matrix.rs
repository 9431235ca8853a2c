//! Technique compatibility matrix: which cell supports which technique.

use serde::Serialize;

use crate::catalog::filter::all_techniques;
use crate::catalog::store::CatalogModel;
use crate::core::hardware::HardwareRecord;
use crate::core::types::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub record_id: RecordId,
    pub name: String,
    /// One flag per column of [`TechniqueMatrix::techniques`]
    pub supported: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechniqueMatrix {
    pub techniques: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

impl TechniqueMatrix {
    /// Build the matrix for `records`, with columns drawn from the whole catalog
    pub fn build<'a>(
        catalog: &CatalogModel,
        records: impl IntoIterator<Item = &'a HardwareRecord>,
    ) -> Self {
        let techniques = all_techniques(catalog);
        let rows = records
            .into_iter()
            .map(|record| MatrixRow {
                record_id: record.id.clone(),
                name: record.name.clone(),
                supported: techniques
                    .iter()
                    .map(|t| record.supports_technique(t))
                    .collect(),
            })
            .collect();

        Self { techniques, rows }
    }

    /// Number of cells supporting each technique, in column order
    pub fn column_counts(&self) -> Vec<usize> {
        (0..self.techniques.len())
            .map(|col| self.rows.iter().filter(|r| r.supported[col]).count())
            .collect()
    }
}
