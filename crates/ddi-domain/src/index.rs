//! Lookup indexes built on every destination

use crate::record::columns;

/// A field the consuming application looks interactions up by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexField {
    /// `Drug_A`
    DrugA,
    /// `Drug_B`
    DrugB,
    /// `Level`
    Level,
}

impl IndexField {
    /// The standard index set created before ingestion
    pub const ALL: [IndexField; 3] = [IndexField::DrugA, IndexField::DrugB, IndexField::Level];

    /// Column / document field name
    pub fn column(&self) -> &'static str {
        match self {
            IndexField::DrugA => columns::DRUG_A,
            IndexField::DrugB => columns::DRUG_B,
            IndexField::Level => columns::LEVEL,
        }
    }

    /// Index name used by the embedded SQL backend
    pub fn index_name(&self) -> &'static str {
        match self {
            IndexField::DrugA => "idx_drug_a",
            IndexField::DrugB => "idx_drug_b",
            IndexField::Level => "idx_level",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_match_source_header() {
        let cols: Vec<_> = IndexField::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(cols, vec!["Drug_A", "Drug_B", "Level"]);
    }

    #[test]
    fn test_index_names_are_distinct() {
        let mut names: Vec<_> = IndexField::ALL.iter().map(|f| f.index_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 3);
    }
}
