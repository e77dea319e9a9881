//! Interaction record - the only entity the loader moves around

use std::fmt;

/// Source column names, as they appear in the DDInter CSV header and as
/// field names in every destination store.
pub mod columns {
    /// First drug of the pair (required)
    pub const DRUG_A: &str = "Drug_A";
    /// Second drug of the pair (required)
    pub const DRUG_B: &str = "Drug_B";
    /// Severity classification (required)
    pub const LEVEL: &str = "Level";
    /// External identifier of the first drug (optional)
    pub const ID_A: &str = "DDInterID_A";
    /// External identifier of the second drug (optional)
    pub const ID_B: &str = "DDInterID_B";

    /// Columns that must hold a non-empty value for a row to be accepted
    pub const REQUIRED: [&str; 3] = [DRUG_A, DRUG_B, LEVEL];
}

/// Reasons a source row cannot become a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required column is absent from the row or holds an empty string
    MissingField(&'static str),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MissingField(field) => {
                write!(f, "required field '{}' is missing or empty", field)
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// A normalized drug-drug interaction entry
///
/// `drug_a`, `drug_b` and `level` are always non-empty. The external
/// identifiers are `None` rather than `Some("")` when the source had nothing,
/// so document stores never see an empty-string sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InteractionRecord {
    /// First drug name (`Drug_A`)
    pub drug_a: String,
    /// Second drug name (`Drug_B`)
    pub drug_b: String,
    /// Severity classification (`Level`), not validated beyond presence
    pub level: String,
    /// External identifier for `drug_a` (`DDInterID_A`)
    pub id_a: Option<String>,
    /// External identifier for `drug_b` (`DDInterID_B`)
    pub id_b: Option<String>,
}

impl InteractionRecord {
    /// Create a record without external identifiers
    ///
    /// # Errors
    /// Returns [`RecordError::MissingField`] if any required value is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ddi_domain::InteractionRecord;
    ///
    /// let record = InteractionRecord::new("Abacavir", "Aspirin", "Minor").unwrap();
    /// assert_eq!(record.id_a, None);
    /// assert!(InteractionRecord::new("", "Aspirin", "Minor").is_err());
    /// ```
    pub fn new(
        drug_a: impl Into<String>,
        drug_b: impl Into<String>,
        level: impl Into<String>,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            drug_a: required(columns::DRUG_A, Some(drug_a.into()))?,
            drug_b: required(columns::DRUG_B, Some(drug_b.into()))?,
            level: required(columns::LEVEL, Some(level.into()))?,
            id_a: None,
            id_b: None,
        })
    }

    /// Attach external identifiers, normalizing empty strings to `None`
    pub fn with_ids(mut self, id_a: Option<&str>, id_b: Option<&str>) -> Self {
        self.id_a = optional(id_a);
        self.id_b = optional(id_b);
        self
    }

    /// Build a record from a header-driven row lookup
    ///
    /// `lookup` is called with each column name and returns the raw cell, or
    /// `None` when the row has no such column.
    ///
    /// # Examples
    ///
    /// ```
    /// use ddi_domain::InteractionRecord;
    /// use std::collections::HashMap;
    ///
    /// let row: HashMap<&str, &str> = [
    ///     ("Drug_A", "Abacavir"),
    ///     ("Drug_B", "Aspirin"),
    ///     ("Level", "Minor"),
    ///     ("DDInterID_A", "DDInter1"),
    ///     ("DDInterID_B", ""),
    /// ].into_iter().collect();
    ///
    /// let record = InteractionRecord::from_row(|col| row.get(col).copied()).unwrap();
    /// assert_eq!(record.id_a.as_deref(), Some("DDInter1"));
    /// assert_eq!(record.id_b, None);
    /// ```
    pub fn from_row<'a, F>(lookup: F) -> Result<Self, RecordError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        Ok(Self {
            drug_a: required(columns::DRUG_A, lookup(columns::DRUG_A).map(str::to_string))?,
            drug_b: required(columns::DRUG_B, lookup(columns::DRUG_B).map(str::to_string))?,
            level: required(columns::LEVEL, lookup(columns::LEVEL).map(str::to_string))?,
            id_a: optional(lookup(columns::ID_A)),
            id_b: optional(lookup(columns::ID_B)),
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, RecordError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RecordError::MissingField(field)),
    }
}

/// Empty source cells mean "absent"
fn optional(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_full_row_maps_every_field() {
        let r = row(&[
            ("Drug_A", "Naltrexone"),
            ("Drug_B", "Abacavir"),
            ("Level", "Moderate"),
            ("DDInterID_A", "DDInter1263"),
            ("DDInterID_B", "DDInter1"),
        ]);
        let record = InteractionRecord::from_row(|c| r.get(c).copied()).unwrap();

        assert_eq!(record.drug_a, "Naltrexone");
        assert_eq!(record.drug_b, "Abacavir");
        assert_eq!(record.level, "Moderate");
        assert_eq!(record.id_a.as_deref(), Some("DDInter1263"));
        assert_eq!(record.id_b.as_deref(), Some("DDInter1"));
    }

    #[test]
    fn test_missing_optional_columns_are_absent() {
        let r = row(&[("Drug_A", "A"), ("Drug_B", "B"), ("Level", "Major")]);
        let record = InteractionRecord::from_row(|c| r.get(c).copied()).unwrap();
        assert_eq!(record.id_a, None);
        assert_eq!(record.id_b, None);
    }

    #[test]
    fn test_empty_optional_is_absent_not_empty_string() {
        let r = row(&[
            ("Drug_A", "A"),
            ("Drug_B", "B"),
            ("Level", "Major"),
            ("DDInterID_A", ""),
            ("DDInterID_B", ""),
        ]);
        let record = InteractionRecord::from_row(|c| r.get(c).copied()).unwrap();
        assert_eq!(record.id_a, None);
        assert_eq!(record.id_b, None);
    }

    #[test]
    fn test_missing_required_column() {
        let r = row(&[("Drug_A", "A"), ("Level", "Major")]);
        let err = InteractionRecord::from_row(|c| r.get(c).copied()).unwrap_err();
        assert_eq!(err, RecordError::MissingField("Drug_B"));
    }

    #[test]
    fn test_empty_required_value() {
        let r = row(&[("Drug_A", "A"), ("Drug_B", "B"), ("Level", "")]);
        let err = InteractionRecord::from_row(|c| r.get(c).copied()).unwrap_err();
        assert_eq!(err, RecordError::MissingField("Level"));
        assert!(err.to_string().contains("Level"));
    }

    #[test]
    fn test_with_ids_normalizes() {
        let record = InteractionRecord::new("A", "B", "Minor")
            .unwrap()
            .with_ids(Some(""), Some("DDInter9"));
        assert_eq!(record.id_a, None);
        assert_eq!(record.id_b.as_deref(), Some("DDInter9"));
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let record = InteractionRecord::new(" A ", "B", "Minor")
            .unwrap()
            .with_ids(Some(" "), None);
        assert_eq!(record.drug_a, " A ");
        assert_eq!(record.id_a.as_deref(), Some(" "));
    }
}
