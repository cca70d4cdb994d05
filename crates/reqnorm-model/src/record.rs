use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::field::{CanonicalField, FIELD_COUNT};

/// One standardized requirement row: exactly one string per canonical field.
///
/// Built once per source row and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RequirementRecord {
    values: [String; FIELD_COUNT],
}

impl RequirementRecord {
    /// Builds a record by asking `value_for` for every field in catalog order.
    pub fn from_fn(mut value_for: impl FnMut(CanonicalField) -> String) -> Self {
        Self {
            values: std::array::from_fn(|idx| value_for(CanonicalField::ALL[idx])),
        }
    }

    /// Builds a record from explicit `(field, value)` pairs; unset fields are empty.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (CanonicalField, S)>,
        S: Into<String>,
    {
        let mut values: [String; FIELD_COUNT] = Default::default();
        for (field, value) in pairs {
            values[field.index()] = value.into();
        }
        Self { values }
    }

    pub fn get(&self, field: CanonicalField) -> &str {
        &self.values[field.index()]
    }

    /// Values in catalog order.
    pub fn values(&self) -> &[String; FIELD_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        CanonicalField::ALL
            .iter()
            .map(|field| (*field, self.values[field.index()].as_str()))
    }

    /// True when every field is empty.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }
}

impl Serialize for RequirementRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.label(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_default_to_empty() {
        let record = RequirementRecord::from_pairs([(CanonicalField::Title, "Logging")]);
        assert_eq!(record.get(CanonicalField::Title), "Logging");
        assert_eq!(record.iter().filter(|(_, v)| v.is_empty()).count(), 15);
        assert!(!record.is_blank());
        assert!(RequirementRecord::default().is_blank());
    }

    #[test]
    fn from_fn_visits_fields_in_order() {
        let mut seen = Vec::new();
        let record = RequirementRecord::from_fn(|field| {
            seen.push(field);
            field.label().to_string()
        });
        assert_eq!(seen, CanonicalField::ALL.to_vec());
        assert_eq!(record.get(CanonicalField::OriginalIdentifier), "Original Identifier");
    }
}
