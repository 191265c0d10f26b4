use std::collections::HashMap;

use super::{normalize_whitespace, CatalogError};

/// Ordered list of official station names; defines the column order of every table
#[derive(Debug, Clone)]
pub struct CanonicalStationList {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl CanonicalStationList {
    pub fn new(names: Vec<String>) -> Result<Self, CatalogError> {
        if names.is_empty() {
            return Err(CatalogError::EmptyStationList);
        }

        let mut index = HashMap::with_capacity(names.len());
        for (column, name) in names.iter().enumerate() {
            // Canonicalized labels are always whitespace-normalized, so an
            // unnormalized station name could never be matched
            if name.is_empty() || normalize_whitespace(name) != *name {
                return Err(CatalogError::InvalidStationName(name.clone()));
            }
            if index.insert(name.clone(), column).is_some() {
                return Err(CatalogError::DuplicateStation(name.clone()));
            }
        }

        Ok(Self { names, index })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn name(&self, column: usize) -> Option<&str> {
        self.names.get(column).map(String::as_str)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positions_follow_input_order() {
        let list = CanonicalStationList::new(names(&["Zeta", "Alpha", "Mid"])).unwrap();
        assert_eq!(list.position("Zeta"), Some(0));
        assert_eq!(list.position("Alpha"), Some(1));
        assert_eq!(list.position("Mid"), Some(2));
        assert_eq!(list.name(1), Some("Alpha"));
        assert!(!list.contains("alpha"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = CanonicalStationList::new(names(&["A", "B", "A"])).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateStation(name) if name == "A"));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            CanonicalStationList::new(Vec::new()),
            Err(CatalogError::EmptyStationList)
        ));
    }

    #[test]
    fn test_unnormalized_name_rejected() {
        let err = CanonicalStationList::new(names(&["Pos  Hujan"])).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidStationName(_)));
    }
}
