/// An insertion-ordered set of narrowing criteria for a list view.
///
/// A key with an empty value is inactive: it stays in the set (so draft
/// edits keep their position in the filter panel) but is never sent to the
/// backend as a query parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: Vec<(String, String)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter value, replacing any existing entry for the key in
    /// place so insertion order is stable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Deactivate a single key without disturbing the others.
    pub fn clear_key(&mut self, key: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| existing == key) {
            entry.1.clear();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn active_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn active_count(&self) -> usize {
        self.active_pairs().count()
    }

    pub fn has_active(&self) -> bool {
        self.entries.iter().any(|(_, value)| !value.is_empty())
    }

    /// The active entries as owned query parameters, inactive keys omitted
    /// entirely (empty-string parameters are never sent).
    pub fn active_query(&self) -> Vec<(String, String)> {
        self.active_pairs()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut filters = FilterSet::new();
        filters.set("currency", "BTC");
        filters.set("status", "PENDING");
        filters.set("currency", "ETH");

        let pairs: Vec<_> = filters.active_pairs().collect();
        assert_eq!(pairs, vec![("currency", "ETH"), ("status", "PENDING")]);
    }

    #[test]
    fn empty_values_are_inactive() {
        let mut filters = FilterSet::new();
        filters.set("searchTerm", "");
        filters.set("currency", "BTC");

        assert_eq!(filters.active_count(), 1);
        assert!(filters.has_active());
        assert_eq!(filters.active_query(), vec![("currency".to_string(), "BTC".to_string())]);

        filters.clear_key("currency");
        assert!(!filters.has_active());
        assert!(filters.active_query().is_empty());
    }

    #[test]
    fn clearing_a_key_keeps_equality_semantics() {
        let mut a = FilterSet::new();
        a.set("currency", "BTC");
        let mut b = a.clone();
        assert_eq!(a, b);

        b.clear_key("currency");
        assert_ne!(a, b);
    }
}
