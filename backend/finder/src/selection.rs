use std::collections::BTreeSet;

use meals::{FetchError, FilterValue, models::DELIMITER};

/// Set of selected values for one axis. Iteration is always sorted, so the
/// cache key does not depend on the order values were toggled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    values: BTreeSet<FilterValue>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a `,` separated list, skipping blank entries.
    pub fn parse_list(raw: &str) -> Result<Self, FetchError> {
        raw.split(DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(FilterValue::new)
            .collect()
    }

    pub fn insert(&mut self, value: FilterValue) -> bool {
        self.values.insert(value)
    }

    pub fn remove(&mut self, value: &FilterValue) -> bool {
        self.values.remove(value)
    }

    /// Returns whether the value is selected afterwards.
    pub fn toggle(&mut self, value: FilterValue) -> bool {
        if self.values.remove(&value) {
            false
        } else {
            self.values.insert(value);
            true
        }
    }

    pub fn contains(&self, value: &FilterValue) -> bool {
        self.values.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn cache_key(&self) -> String {
        let mut key = String::new();

        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                key.push(DELIMITER);
            }
            key.push_str(value.as_str());
        }

        key
    }
}

impl FromIterator<FilterValue> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = FilterValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a FilterValue;
    type IntoIter = std::collections::btree_set::Iter<'a, FilterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    ToggleCategory(FilterValue),
    RemoveCategory(FilterValue),
    ToggleArea(FilterValue),
    RemoveArea(FilterValue),
    ClearAll,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub categories: SelectionSet,
    pub areas: SelectionSet,
}

impl FilterState {
    pub fn apply(&mut self, action: FilterAction) {
        match action {
            FilterAction::ToggleCategory(value) => {
                self.categories.toggle(value);
            }
            FilterAction::RemoveCategory(value) => {
                self.categories.remove(&value);
            }
            FilterAction::ToggleArea(value) => {
                self.areas.toggle(value);
            }
            FilterAction::RemoveArea(value) => {
                self.areas.remove(&value);
            }
            FilterAction::ClearAll => *self = Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.areas.is_empty()
    }
}
