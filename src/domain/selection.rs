use std::collections::{BTreeMap, HashSet};

use super::model::{Category, SelectableItem};

/// Groups items by category, keeping input order inside each group.
/// Categories without items are left out.
pub fn classify(items: &[SelectableItem]) -> BTreeMap<Category, Vec<SelectableItem>> {
    let mut groups: BTreeMap<Category, Vec<SelectableItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category()).or_default().push(item.clone());
    }
    groups
}

/// Tri-state of a category header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckboxState {
    pub checked: bool,
    pub indeterminate: bool,
}

/// Which files of a course are picked for export.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    groups: BTreeMap<Category, Vec<SelectableItem>>,
    selected_ids: HashSet<String>,
}

impl SelectionModel {
    /// Everything starts selected.
    pub fn new(items: Vec<SelectableItem>) -> Self {
        let selected_ids = items.iter().map(|item| item.id.clone()).collect();
        Self {
            groups: classify(&items),
            selected_ids,
        }
    }

    pub fn groups(&self) -> &BTreeMap<Category, Vec<SelectableItem>> {
        &self.groups
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected_ids.len()
    }

    /// Unknown ids are accepted and still flip membership.
    pub fn toggle_item(&mut self, id: &str) {
        if !self.selected_ids.remove(id) {
            self.selected_ids.insert(id.to_string());
        }
    }

    pub fn toggle_category(&mut self, category: Category) {
        let Some(members) = self.groups.get(&category) else {
            return;
        };

        if members.iter().all(|item| self.selected_ids.contains(&item.id)) {
            for item in members {
                self.selected_ids.remove(&item.id);
            }
        } else {
            for item in members {
                self.selected_ids.insert(item.id.clone());
            }
        }
    }

    pub fn group_checkbox_state(&self, category: Category) -> CheckboxState {
        let members = self.groups.get(&category).map(Vec::as_slice).unwrap_or(&[]);
        let selected = members
            .iter()
            .filter(|item| self.selected_ids.contains(&item.id))
            .count();
        let checked = selected == members.len();

        CheckboxState {
            checked,
            indeterminate: !checked && selected > 0,
        }
    }

    /// The selected ids exactly as they are; an empty selection stays empty.
    pub fn confirm(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected_ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}
