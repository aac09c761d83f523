use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of record ids, used for both "checked" and "highlighted" rows.
///
/// Membership is independent of the current page and filters: a selected id
/// stays selected while paginated or filtered out of view, until it is
/// explicitly cleared or its record is deleted.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        SelectionSet { ids: BTreeSet::new() }
    }

    pub fn from_ids<I: IntoIterator<Item = String>>(ids: I) -> Self {
        SelectionSet {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Flip membership of a single id.
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Page-level toggle: if every id on the page is already in the set,
    /// deselect the page; otherwise select the whole page.
    pub fn toggle_page<'a, I>(&mut self, page_ids: I)
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        let all_selected = page_ids.clone().into_iter().all(|id| self.ids.contains(id));
        if all_selected {
            for id in page_ids {
                self.ids.remove(id);
            }
        } else {
            for id in page_ids {
                self.ids.insert(id.to_string());
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop every id in `gone`; called when records are deleted so the set
    /// only ever references live records.
    pub fn prune<'a, I>(&mut self, gone: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for id in gone {
            self.ids.remove(id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}
