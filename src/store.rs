use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One imported data row.
///
/// The field map is keyed by the header sequence fixed at import; a record
/// holds an empty string for a header its source row was too short to fill.
/// The synthetic `id` has the form `row-<ordinal>` and is stable for the
/// session: it is never reassigned or reused after deletion.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn new(id: String, fields: HashMap<String, String>) -> Self {
        Record { id, fields }
    }

    /// Value for a header, empty string when absent.
    pub fn get(&self, header: &str) -> &str {
        self.fields.get(header).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, header: &str, value: String) {
        self.fields.insert(header.to_string(), value);
    }
}

/// Holds the imported dataset as an ordered sequence of records.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct RowStore {
    records: Vec<Record>,
}

impl RowStore {
    pub fn new() -> Self {
        RowStore { records: Vec::new() }
    }

    /// Replace all records with freshly imported rows.
    ///
    /// Each row is zipped against the header list; short rows pad with empty
    /// strings, extra trailing fields are dropped. Ids are dense at import
    /// (`row-0`, `row-1`, ...) and may have gaps after later deletions.
    pub fn import(&mut self, headers: &[String], rows: Vec<Vec<String>>) {
        self.records = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                let mut fields = HashMap::with_capacity(headers.len());
                for (i, header) in headers.iter().enumerate() {
                    let value = row.get(i).cloned().unwrap_or_default();
                    fields.insert(header.clone(), value);
                }
                Record::new(format!("row-{}", index), fields)
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Replace one record's fields in place by id.
    pub fn update(&mut self, id: &str, fields: HashMap<String, String>) -> Result<()> {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.fields = fields;
                Ok(())
            }
            None => Err(PanelError::NotFound(id.to_string())),
        }
    }

    /// Remove one record by id.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Err(PanelError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Remove every record whose id is in `ids`; returns how many went away.
    pub fn delete_many<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        let doomed: std::collections::BTreeSet<&String> = ids.into_iter().collect();
        let before = self.records.len();
        self.records.retain(|r| !doomed.contains(&r.id));
        before - self.records.len()
    }

    /// Records whose ids are in the given set, in store order.
    pub fn filter_by_ids<'a>(&'a self, ids: &crate::selection::SelectionSet) -> Vec<&'a Record> {
        self.records.iter().filter(|r| ids.contains(&r.id)).collect()
    }
}
