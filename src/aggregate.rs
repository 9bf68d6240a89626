//! The nested `batch → programme → semester → examination → students` tree
//! that is the pipeline's only output.
//!
//! Keys keep first-seen order at every level. Each student carries exactly
//! one [`PaperEntry`] bundling all of their papers, with every sequence
//! rendered as list text (`['CS101', 'CS102']`, `[4, 3]`) rather than as JSON
//! arrays, which is the shape downstream consumers already read.

use std::fmt::Display;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::error::NormalizeError;
use crate::model::StudentRecord;

/// Key used when a level's value is absent from the source.
pub const ABSENT_KEY: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Default> OrderedMap<V> {
    /// Returns the value under `key`, creating it on first sight.
    pub fn entry(&mut self, key: &str) -> &mut V {
        let index = match self.entries.iter().position(|(existing, _)| existing == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PaperEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Credits")]
    pub credits: String,
    #[serde(rename = "Int_Marks")]
    pub int_marks: String,
    #[serde(rename = "Ext_Marks")]
    pub ext_marks: String,
    #[serde(rename = "Total")]
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StudentEntry {
    #[serde(rename = "Enrollment")]
    pub enrollment: Option<String>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CGPA")]
    pub cgpa: Option<f64>,
    #[serde(rename = "Papers")]
    pub papers: Vec<PaperEntry>,
}

pub(crate) fn quoted_list<T: Display>(values: &[T]) -> String {
    let items = values
        .iter()
        .map(|value| format!("'{value}'"))
        .collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}

pub(crate) fn plain_list<T: Display>(values: &[T]) -> String {
    let items = values.iter().map(ToString::to_string).collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}

impl From<&StudentRecord> for StudentEntry {
    fn from(record: &StudentRecord) -> Self {
        Self {
            enrollment: record.enrollment_no.clone(),
            name: record.name.clone(),
            cgpa: record.cgpa,
            papers: vec![PaperEntry {
                id: quoted_list(&record.paper_ids),
                credits: plain_list(&record.credits),
                int_marks: quoted_list(&record.internal_marks),
                ext_marks: quoted_list(&record.external_marks),
                total: plain_list(&record.totals),
            }],
        }
    }
}

pub type ExaminationLevel = OrderedMap<Vec<StudentEntry>>;
pub type SemesterLevel = OrderedMap<ExaminationLevel>;
pub type ProgrammeLevel = OrderedMap<SemesterLevel>;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct AggregateTree {
    batches: OrderedMap<ProgrammeLevel>,
}

fn level_key(value: Option<&String>) -> &str {
    value.map_or(ABSENT_KEY, String::as_str)
}

impl AggregateTree {
    /// Upserts the record's path and appends one student entry under it.
    pub fn insert(&mut self, record: &StudentRecord) {
        self.batches
            .entry(level_key(record.batch.as_ref()))
            .entry(level_key(record.programme_name.as_ref()))
            .entry(level_key(record.semester.as_ref()))
            .entry(level_key(record.examination.as_ref()))
            .push(StudentEntry::from(record));
    }

    #[must_use]
    pub fn batches(&self) -> &OrderedMap<ProgrammeLevel> {
        &self.batches
    }

    #[must_use]
    pub fn students(
        &self,
        batch: &str,
        programme: &str,
        semester: &str,
        examination: &str,
    ) -> Option<&[StudentEntry]> {
        self.batches
            .get(batch)?
            .get(programme)?
            .get(semester)?
            .get(examination)
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn student_count(&self) -> usize {
        self.batches
            .values()
            .flat_map(OrderedMap::values)
            .flat_map(OrderedMap::values)
            .flat_map(OrderedMap::values)
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Four-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, NormalizeError> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn to_json(&self) -> Result<String, NormalizeError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<'a> FromIterator<&'a StudentRecord> for AggregateTree {
    fn from_iter<I: IntoIterator<Item = &'a StudentRecord>>(records: I) -> Self {
        let mut tree = Self::default();
        for record in records {
            tree.insert(record);
        }
        tree
    }
}
