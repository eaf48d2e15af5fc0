//! Identity table
//!
//! Maps each distinct identity tuple (the original values of the target
//! columns, in target order) to the synthetic tuple that replaced it. Entries
//! are only ever added; an identity tuple is mapped exactly once for the life
//! of the table.

use super::classifier::ClassifierOptions;
use crate::domain::{EmrError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Original values of the target columns, in target order
pub type IdentityTuple = Vec<String>;

/// Replacement values, parallel to an [`IdentityTuple`]
pub type SyntheticTuple = Vec<String>;

/// Mapping from identity tuples to synthetic tuples for a fixed field list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRecord", into = "TableRecord")]
pub struct IdentityTable {
    fields: Vec<String>,
    options: ClassifierOptions,
    created_at: DateTime<Utc>,
    entries: BTreeMap<IdentityTuple, SyntheticTuple>,
}

impl IdentityTable {
    /// Create an empty table for `fields`
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::Configuration`] if `fields` is empty or names a
    /// column twice.
    pub fn new(fields: Vec<String>, options: ClassifierOptions) -> Result<Self> {
        validate_fields(&fields).map_err(EmrError::Configuration)?;
        Ok(Self {
            fields,
            options,
            created_at: Utc::now(),
            entries: BTreeMap::new(),
        })
    }

    /// Target column names, in tuple order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Classifier variant the synthetic values were generated with
    pub fn options(&self) -> ClassifierOptions {
        self.options
    }

    /// When the table was first created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of identity tuples mapped
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Synthetic tuple already assigned to `identity`, if any
    pub fn get(&self, identity: &[String]) -> Option<&SyntheticTuple> {
        self.entries.get(identity)
    }

    /// Iterate over all (identity, synthetic) pairs in identity order
    pub fn entries(&self) -> impl Iterator<Item = (&IdentityTuple, &SyntheticTuple)> {
        self.entries.iter()
    }

    /// Return the synthetic tuple for `identity`, generating it with `generate`
    /// when the identity has not been seen yet
    ///
    /// The boolean is `true` when a new entry was created. `generate` is
    /// never called for an identity that is already mapped.
    pub fn get_or_insert_with<F>(
        &mut self,
        identity: IdentityTuple,
        generate: F,
    ) -> Result<(&SyntheticTuple, bool)>
    where
        F: FnOnce(&IdentityTuple) -> SyntheticTuple,
    {
        self.check_width(&identity)?;
        let width = self.fields.len();

        match self.entries.entry(identity) {
            Entry::Occupied(occupied) => Ok((occupied.into_mut(), false)),
            Entry::Vacant(vacant) => {
                let synthetic = generate(vacant.key());
                if synthetic.len() != width {
                    return Err(EmrError::Configuration(format!(
                        "generated {} values for an identity table with {} fields",
                        synthetic.len(),
                        width
                    )));
                }
                Ok((vacant.insert(synthetic), true))
            }
        }
    }

    /// Insert an explicit mapping
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::Configuration`] if either tuple has the wrong width
    /// or `identity` is already mapped.
    pub fn insert(&mut self, identity: IdentityTuple, synthetic: SyntheticTuple) -> Result<()> {
        self.check_width(&identity)?;
        self.check_width(&synthetic)?;
        if self.entries.contains_key(&identity) {
            return Err(EmrError::Configuration(format!(
                "identity tuple for fields [{}] is already mapped",
                self.fields.join(", ")
            )));
        }
        self.entries.insert(identity, synthetic);
        Ok(())
    }

    /// Ensure a run's target fields are exactly the table's fields
    pub fn ensure_fields(&self, target_fields: &[String]) -> Result<()> {
        if self.fields != target_fields {
            return Err(EmrError::Configuration(format!(
                "target fields [{}] do not match the identity table fields [{}]",
                target_fields.join(", "),
                self.fields.join(", ")
            )));
        }
        Ok(())
    }

    /// Build the reverse mapping, synthetic tuple to identity tuple
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::AmbiguousTable`] if two identity tuples share a
    /// synthetic tuple.
    pub fn invert(&self) -> Result<HashMap<&[String], &[String]>> {
        let mut inverted: HashMap<&[String], &[String]> = HashMap::with_capacity(self.len());
        for (identity, synthetic) in &self.entries {
            if inverted
                .insert(synthetic.as_slice(), identity.as_slice())
                .is_some()
            {
                return Err(EmrError::AmbiguousTable(format!(
                    "synthetic tuple {:?} for fields [{}] is assigned to more than one identity",
                    synthetic,
                    self.fields.join(", ")
                )));
            }
        }
        Ok(inverted)
    }

    /// SHA-256 over the serialized fields and entries, hex encoded
    ///
    /// Safe to log: identifies a table without revealing its contents.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for field in &self.fields {
            hasher.update(field.as_bytes());
            hasher.update([0x1f]);
        }
        for (identity, synthetic) in &self.entries {
            for value in identity.iter().chain(synthetic.iter()) {
                hasher.update((value.len() as u64).to_le_bytes());
                hasher.update(value.as_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }

    fn check_width(&self, tuple: &[String]) -> Result<()> {
        if tuple.len() != self.fields.len() {
            return Err(EmrError::Configuration(format!(
                "tuple has {} values but the identity table has {} fields",
                tuple.len(),
                self.fields.len()
            )));
        }
        Ok(())
    }
}

fn validate_fields(fields: &[String]) -> std::result::Result<(), String> {
    if fields.is_empty() {
        return Err("at least one target field is required".to_string());
    }
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.as_str()) {
            return Err(format!("target field '{field}' is listed more than once"));
        }
    }
    Ok(())
}

/// On-disk shape of a table
#[derive(Serialize, Deserialize)]
struct TableRecord {
    fields: Vec<String>,
    #[serde(default)]
    options: ClassifierOptions,
    created_at: DateTime<Utc>,
    entries: Vec<EntryRecord>,
}

#[derive(Serialize, Deserialize)]
struct EntryRecord {
    identity: IdentityTuple,
    synthetic: SyntheticTuple,
}

impl From<IdentityTable> for TableRecord {
    fn from(table: IdentityTable) -> Self {
        Self {
            fields: table.fields,
            options: table.options,
            created_at: table.created_at,
            entries: table
                .entries
                .into_iter()
                .map(|(identity, synthetic)| EntryRecord {
                    identity,
                    synthetic,
                })
                .collect(),
        }
    }
}

impl TryFrom<TableRecord> for IdentityTable {
    type Error = String;

    fn try_from(record: TableRecord) -> std::result::Result<Self, Self::Error> {
        validate_fields(&record.fields)?;
        let width = record.fields.len();
        let mut entries = BTreeMap::new();
        for (i, entry) in record.entries.into_iter().enumerate() {
            if entry.identity.len() != width || entry.synthetic.len() != width {
                return Err(format!("entry {i} does not have {width} values"));
            }
            if entries.insert(entry.identity, entry.synthetic).is_some() {
                return Err(format!("entry {i} repeats an identity tuple"));
            }
        }
        Ok(Self {
            fields: record.fields,
            options: record.options,
            created_at: record.created_at,
            entries,
        })
    }
}
