//! Core value types shared by the indexers, the merger and the evaluator
//!
//! Block keys are canonical values rather than strings: a P-Sig key is the
//! sorted set of bit positions its signature flips, and its string form is only
//! produced for display and compression.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One row of PII, every field as a string
pub type Record = Vec<String>;

/// Maps a block key to the records that fall into that block
pub type ReversedIndex = BTreeMap<BlockKey, Vec<RecordId>>;

/// Maps a raw signature string to the records that produced it
pub type SignatureIndex = BTreeMap<String, Vec<RecordId>>;

/// Convert borrowed rows into owned records.
///
/// ```ignore
/// let records = records_from(&[["id1", "Joyce", "Wang"], ["id2", "Fred", "Yu"]]);
/// ```
pub fn records_from<R, S>(rows: &[R]) -> Vec<Record>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    rows.iter()
        .map(|row| row.as_ref().iter().map(|f| f.as_ref().to_string()).collect())
        .collect()
}

/// Identifier of a record within one party's dataset
///
/// `Index` is the row position (no record id column configured), `Label` is
/// the value read from the configured record id column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Index(usize),
    Label(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Index(i) => write!(f, "{}", i),
            RecordId::Label(label) => f.write_str(label),
        }
    }
}

impl From<usize> for RecordId {
    fn from(index: usize) -> Self {
        RecordId::Index(index)
    }
}

impl From<&str> for RecordId {
    fn from(label: &str) -> Self {
        RecordId::Label(label.to_string())
    }
}

impl From<String> for RecordId {
    fn from(label: String) -> Self {
        RecordId::Label(label)
    }
}

/// Column address of a feature: positional index or header name
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureRef {
    Index(usize),
    Name(String),
}

impl FeatureRef {
    pub fn is_name(&self) -> bool {
        matches!(self, FeatureRef::Name(_))
    }
}

impl From<usize> for FeatureRef {
    fn from(index: usize) -> Self {
        FeatureRef::Index(index)
    }
}

impl From<&str> for FeatureRef {
    fn from(name: &str) -> Self {
        FeatureRef::Name(name.to_string())
    }
}

impl fmt::Display for FeatureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureRef::Index(i) => write!(f, "{}", i),
            FeatureRef::Name(name) => f.write_str(name),
        }
    }
}

/// Sorted, deduplicated bit positions flipped by one signature
///
/// The canonical string form is a tuple, e.g. `(3, 17, 256)` or `(5,)`.
/// Digests of compressed keys are taken over this form, so it must not change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BloomSet(Vec<usize>);

impl BloomSet {
    /// Build from arbitrary positions (sorted and deduplicated here)
    pub fn from_positions<I: IntoIterator<Item = usize>>(positions: I) -> Self {
        let mut positions: Vec<usize> = positions.into_iter().collect();
        positions.sort_unstable();
        positions.dedup();
        Self(positions)
    }

    pub fn positions(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for BloomSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, pos) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", pos)?;
        }
        if self.0.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str(")")
    }
}

/// Key of a block in a reversed index
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKey {
    /// Bit positions of a P-Sig blocking bloom filter
    BloomSet(BloomSet),
    /// Table-prefixed Lambda-fold key or any other literal key
    Text(String),
    /// Compressed form of a bloom set key (5-byte digest)
    Digest([u8; 5]),
}

impl BlockKey {
    pub fn as_bloom_set(&self) -> Option<&BloomSet> {
        match self {
            BlockKey::BloomSet(set) => Some(set),
            _ => None,
        }
    }
}

impl From<BloomSet> for BlockKey {
    fn from(set: BloomSet) -> Self {
        BlockKey::BloomSet(set)
    }
}

impl From<&str> for BlockKey {
    fn from(key: &str) -> Self {
        BlockKey::Text(key.to_string())
    }
}

impl From<String> for BlockKey {
    fn from(key: String) -> Self {
        BlockKey::Text(key)
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKey::BloomSet(set) => set.fmt(f),
            BlockKey::Text(text) => f.write_str(text),
            BlockKey::Digest(bytes) => f.write_str(&hex::encode(bytes)),
        }
    }
}

impl Serialize for BlockKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_set_is_sorted_and_deduplicated() {
        let set = BloomSet::from_positions([1291, 553, 1946, 553, 1208]);
        assert_eq!(set.positions(), &[553, 1208, 1291, 1946]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_bloom_set_canonical_string_matches_tuple_repr() {
        let set = BloomSet::from_positions([1946, 553, 1291, 1208]);
        assert_eq!(set.to_string(), "(553, 1208, 1291, 1946)");

        let single = BloomSet::from_positions([5]);
        assert_eq!(single.to_string(), "(5,)");

        assert_eq!(BloomSet::default().to_string(), "()");
    }

    #[test]
    fn test_block_key_display() {
        assert_eq!(BlockKey::from("0_0110").to_string(), "0_0110");
        assert_eq!(
            BlockKey::Digest([0x2b, 0xfb, 0x3b, 0xb5, 0x5a]).to_string(),
            "2bfb3bb55a"
        );
    }

    #[test]
    fn test_block_key_serializes_as_string_map_key() {
        let mut index = ReversedIndex::new();
        index.insert(
            BlockKey::BloomSet(BloomSet::from_positions([2, 1])),
            vec![RecordId::from("id1"), RecordId::from(3usize)],
        );
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"{"(1, 2)":["id1",3]}"#);
    }

    #[test]
    fn test_records_from_borrowed_rows() {
        let records = records_from(&[["id1", "Joyce"], ["id2", "Fred"]]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec!["id2".to_string(), "Fred".to_string()]);
    }

    #[test]
    fn test_feature_ref_deserializes_int_or_name() {
        let refs: Vec<FeatureRef> = serde_json::from_str(r#"[1, "surname"]"#).unwrap();
        assert_eq!(refs[0], FeatureRef::Index(1));
        assert_eq!(refs[1], FeatureRef::Name("surname".to_string()));
    }
}
