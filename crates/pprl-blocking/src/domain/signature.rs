//! Signature generation
//!
//! A signature group is a list of feature specs. Each spec encodes one field
//! of a record into a component; the non-null components of a group are
//! joined with `_` and prefixed by the group ordinal, e.g. `"0_Joyce_Wang"`.
//!
//! Feature specs are resolved against the dataset once per build
//! ([`SignatureGenerator::new`]) so that per-record generation does no
//! parsing or name lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::TryFrom;

use super::phonetic::double_metaphone;
use super::types::FeatureRef;
use crate::error::{BlockingError, ConfigError, DataError};

/// One signature group: its specs are concatenated into one signature
pub type SignatureGroup = Vec<FeatureSpec>;

/// How a single field is turned into a signature component
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FeatureSpec {
    /// The field value itself
    FeatureValue { feature: FeatureRef },
    /// Selected characters or slices of the field
    CharactersAt {
        feature: FeatureRef,
        config: CharactersAtConfig,
    },
    /// Double Metaphone code of the field
    Metaphone { feature: FeatureRef },
}

impl FeatureSpec {
    pub fn feature(&self) -> &FeatureRef {
        match self {
            FeatureSpec::FeatureValue { feature }
            | FeatureSpec::CharactersAt { feature, .. }
            | FeatureSpec::Metaphone { feature } => feature,
        }
    }
}

/// Position arguments of a `characters-at` spec, as written in the config
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharactersAtConfig {
    pub pos: Vec<RawPosition>,
}

/// An integer index or a slice expression such as `"1:4"`, `":2"`, `"-2:"`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPosition {
    Int(i64),
    Text(String),
}

impl From<i64> for RawPosition {
    fn from(index: i64) -> Self {
        RawPosition::Int(index)
    }
}

impl From<&str> for RawPosition {
    fn from(expr: &str) -> Self {
        RawPosition::Text(expr.to_string())
    }
}

/// Parsed character position
///
/// Positions count Unicode scalar values; negative values count from the
/// end of the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharPosition {
    /// Single character, clamped to the last character of the field
    Index(i64),
    /// Half-open range `[start, end)`, each bound clamped to the field
    Slice { start: Option<i64>, end: Option<i64> },
}

impl TryFrom<&RawPosition> for CharPosition {
    type Error = ConfigError;

    fn try_from(raw: &RawPosition) -> Result<Self, Self::Error> {
        match raw {
            RawPosition::Int(index) => Ok(CharPosition::Index(*index)),
            RawPosition::Text(expr) => CharPosition::parse(expr),
        }
    }
}

impl CharPosition {
    /// Parse `"i"`, `"s:e"`, `":e"` or `"s:"`
    pub fn parse(expr: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidPosition(expr.to_string());
        let expr_trimmed = expr.trim();

        let Some((start, end)) = expr_trimmed.split_once(':') else {
            return expr_trimmed
                .parse::<i64>()
                .map(CharPosition::Index)
                .map_err(|_| invalid());
        };

        let bound = |s: &str| -> Result<Option<i64>, ConfigError> {
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse::<i64>().map(Some).map_err(|_| invalid())
            }
        };
        let start = bound(start.trim())?;
        let end = bound(end.trim())?;

        match (start, end) {
            (None, None) => Err(invalid()),
            (Some(s), Some(e)) if s >= 0 && e >= 0 && s >= e => Err(invalid()),
            _ => Ok(CharPosition::Slice { start, end }),
        }
    }

    /// Extract the selected characters from `chars`
    pub fn extract(&self, chars: &[char]) -> String {
        let len = chars.len() as i64;
        if len == 0 {
            return String::new();
        }
        let normalize = |p: i64| -> i64 {
            if p < 0 {
                (p + len).max(0)
            } else {
                p.min(len)
            }
        };

        match *self {
            CharPosition::Index(p) => {
                let idx = if p < 0 { (p + len).max(0) } else { p.min(len - 1) };
                chars[idx as usize].to_string()
            }
            CharPosition::Slice { start, end } => {
                let s = normalize(start.unwrap_or(0));
                let e = normalize(end.unwrap_or(len));
                if s >= e {
                    String::new()
                } else {
                    chars[s as usize..e as usize].iter().collect()
                }
            }
        }
    }
}

/// Maps feature references to column indices
#[derive(Clone, Debug, Default)]
pub struct FeatureResolver {
    names: Option<HashMap<String, usize>>,
}

impl FeatureResolver {
    /// Resolver for positional features only
    pub fn positional() -> Self {
        Self::default()
    }

    /// Build a resolver from an optional header
    ///
    /// When both a header and a record width are known they must agree.
    pub fn new(header: Option<&[String]>, record_width: Option<usize>) -> Result<Self, ConfigError> {
        let Some(header) = header else {
            return Ok(Self::positional());
        };
        if let Some(width) = record_width {
            if header.len() != width {
                return Err(ConfigError::HeaderWidthMismatch {
                    header: header.len(),
                    record: width,
                });
            }
        }
        let names = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Ok(Self { names: Some(names) })
    }

    /// Column index of a feature
    pub fn resolve(&self, feature: &FeatureRef) -> Result<usize, ConfigError> {
        match feature {
            FeatureRef::Index(i) => Ok(*i),
            FeatureRef::Name(name) => {
                let names = self.names.as_ref().ok_or(ConfigError::MissingHeader)?;
                names
                    .get(name)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownFeature(name.clone()))
            }
        }
    }
}

/// Reject configs that address features both by index and by name
pub fn check_feature_kinds<'a, I>(features: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = &'a FeatureRef>,
{
    let mut seen_name = false;
    let mut seen_index = false;
    for feature in features {
        if feature.is_name() {
            seen_name = true;
        } else {
            seen_index = true;
        }
        if seen_name && seen_index {
            return Err(ConfigError::MixedFeatureTypes);
        }
    }
    Ok(())
}

#[derive(Clone, Debug)]
enum Encoding {
    Value,
    Chars(Vec<CharPosition>),
    Metaphone,
}

#[derive(Clone, Debug)]
struct Component {
    column: usize,
    encoding: Encoding,
}

impl Component {
    fn encode(&self, field: &str) -> String {
        match &self.encoding {
            Encoding::Value => field.to_string(),
            Encoding::Chars(positions) => {
                let chars: Vec<char> = field.chars().collect();
                positions.iter().map(|p| p.extract(&chars)).collect()
            }
            Encoding::Metaphone => double_metaphone(field).joined(),
        }
    }
}

/// Signature groups resolved against one dataset
#[derive(Clone, Debug)]
pub struct SignatureGenerator {
    groups: Vec<Vec<Component>>,
    null_sentinel: String,
}

impl SignatureGenerator {
    pub fn new(
        groups: &[SignatureGroup],
        null_sentinel: &str,
        resolver: &FeatureResolver,
    ) -> Result<Self, ConfigError> {
        let groups = groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|spec| {
                        let column = resolver.resolve(spec.feature())?;
                        let encoding = match spec {
                            FeatureSpec::FeatureValue { .. } => Encoding::Value,
                            FeatureSpec::CharactersAt { config, .. } => Encoding::Chars(
                                config
                                    .pos
                                    .iter()
                                    .map(CharPosition::try_from)
                                    .collect::<Result<_, _>>()?,
                            ),
                            FeatureSpec::Metaphone { .. } => Encoding::Metaphone,
                        };
                        Ok(Component { column, encoding })
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            groups,
            null_sentinel: null_sentinel.to_string(),
        })
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Signature of `record` for group `group`, `None` when every component is null
    pub fn signature_for_group(
        &self,
        group: usize,
        row: usize,
        record: &[String],
    ) -> Result<Option<String>, DataError> {
        let Some(components) = self.groups.get(group) else {
            return Ok(None);
        };

        let mut parts = Vec::with_capacity(components.len());
        for component in components {
            let field = record.get(component.column).ok_or(DataError::FieldOutOfRange {
                record: row,
                index: component.column,
                width: record.len(),
            })?;
            if *field == self.null_sentinel {
                continue;
            }
            let encoded = component.encode(field);
            if !encoded.is_empty() {
                parts.push(encoded);
            }
        }

        if parts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(format!("{}_{}", group, parts.join("_"))))
        }
    }

    /// All signatures of `record`, in group order
    pub fn generate(&self, row: usize, record: &[String]) -> Result<Vec<String>, DataError> {
        let mut signatures = Vec::with_capacity(self.groups.len());
        for group in 0..self.groups.len() {
            if let Some(signature) = self.signature_for_group(group, row, record)? {
                signatures.push(signature);
            }
        }
        Ok(signatures)
    }
}

/// Generate the signatures of a single record
pub fn generate_signatures(
    groups: &[SignatureGroup],
    record: &[String],
    null_sentinel: &str,
    resolver: &FeatureResolver,
) -> Result<Vec<String>, BlockingError> {
    let generator = SignatureGenerator::new(groups, null_sentinel, resolver)?;
    Ok(generator.generate(0, record)?)
}
