//! String similarity measures
//!
//! Similarities are in `[0, 1]`. Used by reference-value based blocking
//! techniques to compare plaintext values against reference values.

use lru::LruCache;
use serde::Deserialize;
use std::collections::HashSet;
use std::num::NonZeroUsize;

use crate::error::ConfigError;

/// A similarity between two strings, in `[0, 1]`
pub trait SimMeasure {
    fn sim(&mut self, a: &str, b: &str) -> f64;
}

/// Configuration of [`EditSim`]
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EditSimConfig {
    #[serde(default)]
    pub min_threshold: Option<f64>,
}

/// Normalised Levenshtein similarity
///
/// With a minimum threshold, pairs whose length difference alone puts them
/// below the threshold score 0, and the row scan stops as soon as the
/// distance cannot stay within the threshold.
#[derive(Clone, Debug, Default)]
pub struct EditSim {
    min_threshold: Option<f64>,
}

impl EditSim {
    pub fn new(config: EditSimConfig) -> Result<Self, ConfigError> {
        if let Some(t) = config.min_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(ConfigError::InvalidParameter(format!(
                    "min_threshold must be between 0 and 1, got {}",
                    t
                )));
            }
        }
        Ok(Self {
            min_threshold: config.min_threshold,
        })
    }
}

impl SimMeasure for EditSim {
    fn sim(&mut self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }

        let mut short: Vec<char> = a.chars().collect();
        let mut long: Vec<char> = b.chars().collect();
        let max_len = short.len().max(long.len()) as f64;

        let max_dist = match self.min_threshold {
            Some(t) => {
                let len_diff = short.len().abs_diff(long.len()) as f64;
                if 1.0 - len_diff / max_len < t {
                    return 0.0;
                }
                Some((1.0 - t) * max_len)
            }
            None => None,
        };

        if short.len() > long.len() {
            std::mem::swap(&mut short, &mut long);
        }
        let n = short.len();

        let mut current: Vec<usize> = (0..=n).collect();
        for (i, &long_char) in long.iter().enumerate() {
            let previous = std::mem::replace(&mut current, vec![0; n + 1]);
            current[0] = i + 1;
            for j in 1..=n {
                let substitute = previous[j - 1] + usize::from(short[j - 1] != long_char);
                current[j] = (previous[j] + 1).min(current[j - 1] + 1).min(substitute);
            }
            if let Some(max_dist) = max_dist {
                let row_min = current.iter().copied().min().unwrap_or(0) as f64;
                if row_min > max_dist {
                    return 1.0 - (max_dist + 1.0) / max_len;
                }
            }
        }

        1.0 - current[n] as f64 / max_len
    }
}

/// Configuration of [`DiceSim`]
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DiceSimConfig {
    pub ngram_len: usize,
    #[serde(default)]
    pub ngram_padding: bool,
    #[serde(default = "default_start_char")]
    pub padding_start_char: char,
    #[serde(default = "default_end_char")]
    pub padding_end_char: char,
}

fn default_start_char() -> char {
    '\u{2}'
}

fn default_end_char() -> char {
    '\u{3}'
}

impl Default for DiceSimConfig {
    fn default() -> Self {
        Self {
            ngram_len: 2,
            ngram_padding: false,
            padding_start_char: default_start_char(),
            padding_end_char: default_end_char(),
        }
    }
}

/// Dice coefficient over the q-grams of both strings
pub struct DiceSim {
    config: DiceSimConfig,
    qgram_cache: Option<LruCache<String, Vec<String>>>,
    sim_cache: Option<LruCache<(String, String), f64>>,
}

impl DiceSim {
    pub fn new(config: DiceSimConfig) -> Result<Self, ConfigError> {
        if config.ngram_len == 0 {
            return Err(ConfigError::InvalidParameter(
                "ngram_len must be positive".into(),
            ));
        }
        Ok(Self {
            config,
            qgram_cache: None,
            sim_cache: None,
        })
    }

    /// Cache q-gram lists and pair similarities, `capacity` entries each
    pub fn with_cache(mut self, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        self.qgram_cache = Some(LruCache::new(cap));
        self.sim_cache = Some(LruCache::new(cap));
        self
    }

    /// q-grams of `s`, padded when configured
    pub fn qgrams(&mut self, s: &str) -> Vec<String> {
        if let Some(grams) = self.qgram_cache.as_mut().and_then(|c| c.get(s)) {
            return grams.clone();
        }

        let q = self.config.ngram_len;
        let mut chars: Vec<char> = Vec::with_capacity(s.len() + 2 * (q - 1));
        if self.config.ngram_padding {
            chars.extend(std::iter::repeat(self.config.padding_start_char).take(q - 1));
        }
        chars.extend(s.chars());
        if self.config.ngram_padding {
            chars.extend(std::iter::repeat(self.config.padding_end_char).take(q - 1));
        }
        let grams: Vec<String> = chars.windows(q).map(|w| w.iter().collect()).collect();

        if let Some(cache) = self.qgram_cache.as_mut() {
            cache.put(s.to_string(), grams.clone());
        }
        grams
    }
}

impl SimMeasure for DiceSim {
    fn sim(&mut self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        let pair = (a.to_string(), b.to_string());
        if let Some(sim) = self.sim_cache.as_mut().and_then(|c| c.get(&pair)) {
            return *sim;
        }

        let grams_a = self.qgrams(a);
        let grams_b = self.qgrams(b);
        let total = grams_a.len() + grams_b.len();
        let sim = if total == 0 {
            0.0
        } else {
            let set_a: HashSet<&String> = grams_a.iter().collect();
            let common = grams_b.iter().collect::<HashSet<_>>().intersection(&set_a).count();
            2.0 * common as f64 / total as f64
        };

        if let Some(cache) = self.sim_cache.as_mut() {
            cache.put(pair, sim);
        }
        sim
    }
}
