//! Seed ingestion and the brace notation used to exchange seed lists with
//! external math tools.
//!
//! A seed list looks like `{{{1, 0}, {2, 0.5}},{{-1, 3}, {0, 0}}}`: the outer
//! braces wrap the list, each seed is a brace list of `{re, im}` pairs, and
//! every seed must have the same number of pairs.

use crate::complex::RootVector;
use crate::error::{Result, TrackError};
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Range the default randomizer draws unset components from.
pub const RANDOM_COMPONENT_RANGE: (f64, f64) = (-10.0, 10.0);

/// A complex value whose real or imaginary part may still be unset.
pub type PartialComplex = [Option<f64>; 2];

/// Parses the brace notation into seeds.
///
/// Rejects an empty outer list, empty seeds, seeds of unequal length and any
/// pair that is not exactly two numbers.
pub fn parse_seeds(input: &str) -> Result<Vec<RootVector>> {
    let json: String = input
        .chars()
        .map(|ch| match ch {
            '{' => '[',
            '}' => ']',
            other => other,
        })
        .collect();

    let raw: Vec<Vec<Vec<f64>>> =
        serde_json::from_str(&json).map_err(|err| TrackError::MalformedSeedInput(err.to_string()))?;

    if raw.is_empty() {
        return Err(TrackError::MalformedSeedInput("seed list is empty".into()));
    }
    let dim = raw[0].len();

    raw.into_iter()
        .enumerate()
        .map(|(index, seed)| {
            if seed.is_empty() {
                return Err(TrackError::MalformedSeedInput(format!("seed {} is empty", index)));
            }
            if seed.len() != dim {
                return Err(TrackError::MalformedSeedInput(format!(
                    "seed {} has {} roots, expected {}",
                    index,
                    seed.len(),
                    dim
                )));
            }
            seed.into_iter()
                .map(|pair| match pair.as_slice() {
                    [re, im] => Ok(Complex64::new(*re, *im)),
                    _ => Err(TrackError::MalformedSeedInput(format!(
                        "seed {} has a pair with {} numbers",
                        index,
                        pair.len()
                    ))),
                })
                .collect()
        })
        .collect()
}

/// Formats seeds in brace notation, one seed per two-space indented line.
///
/// Numbers are written as plain decimals, never in exponent form.
pub fn format_seeds(seeds: &[RootVector]) -> String {
    let body: Vec<String> = seeds
        .iter()
        .map(|seed| {
            let pairs: Vec<String> = seed.iter().map(|c| format!("{{{}, {}}}", c.re, c.im)).collect();
            format!("{{\n  {}\n}}", pairs.join(", "))
        })
        .collect();
    format!("{{{}}}", body.join(","))
}

/// Fills unset components with values drawn uniformly from
/// [`RANDOM_COMPONENT_RANGE`].
pub fn complete_seed<R: Rng>(partial: &[PartialComplex], rng: &mut R) -> RootVector {
    let (lo, hi) = RANDOM_COMPONENT_RANGE;
    let mut draw = |part: Option<f64>| part.unwrap_or_else(|| rng.random_range(lo..=hi));
    partial
        .iter()
        .map(|[re, im]| {
            let re = draw(*re);
            let im = draw(*im);
            Complex64::new(re, im)
        })
        .collect()
}

/// What an import did to the committed seeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedChange {
    Unchanged,
    /// Same seed count; these indices hold new values.
    Edited { changed: Vec<usize> },
    /// The number of seeds changed, so per-index outputs cannot be matched up.
    Resized,
}

/// The committed seed set for a run. Every mutation validates first and
/// leaves the book untouched on error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedBook {
    seeds: Vec<RootVector>,
}

impl Default for SeedBook {
    fn default() -> Self {
        Self {
            seeds: vec![vec![Complex64::new(0.0, 0.0)]],
        }
    }
}

impl SeedBook {
    pub fn new(seeds: Vec<RootVector>) -> Result<Self> {
        if seeds.is_empty() {
            return Err(TrackError::DimensionMismatch {
                what: "seed list",
                expected: 1,
                found: 0,
            });
        }
        crate::orchestrator::validate_seeds(&seeds)?;
        Ok(Self { seeds })
    }

    pub fn seeds(&self) -> &[RootVector] {
        &self.seeds
    }

    /// Roots per seed (M).
    pub fn dimension(&self) -> usize {
        self.seeds.first().map_or(0, Vec::len)
    }

    pub fn export(&self) -> String {
        format_seeds(&self.seeds)
    }

    /// Replaces the seeds with the parsed contents of `text`.
    pub fn import(&mut self, text: &str) -> Result<SeedChange> {
        let parsed = parse_seeds(text)?;
        if parsed == self.seeds {
            return Ok(SeedChange::Unchanged);
        }
        let change = if parsed.len() != self.seeds.len() {
            SeedChange::Resized
        } else {
            let changed = parsed
                .iter()
                .zip(&self.seeds)
                .enumerate()
                .filter(|(_, (new, old))| new != old)
                .map(|(index, _)| index)
                .collect();
            SeedChange::Edited { changed }
        };
        self.seeds = parsed;
        Ok(change)
    }

    /// Resizes every seed to `dimension` roots, drawing new roots at random.
    pub fn set_dimension<R: Rng>(&mut self, dimension: usize, rng: &mut R) -> Result<()> {
        if dimension == 0 {
            return Err(TrackError::DimensionMismatch {
                what: "seed",
                expected: 1,
                found: 0,
            });
        }
        for seed in &mut self.seeds {
            if seed.len() > dimension {
                seed.truncate(dimension);
            } else {
                let missing = vec![[None, None]; dimension - seed.len()];
                seed.extend(complete_seed(&missing, &mut *rng));
            }
        }
        Ok(())
    }

    /// Appends a fully random seed of the current dimension.
    pub fn push_random<R: Rng>(&mut self, rng: &mut R) -> usize {
        let partial = vec![[None, None]; self.dimension()];
        self.seeds.push(complete_seed(&partial, rng));
        self.seeds.len() - 1
    }

    /// Removes a seed, refusing to remove the last one.
    pub fn remove(&mut self, index: usize) -> Option<RootVector> {
        if self.seeds.len() <= 1 || index >= self.seeds.len() {
            return None;
        }
        Some(self.seeds.remove(index))
    }
}
