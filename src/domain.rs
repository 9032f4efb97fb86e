//! Declarative value domains.
//!
//! A [`Domain`] is a tagged union over four shapes: fixed bit-width integers, an enumerated list
//! of values, a weighted mapping of values/ranges to positive weights, and an opaque function.
//! Dispatch is on the tag; there is no inheritance hierarchy to navigate.

use crate::random::RandomSource;
use crate::value::Value;

/// An upper bound on how many values [`Domain::enumerate_all`] will ever materialize for a
/// bit-width domain. Domains larger than this are treated as practically infinite for the
/// purposes of full enumeration (the thorough strategy will refuse them via `max_domain_size`
/// long before this bound matters; this bound exists purely to stop an accidental 64-bit
/// enumeration from allocating forever).
const MAX_PRACTICAL_ENUMERATION: u64 = 1 << 20;

/// A key in a [`Domain::Weighted`] mapping: either a single value or an inclusive-exclusive range
/// of values (matching the half-open range convention of the source language this crate's
/// contract is modeled on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightedKey {
    /// A single value.
    Value(i64),
    /// A half-open range `[start, end)`, sampled uniformly once the range itself is chosen.
    Range(i64, i64),
}

impl WeightedKey {
    fn size(&self) -> u64 {
        match *self {
            WeightedKey::Value(_) => 1,
            WeightedKey::Range(start, end) => end.saturating_sub(start).max(0) as u64,
        }
    }

    fn sample(&self, rng: &mut RandomSource) -> i64 {
        match *self {
            WeightedKey::Value(value) => value,
            WeightedKey::Range(start, end) => {
                assert!(start < end, "weighted range must be non-empty: {start}..{end}");
                rng.uniform_range(start, end - 1)
            }
        }
    }

    fn enumerate_into(&self, out: &mut Vec<i64>) {
        match *self {
            WeightedKey::Value(value) => out.push(value),
            WeightedKey::Range(start, end) => out.extend(start..end),
        }
    }
}

/// One entry of a weighted domain: a key and its (positive) weight.
#[derive(Debug, Clone)]
pub struct WeightedEntry {
    pub key: WeightedKey,
    pub weight: u32,
}

impl WeightedEntry {
    pub fn value(value: i64, weight: u32) -> Self {
        WeightedEntry {
            key: WeightedKey::Value(value),
            weight,
        }
    }

    pub fn range(start: i64, end: i64, weight: u32) -> Self {
        WeightedEntry {
            key: WeightedKey::Range(start, end),
            weight,
        }
    }
}

/// A function-domain callback. Receives the shared random source and the variable's fixed
/// argument tuple, and is trusted to produce a value of whatever shape the caller expects.
pub type DomainFn = Box<dyn Fn(&mut RandomSource, &[Value]) -> Value>;

/// The declared set of possible values for a variable.
pub enum Domain {
    /// Integers in `[0, 2^width)`, sampled uniformly.
    BitWidth(u32),
    /// A finite ordered sequence of values, sampled uniformly.
    Enumerated(Vec<i64>),
    /// A mapping from value-or-range to positive weight, sampled proportionally.
    Weighted(Vec<WeightedEntry>),
    /// An opaque callable, optionally with a fixed argument tuple.
    Function(DomainFn, Vec<Value>),
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::BitWidth(width) => f.debug_tuple("BitWidth").field(width).finish(),
            Domain::Enumerated(values) => f.debug_tuple("Enumerated").field(values).finish(),
            Domain::Weighted(entries) => f.debug_tuple("Weighted").field(entries).finish(),
            Domain::Function(_, args) => f
                .debug_tuple("Function")
                .field(&"<closure>")
                .field(args)
                .finish(),
        }
    }
}

impl Domain {
    /// The number of distinct values this domain can produce, or `None` if unbounded/unknown
    /// (always `None` for [`Domain::Function`]).
    pub fn size(&self) -> Option<u64> {
        match self {
            Domain::BitWidth(width) => {
                if *width >= 64 {
                    None
                } else {
                    Some(1u64 << width)
                }
            }
            Domain::Enumerated(values) => Some(values.len() as u64),
            Domain::Weighted(entries) => {
                Some(entries.iter().map(WeightedEntry::size).sum())
            }
            Domain::Function(..) => None,
        }
    }

    /// Whether this domain can be asked for a full enumeration without sampling.
    pub fn is_fully_enumerable(&self) -> bool {
        matches!(self.size(), Some(size) if size <= MAX_PRACTICAL_ENUMERATION)
    }

    /// Produces every value in the domain, deduplicated but otherwise in declaration order. Only
    /// meaningful (and only called) when [`Domain::is_fully_enumerable`] holds.
    pub fn enumerate_all(&self) -> Vec<i64> {
        match self {
            Domain::BitWidth(width) => {
                let size = self.size().unwrap_or(MAX_PRACTICAL_ENUMERATION);
                (0..size as i64).collect()
            }
            Domain::Enumerated(values) => values.clone(),
            Domain::Weighted(entries) => {
                let mut out = Vec::new();
                for entry in entries {
                    entry.key.enumerate_into(&mut out);
                }
                out
            }
            Domain::Function(..) => Vec::new(),
        }
    }

    /// Draws a single value from the domain using the shared random source.
    pub fn sample(&self, rng: &mut RandomSource) -> Value {
        match self {
            Domain::BitWidth(width) => {
                let hi = if *width >= 63 {
                    i64::MAX
                } else {
                    (1i64 << width) - 1
                };
                Value::Int(rng.uniform_range(0, hi))
            }
            Domain::Enumerated(values) => {
                let value = *rng
                    .choose(values)
                    .expect("enumerated domain must not be empty");
                Value::Int(value)
            }
            Domain::Weighted(entries) => {
                let weights: Vec<u32> = entries.iter().map(|entry| entry.weight).collect();
                let idx = rng
                    .weighted_index(&weights)
                    .expect("weighted domain must have at least one positive weight");
                Value::Int(entries[idx].key.sample(rng))
            }
            Domain::Function(func, args) => func(rng, args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_width_samples_in_range() {
        let domain = Domain::BitWidth(3);
        let mut rng = RandomSource::new(0);
        for _ in 0..500 {
            let value = domain.sample(&mut rng).as_int().unwrap();
            assert!((0..8).contains(&value));
        }
        assert_eq!(domain.size(), Some(8));
        let mut all = domain.enumerate_all();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn enumerated_domain_respects_declared_set() {
        let domain = Domain::Enumerated(vec![2, 4, 6]);
        let mut rng = RandomSource::new(1);
        for _ in 0..100 {
            let value = domain.sample(&mut rng).as_int().unwrap();
            assert!([2, 4, 6].contains(&value));
        }
    }

    #[test]
    fn weighted_domain_enumerates_ranges() {
        let domain = Domain::Weighted(vec![
            WeightedEntry::value(0, 50),
            WeightedEntry::value(1, 25),
            WeightedEntry::range(2, 10, 25),
        ]);
        assert_eq!(domain.size(), Some(10));
        let mut all = domain.enumerate_all();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }
}
