//! Immutable binding table: normalized key sequences mapped to action handles
//!
//! Built once from a base layer plus one platform override layer. Overrides
//! replace base entries with the same normalized sequence; everything else is
//! added. After construction the table is read-only and can be shared between
//! any number of matchers (wrap it in an `Arc`).

use std::collections::{HashMap, HashSet};

use super::binding::{KeySequence, Keybinding};
use super::config::KeymapError;
use super::types::Keystroke;

/// How to treat two entries of the same layer that normalize to one sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The later entry wins, with a warning
    #[default]
    LastWins,
    /// Fail with `KeymapError::DuplicateBinding`
    Strict,
}

/// Result of looking up a (possibly partial) sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a, A> {
    /// The sequence is bound; it may also be a prefix of longer bindings
    Exact(&'a A),
    /// Not bound itself, but the start of at least one bound sequence
    Prefix,
    /// Neither bound nor the start of anything bound
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct BindingTable<A> {
    bindings: HashMap<KeySequence, A>,
    /// For every prefix of every bound sequence (the sequence itself included),
    /// how many bound sequences start with it
    reach: HashMap<Vec<Keystroke>, usize>,
}

impl<A> BindingTable<A> {
    /// Parse and merge raw `(notation, action)` entries
    ///
    /// Any malformed notation fails the whole build; no partial table is
    /// produced.
    pub fn build<S, B, O>(base: B, overrides: O, policy: MergePolicy) -> Result<Self, KeymapError>
    where
        S: AsRef<str>,
        B: IntoIterator<Item = (S, A)>,
        O: IntoIterator<Item = (S, A)>,
    {
        Self::from_layers(parse_layer(base)?, parse_layer(overrides)?, policy)
    }

    /// Merge already-parsed layers
    pub fn from_layers(
        base: Vec<Keybinding<A>>,
        overrides: Vec<Keybinding<A>>,
        policy: MergePolicy,
    ) -> Result<Self, KeymapError> {
        let mut bindings = collect_layer(base, policy)?;

        for (sequence, action) in collect_layer(overrides, policy)? {
            if bindings.insert(sequence.clone(), action).is_some() {
                tracing::debug!("Platform override replaces base binding {}", sequence);
            }
        }

        let mut reach: HashMap<Vec<Keystroke>, usize> = HashMap::new();
        for sequence in bindings.keys() {
            for len in 1..=sequence.len() {
                *reach.entry(sequence[..len].to_vec()).or_default() += 1;
            }
        }

        Ok(Self { bindings, reach })
    }

    /// Classify a candidate sequence against the table
    pub fn lookup(&self, sequence: &[Keystroke]) -> Lookup<'_, A> {
        if let Some(action) = self.bindings.get(sequence) {
            Lookup::Exact(action)
        } else if self.reach.contains_key(sequence) {
            Lookup::Prefix
        } else {
            Lookup::NoMatch
        }
    }

    /// True when exactly one bound sequence starts with `sequence`
    ///
    /// For an exact match this means nothing longer extends it, so it can fire
    /// without waiting.
    pub fn longest_prefix_is_unique(&self, sequence: &[Keystroke]) -> bool {
        self.reach.get(sequence) == Some(&1)
    }

    /// Action bound to exactly this sequence
    pub fn get(&self, sequence: &[Keystroke]) -> Option<&A> {
        self.bindings.get(sequence)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All bindings, sorted by sequence for stable listings
    pub fn bindings(&self) -> Vec<(&KeySequence, &A)> {
        let mut all: Vec<_> = self.bindings.iter().collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }
}

impl<A: PartialEq> BindingTable<A> {
    /// Get the sequence bound to an action (shortest, then lowest, first)
    pub fn sequence_for(&self, action: &A) -> Option<&KeySequence> {
        self.bindings
            .iter()
            .filter(|(_, bound)| *bound == action)
            .map(|(sequence, _)| sequence)
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
    }

    /// Get display string for an action's keybinding
    pub fn display_for(&self, action: &A) -> Option<String> {
        self.sequence_for(action).map(|s| s.display_string())
    }
}

fn parse_layer<S, A, I>(entries: I) -> Result<Vec<Keybinding<A>>, KeymapError>
where
    S: AsRef<str>,
    I: IntoIterator<Item = (S, A)>,
{
    entries
        .into_iter()
        .map(|(notation, action)| {
            let notation = notation.as_ref();
            Keybinding::parse(notation, action).map_err(|reason| KeymapError::MalformedSequence {
                sequence: notation.to_string(),
                reason,
            })
        })
        .collect()
}

/// Apply the duplicate policy to one layer of parsed entries
///
/// Entries are compared after normalization, so `<C-A-s>` and `<A-C-s>`
/// collide. Under `LastWins` each duplicate is only logged.
pub(super) fn check_layer<A>(
    layer: &[Keybinding<A>],
    policy: MergePolicy,
) -> Result<(), KeymapError> {
    let mut seen = HashSet::with_capacity(layer.len());
    for binding in layer {
        if seen.insert(&binding.sequence) {
            continue;
        }
        match policy {
            MergePolicy::Strict => {
                return Err(KeymapError::DuplicateBinding(binding.sequence.to_string()));
            }
            MergePolicy::LastWins => {
                tracing::warn!(
                    "Duplicate binding for {}, keeping the later one",
                    binding.sequence
                );
            }
        }
    }
    Ok(())
}

/// Fold one layer into a map, applying the duplicate policy
fn collect_layer<A>(
    layer: Vec<Keybinding<A>>,
    policy: MergePolicy,
) -> Result<HashMap<KeySequence, A>, KeymapError> {
    check_layer(&layer, policy)?;
    Ok(layer
        .into_iter()
        .map(|binding| (binding.sequence, binding.action))
        .collect())
}
