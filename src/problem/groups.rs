//! Mapping of source group names onto canonical testset indices.

use crate::problem::snapshot::{
    DependencyMode, FeedbackPolicy, ScoringMode, Testset,
};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::warn;
use uuid::Uuid;

/// Index of the testset holding samples.
pub const SAMPLE_INDEX: u32 = 0;

pub fn is_sample_group(name: &str) -> bool {
    name == "0" || name.to_lowercase().contains("sample")
}

// Integers sort numerically and before every non-integer name, which keeps the order total.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey<'a> {
    Number(i64),
    Name(&'a str),
}

impl<'a> GroupKey<'a> {
    fn of(name: &'a str) -> Self {
        match name.parse() {
            Ok(number) => GroupKey::Number(number),
            Err(_) => GroupKey::Name(name),
        }
    }
}

/// Canonical index of every known group name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupIndices {
    indices: IndexMap<String, u32>,
}

impl GroupIndices {
    /// Assigns indices to group names. Sample-like names get [`SAMPLE_INDEX`], the rest get
    /// consecutive indices from 1 in numeric-aware order. Repeated names are ignored.
    pub fn assign<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        let mut sorted: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        sorted.sort_by(|a, b| GroupKey::of(a).cmp(&GroupKey::of(b)));

        let mut indices = IndexMap::new();
        let mut next = SAMPLE_INDEX + 1;
        for name in sorted {
            if indices.contains_key(name) {
                continue;
            }
            if is_sample_group(name) {
                indices.insert(name.to_string(), SAMPLE_INDEX);
            } else {
                indices.insert(name.to_string(), next);
                next += 1;
            }
        }

        Self { indices }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.indices.get(name).copied()
    }

    /// Distinct indices in ascending order.
    pub fn distinct(&self) -> BTreeSet<u32> {
        self.indices.values().copied().collect()
    }

    /// Names sharing an index, in assignment order.
    pub fn names_of(&self, index: u32) -> impl Iterator<Item = &str> {
        self.indices
            .iter()
            .filter(move |(_, assigned)| **assigned == index)
            .map(|(name, _)| name.as_str())
    }

    /// Translates dependency group names of the testset `own` into indices. Dependencies that do
    /// not point at a strictly lower index are dropped.
    pub fn dependencies<'a>(&self, own: u32, names: impl IntoIterator<Item = &'a str>) -> Vec<u32> {
        let mut dependencies = Vec::new();
        for name in names {
            match self.get(name) {
                Some(index) if index < own => {
                    if !dependencies.contains(&index) {
                        dependencies.push(index);
                    }
                }
                Some(index) => {
                    warn!(
                        testset = own,
                        dependency = %name,
                        index,
                        "dropping dependency that does not point to an earlier testset"
                    );
                }
                None => warn!(testset = own, dependency = %name, "dropping unknown dependency"),
            }
        }
        dependencies
    }
}

/// Limits shared by every testset of a package.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub cpu_limit_ms: u32,
    pub memory_limit_bytes: u64,
    pub file_size_limit_bytes: u64,
}

/// A fresh testset with the default policy: samples are scored per test with complete feedback,
/// everything else is all-or-nothing with expanded ICPC feedback.
pub fn testset(index: u32, limits: Limits) -> Testset {
    let (scoring_mode, feedback_policy) = if index == SAMPLE_INDEX {
        (ScoringMode::Each, FeedbackPolicy::Complete)
    } else {
        (ScoringMode::All, FeedbackPolicy::IcpcExpanded)
    };

    Testset {
        id: Uuid::new_v4().to_string(),
        index,
        cpu_limit_ms: limits.cpu_limit_ms,
        memory_limit_bytes: limits.memory_limit_bytes,
        file_size_limit_bytes: limits.file_size_limit_bytes,
        scoring_mode,
        feedback_policy,
        dependency_mode: DependencyMode::None,
        dependencies: Vec::new(),
    }
}
