use std::fmt;

use serde::{Deserialize, Serialize};

/// A single `(subject, predicate, object)` fact.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Debug for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

/// A batch of fact mutations applied as one logical commit.
///
/// `stale` facts are removed first, then `fresh` facts are added. Emulating a
/// scalar update on an append-only store is a remove of the old value plus an
/// add of the new one in the same transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    stale: Vec<Triple>,
    fresh: Vec<Triple>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fact for removal.
    pub fn remove(&mut self, triple: Triple) -> &mut Self {
        self.stale.push(triple);
        self
    }

    /// Queue a fact for addition.
    pub fn add(&mut self, triple: Triple) -> &mut Self {
        self.fresh.push(triple);
        self
    }

    pub fn stale(&self) -> &[Triple] {
        &self.stale
    }

    pub fn fresh(&self) -> &[Triple] {
        &self.fresh
    }

    /// Total number of queued mutations.
    pub fn len(&self) -> usize {
        self.stale.len() + self.fresh.len()
    }

    /// Returns `true` if applying this transaction would change nothing.
    pub fn is_empty(&self) -> bool {
        self.stale.is_empty() && self.fresh.is_empty()
    }
}
