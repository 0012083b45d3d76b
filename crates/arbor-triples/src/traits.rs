use crate::error::TripleResult;
use crate::triple::{Transaction, Triple};

/// A `(subject, predicate, object)` fact store with forward and reverse
/// lookup.
///
/// All implementations must satisfy these invariants:
/// - Facts form a set: adding a present fact or removing an absent one
///   changes nothing.
/// - [`apply`](TripleStore::apply) removes every stale fact before adding any
///   fresh fact.
/// - [`subjects_with`](TripleStore::subjects_with) is answered from an index
///   keyed by `(predicate, object)`, not by scanning subjects.
/// - All I/O errors are propagated, never silently ignored.
pub trait TripleStore: Send + Sync {
    /// The object of the first fact matching `(subject, predicate, _)`.
    ///
    /// Returns `Ok(None)` if no such fact exists. When several facts match,
    /// the lexicographically smallest object wins.
    fn value_of(&self, subject: &str, predicate: &str) -> TripleResult<Option<String>>;

    /// Every subject `s` with a fact `(s, predicate, object)`, sorted.
    fn subjects_with(&self, predicate: &str, object: &str) -> TripleResult<Vec<String>>;

    /// Every fact with `subject` as its subject, ordered by predicate and
    /// then object.
    fn facts_about(&self, subject: &str) -> TripleResult<Vec<Triple>>;

    /// Apply a batch: stale facts are removed, then fresh facts are added.
    fn apply(&self, transaction: &Transaction) -> TripleResult<()>;

    /// Whether [`apply`](TripleStore::apply) is all-or-nothing.
    ///
    /// Callers report a failed commit as possibly partial when this is
    /// `false`.
    fn is_atomic(&self) -> bool {
        true
    }

    /// Add a single fact.
    fn add_fact(&self, triple: Triple) -> TripleResult<()> {
        let mut tx = Transaction::new();
        tx.add(triple);
        self.apply(&tx)
    }

    /// Remove a single fact.
    fn remove_fact(&self, triple: Triple) -> TripleResult<()> {
        let mut tx = Transaction::new();
        tx.remove(triple);
        self.apply(&tx)
    }
}
