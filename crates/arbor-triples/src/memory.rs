use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::trace;

use crate::error::{TripleError, TripleResult};
use crate::traits::TripleStore;
use crate::triple::{Transaction, Triple};

type Index = BTreeMap<(String, String), BTreeSet<String>>;

#[derive(Default)]
struct Indexes {
    /// `(subject, predicate) -> objects`
    forward: Index,
    /// `(predicate, object) -> subjects`
    reverse: Index,
}

impl Indexes {
    fn insert(&mut self, t: &Triple) {
        self.forward
            .entry((t.subject.clone(), t.predicate.clone()))
            .or_default()
            .insert(t.object.clone());
        self.reverse
            .entry((t.predicate.clone(), t.object.clone()))
            .or_default()
            .insert(t.subject.clone());
    }

    fn remove(&mut self, t: &Triple) {
        let key = (t.subject.clone(), t.predicate.clone());
        if let Some(objects) = self.forward.get_mut(&key) {
            objects.remove(&t.object);
            if objects.is_empty() {
                self.forward.remove(&key);
            }
        }
        let key = (t.predicate.clone(), t.object.clone());
        if let Some(subjects) = self.reverse.get_mut(&key) {
            subjects.remove(&t.subject);
            if subjects.is_empty() {
                self.reverse.remove(&key);
            }
        }
    }
}

/// In-memory triple store.
///
/// Intended for tests and embedding. Both indexes live behind one `RwLock`,
/// so a transaction is applied atomically with respect to readers. Data is
/// lost when the store is dropped.
#[derive(Default)]
pub struct InMemoryTripleStore {
    indexes: RwLock<Indexes>,
    commits: AtomicU64,
}

impl InMemoryTripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of facts currently stored.
    pub fn len(&self) -> TripleResult<usize> {
        let indexes = self.read()?;
        Ok(indexes.forward.values().map(BTreeSet::len).sum())
    }

    /// Returns `true` if the store holds no facts.
    pub fn is_empty(&self) -> TripleResult<bool> {
        Ok(self.read()?.forward.is_empty())
    }

    /// Whether the exact fact is present.
    pub fn contains(&self, triple: &Triple) -> TripleResult<bool> {
        let indexes = self.read()?;
        Ok(indexes
            .forward
            .get(&(triple.subject.clone(), triple.predicate.clone()))
            .is_some_and(|objects| objects.contains(&triple.object)))
    }

    /// Number of non-empty transactions applied so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    fn read(&self) -> TripleResult<std::sync::RwLockReadGuard<'_, Indexes>> {
        self.indexes
            .read()
            .map_err(|e| TripleError::LockPoisoned(e.to_string()))
    }
}

impl TripleStore for InMemoryTripleStore {
    fn value_of(&self, subject: &str, predicate: &str) -> TripleResult<Option<String>> {
        let indexes = self.read()?;
        Ok(indexes
            .forward
            .get(&(subject.to_string(), predicate.to_string()))
            .and_then(|objects| objects.first().cloned()))
    }

    fn subjects_with(&self, predicate: &str, object: &str) -> TripleResult<Vec<String>> {
        let indexes = self.read()?;
        Ok(indexes
            .reverse
            .get(&(predicate.to_string(), object.to_string()))
            .map(|subjects| subjects.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn facts_about(&self, subject: &str) -> TripleResult<Vec<Triple>> {
        let indexes = self.read()?;
        Ok(indexes
            .forward
            .range((subject.to_string(), String::new())..)
            .take_while(|((s, _), _)| s == subject)
            .flat_map(|((s, p), objects)| objects.iter().map(move |o| Triple::new(s, p, o)))
            .collect())
    }

    fn apply(&self, transaction: &Transaction) -> TripleResult<()> {
        if transaction.is_empty() {
            return Ok(());
        }
        let mut indexes = self
            .indexes
            .write()
            .map_err(|e| TripleError::LockPoisoned(e.to_string()))?;
        for triple in transaction.stale() {
            indexes.remove(triple);
        }
        for triple in transaction.fresh() {
            indexes.insert(triple);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        trace!(
            stale = transaction.stale().len(),
            fresh = transaction.fresh().len(),
            "applied transaction"
        );
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryTripleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTripleStore")
            .field("fact_count", &self.len().unwrap_or_default())
            .field("commits", &self.commit_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup_both_directions() {
        let store = InMemoryTripleStore::new();
        store.add_fact(Triple::new("a", "hasParent", "root")).unwrap();
        store.add_fact(Triple::new("b", "hasParent", "root")).unwrap();

        assert_eq!(
            store.value_of("a", "hasParent").unwrap().as_deref(),
            Some("root")
        );
        assert_eq!(
            store.subjects_with("hasParent", "root").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn add_is_idempotent() {
        let store = InMemoryTripleStore::new();
        let fact = Triple::new("a", "isNamed", "docs");
        store.add_fact(fact.clone()).unwrap();
        store.add_fact(fact.clone()).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.contains(&fact).unwrap());
    }

    #[test]
    fn remove_absent_is_noop() {
        let store = InMemoryTripleStore::new();
        store.remove_fact(Triple::new("a", "isNamed", "x")).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn missing_value_is_none() {
        let store = InMemoryTripleStore::new();
        assert_eq!(store.value_of("nobody", "isNamed").unwrap(), None);
        assert!(store.subjects_with("isNamed", "nobody").unwrap().is_empty());
    }

    #[test]
    fn stale_removed_before_fresh_added() {
        let store = InMemoryTripleStore::new();
        let fact = Triple::new("a", "isNamed", "same");
        store.add_fact(fact.clone()).unwrap();

        // Removing and re-adding the same fact in one batch must leave it present.
        let mut tx = Transaction::new();
        tx.remove(fact.clone()).add(fact.clone());
        store.apply(&tx).unwrap();
        assert!(store.contains(&fact).unwrap());
    }

    #[test]
    fn scalar_update_leaves_single_value() {
        let store = InMemoryTripleStore::new();
        store.add_fact(Triple::new("a", "isNamed", "old")).unwrap();

        let mut tx = Transaction::new();
        tx.remove(Triple::new("a", "isNamed", "old"))
            .add(Triple::new("a", "isNamed", "new"));
        store.apply(&tx).unwrap();

        assert_eq!(store.value_of("a", "isNamed").unwrap().as_deref(), Some("new"));
        assert!(store.subjects_with("isNamed", "old").unwrap().is_empty());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn empty_transaction_is_not_counted() {
        let store = InMemoryTripleStore::new();
        store.apply(&Transaction::new()).unwrap();
        assert_eq!(store.commit_count(), 0);
        store.add_fact(Triple::new("a", "b", "c")).unwrap();
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn facts_about_stays_within_subject() {
        let store = InMemoryTripleStore::new();
        let mut tx = Transaction::new();
        tx.add(Triple::new("a", "isNamed", "x"))
            .add(Triple::new("a", "offset-0", "h1"))
            .add(Triple::new("ab", "isNamed", "y"))
            .add(Triple::new("b", "isNamed", "z"));
        store.apply(&tx).unwrap();

        assert_eq!(
            store.facts_about("a").unwrap(),
            vec![Triple::new("a", "isNamed", "x"), Triple::new("a", "offset-0", "h1")]
        );
        assert!(store.facts_about("missing").unwrap().is_empty());
    }

    #[test]
    fn first_value_wins_when_several_exist() {
        let store = InMemoryTripleStore::new();
        store.add_fact(Triple::new("a", "hasType", "text/plain")).unwrap();
        store.add_fact(Triple::new("a", "hasType", "image/png")).unwrap();
        assert_eq!(
            store.value_of("a", "hasType").unwrap().as_deref(),
            Some("image/png")
        );
    }
}
