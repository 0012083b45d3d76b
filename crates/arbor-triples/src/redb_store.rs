use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, instrument};

use crate::error::{TripleError, TripleResult};
use crate::traits::TripleStore;
use crate::triple::{Transaction, Triple};

/// `(subject, predicate, object)`
const SPO_TABLE: TableDefinition<(&str, &str, &str), ()> = TableDefinition::new("spo");
/// `(predicate, object, subject)`, the reverse-edge index.
const POS_TABLE: TableDefinition<(&str, &str, &str), ()> = TableDefinition::new("pos");

fn backend<E: Into<redb::Error>>(err: E) -> TripleError {
    TripleError::from(err.into())
}

/// Persistent triple store backed by a redb database.
///
/// Each fact is a key in two tables: `spo` answers forward lookups, `pos`
/// answers reverse lookups. Both keys are written in the same write
/// transaction, so every [`Transaction`] commits atomically.
#[derive(Clone)]
pub struct RedbTripleStore {
    db: Arc<Database>,
}

impl RedbTripleStore {
    /// Open (or create) a store at the given database file path.
    pub fn open(path: &Path) -> TripleResult<Self> {
        if path == Path::new("/") {
            return Err(TripleError::Open(
                "cowardly refusing to open / with redb".to_string(),
            ));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(backend)?;
        create_schema(&db)?;
        debug!(path = %path.display(), "opened redb triple store");
        Ok(Self { db: Arc::new(db) })
    }

    /// A store on redb's in-memory backend.
    pub fn new_temporary() -> TripleResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(backend)?;
        create_schema(&db)?;
        Ok(Self { db: Arc::new(db) })
    }
}

/// Ensures both tables exist so read transactions can open them.
fn create_schema(db: &Database) -> TripleResult<()> {
    let txn = db.begin_write().map_err(backend)?;
    txn.open_table(SPO_TABLE).map_err(backend)?;
    txn.open_table(POS_TABLE).map_err(backend)?;
    txn.commit().map_err(backend)?;
    Ok(())
}

impl TripleStore for RedbTripleStore {
    fn value_of(&self, subject: &str, predicate: &str) -> TripleResult<Option<String>> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(SPO_TABLE).map_err(backend)?;
        let mut range = table.range((subject, predicate, "")..).map_err(backend)?;
        if let Some(entry) = range.next() {
            let (key, _) = entry.map_err(backend)?;
            let (s, p, o) = key.value();
            if s == subject && p == predicate {
                return Ok(Some(o.to_string()));
            }
        }
        Ok(None)
    }

    fn subjects_with(&self, predicate: &str, object: &str) -> TripleResult<Vec<String>> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(POS_TABLE).map_err(backend)?;
        let mut subjects = Vec::new();
        for entry in table.range((predicate, object, "")..).map_err(backend)? {
            let (key, _) = entry.map_err(backend)?;
            let (p, o, s) = key.value();
            if p != predicate || o != object {
                break;
            }
            subjects.push(s.to_string());
        }
        Ok(subjects)
    }

    fn facts_about(&self, subject: &str) -> TripleResult<Vec<Triple>> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(SPO_TABLE).map_err(backend)?;
        let mut facts = Vec::new();
        for entry in table.range((subject, "", "")..).map_err(backend)? {
            let (key, _) = entry.map_err(backend)?;
            let (s, p, o) = key.value();
            if s != subject {
                break;
            }
            facts.push(Triple::new(s, p, o));
        }
        Ok(facts)
    }

    #[instrument(level = "trace", skip_all, fields(stale = transaction.stale().len(), fresh = transaction.fresh().len()))]
    fn apply(&self, transaction: &Transaction) -> TripleResult<()> {
        if transaction.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin_write().map_err(backend)?;
        {
            let mut spo = txn.open_table(SPO_TABLE).map_err(backend)?;
            let mut pos = txn.open_table(POS_TABLE).map_err(backend)?;
            for Triple {
                subject,
                predicate,
                object,
            } in transaction.stale()
            {
                spo.remove((subject.as_str(), predicate.as_str(), object.as_str()))
                    .map_err(backend)?;
                pos.remove((predicate.as_str(), object.as_str(), subject.as_str()))
                    .map_err(backend)?;
            }
            for Triple {
                subject,
                predicate,
                object,
            } in transaction.fresh()
            {
                spo.insert((subject.as_str(), predicate.as_str(), object.as_str()), ())
                    .map_err(backend)?;
                pos.insert((predicate.as_str(), object.as_str(), subject.as_str()), ())
                    .map_err(backend)?;
            }
        }
        txn.commit().map_err(backend)?;
        Ok(())
    }
}

impl std::fmt::Debug for RedbTripleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbTripleStore").finish_non_exhaustive()
    }
}
