//! A waypoint store held in process memory.
//!
//! Used when no PostgreSQL connection is configured and by the tests. It can
//! be switched into an unavailable state to exercise failure handling.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use async_trait::async_trait;
use model::{waypoint::Waypoint, WithId};
use utility::id::Id;

use crate::database::{
    Database, DatabaseError, RawWaypoint, Result, StoredWaypoint, WaypointRepo,
};

#[derive(Debug, Default)]
struct Shared {
    records: Mutex<Vec<RawWaypoint>>,
    unavailable: AtomicBool,
    next_id: AtomicU64,
    operations: AtomicU64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    shared: Arc<Shared>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails as if the service was unreachable.
    pub fn unavailable() -> Self {
        let database = Self::new();
        database.set_available(false);
        database
    }

    pub fn set_available(&self, available: bool) {
        self.shared.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Stores a record as is, bypassing validation. Lets tests seed records
    /// that other clients could have written.
    pub fn insert_raw(&self, record: RawWaypoint) {
        if let Ok(mut records) = self.shared.records.lock() {
            records.push(record);
        }
    }

    /// Number of store operations performed so far, failed ones included.
    pub fn operations(&self) -> u64 {
        self.shared.operations.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.shared
            .records
            .lock()
            .map(|records| records.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Database for MemoryDatabase {
    type Autocommit = MemoryAutocommit;

    fn auto(&self) -> Self::Autocommit {
        MemoryAutocommit {
            shared: self.shared.clone(),
        }
    }
}

pub struct MemoryAutocommit {
    shared: Arc<Shared>,
}

impl MemoryAutocommit {
    fn records(&self) -> Result<MutexGuard<'_, Vec<RawWaypoint>>> {
        self.shared.operations.fetch_add(1, Ordering::SeqCst);
        if self.shared.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("memory store is offline".into()));
        }
        self.shared
            .records
            .lock()
            .map_err(|_| DatabaseError::Other("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl WaypointRepo for MemoryAutocommit {
    async fn exists(&mut self, id: &Id<Waypoint>) -> Result<bool> {
        let records = self.records()?;
        Ok(records.iter().any(|record| record.id == *id.raw_ref::<str>()))
    }

    async fn get(&mut self, id: &Id<Waypoint>) -> Result<WithId<Waypoint>> {
        let records = self.records()?;
        let record = records
            .iter()
            .find(|record| record.id == *id.raw_ref::<str>())
            .cloned()
            .ok_or(DatabaseError::NotFound)?;
        match record.validate() {
            StoredWaypoint::Valid(waypoint) => Ok(waypoint),
            StoredWaypoint::Malformed { reason, .. } => {
                Err(DatabaseError::Malformed(reason))
            }
        }
    }

    async fn create(&mut self, waypoint: WithId<Waypoint>) -> Result<bool> {
        let mut records = self.records()?;
        if records
            .iter()
            .any(|record| record.id == *waypoint.id.raw_ref::<str>())
        {
            return Ok(false);
        }
        records.push(RawWaypoint::from_model(&waypoint));
        Ok(true)
    }

    async fn list_all(&mut self) -> Result<Vec<StoredWaypoint>> {
        let mut records = self.records()?.clone();
        records.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records.into_iter().map(RawWaypoint::validate).collect())
    }

    async fn append(&mut self, waypoint: Waypoint) -> Result<WithId<Waypoint>> {
        let mut records = self.records()?;
        let sequence = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        let waypoint = WithId::new(Id::new(format!("generated-{:08}", sequence)), waypoint);
        records.push(RawWaypoint::from_model(&waypoint));
        Ok(waypoint)
    }
}
