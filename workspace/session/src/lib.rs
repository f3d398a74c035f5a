pub mod coherence;
pub mod error;
pub mod profile;
pub mod resolver;
pub mod store;
pub mod sync;

pub use coherence::{
    CacheCoherenceController, CacheKey, CachedCollection, CollectionKind, DerivedView,
    PendingWrite,
};
pub use error::{Result, SessionError, SettlementRejection};
pub use profile::ProfileCache;
pub use resolver::{ActiveHousehold, HouseholdResolver, RemoteList};
pub use store::{FileStore, HouseholdStore, KeyValueStore, MemoryStore};
pub use sync::{SyncConfig, SyncScheduler};
