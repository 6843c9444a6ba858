// JSON persistence: a thin front over the snapshot form. The store is
// cleared before the document is read, so every failed load ends the same
// way: empty registries, never a partial or stale population.

use std::path::Path;

use tracing::debug;

use crate::snapshot::{PersistError, StoreSnapshot};
use crate::store::LodgingStore;

/// Serializes the store as a pretty-printed JSON document with four top-level
/// arrays (`users`, `housings`, `bookings`, `reviews`).
pub fn to_string(store: &LodgingStore) -> Result<String, PersistError> {
    serde_json::to_string_pretty(&StoreSnapshot::from(store))
        .map_err(|e| PersistError::Serialize(e.to_string()))
}

/// Parses a JSON document and replaces the store's contents with it. The
/// store is cleared first; on any failure it stays empty. Missing top-level
/// arrays default to empty.
pub fn from_str(store: &mut LodgingStore, text: &str) -> Result<(), PersistError> {
    store.clear();
    let snapshot: StoreSnapshot =
        serde_json::from_str(text).map_err(|e| PersistError::JsonParse(e.to_string()))?;
    snapshot.restore(store)?;
    debug!(
        "loaded {} users, {} housings, {} bookings, {} reviews from JSON",
        store.users().len(),
        store.housings().len(),
        store.bookings().len(),
        store.reviews().len()
    );
    Ok(())
}

/// Writes the store to `path` as JSON, replacing any existing file.
pub fn save(store: &LodgingStore, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let text = to_string(store)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Reads a whole JSON file and loads it into the store. The store is cleared
/// first; a missing or unreadable file surfaces as [`PersistError::Io`] with
/// the store left empty.
pub fn load(store: &mut LodgingStore, path: impl AsRef<Path>) -> Result<(), PersistError> {
    store.clear();
    let text = std::fs::read_to_string(path)?;
    from_str(store, &text)
}
