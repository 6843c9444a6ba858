// Main library file for the lodging booking store

// Export modules for each layer of the store
pub mod json_codec;
pub mod model;
pub mod snapshot;
pub mod store;
pub mod xml_codec;

// Re-export key types for convenience
pub use model::{
    Address, Booking, BookingId, BookingPatch, DomainError, Housing, HousingId, HousingPatch,
    Review, ReviewId, ReviewPatch, User, UserId, UserPatch,
};
pub use snapshot::{PersistError, StoreSnapshot};
pub use store::{LodgingStore, Registry};
