// The normalized document form shared by both codecs. Cross-references are
// carried as plain ID fields, never nested objects; the embedded address is
// the one exception since it has no identity of its own. Restore order and
// the lenient-reference policy live here so JSON and XML cannot diverge.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::{Address, BookingId, DomainError, HousingId, ReviewId, UserId};
use crate::store::LodgingStore;

// Error types for persistence
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid record in document: {0}")]
    Domain(#[from] DomainError),
}

/// Flat capture of a store: one record vector per entity type, in registry
/// insertion order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub users: Vec<UserRecord>,
    pub housings: Vec<HousingRecord>,
    pub bookings: Vec<BookingRecord>,
    pub reviews: Vec<ReviewRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub name: String,
    pub contact_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub city: String,
    pub street: String,
    pub building_number: String,
    // Serialized as null when absent; a missing key also reads as absent.
    #[serde(default)]
    pub postal_code: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingRecord {
    pub housing_id: HousingId,
    pub location: AddressRecord,
    pub price_per_night: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub housing_id: HousingId,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_id: ReviewId,
    pub user_id: UserId,
    pub housing_id: HousingId,
    pub rating: u8,
    pub comment: String,
}

impl From<&LodgingStore> for StoreSnapshot {
    fn from(store: &LodgingStore) -> Self {
        StoreSnapshot {
            users: store
                .users()
                .iter()
                .map(|user| UserRecord {
                    user_id: user.id(),
                    name: user.name().to_string(),
                    contact_info: user.contact_info().to_string(),
                })
                .collect(),
            housings: store
                .housings()
                .iter()
                .map(|housing| HousingRecord {
                    housing_id: housing.id(),
                    location: AddressRecord {
                        city: housing.location().city().to_string(),
                        street: housing.location().street().to_string(),
                        building_number: housing.location().building_number().to_string(),
                        postal_code: housing.location().postal_code(),
                    },
                    price_per_night: housing.price_per_night(),
                    description: housing.description().to_string(),
                })
                .collect(),
            bookings: store
                .bookings()
                .iter()
                .map(|booking| BookingRecord {
                    booking_id: booking.id(),
                    user_id: booking.user_id(),
                    housing_id: booking.housing_id(),
                    start_date: booking.start_date().to_string(),
                    end_date: booking.end_date().to_string(),
                })
                .collect(),
            reviews: store
                .reviews()
                .iter()
                .map(|review| ReviewRecord {
                    review_id: review.id(),
                    user_id: review.user_id(),
                    housing_id: review.housing_id(),
                    rating: review.rating(),
                    comment: review.comment().to_string(),
                })
                .collect(),
        }
    }
}

impl StoreSnapshot {
    /// Replaces the store's contents with this snapshot. The store is cleared
    /// first, then repopulated in dependency order: users, housings,
    /// bookings, reviews. A booking or review whose referenced ID is absent
    /// is skipped with a warning (lenient-load policy); any other failure
    /// aborts the restore and clears the store again, so a failed load never
    /// leaves it partially populated.
    pub fn restore(self, store: &mut LodgingStore) -> Result<(), DomainError> {
        store.clear();
        if let Err(err) = self.apply(store) {
            store.clear();
            return Err(err);
        }
        Ok(())
    }

    fn apply(self, store: &mut LodgingStore) -> Result<(), DomainError> {
        for record in self.users {
            store.create_user(record.user_id, record.name, record.contact_info)?;
        }
        for record in self.housings {
            let location = Address::new(
                record.location.city,
                record.location.street,
                record.location.building_number,
                record.location.postal_code,
            )?;
            store.create_housing(
                record.housing_id,
                location,
                record.price_per_night,
                record.description,
            )?;
        }
        // The registries themselves resolve the foreign keys from here on.
        for record in self.bookings {
            let result = store.create_booking(
                record.booking_id,
                record.user_id,
                record.housing_id,
                record.start_date,
                record.end_date,
            );
            match result {
                Ok(_) => {}
                Err(err @ DomainError::UnknownReference { .. }) => {
                    warn!("skipping record during load: {}", err);
                }
                Err(err) => return Err(err),
            }
        }
        for record in self.reviews {
            let result = store.create_review(
                record.review_id,
                record.user_id,
                record.housing_id,
                record.rating,
                record.comment,
            );
            match result {
                Ok(_) => {}
                Err(err @ DomainError::UnknownReference { .. }) => {
                    warn!("skipping record during load: {}", err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> LodgingStore {
        let mut store = LodgingStore::new();
        store.create_user(UserId(1), "Anna", "anna@example.com").unwrap();
        store
            .create_housing(
                HousingId(101),
                Address::new("Moscow", "Tverskaya", "10", Some(125_009)).unwrap(),
                5500.0,
                "flat",
            )
            .unwrap();
        store
            .create_booking(BookingId(501), UserId(1), HousingId(101), "2024-01-10", "2024-01-15")
            .unwrap();
        store
            .create_review(ReviewId(1001), UserId(1), HousingId(101), 5, "great")
            .unwrap();
        store
    }

    #[test]
    fn test_capture_and_restore_round_trip() {
        let store = sample_store();
        let snapshot = StoreSnapshot::from(&store);

        let mut reloaded = LodgingStore::new();
        snapshot.clone().restore(&mut reloaded).unwrap();

        assert_eq!(StoreSnapshot::from(&reloaded), snapshot);
    }

    #[test]
    fn test_restore_clears_previous_contents() {
        let snapshot = StoreSnapshot::from(&sample_store());

        let mut store = LodgingStore::new();
        store.create_user(UserId(99), "Stale", "stale@example.com").unwrap();
        snapshot.restore(&mut store).unwrap();

        assert!(store.users().get(UserId(99)).is_none());
        assert!(store.users().get(UserId(1)).is_some());
    }

    #[test]
    fn test_restore_skips_records_with_dangling_references() {
        let mut snapshot = StoreSnapshot::from(&sample_store());
        snapshot.bookings.push(BookingRecord {
            booking_id: BookingId(502),
            user_id: UserId(77),
            housing_id: HousingId(101),
            start_date: "2024-02-01".to_string(),
            end_date: "2024-02-03".to_string(),
        });
        snapshot.reviews.push(ReviewRecord {
            review_id: ReviewId(1002),
            user_id: UserId(1),
            housing_id: HousingId(999),
            rating: 2,
            comment: "never happened".to_string(),
        });

        let mut store = LodgingStore::new();
        snapshot.restore(&mut store).unwrap();

        assert!(store.bookings().get(BookingId(501)).is_some());
        assert!(store.bookings().get(BookingId(502)).is_none());
        assert!(store.reviews().get(ReviewId(1001)).is_some());
        assert!(store.reviews().get(ReviewId(1002)).is_none());
    }

    #[test]
    fn test_restore_failure_leaves_store_empty() {
        let mut snapshot = StoreSnapshot::from(&sample_store());
        snapshot.users.push(UserRecord {
            user_id: UserId(1),
            name: "Duplicate".to_string(),
            contact_info: "dup@example.com".to_string(),
        });

        let mut store = sample_store();
        let err = snapshot.restore(&mut store).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateId { .. }));

        assert!(store.users().is_empty());
        assert!(store.housings().is_empty());
        assert!(store.bookings().is_empty());
        assert!(store.reviews().is_empty());
    }

    #[test]
    fn test_restore_rejects_invalid_field_values() {
        let mut snapshot = StoreSnapshot::from(&sample_store());
        snapshot.reviews.push(ReviewRecord {
            review_id: ReviewId(1002),
            user_id: UserId(1),
            housing_id: HousingId(101),
            rating: 9,
            comment: "out of range".to_string(),
        });

        let mut store = LodgingStore::new();
        let err = snapshot.restore(&mut store).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(store.users().is_empty());
    }
}
