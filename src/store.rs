// Registries and the store. Each entity type gets an ID-keyed identity map;
// the store owns all four and is the only write path, so referential
// integrity (reject unknown references, cascade on delete) is enforced in one
// place.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::model::{
    Address, Booking, BookingId, BookingPatch, DomainError, Housing, HousingId, HousingPatch,
    Review, ReviewId, ReviewPatch, User, UserId, UserPatch,
};

/// In-memory identity map for one entity type. Lookup goes through the map;
/// iteration follows insertion order, which keeps serialization and tests
/// deterministic. Mutation is crate-private so all writes go through
/// [`LodgingStore`].
#[derive(Debug)]
pub struct Registry<K, T> {
    entries: HashMap<K, T>,
    order: Vec<K>,
}

impl<K, T> Default for Registry<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, T> Registry<K, T> {
    pub fn get(&self, id: K) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    // On a duplicate ID the existing entity is kept and the order vector is
    // left alone, so `iter` never yields an entity twice. Callers still
    // check `contains` first to report `DuplicateId`.
    pub(crate) fn insert(&mut self, id: K, value: T) -> &T {
        if !self.entries.contains_key(&id) {
            self.order.push(id);
        }
        self.entries.entry(id).or_insert(value)
    }

    pub(crate) fn get_mut(&mut self, id: K) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: K) -> Option<T> {
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            self.order.retain(|existing| *existing != id);
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// The booking-domain store: four registries plus the operations that keep
/// them consistent. Plain owned value, no process-wide state; callers pass it
/// by reference.
#[derive(Debug, Default)]
pub struct LodgingStore {
    users: Registry<UserId, User>,
    housings: Registry<HousingId, Housing>,
    bookings: Registry<BookingId, Booking>,
    reviews: Registry<ReviewId, Review>,
}

impl LodgingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &Registry<UserId, User> {
        &self.users
    }

    pub fn housings(&self) -> &Registry<HousingId, Housing> {
        &self.housings
    }

    pub fn bookings(&self) -> &Registry<BookingId, Booking> {
        &self.bookings
    }

    pub fn reviews(&self) -> &Registry<ReviewId, Review> {
        &self.reviews
    }

    /// Empties all four registries. Used before a full reload so loading is
    /// idempotent.
    pub fn clear(&mut self) {
        self.users.clear();
        self.housings.clear();
        self.bookings.clear();
        self.reviews.clear();
    }

    pub fn create_user(
        &mut self,
        id: UserId,
        name: impl Into<String>,
        contact_info: impl Into<String>,
    ) -> Result<&User, DomainError> {
        if self.users.contains(id) {
            return Err(DomainError::DuplicateId {
                entity: "user",
                id: id.0,
            });
        }
        let user = User::new(id, name, contact_info)?;
        Ok(self.users.insert(id, user))
    }

    pub fn create_housing(
        &mut self,
        id: HousingId,
        location: Address,
        price_per_night: f64,
        description: impl Into<String>,
    ) -> Result<&Housing, DomainError> {
        if self.housings.contains(id) {
            return Err(DomainError::DuplicateId {
                entity: "housing",
                id: id.0,
            });
        }
        let housing = Housing::new(id, location, price_per_night, description)?;
        Ok(self.housings.insert(id, housing))
    }

    pub fn create_booking(
        &mut self,
        id: BookingId,
        user_id: UserId,
        housing_id: HousingId,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Result<&Booking, DomainError> {
        if self.bookings.contains(id) {
            return Err(DomainError::DuplicateId {
                entity: "booking",
                id: id.0,
            });
        }
        self.check_references("booking", id.0, user_id, housing_id)?;
        let booking = Booking::new(id, user_id, housing_id, start_date, end_date)?;
        Ok(self.bookings.insert(id, booking))
    }

    pub fn create_review(
        &mut self,
        id: ReviewId,
        user_id: UserId,
        housing_id: HousingId,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<&Review, DomainError> {
        if self.reviews.contains(id) {
            return Err(DomainError::DuplicateId {
                entity: "review",
                id: id.0,
            });
        }
        self.check_references("review", id.0, user_id, housing_id)?;
        let review = Review::new(id, user_id, housing_id, rating, comment)?;
        Ok(self.reviews.insert(id, review))
    }

    fn check_references(
        &self,
        entity: &'static str,
        id: u64,
        user_id: UserId,
        housing_id: HousingId,
    ) -> Result<(), DomainError> {
        if !self.users.contains(user_id) {
            return Err(DomainError::UnknownReference {
                entity,
                id,
                target: "user",
                target_id: user_id.0,
            });
        }
        if !self.housings.contains(housing_id) {
            return Err(DomainError::UnknownReference {
                entity,
                id,
                target: "housing",
                target_id: housing_id.0,
            });
        }
        Ok(())
    }

    /// Applies a partial update. Returns `Ok(false)` when the ID is absent; a
    /// validation failure leaves the stored entity unchanged.
    pub fn update_user(&mut self, id: UserId, patch: UserPatch) -> Result<bool, DomainError> {
        match self.users.get_mut(id) {
            Some(user) => {
                user.apply(patch)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn update_housing(
        &mut self,
        id: HousingId,
        patch: HousingPatch,
    ) -> Result<bool, DomainError> {
        match self.housings.get_mut(id) {
            Some(housing) => {
                housing.apply(patch)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn update_booking(
        &mut self,
        id: BookingId,
        patch: BookingPatch,
    ) -> Result<bool, DomainError> {
        if !self.bookings.contains(id) {
            return Ok(false);
        }
        self.check_patched_references("booking", id.0, patch.user_id, patch.housing_id)?;
        match self.bookings.get_mut(id) {
            Some(booking) => {
                booking.apply(patch)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn update_review(&mut self, id: ReviewId, patch: ReviewPatch) -> Result<bool, DomainError> {
        if !self.reviews.contains(id) {
            return Ok(false);
        }
        self.check_patched_references("review", id.0, patch.user_id, patch.housing_id)?;
        match self.reviews.get_mut(id) {
            Some(review) => {
                review.apply(patch)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn check_patched_references(
        &self,
        entity: &'static str,
        id: u64,
        user_id: Option<UserId>,
        housing_id: Option<HousingId>,
    ) -> Result<(), DomainError> {
        if let Some(user_id) = user_id {
            if !self.users.contains(user_id) {
                return Err(DomainError::UnknownReference {
                    entity,
                    id,
                    target: "user",
                    target_id: user_id.0,
                });
            }
        }
        if let Some(housing_id) = housing_id {
            if !self.housings.contains(housing_id) {
                return Err(DomainError::UnknownReference {
                    entity,
                    id,
                    target: "housing",
                    target_id: housing_id.0,
                });
            }
        }
        Ok(())
    }

    /// Removes a user and every booking/review that references them. Returns
    /// `false` when the ID is absent. The cascade is a full scan of the
    /// dependent registries, O(n) per delete.
    pub fn delete_user(&mut self, id: UserId) -> bool {
        if !self.users.contains(id) {
            return false;
        }
        // Bookings first, then reviews; a documented convention, not a
        // dependency.
        let stale_bookings: Vec<BookingId> = self
            .bookings
            .iter()
            .filter(|booking| booking.user_id() == id)
            .map(|booking| booking.id())
            .collect();
        for booking_id in stale_bookings {
            self.bookings.remove(booking_id);
            debug!("removed booking {} referencing deleted user {}", booking_id, id);
        }
        let stale_reviews: Vec<ReviewId> = self
            .reviews
            .iter()
            .filter(|review| review.user_id() == id)
            .map(|review| review.id())
            .collect();
        for review_id in stale_reviews {
            self.reviews.remove(review_id);
            debug!("removed review {} referencing deleted user {}", review_id, id);
        }
        self.users.remove(id).is_some()
    }

    /// Removes a housing and every booking/review that references it. Same
    /// cascade contract as [`delete_user`](Self::delete_user).
    pub fn delete_housing(&mut self, id: HousingId) -> bool {
        if !self.housings.contains(id) {
            return false;
        }
        let stale_bookings: Vec<BookingId> = self
            .bookings
            .iter()
            .filter(|booking| booking.housing_id() == id)
            .map(|booking| booking.id())
            .collect();
        for booking_id in stale_bookings {
            self.bookings.remove(booking_id);
            debug!(
                "removed booking {} referencing deleted housing {}",
                booking_id, id
            );
        }
        let stale_reviews: Vec<ReviewId> = self
            .reviews
            .iter()
            .filter(|review| review.housing_id() == id)
            .map(|review| review.id())
            .collect();
        for review_id in stale_reviews {
            self.reviews.remove(review_id);
            debug!(
                "removed review {} referencing deleted housing {}",
                review_id, id
            );
        }
        self.housings.remove(id).is_some()
    }

    /// Bookings are leaves in the reference graph; deleting one never
    /// cascades.
    pub fn delete_booking(&mut self, id: BookingId) -> bool {
        self.bookings.remove(id).is_some()
    }

    /// Reviews are leaves in the reference graph; deleting one never
    /// cascades.
    pub fn delete_review(&mut self, id: ReviewId) -> bool {
        self.reviews.remove(id).is_some()
    }
}
