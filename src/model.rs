// Domain model: entity identifiers, the Address value object and the four
// entities with their validation rules. Constructors validate fields and
// nothing else; reference checks against live registries belong to the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Error types for domain validation
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("duplicate {entity} id {id}")]
    DuplicateId { entity: &'static str, id: u64 },

    #[error("{entity} {id} references unknown {target} {target_id}")]
    UnknownReference {
        entity: &'static str,
        id: u64,
        target: &'static str,
        target_id: u64,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::Validation(format!(
            "{} must be a non-empty string",
            field
        )));
    }
    Ok(())
}

fn require_positive_id(id: u64, field: &str) -> Result<(), DomainError> {
    if id == 0 {
        return Err(DomainError::Validation(format!(
            "{} must be a positive integer",
            field
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), DomainError> {
    if !price.is_finite() {
        return Err(DomainError::TypeMismatch(
            "price_per_night must be a finite number".to_string(),
        ));
    }
    if price <= 0.0 {
        return Err(DomainError::Validation(
            "price_per_night must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_rating(rating: u8) -> Result<(), DomainError> {
    if !(1..=5).contains(&rating) {
        return Err(DomainError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

fn validate_postal_code(postal_code: Option<u32>) -> Result<(), DomainError> {
    if postal_code == Some(0) {
        return Err(DomainError::Validation(
            "postal_code must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Identifier of a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Identifier of a [`Housing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HousingId(pub u64);

/// Identifier of a [`Booking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

/// Identifier of a [`Review`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for HousingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Postal address of a housing unit. A value object: no identity, structural
/// equality, owned by exactly one [`Housing`].
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    city: String,
    street: String,
    building_number: String,
    postal_code: Option<u32>,
}

impl Address {
    pub fn new(
        city: impl Into<String>,
        street: impl Into<String>,
        building_number: impl Into<String>,
        postal_code: Option<u32>,
    ) -> Result<Self, DomainError> {
        let city = city.into();
        let street = street.into();
        let building_number = building_number.into();

        require_non_empty(&city, "city")?;
        require_non_empty(&street, "street")?;
        require_non_empty(&building_number, "building_number")?;
        validate_postal_code(postal_code)?;

        Ok(Self {
            city,
            street,
            building_number,
            postal_code,
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn building_number(&self) -> &str {
        &self.building_number
    }

    pub fn postal_code(&self) -> Option<u32> {
        self.postal_code
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.city, self.street, self.building_number)?;
        if let Some(postal_code) = self.postal_code {
            write!(f, " ({})", postal_code)?;
        }
        Ok(())
    }
}

/// A registered guest. Bookings and reviews are not stored on the user; the
/// dependent registries are scanned instead, which keeps the reference graph
/// acyclic.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: String,
    contact_info: String,
}

impl User {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        contact_info: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let contact_info = contact_info.into();

        require_positive_id(id.0, "user_id")?;
        require_non_empty(&name, "name")?;
        require_non_empty(&contact_info, "contact_info")?;

        Ok(Self {
            id,
            name,
            contact_info,
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact_info(&self) -> &str {
        &self.contact_info
    }

    pub(crate) fn apply(&mut self, patch: UserPatch) -> Result<(), DomainError> {
        if let Some(name) = &patch.name {
            require_non_empty(name, "name")?;
        }
        if let Some(contact_info) = &patch.contact_info {
            require_non_empty(contact_info, "contact_info")?;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(contact_info) = patch.contact_info {
            self.contact_info = contact_info;
        }
        Ok(())
    }
}

/// A housing listing. The address is owned exclusively; it is moved in at
/// construction and never shared between listings.
#[derive(Debug, Clone, PartialEq)]
pub struct Housing {
    id: HousingId,
    location: Address,
    price_per_night: f64,
    description: String,
}

impl Housing {
    pub fn new(
        id: HousingId,
        location: Address,
        price_per_night: f64,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        require_positive_id(id.0, "housing_id")?;
        validate_price(price_per_night)?;

        Ok(Self {
            id,
            location,
            price_per_night,
            description: description.into(),
        })
    }

    pub fn id(&self) -> HousingId {
        self.id
    }

    pub fn location(&self) -> &Address {
        &self.location
    }

    pub fn price_per_night(&self) -> f64 {
        self.price_per_night
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn apply(&mut self, patch: HousingPatch) -> Result<(), DomainError> {
        if let Some(price_per_night) = patch.price_per_night {
            validate_price(price_per_night)?;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(price_per_night) = patch.price_per_night {
            self.price_per_night = price_per_night;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        Ok(())
    }
}

/// A stay booked by a user at a housing. Holds ID references only; the store
/// guarantees they resolve at creation time and keeps them consistent through
/// cascade deletes. Dates are opaque `YYYY-MM-DD` strings, deliberately
/// without calendar or ordering checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    id: BookingId,
    user_id: UserId,
    housing_id: HousingId,
    start_date: String,
    end_date: String,
}

impl Booking {
    pub fn new(
        id: BookingId,
        user_id: UserId,
        housing_id: HousingId,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let start_date = start_date.into();
        let end_date = end_date.into();

        require_positive_id(id.0, "booking_id")?;
        require_non_empty(&start_date, "start_date")?;
        require_non_empty(&end_date, "end_date")?;

        Ok(Self {
            id,
            user_id,
            housing_id,
            start_date,
            end_date,
        })
    }

    pub fn id(&self) -> BookingId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn housing_id(&self) -> HousingId {
        self.housing_id
    }

    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    pub fn end_date(&self) -> &str {
        &self.end_date
    }

    pub(crate) fn apply(&mut self, patch: BookingPatch) -> Result<(), DomainError> {
        if let Some(start_date) = &patch.start_date {
            require_non_empty(start_date, "start_date")?;
        }
        if let Some(end_date) = &patch.end_date {
            require_non_empty(end_date, "end_date")?;
        }
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(housing_id) = patch.housing_id {
            self.housing_id = housing_id;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        Ok(())
    }
}

/// A rating left by a user for a housing. Same reference discipline as
/// [`Booking`].
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    id: ReviewId,
    user_id: UserId,
    housing_id: HousingId,
    rating: u8,
    comment: String,
}

impl Review {
    pub fn new(
        id: ReviewId,
        user_id: UserId,
        housing_id: HousingId,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<Self, DomainError> {
        require_positive_id(id.0, "review_id")?;
        validate_rating(rating)?;

        Ok(Self {
            id,
            user_id,
            housing_id,
            rating,
            comment: comment.into(),
        })
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn housing_id(&self) -> HousingId {
        self.housing_id
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub(crate) fn apply(&mut self, patch: ReviewPatch) -> Result<(), DomainError> {
        if let Some(rating) = patch.rating {
            validate_rating(rating)?;
        }
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(housing_id) = patch.housing_id {
            self.housing_id = housing_id;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(comment) = patch.comment {
            self.comment = comment;
        }
        Ok(())
    }
}

// Partial-update payloads. `None` fields are no-ops; supplied fields are
// re-validated with the construction rules before anything is assigned, so a
// failed update leaves the entity untouched.

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HousingPatch {
    pub location: Option<Address>,
    pub price_per_night: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub user_id: Option<UserId>,
    pub housing_id: Option<HousingId>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub user_id: Option<UserId>,
    pub housing_id: Option<HousingId>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_address_fields_read_back() {
        let address = Address::new("Moscow", "Tverskaya", "10", Some(125_009)).unwrap();
        assert_eq!(address.city(), "Moscow");
        assert_eq!(address.street(), "Tverskaya");
        assert_eq!(address.building_number(), "10");
        assert_eq!(address.postal_code(), Some(125_009));
    }

    #[test_case("", "Tverskaya", "10"; "#1 empty city")]
    #[test_case("Moscow", "", "10"; "#2 empty street")]
    #[test_case("Moscow", "Tverskaya", ""; "#3 empty building number")]
    fn test_address_rejects_empty_fields(city: &str, street: &str, building_number: &str) {
        let result = Address::new(city, street, building_number, None);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_address_rejects_zero_postal_code() {
        let result = Address::new("Moscow", "Tverskaya", "10", Some(0));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_address_allows_letters_in_building_number() {
        let address = Address::new("Moscow", "Tverskaya", "10k2", None).unwrap();
        assert_eq!(address.building_number(), "10k2");
    }

    #[test]
    fn test_address_display() {
        let with_postal = Address::new("Moscow", "Tverskaya", "10", Some(125_009)).unwrap();
        assert_eq!(with_postal.to_string(), "Moscow, Tverskaya, 10 (125009)");

        let without_postal = Address::new("Moscow", "Tverskaya", "10", None).unwrap();
        assert_eq!(without_postal.to_string(), "Moscow, Tverskaya, 10");
    }

    #[test]
    fn test_user_fields_read_back() {
        let user = User::new(UserId(1), "Anna", "anna@example.com").unwrap();
        assert_eq!(user.id(), UserId(1));
        assert_eq!(user.name(), "Anna");
        assert_eq!(user.contact_info(), "anna@example.com");
    }

    #[test]
    fn test_user_rejects_zero_id_and_empty_fields() {
        assert!(matches!(
            User::new(UserId(0), "Anna", "anna@example.com"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            User::new(UserId(1), "", "anna@example.com"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            User::new(UserId(1), "Anna", ""),
            Err(DomainError::Validation(_))
        ));
    }

    fn sample_address() -> Address {
        Address::new("Moscow", "Tverskaya", "10", Some(125_009)).unwrap()
    }

    #[test]
    fn test_housing_fields_read_back() {
        let housing = Housing::new(HousingId(101), sample_address(), 5500.0, "desc").unwrap();
        assert_eq!(housing.id(), HousingId(101));
        assert_eq!(housing.location(), &sample_address());
        assert_eq!(housing.price_per_night(), 5500.0);
        assert_eq!(housing.description(), "desc");
    }

    #[test_case(0.0; "#1 zero price")]
    #[test_case(-5.0; "#2 negative price")]
    fn test_housing_rejects_non_positive_price(price: f64) {
        let result = Housing::new(HousingId(101), sample_address(), price, "desc");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test_case(f64::NAN; "#1 nan price")]
    #[test_case(f64::INFINITY; "#2 infinite price")]
    fn test_housing_rejects_non_finite_price(price: f64) {
        let result = Housing::new(HousingId(101), sample_address(), price, "desc");
        assert!(matches!(result, Err(DomainError::TypeMismatch(_))));
    }

    #[test]
    fn test_housing_allows_empty_description() {
        let housing = Housing::new(HousingId(101), sample_address(), 5500.0, "").unwrap();
        assert_eq!(housing.description(), "");
    }

    #[test]
    fn test_booking_fields_read_back() {
        let booking = Booking::new(
            BookingId(501),
            UserId(1),
            HousingId(101),
            "2024-01-10",
            "2024-01-15",
        )
        .unwrap();
        assert_eq!(booking.id(), BookingId(501));
        assert_eq!(booking.user_id(), UserId(1));
        assert_eq!(booking.housing_id(), HousingId(101));
        assert_eq!(booking.start_date(), "2024-01-10");
        assert_eq!(booking.end_date(), "2024-01-15");
    }

    #[test]
    fn test_booking_rejects_empty_dates() {
        assert!(matches!(
            Booking::new(BookingId(501), UserId(1), HousingId(101), "", "2024-01-15"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Booking::new(BookingId(501), UserId(1), HousingId(101), "2024-01-10", ""),
            Err(DomainError::Validation(_))
        ));
    }

    // Start/end ordering is deliberately unconstrained.
    #[test]
    fn test_booking_accepts_reversed_dates() {
        let booking = Booking::new(
            BookingId(501),
            UserId(1),
            HousingId(101),
            "2024-01-15",
            "2024-01-10",
        );
        assert!(booking.is_ok());
    }

    #[test_case(1; "#1 lower bound")]
    #[test_case(3; "#2 middle")]
    #[test_case(5; "#3 upper bound")]
    fn test_review_accepts_valid_rating(rating: u8) {
        let review = Review::new(ReviewId(1001), UserId(1), HousingId(101), rating, "ok");
        assert!(review.is_ok());
    }

    #[test_case(0; "#1 below range")]
    #[test_case(6; "#2 above range")]
    fn test_review_rejects_out_of_range_rating(rating: u8) {
        let result = Review::new(ReviewId(1001), UserId(1), HousingId(101), rating, "ok");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_review_allows_empty_comment() {
        let review = Review::new(ReviewId(1001), UserId(1), HousingId(101), 4, "").unwrap();
        assert_eq!(review.comment(), "");
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = User::new(UserId(1), "", "anna@example.com").unwrap_err();
        assert!(err.to_string().contains("name"), "unexpected message: {}", err);

        let err = Review::new(ReviewId(1001), UserId(1), HousingId(101), 9, "ok").unwrap_err();
        assert!(
            err.to_string().contains("rating"),
            "unexpected message: {}",
            err
        );
    }
}
