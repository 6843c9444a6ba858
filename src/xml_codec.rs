// XML persistence. Structurally the same normalized form as the JSON codec,
// just a different concrete syntax: identity and cross-references live in
// attributes, everything else in child elements.

use std::path::Path;

use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{BookingId, HousingId, ReviewId, UserId};
use crate::snapshot::{
    AddressRecord, BookingRecord, HousingRecord, PersistError, ReviewRecord, StoreSnapshot,
    UserRecord,
};
use crate::store::LodgingStore;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

// Structures for XML (de)serialization
#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename = "data")]
pub struct XmlDocument {
    pub users: XmlUsers,
    pub housings: XmlHousings,
    pub bookings: XmlBookings,
    pub reviews: XmlReviews,
}

#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XmlUsers {
    #[serde(rename = "user")]
    pub users: Vec<XmlUser>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct XmlUser {
    #[serde(rename = "@id")]
    pub id: UserId,
    pub name: String,
    pub contact_info: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XmlHousings {
    #[serde(rename = "housing")]
    pub housings: Vec<XmlHousing>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct XmlHousing {
    #[serde(rename = "@id")]
    pub id: HousingId,
    #[serde(rename = "@price")]
    pub price: f64,
    pub location: XmlLocation,
    pub description: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XmlLocation {
    pub city: String,
    pub street: String,
    pub building_number: String,
    // Emitted only when present; a missing element reads back as absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<u32>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XmlBookings {
    #[serde(rename = "booking")]
    pub bookings: Vec<XmlBooking>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct XmlBooking {
    #[serde(rename = "@id")]
    pub id: BookingId,
    #[serde(rename = "@user_id")]
    pub user_id: UserId,
    #[serde(rename = "@housing_id")]
    pub housing_id: HousingId,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XmlReviews {
    #[serde(rename = "review")]
    pub reviews: Vec<XmlReview>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct XmlReview {
    #[serde(rename = "@id")]
    pub id: ReviewId,
    #[serde(rename = "@user_id")]
    pub user_id: UserId,
    #[serde(rename = "@housing_id")]
    pub housing_id: HousingId,
    #[serde(rename = "@rating")]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

impl From<StoreSnapshot> for XmlDocument {
    fn from(snapshot: StoreSnapshot) -> Self {
        XmlDocument {
            users: XmlUsers {
                users: snapshot
                    .users
                    .into_iter()
                    .map(|record| XmlUser {
                        id: record.user_id,
                        name: record.name,
                        contact_info: record.contact_info,
                    })
                    .collect(),
            },
            housings: XmlHousings {
                housings: snapshot
                    .housings
                    .into_iter()
                    .map(|record| XmlHousing {
                        id: record.housing_id,
                        price: record.price_per_night,
                        location: XmlLocation {
                            city: record.location.city,
                            street: record.location.street,
                            building_number: record.location.building_number,
                            postal_code: record.location.postal_code,
                        },
                        description: record.description,
                    })
                    .collect(),
            },
            bookings: XmlBookings {
                bookings: snapshot
                    .bookings
                    .into_iter()
                    .map(|record| XmlBooking {
                        id: record.booking_id,
                        user_id: record.user_id,
                        housing_id: record.housing_id,
                        start_date: record.start_date,
                        end_date: record.end_date,
                    })
                    .collect(),
            },
            reviews: XmlReviews {
                reviews: snapshot
                    .reviews
                    .into_iter()
                    .map(|record| XmlReview {
                        id: record.review_id,
                        user_id: record.user_id,
                        housing_id: record.housing_id,
                        rating: record.rating,
                        comment: record.comment,
                    })
                    .collect(),
            },
        }
    }
}

impl From<XmlDocument> for StoreSnapshot {
    fn from(document: XmlDocument) -> Self {
        StoreSnapshot {
            users: document
                .users
                .users
                .into_iter()
                .map(|element| UserRecord {
                    user_id: element.id,
                    name: element.name,
                    contact_info: element.contact_info,
                })
                .collect(),
            housings: document
                .housings
                .housings
                .into_iter()
                .map(|element| HousingRecord {
                    housing_id: element.id,
                    location: AddressRecord {
                        city: element.location.city,
                        street: element.location.street,
                        building_number: element.location.building_number,
                        postal_code: element.location.postal_code,
                    },
                    price_per_night: element.price,
                    description: element.description,
                })
                .collect(),
            bookings: document
                .bookings
                .bookings
                .into_iter()
                .map(|element| BookingRecord {
                    booking_id: element.id,
                    user_id: element.user_id,
                    housing_id: element.housing_id,
                    start_date: element.start_date,
                    end_date: element.end_date,
                })
                .collect(),
            reviews: document
                .reviews
                .reviews
                .into_iter()
                .map(|element| ReviewRecord {
                    review_id: element.id,
                    user_id: element.user_id,
                    housing_id: element.housing_id,
                    rating: element.rating,
                    comment: element.comment,
                })
                .collect(),
        }
    }
}

/// Serializes the store as an indented XML document under a `<data>` root,
/// prefixed with an XML declaration.
pub fn to_string(store: &LodgingStore) -> Result<String, PersistError> {
    let document = XmlDocument::from(StoreSnapshot::from(store));
    let mut body = String::new();
    let mut serializer = Serializer::new(&mut body);
    serializer.indent(' ', 4);
    document
        .serialize(serializer)
        .map_err(|e| PersistError::Serialize(e.to_string()))?;
    Ok(format!("{}\n{}\n", XML_DECLARATION, body))
}

/// Parses an XML document and replaces the store's contents with it. The
/// store is cleared first; on any failure it stays empty. Missing container
/// elements default to empty, same leniency as the JSON codec.
pub fn from_str(store: &mut LodgingStore, text: &str) -> Result<(), PersistError> {
    store.clear();
    let document: XmlDocument =
        quick_xml::de::from_str(text).map_err(|e| PersistError::XmlParse(e.to_string()))?;
    StoreSnapshot::from(document).restore(store)?;
    debug!(
        "loaded {} users, {} housings, {} bookings, {} reviews from XML",
        store.users().len(),
        store.housings().len(),
        store.bookings().len(),
        store.reviews().len()
    );
    Ok(())
}

/// Writes the store to `path` as XML, replacing any existing file.
pub fn save(store: &LodgingStore, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let text = to_string(store)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Reads a whole XML file and loads it into the store. The store is cleared
/// first; a missing or unreadable file surfaces as [`PersistError::Io`] with
/// the store left empty.
pub fn load(store: &mut LodgingStore, path: impl AsRef<Path>) -> Result<(), PersistError> {
    store.clear();
    let text = std::fs::read_to_string(path)?;
    from_str(store, &text)
}

// A small sample document for inline testing
pub const SMALL_SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<data>
    <users>
        <user id="1">
            <name>Anna</name>
            <contact_info>anna@example.com</contact_info>
        </user>
    </users>
    <housings>
        <housing id="101" price="5500">
            <location>
                <city>Moscow</city>
                <street>Tverskaya</street>
                <building_number>10</building_number>
                <postal_code>125009</postal_code>
            </location>
            <description>Two-room flat</description>
        </housing>
    </housings>
    <bookings>
        <booking id="501" user_id="1" housing_id="101">
            <start_date>2024-01-10</start_date>
            <end_date>2024-01-15</end_date>
        </booking>
    </bookings>
    <reviews>
        <review id="1001" user_id="1" housing_id="101" rating="5">
            <comment>Great stay</comment>
        </review>
    </reviews>
</data>
"#;
