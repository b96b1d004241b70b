//! Listing normalizer
//!
//! Pulls the allow-listed fields out of one raw search-result `listing`
//! object. Only presence is checked: a present value is copied through
//! unchanged, whatever its JSON type, and value checks are left to whoever
//! consumes the dataset.

use crate::listing::types::{Listing, ListingId};
use crate::NormalizeError;
use serde::Deserialize;
use serde_json::Value;

/// Field names copied from every raw listing, in output order
pub const LISTING_FIELDS: [&str; 14] = [
    "id",
    "price",
    "lat",
    "lng",
    "instant_bookable",
    "has_simplified_booking",
    "bedrooms",
    "beds",
    "person_capacity",
    "picture_count",
    "property_type",
    "room_type",
    "room_type_category",
    "reviews_count",
];

/// Extracts the identifier of a raw listing object
///
/// Used for deduplication before the rest of the record is touched.
pub fn listing_id(raw: &Value) -> Result<ListingId, NormalizeError> {
    match raw.get("id") {
        None | Some(Value::Null) => Err(NormalizeError::MissingId),
        Some(id) => ListingId::deserialize(id).map_err(|_| NormalizeError::InvalidId {
            value: id.to_string(),
        }),
    }
}

/// Normalizes one raw listing object into a flat [`Listing`]
///
/// Fields outside the allow-list are dropped. An allow-listed field that is
/// absent or `null` becomes `None`.
pub fn normalize(raw: &Value) -> Result<Listing, NormalizeError> {
    let id = listing_id(raw)?;

    Ok(Listing {
        id,
        price: field(raw, "price"),
        lat: field(raw, "lat"),
        lng: field(raw, "lng"),
        instant_bookable: field(raw, "instant_bookable"),
        has_simplified_booking: field(raw, "has_simplified_booking"),
        bedrooms: field(raw, "bedrooms"),
        beds: field(raw, "beds"),
        person_capacity: field(raw, "person_capacity"),
        picture_count: field(raw, "picture_count"),
        property_type: field(raw, "property_type"),
        room_type: field(raw, "room_type"),
        room_type_category: field(raw, "room_type_category"),
        reviews_count: field(raw, "reviews_count"),
        calendar: None,
    })
}

fn field(raw: &Value, name: &str) -> Option<Value> {
    raw.get(name).filter(|value| !value.is_null()).cloned()
}
