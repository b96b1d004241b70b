use crate::CalendarError;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Opaque listing identifier, the deduplication key of a crawl
///
/// The search API has served both numeric and string ids; the original JSON
/// type is kept so the dataset round-trips what upstream sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ListingId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u64> for ListingId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

/// One rental unit as harvested from the search API
///
/// Every direct field is optional: `None` means the search payload did not
/// carry it (or sent `null`), which is not the same as zero. Present values
/// are kept exactly as upstream sent them, whatever their JSON type.
/// `calendar` stays `None` until the coordinator attaches the scraped
/// availability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub price: Option<Value>,
    pub lat: Option<Value>,
    pub lng: Option<Value>,
    pub instant_bookable: Option<Value>,
    pub has_simplified_booking: Option<Value>,
    pub bedrooms: Option<Value>,
    pub beds: Option<Value>,
    pub person_capacity: Option<Value>,
    pub picture_count: Option<Value>,
    pub property_type: Option<Value>,
    pub room_type: Option<Value>,
    pub room_type_category: Option<Value>,
    pub reviews_count: Option<Value>,
    pub calendar: Option<Calendar>,
}

impl Listing {
    /// Creates a listing with only an identifier
    pub fn new(id: impl Into<ListingId>) -> Self {
        Self {
            id: id.into(),
            price: None,
            lat: None,
            lng: None,
            instant_bookable: None,
            has_simplified_booking: None,
            bedrooms: None,
            beds: None,
            person_capacity: None,
            picture_count: None,
            property_type: None,
            room_type: None,
            room_type_category: None,
            reviews_count: None,
            calendar: None,
        }
    }

    /// Returns the listing with its availability calendar attached
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = Some(calendar);
        self
    }
}

/// A calendar day as requested from the widget, not as inferred from the page
///
/// Ordered by year, then month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(month: u32, day: u32, year: i32) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-listing availability: date -> bookable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Calendar {
    days: BTreeMap<CalendarDate, bool>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one day, refusing to overwrite an existing entry
    pub fn insert(&mut self, date: CalendarDate, available: bool) -> Result<(), CalendarError> {
        match self.days.entry(date) {
            btree_map::Entry::Occupied(_) => Err(CalendarError::DuplicateDate {
                date: date.to_string(),
            }),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(available);
                Ok(())
            }
        }
    }

    /// Records one day, replacing any earlier value for the same date
    ///
    /// Returns the replaced value, if there was one.
    pub fn set(&mut self, date: CalendarDate, available: bool) -> Option<bool> {
        self.days.insert(date, available)
    }

    /// Folds another month's pass into this calendar
    ///
    /// Fails on the first date both calendars contain.
    pub fn merge(&mut self, other: Calendar) -> Result<(), CalendarError> {
        for (date, available) in other.days {
            self.insert(date, available)?;
        }
        Ok(())
    }

    pub fn get(&self, date: &CalendarDate) -> Option<bool> {
        self.days.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of days marked available
    pub fn available_days(&self) -> usize {
        self.days.values().filter(|available| **available).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CalendarDate, &bool)> {
        self.days.iter()
    }
}
