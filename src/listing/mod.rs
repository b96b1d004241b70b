//! Listing records and their availability calendars
//!
//! - `Listing`: one rental unit with the allow-listed search fields
//! - `Calendar`: date -> availability map attached once per listing
//! - `normalize`: raw search JSON -> `Listing`

mod normalize;
mod types;

pub use normalize::{listing_id, normalize, LISTING_FIELDS};
pub use types::{Calendar, CalendarDate, Listing, ListingId};
