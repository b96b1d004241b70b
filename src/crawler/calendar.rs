//! Calendar widget parser
//!
//! The availability widget renders a table whose cells each hold one `<span>`
//! with a day number. The requested month is padded with trailing days of the
//! previous month and leading days of the next one, so day numbers repeat.
//!
//! Month boundaries are found with a two-state machine keyed on day `1`, not
//! with date arithmetic: the first `1` enters the requested month, the next
//! `1` leaves it. Only cells seen inside the month are recorded; a later `1`
//! re-enters it and later cells overwrite earlier ones. Any cell that does
//! not fit the expected shape aborts the parse.

use crate::listing::{Calendar, CalendarDate};
use crate::CalendarError;
use scraper::{ElementRef, Html, Selector};

/// Class token of a bookable day
const AVAILABLE: &str = "available";

/// Class token of a blocked day
const UNAVAILABLE: &str = "unavailable";

/// Whether the scan is currently inside the requested month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthTracking {
    OutsideMonth,
    InsideMonth,
}

impl MonthTracking {
    /// Flips between the two states; called on every day `1`
    pub fn toggle(self) -> Self {
        match self {
            Self::OutsideMonth => Self::InsideMonth,
            Self::InsideMonth => Self::OutsideMonth,
        }
    }

    pub fn is_inside(self) -> bool {
        self == Self::InsideMonth
    }
}

struct CellSelectors {
    cell: Selector,
    day: Selector,
}

impl CellSelectors {
    fn new() -> Self {
        Self {
            cell: Selector::parse("td").expect("cell selector"),
            day: Selector::parse("span").expect("day selector"),
        }
    }
}

/// Parses one widget page into the availability of the requested month
///
/// `month` and `year` are the values the page was requested for; they are
/// used verbatim as the date keys.
///
/// # Errors
///
/// * `CellSpanCount` - a cell without exactly one `<span>`
/// * `DayNotNumeric` / `DayOutOfRange` - a day outside `1..=31`
/// * `AmbiguousAvailability` - an in-month cell tagged neither or both ways
///
/// # Example
///
/// ```
/// use rental_harvest::crawler::parse_calendar;
/// use rental_harvest::CalendarDate;
///
/// let html = r#"<table><tr>
///     <td class="available"><span>31</span></td>
///     <td class="available"><span>1</span></td>
///     <td class="unavailable"><span>2</span></td>
/// </tr></table>"#;
/// let calendar = parse_calendar(html, 4, 2014).unwrap();
/// assert_eq!(calendar.len(), 2);
/// assert_eq!(calendar.get(&CalendarDate::new(4, 2, 2014)), Some(false));
/// ```
pub fn parse_calendar(html: &str, month: u32, year: i32) -> Result<Calendar, CalendarError> {
    let document = Html::parse_document(html);
    let selectors = CellSelectors::new();

    let mut calendar = Calendar::new();
    let mut tracking = MonthTracking::OutsideMonth;

    for (index, cell) in document.select(&selectors.cell).enumerate() {
        let day = cell_day(index, cell, &selectors.day)?;

        if day == 1 {
            tracking = tracking.toggle();
        }

        if !tracking.is_inside() {
            tracing::trace!("cell {}: day {} outside month {}", index, day, month);
            continue;
        }

        let available = cell_availability(index, day, cell)?;
        tracing::trace!("cell {}: {}/{}/{} available={}", index, month, day, year, available);
        if let Some(previous) = calendar.set(CalendarDate::new(month, day, year), available) {
            tracing::trace!("cell {}: replaces earlier value {}", index, previous);
        }
    }

    Ok(calendar)
}

/// Reads the day number held by a cell's single `<span>`
fn cell_day(index: usize, cell: ElementRef<'_>, day_selector: &Selector) -> Result<u32, CalendarError> {
    let spans: Vec<ElementRef<'_>> = cell.select(day_selector).collect();
    if spans.len() != 1 {
        return Err(CalendarError::CellSpanCount {
            cell: index,
            found: spans.len(),
            html: cell.html(),
        });
    }

    let text = spans[0].text().collect::<String>();
    let text = text.trim();
    let day: u32 = text.parse().map_err(|_| CalendarError::DayNotNumeric {
        cell: index,
        text: text.to_string(),
    })?;

    if !(1..=31).contains(&day) {
        return Err(CalendarError::DayOutOfRange { cell: index, day });
    }

    Ok(day)
}

/// Reads availability from the cell's class tokens
fn cell_availability(index: usize, day: u32, cell: ElementRef<'_>) -> Result<bool, CalendarError> {
    let classes: Vec<&str> = cell.value().classes().collect();
    let available = classes.contains(&AVAILABLE);
    let unavailable = classes.contains(&UNAVAILABLE);

    match (available, unavailable) {
        (true, false) => Ok(true),
        (false, true) => Ok(false),
        _ => Err(CalendarError::AmbiguousAvailability {
            cell: index,
            day,
            classes: classes.join(" "),
        }),
    }
}
