use bdays::calendars::us::USSettlement;
use bdays::HolidayCalendar as _;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashSet;
use tracing::info;

use crate::error::PipelineError;

/// Upper bound on how many business days the holiday walk-back may step over.
pub const MAX_HOLIDAY_WALK: usize = 10;

/// Source of holiday dates for the market calendar.
pub trait HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// U.S. federal holidays, observed-date rules included.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsFederalHolidays;

impl HolidayCalendar for UsFederalHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        USSettlement.is_holiday(date)
    }
}

impl HolidayCalendar for HashSet<NaiveDate> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}

/// How the calendar sees a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    BusinessDay,
    Weekend,
    Holiday,
}

/// The two dates every fetch in a run is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDates {
    pub today: NaiveDate,
    pub last_business_day: NaiveDate,
}

/// Market calendar utilities for handling weekends and holidays
#[derive(Debug, Clone, Default)]
pub struct MarketCalendar<C = UsFederalHolidays> {
    holidays: C,
}

impl MarketCalendar<UsFederalHolidays> {
    pub fn us_federal() -> Self {
        Self::new(UsFederalHolidays)
    }
}

impl<C: HolidayCalendar> MarketCalendar<C> {
    pub fn new(holidays: C) -> Self {
        Self { holidays }
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.is_holiday(date)
    }

    pub fn classify(&self, date: NaiveDate) -> DayKind {
        if self.is_holiday(date) {
            DayKind::Holiday
        } else if Self::is_weekend(date) {
            DayKind::Weekend
        } else {
            DayKind::BusinessDay
        }
    }

    /// The weekday immediately before `date` (Monday steps back to Friday).
    /// Holidays are not considered here.
    pub fn previous_weekday(date: NaiveDate) -> NaiveDate {
        let mut current = date - Duration::days(1);
        while Self::is_weekend(current) {
            current = current - Duration::days(1);
        }
        current
    }

    /// Walk `last_day` back one business day at a time until it is not a holiday.
    ///
    /// Returns the input unchanged when it is already a non-holiday.
    pub fn find_true_last_day(&self, last_day: NaiveDate) -> Result<NaiveDate, PipelineError> {
        let mut candidate = last_day;
        for _ in 0..=MAX_HOLIDAY_WALK {
            if !self.is_holiday(candidate) {
                return Ok(candidate);
            }
            candidate = Self::previous_weekday(candidate);
        }

        Err(PipelineError::HolidayWalkExhausted {
            date: candidate,
            start: last_day,
            limit: MAX_HOLIDAY_WALK,
        })
    }

    /// Validate `today` and compute the last business day to fetch prices for.
    ///
    /// Holidays and weekends end the run before any other date is computed.
    pub fn resolve(&self, today: NaiveDate) -> Result<RunDates, PipelineError> {
        match self.classify(today) {
            DayKind::Holiday => return Err(PipelineError::Holiday { date: today }),
            DayKind::Weekend => return Err(PipelineError::Weekend { date: today }),
            DayKind::BusinessDay => {}
        }

        let naive_last_day = Self::previous_weekday(today);
        let last_business_day = self.find_true_last_day(naive_last_day)?;
        if last_business_day != naive_last_day {
            info!("{}: Changed last_day to {}.", today, last_business_day);
        }

        Ok(RunDates {
            today,
            last_business_day,
        })
    }
}

/// Parse the leading `YYYY-MM-DD` of an API date field.
///
/// The technical indicator endpoint appends a time of day; other endpoints do not.
pub fn parse_api_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// `MM/DD/YY`, the date format stored in every table.
pub fn format_table_date(date: NaiveDate) -> String {
    date.format("%m/%d/%y").to_string()
}
