//! Range selection for the quick-select buttons and the date pickers.
//!
//! "Today" comes from a [`Clock`]. [`SystemClock`] reads the host's local
//! calendar date, so a selection made near midnight, or on hosts in
//! different timezones, can differ by a day.

use time::{Date, Duration, OffsetDateTime};

use crate::{format_iso_date, DateRange, Period, ValidationError};

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Host-local calendar date, falling back to UTC when the local offset is
/// unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

/// Range ending `today` and starting `days` calendar days earlier.
pub fn select_period(days: u32, today: Date) -> Result<DateRange, ValidationError> {
    if days == 0 {
        return Err(ValidationError::NonPositivePeriod);
    }

    let start = today
        .checked_sub(Duration::days(i64::from(days)))
        .ok_or_else(|| ValidationError::DateOutOfRange {
            days,
            from: format_iso_date(today),
        })?;

    Ok(DateRange::new(start, today))
}

/// Holds the range currently shown on a page.
#[derive(Debug, Clone)]
pub struct RangeSelector<C = SystemClock> {
    clock: C,
    current: DateRange,
}

impl<C: Clock> RangeSelector<C> {
    /// Start with `initial` selected relative to the clock's today.
    pub fn new(clock: C, initial: Period) -> Result<Self, ValidationError> {
        let current = select_period(initial.days(), clock.today())?;
        Ok(Self { clock, current })
    }

    pub fn current(&self) -> DateRange {
        self.current
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    pub fn select_period(&mut self, days: u32) -> Result<DateRange, ValidationError> {
        self.current = select_period(days, self.clock.today())?;
        Ok(self.current)
    }

    pub fn select(&mut self, period: Period) -> Result<DateRange, ValidationError> {
        self.select_period(period.days())
    }

    /// Date picker edit. The end date is left alone even if it now precedes
    /// the start.
    pub fn set_start(&mut self, start: Date) -> DateRange {
        self.current.start = start;
        self.current
    }

    pub fn set_end(&mut self, end: Date) -> DateRange {
        self.current.end = end;
        self.current
    }

    pub fn set_range(&mut self, range: DateRange) -> DateRange {
        self.current = range;
        self.current
    }
}
