//! Date classification for history profiles.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};

use vl_core::LocalClock;

use crate::ForecastResult;

/// Partition key for history profiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateType {
    Weekday,
    Weekend,
    Holiday,
}

impl DateType {
    pub fn as_str(self) -> &'static str {
        match self {
            DateType::Weekday => "weekday",
            DateType::Weekend => "weekend",
            DateType::Holiday => "holiday",
        }
    }
}

impl fmt::Display for DateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Saturday and Sunday are weekends, everything else a weekday, unless an
/// explicit override says otherwise.
#[derive(Clone, Debug, Default)]
pub struct DateCalendar {
    overrides: BTreeMap<NaiveDate, DateType>,
}

impl DateCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, date: NaiveDate, date_type: DateType) -> Self {
        self.overrides.insert(date, date_type);
        self
    }

    pub fn holiday(self, date: NaiveDate) -> Self {
        self.with_override(date, DateType::Holiday)
    }

    pub fn classify(&self, date: NaiveDate) -> DateType {
        if let Some(&t) = self.overrides.get(&date) {
            return t;
        }
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DateType::Weekend,
            _ => DateType::Weekday,
        }
    }

    /// Classify the local date of a telemetry timestamp.
    pub fn date_type_at(&self, clock: &LocalClock, unix_secs: i64) -> ForecastResult<DateType> {
        Ok(self.classify(clock.local_date(unix_secs)?))
    }
}
