//! Brazilian national business-day calendar.
//!
//! A date is a business day when it falls Monday to Friday and is not listed as a national
//! holiday. The list ships with the crate (ANBIMA national holidays, 2001 to 2040) and can
//! be replaced by any CSV file with the same layout.

use crate::error::{Error, Result};
use jiff::civil::{Date, Weekday};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const BUNDLED_HOLIDAYS: &str = include_str!("../data/feriados_nacionais.csv");

/// Date format of the first column of the holiday list
const HOLIDAY_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    holidays: BTreeMap<Date, Vec<String>>,
}

impl HolidayCalendar {
    /// Holiday list compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_reader(BUNDLED_HOLIDAYS.as_bytes())
    }

    /// Read a holiday list from disk. Each call builds a new calendar.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::DataLoad(format!("cannot open {}: {e}", path.display())))?;
        let calendar = Self::from_reader(file)?;
        debug!(
            "loaded {} holidays from {}",
            calendar.holidays.len(),
            path.display()
        );
        Ok(calendar)
    }

    /// Parse `date (MM/DD/YYYY), weekday, name` rows. The first row is a header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut holidays: BTreeMap<Date, Vec<String>> = BTreeMap::new();
        for result in reader.records() {
            let record = result.map_err(|e| Error::DataLoad(e.to_string()))?;
            let line = record.position().map_or(0, |pos| pos.line());

            let (Some(date), Some(name)) = (record.get(0), record.get(2)) else {
                return Err(Error::DataLoad(format!(
                    "line {line}: expected 3 columns, found {}",
                    record.len()
                )));
            };
            let date = Date::strptime(HOLIDAY_DATE_FORMAT, date.trim()).map_err(|e| {
                Error::DataLoad(format!("line {line}: invalid date {date:?}: {e}"))
            })?;

            holidays
                .entry(date)
                .or_default()
                .push(name.trim().to_string());
        }

        Ok(Self { holidays })
    }

    pub fn is_business_day(&self, date: Date) -> bool {
        self.is_weekday(date) && !self.is_holiday(date)
    }

    pub fn is_weekday(&self, date: Date) -> bool {
        !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }

    pub fn is_holiday(&self, date: Date) -> bool {
        self.holidays.contains_key(&date)
    }

    /// Names of the holidays on `date`, empty when there are none
    pub fn holidays_on(&self, date: Date) -> &[String] {
        self.holidays
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Latest business day before `date`, or at `date` when `include_itself` is set.
    ///
    /// Walks back one day at a time. The holiday list is finite, so this always ends for
    /// any calendar built from real data. Returns `None` only if the walk would step past
    /// `Date::MIN`.
    pub fn previous_business_day(&self, date: Date, include_itself: bool) -> Option<Date> {
        let mut day = if include_itself {
            Some(date)
        } else {
            date.yesterday().ok()
        };
        while let Some(current) = day {
            if self.is_business_day(current) {
                return Some(current);
            }
            day = current.yesterday().ok();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}
