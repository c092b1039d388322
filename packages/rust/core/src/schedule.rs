//! Run modes and date-range computation.

use chrono::{Days, NaiveDate};

use arxivcode_shared::ArxivCodeError;

// ---------------------------------------------------------------------------
// RunMode
// ---------------------------------------------------------------------------

/// Operating mode, selected once at startup and fixed for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Establish the store from scratch over the backfill window.
    Backfill,
    /// Fetch yesterday and merge it into the existing store.
    Daily,
}

impl RunMode {
    /// The external setting value naming this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backfill => "first_run",
            Self::Daily => "daily_run",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RunMode {
    type Err = ArxivCodeError;

    /// Anything other than the two recognized values is a fatal config
    /// error; the caller must exit before touching the store or digest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_run" => Ok(Self::Backfill),
            "daily_run" => Ok(Self::Daily),
            other => Err(ArxivCodeError::config(format!(
                "unknown run mode '{other}': expected 'first_run' or 'daily_run'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Date ranges
// ---------------------------------------------------------------------------

/// The last `days` calendar dates ending at `today`, newest first.
pub fn backfill_dates(today: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (0..days)
        .filter_map(|i| today.checked_sub_days(Days::new(i as u64)))
        .collect()
}

/// The single date an incremental run covers.
pub fn yesterday(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn recognized_modes_parse() {
        assert_eq!(RunMode::from_str("first_run").unwrap(), RunMode::Backfill);
        assert_eq!(RunMode::from_str("daily_run").unwrap(), RunMode::Daily);
    }

    #[test]
    fn unknown_mode_is_a_config_error() {
        let err = RunMode::from_str("weekly_run").unwrap_err();
        assert!(err.to_string().contains("unknown run mode 'weekly_run'"));
    }

    #[test]
    fn mode_round_trips_through_display() {
        for mode in [RunMode::Backfill, RunMode::Daily] {
            assert_eq!(RunMode::from_str(&mode.to_string()).unwrap(), mode);
        }
    }

    #[test]
    fn backfill_dates_are_newest_first_and_contiguous() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let dates = backfill_dates(today, 4);

        assert_eq!(dates.len(), 4);
        assert_eq!(dates[0], today);
        assert_eq!(dates[1].to_string(), "2026-03-01");
        assert_eq!(dates[2].to_string(), "2026-02-28");
        assert_eq!(dates[3].to_string(), "2026-02-27");
    }

    #[test]
    fn backfill_window_spans_a_full_year() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let dates = backfill_dates(today, 365);
        assert_eq!(dates.len(), 365);
        assert_eq!(dates.last().unwrap().to_string(), "2025-08-30");
    }

    #[test]
    fn yesterday_crosses_month_boundaries() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert_eq!(yesterday(today).to_string(), "2026-07-31");
    }
}
