use chrono::{Days, NaiveDate};

/// Trailing period during which a past play disqualifies rejoining.
///
/// A play on `d` is recent iff `today - days < d <= today`: a record exactly
/// `days` old has expired, one `days - 1` old has not.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use lineup::VarietyWindow;
///
/// let today = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
/// let window = VarietyWindow::days(7);
/// assert!(!window.is_recent(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), today));
/// assert!(window.is_recent(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), today));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VarietyWindow {
    days: u32,
}

impl VarietyWindow {
    pub const fn days(days: u32) -> Self {
        Self { days }
    }

    pub fn len_days(&self) -> u32 {
        self.days
    }

    /// Latest date that counts as expired.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn is_recent(&self, played_on: NaiveDate, today: NaiveDate) -> bool {
        played_on > self.cutoff(today) && played_on <= today
    }
}

impl Default for VarietyWindow {
    fn default() -> Self {
        Self::days(7)
    }
}
