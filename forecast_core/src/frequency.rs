//! Sampling frequency of a series and calendar stepping.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Native spacing of observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Infer the frequency from the median gap between consecutive dates.
    ///
    /// Business-day series (weekend gaps) still come out as daily.
    pub fn infer(dates: &[NaiveDate]) -> Option<Frequency> {
        let mut gaps: Vec<i64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .filter(|d| *d > 0)
            .collect();
        if gaps.is_empty() {
            return None;
        }
        gaps.sort_unstable();
        let median = gaps[gaps.len() / 2];

        Some(match median {
            0..=3 => Frequency::Daily,
            4..=10 => Frequency::Weekly,
            11..=45 => Frequency::Monthly,
            46..=135 => Frequency::Quarterly,
            _ => Frequency::Yearly,
        })
    }

    /// The date `n` periods after `base`.
    ///
    /// Month-based frequencies step from `base` directly, so end-of-month
    /// clamping does not accumulate.
    pub fn step(self, base: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => base.checked_add_days(Days::new(u64::from(n))),
            Frequency::Weekly => base.checked_add_days(Days::new(7 * u64::from(n))),
            Frequency::Monthly => base.checked_add_months(Months::new(n)),
            Frequency::Quarterly => base.checked_add_months(Months::new(3 * n)),
            Frequency::Yearly => base.checked_add_months(Months::new(12 * n)),
        }
    }

    /// Dates strictly after `last`, one per period, up to and including `until`.
    pub fn dates_until(self, last: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let mut n = 1;
        while let Some(date) = self.step(last, n) {
            if date > until {
                break;
            }
            out.push(date);
            n += 1;
        }
        out
    }

    /// The next `periods` dates after `last`.
    pub fn dates_after(self, last: NaiveDate, periods: usize) -> Vec<NaiveDate> {
        (1..=periods as u32)
            .map_while(|n| self.step(last, n))
            .collect()
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn infers_business_daily() {
        let dates = [d(2023, 1, 5), d(2023, 1, 6), d(2023, 1, 9), d(2023, 1, 10), d(2023, 1, 11)];
        assert_eq!(Frequency::infer(&dates), Some(Frequency::Daily));
    }

    #[test]
    fn infers_quarterly() {
        let dates = [d(2022, 1, 1), d(2022, 4, 1), d(2022, 7, 1), d(2022, 10, 1)];
        assert_eq!(Frequency::infer(&dates), Some(Frequency::Quarterly));
    }

    #[test]
    fn single_date_has_no_frequency() {
        assert_eq!(Frequency::infer(&[d(2022, 1, 1)]), None);
    }

    #[test]
    fn monthly_step_does_not_drift() {
        let base = d(2023, 1, 31);
        assert_eq!(Frequency::Monthly.step(base, 1), Some(d(2023, 2, 28)));
        assert_eq!(Frequency::Monthly.step(base, 2), Some(d(2023, 3, 31)));
    }

    #[test]
    fn dates_until_is_inclusive() {
        let dates = Frequency::Quarterly.dates_until(d(2023, 1, 1), d(2024, 1, 1));
        assert_eq!(dates, vec![d(2023, 4, 1), d(2023, 7, 1), d(2023, 10, 1), d(2024, 1, 1)]);
    }

    #[test]
    fn dates_after_counts_periods() {
        let dates = Frequency::Daily.dates_after(d(2023, 12, 30), 3);
        assert_eq!(dates, vec![d(2023, 12, 31), d(2024, 1, 1), d(2024, 1, 2)]);
    }
}
