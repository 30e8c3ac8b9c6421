//! Public holiday calendars used as regressors by the trend model.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Countries with a built-in holiday calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Poland,
}

/// A named public holiday on a concrete date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    pub name: &'static str,
    pub date: NaiveDate,
}

impl Country {
    /// All public holidays of `year`, in calendar order.
    pub fn holidays(self, year: i32) -> Vec<Holiday> {
        match self {
            Country::Poland => poland(year),
        }
    }

    /// Name of the holiday falling on `date`, if any.
    pub fn holiday_on(self, date: NaiveDate) -> Option<&'static str> {
        self.holidays(date.year())
            .into_iter()
            .find(|h| h.date == date)
            .map(|h| h.name)
    }
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn poland(year: i32) -> Vec<Holiday> {
    let fixed: &[(&'static str, u32, u32)] = &[
        ("Nowy Rok", 1, 1),
        ("Święto Trzech Króli", 1, 6),
        ("Święto Pracy", 5, 1),
        ("Święto Konstytucji 3 Maja", 5, 3),
        ("Wniebowzięcie Najświętszej Maryi Panny", 8, 15),
        ("Wszystkich Świętych", 11, 1),
        ("Narodowe Święto Niepodległości", 11, 11),
        ("Wigilia Bożego Narodzenia", 12, 24),
        ("Boże Narodzenie (pierwszy dzień)", 12, 25),
        ("Boże Narodzenie (drugi dzień)", 12, 26),
    ];

    let mut out: Vec<Holiday> = fixed
        .iter()
        .filter(|(name, _, _)| match *name {
            "Święto Trzech Króli" => year >= 2011,
            "Wigilia Bożego Narodzenia" => year >= 2025,
            _ => true,
        })
        .filter_map(|&(name, month, day)| {
            NaiveDate::from_ymd_opt(year, month, day).map(|date| Holiday { name, date })
        })
        .collect();

    if let Some(easter) = easter_sunday(year) {
        let movable: [(&'static str, u64); 4] = [
            ("Niedziela Wielkanocna", 0),
            ("Poniedziałek Wielkanocny", 1),
            ("Zielone Świątki", 49),
            ("Dzień Bożego Ciała", 60),
        ];
        for (name, offset) in movable {
            if let Some(date) = easter.checked_add_days(Days::new(offset)) {
                out.push(Holiday { name, date });
            }
        }
    }

    out.sort_by_key(|h| h.date);
    out
}
