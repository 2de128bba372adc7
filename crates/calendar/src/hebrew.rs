//! Hebrew calendar arithmetic on rata die day numbers (R.D. 1 = 0001-01-01 proleptic Gregorian).

use chrono::{Datelike, NaiveDate};

use crate::CalendarError;

/// R.D. of the day before 1 Tishrei AM 1.
const EPOCH: i64 = -1_373_428;
const AVG_YEAR_DAYS: f64 = 365.246_822_205_977_94;

const PARTS_PER_HOUR: i64 = 1080;
const MONTHS_PER_CYCLE: i64 = 235;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HebrewMonth {
    Nisan = 1,
    Iyyar = 2,
    Sivan = 3,
    Tamuz = 4,
    Av = 5,
    Elul = 6,
    Tishrei = 7,
    Cheshvan = 8,
    Kislev = 9,
    Tevet = 10,
    Shvat = 11,
    AdarI = 12,
    AdarII = 13,
}

impl HebrewMonth {
    pub fn from_number(month: u32) -> Option<Self> {
        let month = match month {
            1 => HebrewMonth::Nisan,
            2 => HebrewMonth::Iyyar,
            3 => HebrewMonth::Sivan,
            4 => HebrewMonth::Tamuz,
            5 => HebrewMonth::Av,
            6 => HebrewMonth::Elul,
            7 => HebrewMonth::Tishrei,
            8 => HebrewMonth::Cheshvan,
            9 => HebrewMonth::Kislev,
            10 => HebrewMonth::Tevet,
            11 => HebrewMonth::Shvat,
            12 => HebrewMonth::AdarI,
            13 => HebrewMonth::AdarII,
            _ => return None,
        };
        Some(month)
    }

    pub fn number(self) -> u32 {
        self as u32
    }

    /// Month name in Hebrew script, without vowel points.
    pub fn hebrew_name(self, leap_year: bool) -> &'static str {
        match self {
            HebrewMonth::Nisan => "ניסן",
            HebrewMonth::Iyyar => "אייר",
            HebrewMonth::Sivan => "סיון",
            HebrewMonth::Tamuz => "תמוז",
            HebrewMonth::Av => "אב",
            HebrewMonth::Elul => "אלול",
            HebrewMonth::Tishrei => "תשרי",
            HebrewMonth::Cheshvan => "חשון",
            HebrewMonth::Kislev => "כסלו",
            HebrewMonth::Tevet => "טבת",
            HebrewMonth::Shvat => "שבט",
            HebrewMonth::AdarI if leap_year => "אדר א׳",
            HebrewMonth::AdarI => "אדר",
            HebrewMonth::AdarII => "אדר ב׳",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HebrewDate {
    pub year: i64,
    pub month: HebrewMonth,
    pub day: u32,
}

impl HebrewDate {
    pub fn from_gregorian(date: NaiveDate) -> Result<Self, CalendarError> {
        from_rata_die(i64::from(date.num_days_from_ce()))
    }

    pub fn is_leap_year(&self) -> bool {
        is_leap_year(self.year)
    }

    pub fn to_rata_die(&self) -> i64 {
        to_rata_die(self.year, self.month.number(), self.day)
    }
}

pub fn is_leap_year(year: i64) -> bool {
    (1 + year * 7).rem_euclid(19) < 7
}

pub fn months_in_year(year: i64) -> u32 {
    if is_leap_year(year) {
        13
    } else {
        12
    }
}

/// Days from the epoch to 1 Tishrei of `year`, after the postponement rules.
pub fn elapsed_days(year: i64) -> i64 {
    let prev_year = year - 1;
    let cycle_year = prev_year.rem_euclid(19);
    let months_elapsed = MONTHS_PER_CYCLE * prev_year.div_euclid(19)
        + 12 * cycle_year
        + (cycle_year * 7 + 1).div_euclid(19);
    let parts_elapsed = 204 + 793 * months_elapsed.rem_euclid(PARTS_PER_HOUR);
    let hours_elapsed = 5
        + 12 * months_elapsed
        + 793 * months_elapsed.div_euclid(PARTS_PER_HOUR)
        + parts_elapsed.div_euclid(PARTS_PER_HOUR);
    let parts =
        parts_elapsed.rem_euclid(PARTS_PER_HOUR) + PARTS_PER_HOUR * hours_elapsed.rem_euclid(24);
    let day = 1 + 29 * months_elapsed + hours_elapsed.div_euclid(24);

    let mut alt_day = day;
    if parts >= 19_440
        || (day.rem_euclid(7) == 2 && parts >= 9_924 && !is_leap_year(year))
        || (day.rem_euclid(7) == 1 && parts >= 16_789 && is_leap_year(prev_year))
    {
        alt_day += 1;
    }
    if matches!(alt_day.rem_euclid(7), 0 | 3 | 5) {
        alt_day += 1;
    }
    alt_day
}

pub fn days_in_year(year: i64) -> i64 {
    elapsed_days(year + 1) - elapsed_days(year)
}

fn long_cheshvan(year: i64) -> bool {
    days_in_year(year) % 10 == 5
}

fn short_kislev(year: i64) -> bool {
    days_in_year(year) % 10 == 3
}

pub fn days_in_month(month: u32, year: i64) -> u32 {
    match HebrewMonth::from_number(month) {
        Some(
            HebrewMonth::Iyyar
            | HebrewMonth::Tamuz
            | HebrewMonth::Elul
            | HebrewMonth::Tevet
            | HebrewMonth::AdarII,
        ) => 29,
        Some(HebrewMonth::AdarI) if !is_leap_year(year) => 29,
        Some(HebrewMonth::Cheshvan) if !long_cheshvan(year) => 29,
        Some(HebrewMonth::Kislev) if short_kislev(year) => 29,
        _ => 30,
    }
}

pub fn to_rata_die(year: i64, month: u32, day: u32) -> i64 {
    let tishrei = HebrewMonth::Tishrei.number();
    let mut days = i64::from(day);
    if month < tishrei {
        for m in tishrei..=months_in_year(year) {
            days += i64::from(days_in_month(m, year));
        }
        for m in HebrewMonth::Nisan.number()..month {
            days += i64::from(days_in_month(m, year));
        }
    } else {
        for m in tishrei..month {
            days += i64::from(days_in_month(m, year));
        }
    }
    EPOCH + elapsed_days(year) + days - 1
}

pub fn from_rata_die(rd: i64) -> Result<HebrewDate, CalendarError> {
    if rd <= EPOCH {
        return Err(CalendarError::BeforeEpoch { rata_die: rd });
    }

    let mut year = ((((rd - EPOCH) as f64) / AVG_YEAR_DAYS).floor() as i64).max(1);
    while year > 1 && EPOCH + elapsed_days(year) > rd {
        year -= 1;
    }
    while EPOCH + elapsed_days(year + 1) <= rd {
        year += 1;
    }

    let mut month = if rd < to_rata_die(year, HebrewMonth::Nisan.number(), 1) {
        HebrewMonth::Tishrei.number()
    } else {
        HebrewMonth::Nisan.number()
    };
    while rd > to_rata_die(year, month, days_in_month(month, year)) {
        month += 1;
    }

    let day = 1 + rd - to_rata_die(year, month, 1);
    let month = HebrewMonth::from_number(month).ok_or(CalendarError::MonthOutOfRange(month))?;
    Ok(HebrewDate {
        year,
        month,
        day: day as u32,
    })
}
