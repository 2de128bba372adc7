use calendar::{convert, HebrewCalendar, HebrewDate, HebrewMonth};
use chrono::NaiveDate;
use shared::domain::HebrewDateFormat;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[test]
fn well_known_dates_convert_to_expected_hebrew_days() {
    let cases = [
        (date(2023, 9, 25), 5784, HebrewMonth::Tishrei, 10),
        (date(2022, 12, 19), 5783, HebrewMonth::Kislev, 25),
        (date(2021, 9, 7), 5782, HebrewMonth::Tishrei, 1),
        (date(1948, 5, 14), 5708, HebrewMonth::Iyyar, 5),
        (date(2000, 1, 1), 5760, HebrewMonth::Tevet, 23),
        (date(2030, 3, 19), 5790, HebrewMonth::AdarII, 14),
        (date(2026, 2, 28), 5786, HebrewMonth::AdarI, 11),
    ];

    for (gregorian, year, month, day) in cases {
        let hebrew = HebrewDate::from_gregorian(gregorian).expect("convert");
        assert_eq!(
            (hebrew.year, hebrew.month, hebrew.day),
            (year, month, day),
            "converting {gregorian}"
        );
    }
}

#[test]
fn non_leap_adar_has_no_suffix() {
    assert_eq!(
        convert(&HebrewCalendar, date(2026, 2, 28), HebrewDateFormat::Full),
        "י״א אדר תשפ״ו"
    );
}

#[test]
fn consecutive_gregorian_days_advance_one_hebrew_day() {
    let start = date(2024, 1, 1);
    let mut previous = HebrewDate::from_gregorian(start).expect("convert");
    for offset in 1..800u64 {
        let next = HebrewDate::from_gregorian(start + chrono::Days::new(offset)).expect("convert");
        assert_eq!(next.to_rata_die(), previous.to_rata_die() + 1);
        if next.day != 1 {
            assert_eq!(next.day, previous.day + 1);
            assert_eq!(next.month, previous.month);
        }
        previous = next;
    }
}
