use crate::CalendarError;

const GERESH: char = '׳';
const GERSHAYIM: char = '״';

fn letter(value: u32) -> char {
    match value {
        1 => 'א',
        2 => 'ב',
        3 => 'ג',
        4 => 'ד',
        5 => 'ה',
        6 => 'ו',
        7 => 'ז',
        8 => 'ח',
        9 => 'ט',
        10 => 'י',
        20 => 'כ',
        30 => 'ל',
        40 => 'מ',
        50 => 'נ',
        60 => 'ס',
        70 => 'ע',
        80 => 'פ',
        90 => 'צ',
        100 => 'ק',
        200 => 'ר',
        300 => 'ש',
        _ => 'ת',
    }
}

/// Splits `n` (< 1000 or a thousands count) into letter values, largest first.
/// 15 and 16 become 9+6 and 9+7 so they never spell a divine name.
fn letter_values(mut n: u32) -> Vec<u32> {
    let mut values = Vec::new();
    while n > 0 {
        match n {
            15 => {
                values.extend([9, 6]);
                break;
            }
            16 => {
                values.extend([9, 7]);
                break;
            }
            _ if n >= 400 => {
                values.push(400);
                n -= 400;
            }
            100..=399 => {
                values.push(n / 100 * 100);
                n %= 100;
            }
            10..=99 => {
                values.push(n / 10 * 10);
                n %= 10;
            }
            _ => {
                values.push(n);
                n = 0;
            }
        }
    }
    values
}

/// Renders a positive number as Hebrew numerals. Thousands are written with a
/// trailing geresh, except that 5000 is implied for years of the current millennium.
pub fn gematriya(n: i64) -> Result<String, CalendarError> {
    if n <= 0 || n > i64::from(u32::MAX) {
        return Err(CalendarError::InvalidNumeral(n));
    }
    let n = n as u32;

    let mut rendered = String::new();
    let thousands = n / 1000;
    if thousands > 0 && thousands != 5 {
        for value in letter_values(thousands) {
            rendered.push(letter(value));
        }
        rendered.push(GERESH);
    }

    let values = letter_values(n % 1000);
    match values.as_slice() {
        [] => {}
        [single] => {
            rendered.push(letter(*single));
            rendered.push(GERESH);
        }
        [init @ .., last] => {
            rendered.extend(init.iter().map(|value| letter(*value)));
            rendered.push(GERSHAYIM);
            rendered.push(letter(*last));
        }
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_letters_take_geresh() {
        assert_eq!(gematriya(1).expect("1"), "א׳");
        assert_eq!(gematriya(30).expect("30"), "ל׳");
    }

    #[test]
    fn fifteen_and_sixteen_avoid_divine_name() {
        assert_eq!(gematriya(15).expect("15"), "ט״ו");
        assert_eq!(gematriya(16).expect("16"), "ט״ז");
    }

    #[test]
    fn current_millennium_years_drop_thousands() {
        assert_eq!(gematriya(5786).expect("5786"), "תשפ״ו");
        assert_eq!(gematriya(5760).expect("5760"), "תש״ס");
    }

    #[test]
    fn other_millennia_keep_thousands_with_geresh() {
        assert_eq!(gematriya(3761).expect("3761"), "ג׳תשס״א");
    }

    #[test]
    fn zero_is_not_a_numeral() {
        assert!(matches!(gematriya(0), Err(CalendarError::InvalidNumeral(0))));
    }
}
