//! Persian digits, ordinal day words, and Solar Hijri (Jalali) <-> Gregorian
//! conversion.
//!
//! The conversion uses the breaks-table algorithm shared by the jalaali /
//! date-fns-jalali family of libraries, so leap years agree with them across
//! the supported range (Jalali years -61 to 3177).

use std::fmt::Display;

use chrono::{Datelike, Days, NaiveDate};

use crate::error::OutageError;

/// Jalali month names in calendar order.
pub const JALALI_MONTHS: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

/// Ordinal day words accepted in the table title. 30 and 31 are written both
/// with and without a zero-width non-joiner.
pub const ORDINAL_WORDS: [(&str, u32); 33] = [
    ("اول", 1),
    ("دوم", 2),
    ("سوم", 3),
    ("چهارم", 4),
    ("پنجم", 5),
    ("ششم", 6),
    ("هفتم", 7),
    ("هشتم", 8),
    ("نهم", 9),
    ("دهم", 10),
    ("یازدهم", 11),
    ("دوازدهم", 12),
    ("سیزدهم", 13),
    ("چهاردهم", 14),
    ("پانزدهم", 15),
    ("شانزدهم", 16),
    ("هفدهم", 17),
    ("هجدهم", 18),
    ("نوزدهم", 19),
    ("بیستم", 20),
    ("بیست و یکم", 21),
    ("بیست و دوم", 22),
    ("بیست و سوم", 23),
    ("بیست و چهارم", 24),
    ("بیست و پنجم", 25),
    ("بیست و ششم", 26),
    ("بیست و هفتم", 27),
    ("بیست و هشتم", 28),
    ("بیست و نهم", 29),
    ("سی\u{200c}ام", 30),
    ("سی ام", 30),
    ("سی\u{200c} و یکم", 31),
    ("سی و یکم", 31),
];

const PERSIAN_ZERO: u32 = 0x06F0;

/// Years at which the 33-year leap pattern shifts.
const BREAKS: [i32; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

/// Replaces Persian digits with their ASCII counterparts.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => {
                char::from_digit(c as u32 - PERSIAN_ZERO, 10).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

pub fn word_to_ordinal(word: &str) -> Option<u32> {
    let word = word.trim();
    ORDINAL_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, n)| *n)
}

/// 0-based position of `name` in [`JALALI_MONTHS`].
pub fn month_index(name: &str) -> Option<usize> {
    JALALI_MONTHS.iter().position(|m| *m == name)
}

/// Turns the three date tokens of a table title into a Gregorian date.
///
/// `day_text` may be digits (Persian or ASCII) or an ordinal word; the error
/// for an unusable day quotes `day_text` as written. A day past the end of
/// the month rolls over into the following month (31 Mehr is 1 Aban).
pub fn resolve_date(
    year_text: &str,
    day_text: &str,
    month_name: &str,
) -> Result<NaiveDate, OutageError> {
    let year: i32 = normalize_digits(year_text)
        .trim()
        .parse()
        .map_err(|_| OutageError::InvalidYear(year_text.to_string()))?;
    if year_info(year).is_none() {
        return Err(OutageError::InvalidYear(year_text.to_string()));
    }

    let day = normalize_digits(day_text)
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|d| *d > 0)
        .or_else(|| word_to_ordinal(day_text))
        .ok_or_else(|| OutageError::InvalidDay(day_text.to_string()))?;

    let month = month_index(month_name)
        .ok_or_else(|| OutageError::InvalidMonth(month_name.to_string()))?;

    jalali_to_gregorian(year, month as u32 + 1, 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(day) - 1)))
        .ok_or_else(|| OutageError::InvalidDay(day_text.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JalaliDate {
    pub year: i32,
    /// 1-based.
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// `None` when `month` is outside 1..=12.
    pub fn month_name(&self) -> Option<&'static str> {
        let index = self.month.checked_sub(1)?;
        JALALI_MONTHS.get(index as usize).copied()
    }
}

impl Display for JalaliDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

struct YearInfo {
    /// Gregorian year in which the Jalali year begins.
    gy: i32,
    /// Day of March on which 1 Farvardin falls.
    march: u32,
    /// Years since the last leap year; 0 means this year is leap.
    leap: i32,
}

fn year_info(jy: i32) -> Option<YearInfo> {
    if jy < BREAKS[0] || jy >= BREAKS[BREAKS.len() - 1] {
        return None;
    }

    let gy = jy + 621;
    let mut leap_j = -14;
    let mut jp = BREAKS[0];
    let mut jump = 0;
    for &jm in &BREAKS[1..] {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += jump / 33 * 8 + (jump % 33) / 4;
        jp = jm;
    }

    let mut n = jy - jp;
    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march = 20 + leap_j - leap_g;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    Some(YearInfo {
        gy,
        march: march as u32,
        leap,
    })
}

pub fn is_leap_jalali_year(jy: i32) -> bool {
    year_info(jy).is_some_and(|info| info.leap == 0)
}

pub fn days_in_jalali_month(jy: i32, month: u32) -> Option<u32> {
    match month {
        1..=6 => Some(31),
        7..=11 => Some(30),
        12 if is_leap_jalali_year(jy) => Some(30),
        12 => Some(29),
        _ => None,
    }
}

/// `month` is 1-based. Returns `None` for a year outside the supported range
/// or a day the month does not have.
pub fn jalali_to_gregorian(jy: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let info = year_info(jy)?;
    if day == 0 || day > days_in_jalali_month(jy, month)? {
        return None;
    }

    let month = month as u64;
    let offset = (month - 1) * 31 - month / 7 * month.saturating_sub(7) + day as u64 - 1;

    NaiveDate::from_ymd_opt(info.gy, 3, info.march)?.checked_add_days(Days::new(offset))
}

pub fn gregorian_to_jalali(date: NaiveDate) -> Option<JalaliDate> {
    let mut jy = date.year() - 621;
    let info = year_info(jy)?;
    let farvardin_first = NaiveDate::from_ymd_opt(info.gy, 3, info.march)?;

    let mut k = (date - farvardin_first).num_days();
    if k >= 0 {
        if k <= 185 {
            return Some(JalaliDate {
                year: jy,
                month: 1 + (k / 31) as u32,
                day: (k % 31) as u32 + 1,
            });
        }
        k -= 186;
    } else {
        jy -= 1;
        k += 179;
        if info.leap == 1 {
            k += 1;
        }
    }

    Some(JalaliDate {
        year: jy,
        month: 7 + (k / 30) as u32,
        day: (k % 30) as u32 + 1,
    })
}

/// Renders `date` as "<day> <Jalali month>", prefixed with today / yesterday /
/// tomorrow in Persian when `date` is that close to `today`.
pub fn to_readable_jalali(date: NaiveDate, today: NaiveDate) -> String {
    let prefix = if date == today {
        Some("امروز")
    } else if today.pred_opt() == Some(date) {
        Some("دیروز")
    } else if today.succ_opt() == Some(date) {
        Some("فردا")
    } else {
        None
    };

    let date_string = gregorian_to_jalali(date)
        .and_then(|jalali| Some(format!("{} {}", jalali.day, jalali.month_name()?)))
        .unwrap_or_else(|| date.to_string());

    match prefix {
        Some(prefix) => format!("{} {}", prefix, date_string),
        None => date_string,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_digits() {
        assert_eq!(normalize_digits("ساعت ۹ تا ۱۱"), "ساعت 9 تا 11");
        assert_eq!(normalize_digits("۰۱۲۳۴۵۶۷۸۹"), "0123456789");

        let plain = "no persian digits 42";
        assert_eq!(normalize_digits(plain), plain);

        let once = normalize_digits("مورخ ۱۴ مرداد ماه ۱۴۰۴");
        assert_eq!(normalize_digits(&once), once);
    }

    #[test]
    fn test_word_to_ordinal() {
        assert_eq!(word_to_ordinal("پنجم"), Some(5));
        assert_eq!(word_to_ordinal("  بیست و یکم "), Some(21));
        assert_eq!(word_to_ordinal("سی\u{200c}ام"), Some(30));
        assert_eq!(word_to_ordinal("سی ام"), Some(30));
        assert_eq!(word_to_ordinal("سی و یکم"), Some(31));
        assert_eq!(word_to_ordinal("سی\u{200c} و یکم"), Some(31));
        assert_eq!(word_to_ordinal("نامعتبر"), None);
        assert_eq!(word_to_ordinal(""), None);
    }

    #[test]
    fn test_month_index() {
        assert_eq!(month_index("فروردین"), Some(0));
        assert_eq!(month_index("مرداد"), Some(4));
        assert_eq!(month_index("اسفند"), Some(11));
        assert_eq!(month_index("August"), None);
    }

    #[test]
    fn test_jalali_to_gregorian() {
        assert_eq!(jalali_to_gregorian(1404, 1, 1), Some(ymd(2025, 3, 21)));
        assert_eq!(jalali_to_gregorian(1404, 5, 14), Some(ymd(2025, 8, 5)));
        assert_eq!(jalali_to_gregorian(1404, 6, 5), Some(ymd(2025, 8, 27)));
        assert_eq!(jalali_to_gregorian(1403, 1, 1), Some(ymd(2024, 3, 20)));
        assert_eq!(jalali_to_gregorian(1403, 12, 30), Some(ymd(2025, 3, 20)));
        assert_eq!(jalali_to_gregorian(1402, 10, 11), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn test_jalali_rejects_impossible_days() {
        assert!(is_leap_jalali_year(1403));
        assert!(!is_leap_jalali_year(1404));
        assert_eq!(jalali_to_gregorian(1404, 12, 30), None);
        assert_eq!(jalali_to_gregorian(1404, 7, 31), None);
        assert_eq!(jalali_to_gregorian(1404, 13, 1), None);
        assert_eq!(jalali_to_gregorian(1404, 1, 0), None);
        assert_eq!(jalali_to_gregorian(5000, 1, 1), None);
    }

    #[test]
    fn test_gregorian_to_jalali_inverts() {
        let jalali = gregorian_to_jalali(ymd(2025, 8, 5)).unwrap();
        assert_eq!(
            jalali,
            JalaliDate {
                year: 1404,
                month: 5,
                day: 14
            }
        );
        assert_eq!(jalali.month_name(), Some("مرداد"));
        assert_eq!(jalali.to_string(), "1404/05/14");

        for month in [0, 13] {
            let invalid = JalaliDate {
                year: 1404,
                month,
                day: 1,
            };
            assert_eq!(invalid.month_name(), None);
        }

        let mut date = ymd(2024, 1, 1);
        while date < ymd(2026, 1, 1) {
            let j = gregorian_to_jalali(date).unwrap();
            assert_eq!(jalali_to_gregorian(j.year, j.month, j.day), Some(date));
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_resolve_date_numeric_and_ordinal() {
        assert_eq!(resolve_date("۱۴۰۴", "۱۴", "مرداد").unwrap(), ymd(2025, 8, 5));
        assert_eq!(resolve_date("1404", "14", "مرداد").unwrap(), ymd(2025, 8, 5));
        assert_eq!(resolve_date("۱۴۰۴", "پنجم", "شهریور").unwrap(), ymd(2025, 8, 27));
        assert_eq!(
            resolve_date("۱۴۰۴", "۵", "شهریور").unwrap(),
            resolve_date("۱۴۰۴", "پنجم", "شهریور").unwrap()
        );
        assert_eq!(
            resolve_date("۱۴۰۴", "۲۱", "مهر").unwrap(),
            resolve_date("۱۴۰۴", "بیست و یکم", "مهر").unwrap()
        );
    }

    #[test]
    fn test_resolve_date_rolls_over_month_end() {
        assert_eq!(resolve_date("۱۴۰۴", "۳۱", "مهر").unwrap(), ymd(2025, 10, 23));
        assert_eq!(
            resolve_date("۱۴۰۴", "سی و یکم", "مهر").unwrap(),
            resolve_date("۱۴۰۴", "۱", "آبان").unwrap()
        );
        assert_eq!(resolve_date("۱۴۰۴", "۳۰", "اسفند").unwrap(), ymd(2026, 3, 21));
        assert_eq!(resolve_date("۱۴۰۳", "۳۰", "اسفند").unwrap(), ymd(2025, 3, 20));
        assert_eq!(
            resolve_date("۱۴۰۳", "سی\u{200c} و یکم", "فروردین").unwrap(),
            ymd(2024, 4, 19)
        );
    }

    #[test]
    fn test_resolve_date_errors() {
        let err = resolve_date("۱۴۰۴", "نامعتبر", "مرداد").unwrap_err();
        assert_eq!(err.code(), 400);
        assert_eq!(err.to_string(), "Invalid day: نامعتبر");

        let err = resolve_date("۱۴۰۴", "۰", "مرداد").unwrap_err();
        assert_eq!(err.to_string(), "Invalid day: ۰");

        let err = resolve_date("۱۴۰۴", "۱۴", "آگوست").unwrap_err();
        assert_eq!(err.code(), 400);
        assert_eq!(err.to_string(), "Invalid month: آگوست");

        let err = resolve_date("۹۹۹۹", "۱", "مهر").unwrap_err();
        assert!(matches!(err, OutageError::InvalidYear(_)));
    }

    #[test]
    fn test_to_readable_jalali() {
        let today = ymd(2025, 8, 26);
        assert_eq!(to_readable_jalali(today, today), "امروز 4 شهریور");
        assert_eq!(to_readable_jalali(ymd(2025, 8, 25), today), "دیروز 3 شهریور");
        assert_eq!(to_readable_jalali(ymd(2025, 8, 27), today), "فردا 5 شهریور");
        assert_eq!(to_readable_jalali(ymd(2025, 8, 20), today), "29 مرداد");
    }
}
