//! Conversion between Chinese numeral glyphs and integers.
//!
//! Article numbers appear as `第二十一条` in the source text and as `21` in
//! provision references. Both directions are total: parsing never fails
//! (unknown glyphs count as zero) and rendering falls back to arabic digits
//! outside 0..=9999. Callers treat a zero result as "not a number".

use unicode_normalization::UnicodeNormalization;

/// Highest value [`from_integer`] renders with glyphs.
pub const MAX_GLYPH_VALUE: u32 = 9999;

/// Regex character-class body matching arabic digits and every numeral glyph.
pub(crate) const NUMERAL_CLASS: &str = "0-9零〇一二两三四五六七八九十百千壹贰叁肆伍陆柒捌玖拾佰仟";

const DIGITS: [char; 10] = ['零', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

fn digit_value(c: char) -> Option<u32> {
    let value = match c {
        '零' | '〇' => 0,
        '一' | '壹' => 1,
        '二' | '贰' | '两' => 2,
        '三' | '叁' => 3,
        '四' | '肆' => 4,
        '五' | '伍' => 5,
        '六' | '陆' => 6,
        '七' | '柒' => 7,
        '八' | '捌' => 8,
        '九' | '玖' => 9,
        _ => return None,
    };
    Some(value)
}

fn multiplier_value(c: char) -> Option<u32> {
    match c {
        '十' | '拾' => Some(10),
        '百' | '佰' => Some(100),
        '千' | '仟' => Some(1000),
        _ => None,
    }
}

/// Convert a glyph numeral to an integer.
///
/// # Examples
/// ```
/// use fagui_harvester::numerals::to_integer;
///
/// assert_eq!(to_integer("二十一"), 21);
/// assert_eq!(to_integer("一百零三"), 103);
/// assert_eq!(to_integer("十"), 10);
/// assert_eq!(to_integer("abc"), 0);
/// ```
#[must_use]
pub fn to_integer(numeral: &str) -> u32 {
    let mut result: u32 = 0;
    let mut current: u32 = 0;

    for (i, c) in numeral.chars().enumerate() {
        if let Some(d) = digit_value(c) {
            current = d;
        } else if let Some(m) = multiplier_value(c) {
            if i == 0 && m == 10 {
                // Leading 十 means ten, not "ten times a digit still to come".
                current = 1;
            }
            result = result.saturating_add(current.saturating_mul(m));
            current = 0;
        }
    }

    result.saturating_add(current)
}

/// Render an integer as a glyph numeral.
///
/// Values above [`MAX_GLYPH_VALUE`] come back as arabic digits.
///
/// # Examples
/// ```
/// use fagui_harvester::numerals::from_integer;
///
/// assert_eq!(from_integer(21), "二十一");
/// assert_eq!(from_integer(103), "一百零三");
/// assert_eq!(from_integer(15), "十五");
/// assert_eq!(from_integer(12345), "12345");
/// ```
#[must_use]
pub fn from_integer(n: u32) -> String {
    if n == 0 {
        return DIGITS[0].to_string();
    }
    if n > MAX_GLYPH_VALUE {
        return n.to_string();
    }

    let orders = [(1000, Some('千')), (100, Some('百')), (10, Some('十')), (1, None)];
    let mut out = String::new();
    let mut gap = false;

    for (unit, glyph) in orders {
        let digit = (n / unit) % 10;
        if digit == 0 {
            gap = !out.is_empty();
            continue;
        }
        if gap {
            out.push(DIGITS[0]);
            gap = false;
        }
        out.push(DIGITS[digit as usize]);
        if let Some(g) = glyph {
            out.push(g);
        }
    }

    match out.strip_prefix("一十") {
        Some(rest) => format!("十{rest}"),
        None => out,
    }
}

/// Resolve an article or paragraph number written in either convention.
///
/// Arabic digits win (full-width digits are folded first); glyph numerals are
/// tried second. Zero means nothing usable was found and maps to `None`.
///
/// # Examples
/// ```
/// use fagui_harvester::numerals::parse_number;
///
/// assert_eq!(parse_number("21"), Some(21));
/// assert_eq!(parse_number("２１"), Some(21));
/// assert_eq!(parse_number("二十一"), Some(21));
/// assert_eq!(parse_number("甲"), None);
/// ```
#[must_use]
pub fn parse_number(text: &str) -> Option<u32> {
    let folded: String = text.trim().nfkc().collect();
    if !folded.is_empty() && folded.chars().all(|c| c.is_ascii_digit()) {
        return folded.parse::<u32>().ok().filter(|n| *n > 0);
    }
    Some(to_integer(&folded)).filter(|n| *n > 0)
}
