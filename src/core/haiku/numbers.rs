//! English cardinal numbers, so digits can be counted as spoken syllables.

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

/// Spells out `number` in British-style English: `101` is "one hundred and one",
/// `1100` is "one thousand, one hundred".
#[must_use]
pub fn spell_out(number: u64) -> String {
    if number == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = number;
    while rest > 0 {
        groups.push(rest % 1000);
        rest /= 1000;
    }

    let mut spelled = String::new();
    for (scale, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        if !spelled.is_empty() {
            spelled.push_str(if scale == 0 && group < 100 { " and " } else { ", " });
        }
        spelled.push_str(&below_thousand(group));
        if scale > 0 {
            spelled.push(' ');
            spelled.push_str(SCALES[scale]);
        }
    }
    spelled
}

#[allow(clippy::cast_possible_truncation)] // Always below 1000
fn below_thousand(number: u64) -> String {
    let hundreds = (number / 100) as usize;
    let rest = number % 100;

    match (hundreds, rest) {
        (0, _) => below_hundred(rest),
        (_, 0) => format!("{} hundred", ONES[hundreds]),
        _ => format!("{} hundred and {}", ONES[hundreds], below_hundred(rest)),
    }
}

#[allow(clippy::cast_possible_truncation)] // Always below 100
fn below_hundred(number: u64) -> String {
    let number = number as usize;
    if number < ONES.len() {
        return ONES[number].to_string();
    }

    match number % 10 {
        0 => TENS[number / 10].to_string(),
        ones => format!("{}-{}", TENS[number / 10], ONES[ones]),
    }
}
