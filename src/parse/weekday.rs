use chrono::Weekday;

pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub const SCHOOL_WEEK: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// `chrono` only displays the three letter form, the menu uses full names.
pub const fn full_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Matches a cell or line against the full names in `days`, ignoring case and
/// surrounding whitespace. Abbreviations are not accepted.
pub fn match_full_name(text: &str, days: &[Weekday]) -> Option<Weekday> {
    let text = text.trim();
    days.iter()
        .copied()
        .find(|day| full_name(*day).eq_ignore_ascii_case(text))
}
