pub mod panels;
pub mod plot;
pub mod table;

/// Format a count with thousands separators: `1234567` → `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Label of a working-day flag as shown on charts and tables.
pub fn working_day_label(working_day: bool) -> &'static str {
    if working_day {
        "Working day"
    } else {
        "Non-working day"
    }
}
