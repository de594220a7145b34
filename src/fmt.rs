use chrono::NaiveDateTime;

/// Placeholder for a missing or unparseable date.
pub const NO_DATE: &str = "\u{2014}";

/// Format an amount with thousands separators behind a currency symbol: ₹1,234.56
pub fn money(symbol: &str, val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{symbol}{with_commas}.{dec_part}")
    } else {
        format!("{symbol}{with_commas}.{dec_part}")
    }
}

/// MM/DD/YYYY, or an em-dash when there is no usable date.
pub fn human_date(date: Option<NaiveDateTime>) -> String {
    match date {
        Some(d) => d.format("%m/%d/%Y").to_string(),
        None => NO_DATE.to_string(),
    }
}

/// Plain decimal rendering: integers without a fractional part.
pub fn plain_number(val: f64) -> String {
    if val == 0.0 {
        return "0".to_string();
    }
    format!("{val}")
}

/// Horizontal bar scaled against `max`, at most `width` cells.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "\u{2588}".repeat(cells.clamp(1, width))
}
