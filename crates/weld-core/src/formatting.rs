/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use weld_core::formatting::format_number;
///
/// assert_eq!(format_number(12345.6, 1), "12,345.6");
/// assert_eq!(format_number(15000.0, 0), "15,000");
/// assert_eq!(format_number(-2500.25, 2), "-2,500.25");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = decimals as usize);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut result = group_thousands(int_part);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }

    if value < 0.0 && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a force in newtons, e.g. `"12,345 N"`.
pub fn format_force(newtons: f64) -> String {
    format!("{} N", format_number(newtons, 0))
}

/// Format elapsed wall-clock seconds as `"850ms"`, `"12.3s"` or `"2m 05s"`.
pub fn format_elapsed(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{}ms", (seconds * 1000.0).round() as u64)
    } else if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else {
        let total = seconds.round() as u64;
        format!("{}m {:02}s", total / 60, total % 60)
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// # Examples
///
/// ```
/// use weld_core::formatting::percentage;
///
/// assert!((percentage(1.0, 4.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(3.0, 0.0, 1), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
