pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else if ms < 3_600_000 {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = ms / 3_600_000;
        let mins = (ms % 3_600_000) / 60_000;
        format!("{}h {}m", hours, mins)
    }
}

/// `$1,234,567.89`
pub fn format_currency(usd: f64) -> String {
    let sign = if usd < 0.0 { "-" } else { "" };
    let cents = (usd.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, frac)
}

/// `$2.0M`, `$40K`, `$950`
pub fn format_compact(usd: f64) -> String {
    if usd >= 1_000_000.0 {
        format!("${:.1}M", usd / 1_000_000.0)
    } else if usd >= 1_000.0 {
        format!("${:.0}K", usd / 1_000.0)
    } else {
        format!("${:.0}", usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(500), "500ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(125_000), "2m 5s");
        assert_eq!(format_duration(3_720_000), "1h 2m");
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(1_995_000.0), "$1,995,000.00");
        assert_eq!(format_currency(40_000.5), "$40,000.50");
        assert_eq!(format_currency(999.0), "$999.00");
        assert_eq!(format_currency(-5000.0), "-$5,000.00");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(2_000_000.0), "$2.0M");
        assert_eq!(format_compact(40_000.0), "$40K");
        assert_eq!(format_compact(950.0), "$950");
    }
}
