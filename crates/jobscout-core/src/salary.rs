//! Salary string parsing and annualization.
//!
//! Sources render salaries every way imaginable: "55,020.16–64,729.60 a
//! year", "$25/hour", "$3000 - $5000". These helpers pull numeric ranges out
//! of those strings and normalize them to annual figures so ranges from
//! different sources can be compared.

/// Pay period attached to a salary figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryPeriod {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl SalaryPeriod {
    fn from_text(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if lower.contains("hour") || lower.contains("/hr") || lower.contains(" hr") {
            Some(SalaryPeriod::Hour)
        } else if lower.contains("day") {
            Some(SalaryPeriod::Day)
        } else if lower.contains("week") || lower.contains("wk") {
            Some(SalaryPeriod::Week)
        } else if lower.contains("month") {
            Some(SalaryPeriod::Month)
        } else if lower.contains("year") || lower.contains("annual") || lower.contains("yr") {
            Some(SalaryPeriod::Year)
        } else {
            None
        }
    }
}

/// Parse a salary string into (min, max, period).
///
/// A single figure yields min == max. Returns None when no number is found.
pub fn parse_salary_range(s: &str) -> Option<(f64, f64, Option<SalaryPeriod>)> {
    let (min, rest) = scan_number(s)?;
    let period = SalaryPeriod::from_text(s);

    // A dash (possibly surrounded by spaces and a currency symbol) after the
    // first figure means this is a range.
    let after = rest.trim_start();
    if let Some(stripped) = after.strip_prefix(['-', '–']) {
        let after_dash = stripped.trim_start().trim_start_matches('$').trim_start();
        if let Some((max, _)) = scan_number(after_dash) {
            return Some((min, max, period));
        }
    }
    Some((min, min, period))
}

/// Convert a salary figure to its annual equivalent.
pub fn normalize_annual(salary: f64, period: SalaryPeriod) -> f64 {
    match period {
        SalaryPeriod::Hour => salary * 40.0 * 52.0,
        SalaryPeriod::Day => salary * 5.0 * 52.0,
        SalaryPeriod::Week => salary * 52.0,
        SalaryPeriod::Month => salary * 12.0,
        SalaryPeriod::Year => salary,
    }
}

/// True when the job's advertised salary range overlaps the user's range.
/// Unparseable salaries count as not in range.
pub fn salary_in_range(job_salary: &str, user_min: f64, user_max: f64) -> bool {
    let Some((mut lo, mut hi, period)) = parse_salary_range(job_salary) else {
        return false;
    };
    if let Some(p) = period {
        lo = normalize_annual(lo, p);
        hi = normalize_annual(hi, p);
    }
    // Any overlap between the two ranges counts as a match.
    !(hi < user_min || lo > user_max)
}

/// Parse a user-supplied range like "$3000 - $5000" into (min, max).
pub fn parse_user_range(s: &str) -> Option<(f64, f64)> {
    let (lo, hi, _) = parse_salary_range(s)?;
    if hi > lo { Some((lo, hi)) } else { None }
}

/// Extract the first decimal number (commas allowed as thousands
/// separators). Returns the number and the remainder of the string.
fn scan_number(s: &str) -> Option<(f64, &str)> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let tail = &s[start..];
    let mut end = 0;
    for (i, c) in tail.char_indices() {
        if c.is_ascii_digit() || c == ',' || c == '.' {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    let token: String = tail[..end]
        .trim_end_matches(['.', ','])
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let value = token.parse().ok()?;
    Some((value, &tail[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dash_range_with_period() {
        let (lo, hi, period) = parse_salary_range("55,020.16–64,729.60 a year").unwrap();
        assert_eq!(lo, 55020.16);
        assert_eq!(hi, 64729.60);
        assert_eq!(period, Some(SalaryPeriod::Year));
    }

    #[test]
    fn parses_dollar_range() {
        let (lo, hi, _) = parse_salary_range("$3,000 - $5,000").unwrap();
        assert_eq!(lo, 3000.0);
        assert_eq!(hi, 5000.0);
    }

    #[test]
    fn parses_single_figure() {
        let (lo, hi, period) = parse_salary_range("$25 per hour").unwrap();
        assert_eq!(lo, 25.0);
        assert_eq!(hi, 25.0);
        assert_eq!(period, Some(SalaryPeriod::Hour));
    }

    #[test]
    fn rejects_non_numeric() {
        assert!(parse_salary_range("competitive pay").is_none());
        assert!(parse_salary_range("").is_none());
    }

    #[test]
    fn annualization() {
        assert_eq!(normalize_annual(25.0, SalaryPeriod::Hour), 52_000.0);
        assert_eq!(normalize_annual(400.0, SalaryPeriod::Day), 104_000.0);
        assert_eq!(normalize_annual(1000.0, SalaryPeriod::Week), 52_000.0);
        assert_eq!(normalize_annual(5000.0, SalaryPeriod::Month), 60_000.0);
        assert_eq!(normalize_annual(80_000.0, SalaryPeriod::Year), 80_000.0);
    }

    #[test]
    fn range_overlap() {
        // $25/hour = $52k/year, inside 40k-60k
        assert!(salary_in_range("$25 per hour", 40_000.0, 60_000.0));
        // 80k-100k does not overlap 40k-60k
        assert!(!salary_in_range("80,000 - 100,000 a year", 40_000.0, 60_000.0));
        // Partial overlap counts
        assert!(salary_in_range("55,000 - 70,000 a year", 40_000.0, 60_000.0));
        assert!(!salary_in_range("competitive", 40_000.0, 60_000.0));
    }

    #[test]
    fn user_range_requires_two_figures() {
        assert_eq!(parse_user_range("$3000 - $5000"), Some((3000.0, 5000.0)));
        assert_eq!(parse_user_range("$3000"), None);
    }
}
