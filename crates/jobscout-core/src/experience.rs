//! Free-text experience requirements mapped to the banded codes the
//! JSearch API understands, and back to display text.

/// Years-of-experience band as used by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceBand {
    All,
    LessThanOne,
    OneToThree,
    FourToSix,
    SevenToNine,
    TenToFourteen,
    AboveFifteen,
}

impl ExperienceBand {
    /// Parse a free-text experience string ("2 years", "senior", "entry
    /// level") into a band plus the extracted year count when present.
    pub fn from_text(text: &str) -> (Self, Option<u32>) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return (ExperienceBand::All, None);
        }

        if let Some(years) = first_number(trimmed) {
            let band = match years {
                0 => ExperienceBand::LessThanOne,
                1..=3 => ExperienceBand::OneToThree,
                4..=6 => ExperienceBand::FourToSix,
                7..=9 => ExperienceBand::SevenToNine,
                10..=14 => ExperienceBand::TenToFourteen,
                _ => ExperienceBand::AboveFifteen,
            };
            return (band, Some(years));
        }

        let lower = trimmed.to_lowercase();
        if lower.contains("no experience") || lower.contains("entry") || lower.contains("junior") {
            (ExperienceBand::LessThanOne, Some(0))
        } else if lower.contains("mid") {
            (ExperienceBand::FourToSix, Some(5))
        } else if lower.contains("senior") || lower.contains("experienced") {
            (ExperienceBand::SevenToNine, Some(8))
        } else if lower.contains("expert") || lower.contains("principal") {
            (ExperienceBand::TenToFourteen, Some(12))
        } else {
            (ExperienceBand::All, None)
        }
    }

    /// The code the search API expects in `years_of_experience`.
    pub fn api_code(&self) -> &'static str {
        match self {
            ExperienceBand::All => "ALL",
            ExperienceBand::LessThanOne => "LESS_THAN_ONE",
            ExperienceBand::OneToThree => "ONE_TO_THREE",
            ExperienceBand::FourToSix => "FOUR_TO_SIX",
            ExperienceBand::SevenToNine => "SEVEN_TO_NINE",
            ExperienceBand::TenToFourteen => "TEN_TO_FOURTEEN",
            ExperienceBand::AboveFifteen => "ABOVE_FIFTEEN",
        }
    }

    /// User-friendly rendering.
    pub fn display(&self) -> &'static str {
        match self {
            ExperienceBand::All => "Any experience",
            ExperienceBand::LessThanOne => "Less than 1 year",
            ExperienceBand::OneToThree => "1-3 years",
            ExperienceBand::FourToSix => "4-6 years",
            ExperienceBand::SevenToNine => "7-9 years",
            ExperienceBand::TenToFourteen => "10-14 years",
            ExperienceBand::AboveFifteen => "15+ years",
        }
    }

    /// Parse an API code back into a band. Unknown codes map to `All`.
    pub fn from_api_code(code: &str) -> Self {
        match code {
            "LESS_THAN_ONE" => ExperienceBand::LessThanOne,
            "ONE_TO_THREE" => ExperienceBand::OneToThree,
            "FOUR_TO_SIX" => ExperienceBand::FourToSix,
            "SEVEN_TO_NINE" => ExperienceBand::SevenToNine,
            "TEN_TO_FOURTEEN" => ExperienceBand::TenToFourteen,
            "ABOVE_FIFTEEN" => ExperienceBand::AboveFifteen,
            _ => ExperienceBand::All,
        }
    }
}

/// First unsigned integer embedded in the string, if any.
fn first_number(s: &str) -> Option<u32> {
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !digits.is_empty() {
            break;
        }
    }
    digits.parse().ok()
}
