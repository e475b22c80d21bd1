//! Human-friendly duration strings used by persistence tasks ("5m", "1h", "7d")

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minute,
    Hour,
    Day,
}

impl DurationUnit {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "m" => Some(Self::Minute),
            "h" => Some(Self::Hour),
            "d" => Some(Self::Day),
            _ => None,
        }
    }

    fn secs(&self) -> u64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 60 * 60,
            Self::Day => 60 * 60 * 24,
        }
    }
}

/// Schedules, time windows and steps
pub const DAY_HOUR_MINUTE: &[DurationUnit] = &[DurationUnit::Minute, DurationUnit::Hour, DurationUnit::Day];
/// Retrace durations
pub const DAY_HOUR: &[DurationUnit] = &[DurationUnit::Hour, DurationUnit::Day];

/// Parse `<digits><unit>` into seconds, accepting only the given units
pub fn parse_duration_secs(input: &str, allowed: &[DurationUnit]) -> Result<u64, String> {
    let s = input.trim();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err(format!("'{}' is missing a number or a unit", input));
    }

    let unit = DurationUnit::from_suffix(unit)
        .filter(|unit| allowed.contains(unit))
        .ok_or_else(|| format!("unsupported unit in '{}'", input))?;
    let n: u64 = num_str.parse().map_err(|_| format!("invalid number in '{}'", input))?;

    n.checked_mul(unit.secs()).ok_or_else(|| format!("'{}' is too large", input))
}
