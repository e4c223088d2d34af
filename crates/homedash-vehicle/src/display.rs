//! Battery and odometer presentation helpers.

use serde::Serialize;

/// Battery charge in whole percent, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BatteryLevel(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatteryBand {
    Low,
    Medium,
    High,
}

impl BatteryBand {
    /// Progress bar color.
    pub fn color(&self) -> &'static str {
        match self {
            BatteryBand::Low => "red",
            BatteryBand::Medium => "yellow",
            BatteryBand::High => "green",
        }
    }
}

impl BatteryLevel {
    pub fn new(percent: f64) -> Self {
        if percent.is_nan() {
            return Self(0);
        }
        Self(percent.round().clamp(0.0, 100.0) as u8)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn band(&self) -> BatteryBand {
        match self.0 {
            0..=19 => BatteryBand::Low,
            20..=49 => BatteryBand::Medium,
            _ => BatteryBand::High,
        }
    }
}

/// "12,345 miles"
pub fn format_odometer(miles: f64) -> String {
    let rounded = if miles.is_finite() { miles.round() as i64 } else { 0 };
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}{} miles", sign, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_is_clamped() {
        assert_eq!(BatteryLevel::new(-5.0).percent(), 0);
        assert_eq!(BatteryLevel::new(140.0).percent(), 100);
        assert_eq!(BatteryLevel::new(64.6).percent(), 65);
        assert_eq!(BatteryLevel::new(f64::NAN).percent(), 0);
    }

    #[test]
    fn test_battery_bands() {
        assert_eq!(BatteryLevel::new(19.0).band(), BatteryBand::Low);
        assert_eq!(BatteryLevel::new(20.0).band(), BatteryBand::Medium);
        assert_eq!(BatteryLevel::new(49.0).band(), BatteryBand::Medium);
        assert_eq!(BatteryLevel::new(50.0).band(), BatteryBand::High);
        assert_eq!(BatteryBand::Low.color(), "red");
    }

    #[test]
    fn test_format_odometer() {
        assert_eq!(format_odometer(12345.4), "12,345 miles");
        assert_eq!(format_odometer(999.5), "1,000 miles");
        assert_eq!(format_odometer(7.0), "7 miles");
        assert_eq!(format_odometer(1234567.0), "1,234,567 miles");
        assert_eq!(format_odometer(f64::INFINITY), "0 miles");
    }
}
