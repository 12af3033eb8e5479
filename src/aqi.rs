use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// AqiCategory – six severity buckets
// ---------------------------------------------------------------------------

/// Severity bucket of an air-quality value, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
}

/// Upper bounds (inclusive) of the display scale, one per bucket below Severe.
const DISPLAY_BREAKPOINTS: [f64; 5] = [50.0, 100.0, 200.0, 300.0, 400.0];

/// Upper bounds (inclusive) used upstream when labelling PM2.5 forecasts.
const PM25_BREAKPOINTS: [f64; 5] = [30.0, 60.0, 90.0, 120.0, 250.0];

impl AqiCategory {
    /// All categories in increasing severity.
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Satisfactory,
        AqiCategory::Moderate,
        AqiCategory::Poor,
        AqiCategory::VeryPoor,
        AqiCategory::Severe,
    ];

    /// Classify a value on the 50/100/200/300/400 display scale.
    ///
    /// A value sitting exactly on a breakpoint belongs to the lower bucket.
    /// Negative values are `Good`; `NaN` fails every comparison and lands
    /// in `Severe`.
    pub fn classify(value: f64) -> Self {
        Self::bucket(value, &DISPLAY_BREAKPOINTS)
    }

    /// Classify a PM2.5 concentration (µg/m³) on the 30/60/90/120/250 scale
    /// that produced the `category` labels stored in the dataset.
    pub fn from_pm25_concentration(value: f64) -> Self {
        Self::bucket(value, &PM25_BREAKPOINTS)
    }

    fn bucket(value: f64, breakpoints: &[f64; 5]) -> Self {
        breakpoints
            .iter()
            .position(|&upper| value <= upper)
            .map(|i| Self::ALL[i])
            .unwrap_or(AqiCategory::Severe)
    }

    /// Human readable label, as used in the dataset.
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Satisfactory => "Satisfactory",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
        }
    }

    /// Display colour as a `#rrggbb` string.
    pub fn hex(self) -> &'static str {
        match self {
            AqiCategory::Good => "#00b894",
            AqiCategory::Satisfactory => "#9dd800",
            AqiCategory::Moderate => "#fdcb6e",
            AqiCategory::Poor => "#e17055",
            AqiCategory::VeryPoor => "#d63031",
            AqiCategory::Severe => "#a21d1d",
        }
    }

    /// The inclusive display-scale range covered by this bucket.
    pub fn display_range(self) -> (Option<f64>, Option<f64>) {
        let i = self as usize;
        let lower = i.checked_sub(1).map(|j| DISPLAY_BREAKPOINTS[j]);
        let upper = DISPLAY_BREAKPOINTS.get(i).copied();
        (lower, upper)
    }

    /// Short health advice shown next to a selected station.
    pub fn health_advice(self) -> &'static [&'static str] {
        match self {
            AqiCategory::Good => &["Enjoy outdoor activities.", "Open windows for fresh air."],
            AqiCategory::Satisfactory => &[
                "Good for outdoor exercise.",
                "Sensitive groups monitor symptoms.",
            ],
            AqiCategory::Moderate => &[
                "Limit prolonged outdoor exertion.",
                "Keep windows closed near traffic.",
            ],
            AqiCategory::Poor => &["Wear a mask outdoors.", "Avoid outdoor exercise."],
            AqiCategory::VeryPoor => &["Avoid all outdoor activities.", "Use an air purifier."],
            AqiCategory::Severe => &[
                "Emergency: stay indoors!",
                "Seek medical help if breathless.",
            ],
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown AQI category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for AqiCategory {
    type Err = UnknownCategory;

    /// Accepts the dataset labels ("Very Poor") as well as snake/camel
    /// spellings ("very_poor", "VeryPoor"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "good" => Ok(AqiCategory::Good),
            "satisfactory" => Ok(AqiCategory::Satisfactory),
            "moderate" => Ok(AqiCategory::Moderate),
            "poor" => Ok(AqiCategory::Poor),
            "verypoor" => Ok(AqiCategory::VeryPoor),
            "severe" => Ok(AqiCategory::Severe),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_lower_bucket() {
        assert_eq!(AqiCategory::classify(0.0), AqiCategory::Good);
        assert_eq!(AqiCategory::classify(50.0), AqiCategory::Good);
        assert_eq!(AqiCategory::classify(50.01), AqiCategory::Satisfactory);
        assert_eq!(AqiCategory::classify(51.0), AqiCategory::Satisfactory);
        assert_eq!(AqiCategory::classify(100.0), AqiCategory::Satisfactory);
        assert_eq!(AqiCategory::classify(200.0), AqiCategory::Moderate);
        assert_eq!(AqiCategory::classify(300.0), AqiCategory::Poor);
        assert_eq!(AqiCategory::classify(301.0), AqiCategory::VeryPoor);
        assert_eq!(AqiCategory::classify(400.0), AqiCategory::VeryPoor);
        assert_eq!(AqiCategory::classify(500.0), AqiCategory::Severe);
    }

    #[test]
    fn classify_is_monotonic() {
        let mut previous = AqiCategory::classify(0.0);
        let mut v = 0.0;
        while v < 1000.0 {
            let current = AqiCategory::classify(v);
            assert!(current >= previous, "severity dropped at {v}");
            previous = current;
            v += 0.25;
        }
        assert_eq!(previous, AqiCategory::Severe);
    }

    #[test]
    fn out_of_domain_values() {
        assert_eq!(AqiCategory::classify(-5.0), AqiCategory::Good);
        assert_eq!(AqiCategory::classify(f64::NAN), AqiCategory::Severe);
        assert_eq!(AqiCategory::classify(f64::INFINITY), AqiCategory::Severe);
    }

    #[test]
    fn pm25_scale_matches_dataset_labels() {
        assert_eq!(AqiCategory::from_pm25_concentration(30.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_pm25_concentration(61.0), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_pm25_concentration(240.4), AqiCategory::VeryPoor);
        assert_eq!(AqiCategory::from_pm25_concentration(279.5), AqiCategory::Severe);
    }

    #[test]
    fn labels_parse_back() {
        for cat in AqiCategory::ALL {
            assert_eq!(cat.label().parse::<AqiCategory>(), Ok(cat));
        }
        assert_eq!("very_poor".parse::<AqiCategory>(), Ok(AqiCategory::VeryPoor));
        assert!("Hazardous".parse::<AqiCategory>().is_err());
    }

    #[test]
    fn display_ranges() {
        assert_eq!(AqiCategory::Good.display_range(), (None, Some(50.0)));
        assert_eq!(AqiCategory::Poor.display_range(), (Some(200.0), Some(300.0)));
        assert_eq!(AqiCategory::Severe.display_range(), (Some(400.0), None));
    }
}
