//! Death-count bands used to shade the borough map.

use serde::Serialize;

/// Severity band for a borough's newest known total deaths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathBand {
    /// 343..=552
    Low,
    /// 553..=762
    Moderate,
    /// 763..=972
    High,
    /// 973..=1182
    Severe,
    /// Outside every band, or no known value.
    Unclassified,
}

impl DeathBand {
    pub fn classify(total_deaths: u64) -> Self {
        match total_deaths {
            343..=552 => Self::Low,
            553..=762 => Self::Moderate,
            763..=972 => Self::High,
            973..=1182 => Self::Severe,
            _ => Self::Unclassified,
        }
    }

    /// Hex fill colour for map renderers.
    pub fn colour(self) -> &'static str {
        match self {
            Self::Low => "#66FF99",
            Self::Moderate => "#FFFF66",
            Self::High => "#FFCC66",
            Self::Severe => "#FF6666",
            Self::Unclassified => "#CCCCCC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DeathBand;

    #[test]
    fn band_edges_are_inclusive() {
        assert_eq!(DeathBand::classify(342), DeathBand::Unclassified);
        assert_eq!(DeathBand::classify(343), DeathBand::Low);
        assert_eq!(DeathBand::classify(552), DeathBand::Low);
        assert_eq!(DeathBand::classify(553), DeathBand::Moderate);
        assert_eq!(DeathBand::classify(972), DeathBand::High);
        assert_eq!(DeathBand::classify(973), DeathBand::Severe);
        assert_eq!(DeathBand::classify(1182), DeathBand::Severe);
        assert_eq!(DeathBand::classify(1183), DeathBand::Unclassified);
    }

    #[test]
    fn unclassified_is_grey() {
        assert_eq!(DeathBand::Unclassified.colour(), "#CCCCCC");
    }
}
