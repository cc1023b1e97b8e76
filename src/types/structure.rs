use serde::{Deserialize, Serialize};

use super::market::Side;

/// Direction of a structural feature (order block, FVG, liquidity grab, BOS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Bullish,
    Bearish,
}

impl StructureKind {
    /// Does this feature support entries on the given side?
    pub fn supports(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (StructureKind::Bullish, Side::Long) | (StructureKind::Bearish, Side::Short)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Bullish,
    Bearish,
    Neutral,
}

impl PatternKind {
    pub fn supports(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (PatternKind::Bullish, Side::Long) | (PatternKind::Bearish, Side::Short)
        )
    }
}

/// Candlestick pattern reported by the analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandlestickPattern {
    pub name: String,
    pub kind: PatternKind,
    /// Historical reliability in [0, 1]
    pub reliability: f64,
}

/// Institutional order block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBlock {
    pub kind: StructureKind,
    pub price: f64,
    pub strength: f64,
}

/// Fair value gap between `lower` and `upper`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairValueGap {
    pub kind: StructureKind,
    pub upper: f64,
    pub lower: f64,
    pub strong: bool,
}

impl FairValueGap {
    pub fn midpoint(&self) -> f64 {
        (self.upper + self.lower) / 2.0
    }
}

/// Stop-hunt / liquidity grab event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityGrab {
    pub kind: StructureKind,
    pub strong: bool,
}

/// Break of structure event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakOfStructure {
    pub kind: StructureKind,
}

/// Where price sits relative to the value area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueAreaPosition {
    AboveVa,
    InVa,
    BelowVa,
}

/// Volume profile summary for one timeframe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeProfile {
    /// Point of control
    pub poc: f64,
    pub va_high: f64,
    pub va_low: f64,
    pub current_position: ValueAreaPosition,
    pub confluence_with_poc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_supports() {
        assert!(StructureKind::Bullish.supports(Side::Long));
        assert!(!StructureKind::Bullish.supports(Side::Short));
        assert!(StructureKind::Bearish.supports(Side::Short));
    }

    #[test]
    fn test_pattern_neutral_supports_neither() {
        assert!(!PatternKind::Neutral.supports(Side::Long));
        assert!(!PatternKind::Neutral.supports(Side::Short));
    }

    #[test]
    fn test_fvg_midpoint() {
        let gap = FairValueGap {
            kind: StructureKind::Bullish,
            upper: 102.0,
            lower: 98.0,
            strong: true,
        };
        assert_eq!(gap.midpoint(), 100.0);
    }
}
