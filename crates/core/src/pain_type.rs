//! Pain-type classification and display colors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::regions::normalize_token;
use crate::types::HexColor;

// ---------------------------------------------------------------------------
// PainType
// ---------------------------------------------------------------------------

/// Fixed pain-type vocabulary. Anything unrecognized is [`PainType::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainType {
    Sharp,
    Dull,
    Throbbing,
    Burning,
    Aching,
    Numbness,
    Tingling,
    Stiffness,
    #[default]
    Other,
}

impl PainType {
    /// Legend order.
    pub const ALL: [PainType; 9] = [
        PainType::Sharp,
        PainType::Dull,
        PainType::Throbbing,
        PainType::Burning,
        PainType::Aching,
        PainType::Numbness,
        PainType::Tingling,
        PainType::Stiffness,
        PainType::Other,
    ];

    /// String representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PainType::Sharp => "sharp",
            PainType::Dull => "dull",
            PainType::Throbbing => "throbbing",
            PainType::Burning => "burning",
            PainType::Aching => "aching",
            PainType::Numbness => "numbness",
            PainType::Tingling => "tingling",
            PainType::Stiffness => "stiffness",
            PainType::Other => "other",
        }
    }

    /// Parse from a string, defaulting to `Other` for unknown values.
    ///
    /// The input goes through the same token normalization as region names,
    /// so `" Throbbing "` and `"THROBBING!"` both classify as `Throbbing`.
    pub fn from_str(s: &str) -> Self {
        match normalize_token(s).as_str() {
            "sharp" => PainType::Sharp,
            "dull" => PainType::Dull,
            "throbbing" => PainType::Throbbing,
            "burning" => PainType::Burning,
            "aching" => PainType::Aching,
            "numbness" => PainType::Numbness,
            "tingling" => PainType::Tingling,
            "stiffness" => PainType::Stiffness,
            _ => PainType::Other,
        }
    }

    /// Heatmap display color.
    ///
    /// `Other` shares `Burning`'s red.
    pub fn color(&self) -> HexColor {
        match self {
            PainType::Sharp => "#e11d48",
            PainType::Dull => "#f97316",
            PainType::Throbbing => "#db2777",
            PainType::Burning => "#dc2626",
            PainType::Aching => "#f59e0b",
            PainType::Numbness => "#475569",
            PainType::Tingling => "#06b6d4",
            PainType::Stiffness => "#eab308",
            PainType::Other => "#dc2626",
        }
    }

    /// Legend label.
    pub fn label(&self) -> &'static str {
        match self {
            PainType::Sharp => "Sharp",
            PainType::Dull => "Dull",
            PainType::Throbbing => "Throbbing",
            PainType::Burning => "Burning",
            PainType::Aching => "Aching",
            PainType::Numbness => "Numbness",
            PainType::Tingling => "Tingling",
            PainType::Stiffness => "Stiffness",
            PainType::Other => "Other",
        }
    }
}

impl fmt::Display for PainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a free-form pain-type string. Total: never fails.
pub fn normalize_pain_type(raw: &str) -> PainType {
    PainType::from_str(raw)
}

// ---------------------------------------------------------------------------
// Legend
// ---------------------------------------------------------------------------

/// One row of the pain-type legend shown next to the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub pain_type: PainType,
    pub label: &'static str,
    pub color: HexColor,
}

/// The full legend in display order.
pub fn legend() -> Vec<LegendEntry> {
    PainType::ALL
        .into_iter()
        .map(|pain_type| LegendEntry {
            pain_type,
            label: pain_type.label(),
            color: pain_type.color(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_exact_tokens() {
        for pain_type in PainType::ALL {
            assert_eq!(normalize_pain_type(pain_type.as_str()), pain_type);
        }
    }

    #[test]
    fn classifies_loose_spelling() {
        assert_eq!(normalize_pain_type("  Throbbing "), PainType::Throbbing);
        assert_eq!(normalize_pain_type("BURNING!"), PainType::Burning);
    }

    #[test]
    fn unknown_and_empty_are_other() {
        assert_eq!(normalize_pain_type(""), PainType::Other);
        assert_eq!(normalize_pain_type("stabbing"), PainType::Other);
        assert_eq!(normalize_pain_type("sharp pain"), PainType::Other);
    }

    #[test]
    fn default_is_other() {
        assert_eq!(PainType::default(), PainType::Other);
    }

    #[test]
    fn colors_are_hex() {
        for pain_type in PainType::ALL {
            let color = pain_type.color();
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn other_shares_burning_color() {
        assert_eq!(PainType::Other.color(), PainType::Burning.color());
    }

    #[test]
    fn legend_lists_every_type_once() {
        let entries = legend();
        assert_eq!(entries.len(), PainType::ALL.len());
        assert_eq!(entries[0].label, "Sharp");
        assert_eq!(entries[8].pain_type, PainType::Other);
    }
}
