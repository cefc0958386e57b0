//! Anatomical region taxonomy and region-token normalization.
//!
//! Regions exist at two granularities: nine [`BroadRegion`]s that users pick
//! when logging, and the [`DetailedRegion`]s painted on the body model. Every
//! detailed region belongs to exactly one broad region, and the broad
//! expansions partition the detailed set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Token normalization
// ---------------------------------------------------------------------------

/// Canonicalize a free-form token.
///
/// Trims, lowercases, collapses every run of characters outside `[a-z0-9]`
/// into a single `_`, and strips leading/trailing underscores.
///
/// ```
/// use bodymap_core::regions::normalize_token;
///
/// assert_eq!(normalize_token("  Left Forearm!"), "left_forearm");
/// assert_eq!(normalize_token("--upper   back--"), "upper_back");
/// assert_eq!(normalize_token("!!!"), "");
/// ```
pub fn normalize_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// DetailedRegion
// ---------------------------------------------------------------------------

/// A fine-grained anatomical location rendered on the body model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailedRegion {
    Head,
    Neck,
    Chest,
    Back,
    Abdomen,
    LeftShoulder,
    LeftUpperArm,
    LeftForearm,
    LeftHand,
    RightShoulder,
    RightUpperArm,
    RightForearm,
    RightHand,
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
}

impl DetailedRegion {
    /// Every detailed region, in body order (axial, arms, legs).
    pub const ALL: [DetailedRegion; 19] = [
        DetailedRegion::Head,
        DetailedRegion::Neck,
        DetailedRegion::Chest,
        DetailedRegion::Back,
        DetailedRegion::Abdomen,
        DetailedRegion::LeftShoulder,
        DetailedRegion::LeftUpperArm,
        DetailedRegion::LeftForearm,
        DetailedRegion::LeftHand,
        DetailedRegion::RightShoulder,
        DetailedRegion::RightUpperArm,
        DetailedRegion::RightForearm,
        DetailedRegion::RightHand,
        DetailedRegion::LeftUpperLeg,
        DetailedRegion::LeftLowerLeg,
        DetailedRegion::LeftFoot,
        DetailedRegion::RightUpperLeg,
        DetailedRegion::RightLowerLeg,
        DetailedRegion::RightFoot,
    ];

    /// Canonical token.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailedRegion::Head => "head",
            DetailedRegion::Neck => "neck",
            DetailedRegion::Chest => "chest",
            DetailedRegion::Back => "back",
            DetailedRegion::Abdomen => "abdomen",
            DetailedRegion::LeftShoulder => "left_shoulder",
            DetailedRegion::LeftUpperArm => "left_upper_arm",
            DetailedRegion::LeftForearm => "left_forearm",
            DetailedRegion::LeftHand => "left_hand",
            DetailedRegion::RightShoulder => "right_shoulder",
            DetailedRegion::RightUpperArm => "right_upper_arm",
            DetailedRegion::RightForearm => "right_forearm",
            DetailedRegion::RightHand => "right_hand",
            DetailedRegion::LeftUpperLeg => "left_upper_leg",
            DetailedRegion::LeftLowerLeg => "left_lower_leg",
            DetailedRegion::LeftFoot => "left_foot",
            DetailedRegion::RightUpperLeg => "right_upper_leg",
            DetailedRegion::RightLowerLeg => "right_lower_leg",
            DetailedRegion::RightFoot => "right_foot",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DetailedRegion::Head => "Head",
            DetailedRegion::Neck => "Neck",
            DetailedRegion::Chest => "Chest",
            DetailedRegion::Back => "Back",
            DetailedRegion::Abdomen => "Abdomen",
            DetailedRegion::LeftShoulder => "Left shoulder",
            DetailedRegion::LeftUpperArm => "Left upper arm",
            DetailedRegion::LeftForearm => "Left forearm",
            DetailedRegion::LeftHand => "Left hand",
            DetailedRegion::RightShoulder => "Right shoulder",
            DetailedRegion::RightUpperArm => "Right upper arm",
            DetailedRegion::RightForearm => "Right forearm",
            DetailedRegion::RightHand => "Right hand",
            DetailedRegion::LeftUpperLeg => "Left upper leg",
            DetailedRegion::LeftLowerLeg => "Left lower leg",
            DetailedRegion::LeftFoot => "Left foot",
            DetailedRegion::RightUpperLeg => "Right upper leg",
            DetailedRegion::RightLowerLeg => "Right lower leg",
            DetailedRegion::RightFoot => "Right foot",
        }
    }

    /// Look up an already-canonical token. Returns `None` for anything that is
    /// not exactly one of the detailed tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        DetailedRegion::ALL
            .into_iter()
            .find(|region| region.as_str() == token)
    }

    /// The broad region this detailed region belongs to.
    pub fn broad(&self) -> BroadRegion {
        match self {
            DetailedRegion::Head => BroadRegion::Head,
            DetailedRegion::Neck => BroadRegion::Neck,
            DetailedRegion::Chest => BroadRegion::Chest,
            DetailedRegion::Back => BroadRegion::Back,
            DetailedRegion::Abdomen => BroadRegion::Abdomen,
            DetailedRegion::LeftShoulder
            | DetailedRegion::LeftUpperArm
            | DetailedRegion::LeftForearm
            | DetailedRegion::LeftHand => BroadRegion::LeftArm,
            DetailedRegion::RightShoulder
            | DetailedRegion::RightUpperArm
            | DetailedRegion::RightForearm
            | DetailedRegion::RightHand => BroadRegion::RightArm,
            DetailedRegion::LeftUpperLeg | DetailedRegion::LeftLowerLeg | DetailedRegion::LeftFoot => {
                BroadRegion::LeftLeg
            }
            DetailedRegion::RightUpperLeg
            | DetailedRegion::RightLowerLeg
            | DetailedRegion::RightFoot => BroadRegion::RightLeg,
        }
    }
}

impl fmt::Display for DetailedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailedRegion {
    type Err = CoreError;

    /// Strict parse: normalizes the input but never expands broad regions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_region_token(s).ok_or_else(|| CoreError::UnknownToken {
            kind: "detailed region",
            value: s.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// BroadRegion
// ---------------------------------------------------------------------------

/// A coarse anatomical grouping used when logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadRegion {
    Head,
    Neck,
    Chest,
    Abdomen,
    Back,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

const HEAD: &[DetailedRegion] = &[DetailedRegion::Head];
const NECK: &[DetailedRegion] = &[DetailedRegion::Neck];
const CHEST: &[DetailedRegion] = &[DetailedRegion::Chest];
const ABDOMEN: &[DetailedRegion] = &[DetailedRegion::Abdomen];
const BACK: &[DetailedRegion] = &[DetailedRegion::Back];
const LEFT_ARM: &[DetailedRegion] = &[
    DetailedRegion::LeftShoulder,
    DetailedRegion::LeftUpperArm,
    DetailedRegion::LeftForearm,
    DetailedRegion::LeftHand,
];
const RIGHT_ARM: &[DetailedRegion] = &[
    DetailedRegion::RightShoulder,
    DetailedRegion::RightUpperArm,
    DetailedRegion::RightForearm,
    DetailedRegion::RightHand,
];
const LEFT_LEG: &[DetailedRegion] = &[
    DetailedRegion::LeftUpperLeg,
    DetailedRegion::LeftLowerLeg,
    DetailedRegion::LeftFoot,
];
const RIGHT_LEG: &[DetailedRegion] = &[
    DetailedRegion::RightUpperLeg,
    DetailedRegion::RightLowerLeg,
    DetailedRegion::RightFoot,
];

impl BroadRegion {
    /// Every broad region, in logging-form order.
    pub const ALL: [BroadRegion; 9] = [
        BroadRegion::Head,
        BroadRegion::Neck,
        BroadRegion::Chest,
        BroadRegion::Abdomen,
        BroadRegion::Back,
        BroadRegion::LeftArm,
        BroadRegion::RightArm,
        BroadRegion::LeftLeg,
        BroadRegion::RightLeg,
    ];

    /// Canonical token.
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadRegion::Head => "head",
            BroadRegion::Neck => "neck",
            BroadRegion::Chest => "chest",
            BroadRegion::Abdomen => "abdomen",
            BroadRegion::Back => "back",
            BroadRegion::LeftArm => "left_arm",
            BroadRegion::RightArm => "right_arm",
            BroadRegion::LeftLeg => "left_leg",
            BroadRegion::RightLeg => "right_leg",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            BroadRegion::Head => "Head",
            BroadRegion::Neck => "Neck",
            BroadRegion::Chest => "Chest",
            BroadRegion::Abdomen => "Abdomen",
            BroadRegion::Back => "Back",
            BroadRegion::LeftArm => "Left arm",
            BroadRegion::RightArm => "Right arm",
            BroadRegion::LeftLeg => "Left leg",
            BroadRegion::RightLeg => "Right leg",
        }
    }

    /// Resolve an already-normalized token to a broad region.
    ///
    /// Axial regions match exactly. Any other token with a `left_`/`right_`
    /// prefix resolves to that side's leg when it mentions `leg` or `foot`,
    /// and to that side's arm otherwise.
    pub fn resolve(token: &str) -> Option<Self> {
        match token {
            "head" => return Some(BroadRegion::Head),
            "neck" => return Some(BroadRegion::Neck),
            "chest" => return Some(BroadRegion::Chest),
            "back" => return Some(BroadRegion::Back),
            "abdomen" => return Some(BroadRegion::Abdomen),
            _ => {}
        }

        let is_leg = token.contains("leg") || token.contains("foot");
        if token.starts_with("left_") {
            Some(if is_leg { BroadRegion::LeftLeg } else { BroadRegion::LeftArm })
        } else if token.starts_with("right_") {
            Some(if is_leg { BroadRegion::RightLeg } else { BroadRegion::RightArm })
        } else {
            None
        }
    }

    /// The detailed regions covered by this broad region.
    ///
    /// Axial regions expand to themselves, arms to shoulder/upper arm/
    /// forearm/hand, legs to upper leg/lower leg/foot.
    pub fn detailed(&self) -> &'static [DetailedRegion] {
        match self {
            BroadRegion::Head => HEAD,
            BroadRegion::Neck => NECK,
            BroadRegion::Chest => CHEST,
            BroadRegion::Abdomen => ABDOMEN,
            BroadRegion::Back => BACK,
            BroadRegion::LeftArm => LEFT_ARM,
            BroadRegion::RightArm => RIGHT_ARM,
            BroadRegion::LeftLeg => LEFT_LEG,
            BroadRegion::RightLeg => RIGHT_LEG,
        }
    }
}

impl fmt::Display for BroadRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadRegion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(s);
        BroadRegion::ALL
            .into_iter()
            .find(|region| region.as_str() == token)
            .ok_or_else(|| CoreError::UnknownToken {
                kind: "broad region",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Normalization entry points
// ---------------------------------------------------------------------------

/// Normalize a raw region string to a detailed region, if it names one.
pub fn normalize_region_token(raw: &str) -> Option<DetailedRegion> {
    DetailedRegion::from_token(&normalize_token(raw))
}

/// Expand a raw region or tag string into the detailed regions it covers.
///
/// A string naming a detailed region yields exactly that region. Otherwise the
/// normalized token is resolved as a broad region (see
/// [`BroadRegion::resolve`]) and expanded. Unrecognized strings yield an empty
/// vector.
pub fn expand_to_detailed(raw: &str) -> Vec<DetailedRegion> {
    let token = normalize_token(raw);
    if let Some(region) = DetailedRegion::from_token(&token) {
        return vec![region];
    }
    BroadRegion::resolve(&token)
        .map(|broad| broad.detailed().to_vec())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Region list
// ---------------------------------------------------------------------------

/// One row of the region picker, grouped under its broad region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionEntry {
    pub region: DetailedRegion,
    pub label: &'static str,
    pub broad: BroadRegion,
    pub broad_label: &'static str,
}

/// Every detailed region in picker order: broad regions in logging-form
/// order, each followed by its detailed regions.
pub fn region_list() -> Vec<RegionEntry> {
    BroadRegion::ALL
        .into_iter()
        .flat_map(|broad| {
            broad.detailed().iter().map(move |region| RegionEntry {
                region: *region,
                label: region.label(),
                broad,
                broad_label: broad.label(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use assert_matches::assert_matches;

    use super::*;

    // -- normalize_token -------------------------------------------------------

    #[test]
    fn normalize_collapses_separator_runs() {
        assert_eq!(normalize_token("left -- upper arm"), "left_upper_arm");
    }

    #[test]
    fn normalize_strips_edge_separators() {
        assert_eq!(normalize_token("__chest__"), "chest");
        assert_eq!(normalize_token("  (neck)  "), "neck");
    }

    #[test]
    fn normalize_keeps_digits() {
        assert_eq!(normalize_token("L5 Vertebra"), "l5_vertebra");
    }

    #[test]
    fn normalize_empty_and_symbol_only() {
        assert_eq!(normalize_token(""), "");
        assert_eq!(normalize_token("   "), "");
        assert_eq!(normalize_token("?!"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["Left Forearm!", " ankle  area ", "RIGHT_FOOT", "x"] {
            let once = normalize_token(raw);
            assert_eq!(normalize_token(&once), once);
        }
    }

    // -- DetailedRegion ---------------------------------------------------------

    #[test]
    fn detailed_tokens_round_trip() {
        for region in DetailedRegion::ALL {
            assert_eq!(DetailedRegion::from_token(region.as_str()), Some(region));
            assert_eq!(normalize_region_token(region.as_str()), Some(region));
        }
    }

    #[test]
    fn detailed_from_str_rejects_broad_tokens() {
        assert_matches!(
            "left_arm".parse::<DetailedRegion>(),
            Err(CoreError::UnknownToken { kind: "detailed region", .. })
        );
    }

    #[test]
    fn detailed_from_str_accepts_loose_spelling() {
        assert_eq!(
            "Right Lower-Leg".parse::<DetailedRegion>().unwrap(),
            DetailedRegion::RightLowerLeg
        );
    }

    #[test]
    fn detailed_serializes_as_token() {
        let json = serde_json::to_string(&DetailedRegion::LeftUpperArm).unwrap();
        assert_eq!(json, "\"left_upper_arm\"");
    }

    #[test]
    fn detailed_broad_matches_expansion() {
        for region in DetailedRegion::ALL {
            assert!(region.broad().detailed().contains(&region), "{region}");
        }
    }

    // -- BroadRegion ------------------------------------------------------------

    #[test]
    fn broad_resolve_axial_exact() {
        assert_eq!(BroadRegion::resolve("head"), Some(BroadRegion::Head));
        assert_eq!(BroadRegion::resolve("abdomen"), Some(BroadRegion::Abdomen));
        assert_eq!(BroadRegion::resolve("upper_back"), None);
    }

    #[test]
    fn broad_resolve_sided_tokens() {
        assert_eq!(BroadRegion::resolve("left_leg"), Some(BroadRegion::LeftLeg));
        assert_eq!(BroadRegion::resolve("right_foot_arch"), Some(BroadRegion::RightLeg));
        assert_eq!(BroadRegion::resolve("right_arm"), Some(BroadRegion::RightArm));
        assert_eq!(BroadRegion::resolve("left_elbow"), Some(BroadRegion::LeftArm));
    }

    #[test]
    fn broad_resolve_requires_side_prefix() {
        assert_eq!(BroadRegion::resolve("left"), None);
        assert_eq!(BroadRegion::resolve("leg"), None);
        assert_eq!(BroadRegion::resolve("leftleg"), None);
    }

    #[test]
    fn broad_from_str() {
        assert_eq!("Left Arm".parse::<BroadRegion>().unwrap(), BroadRegion::LeftArm);
        assert!("shoulder".parse::<BroadRegion>().is_err());
    }

    #[test]
    fn broad_expansion_sizes() {
        assert_eq!(BroadRegion::Head.detailed().len(), 1);
        assert_eq!(BroadRegion::LeftArm.detailed().len(), 4);
        assert_eq!(BroadRegion::RightLeg.detailed().len(), 3);
    }

    #[test]
    fn broad_expansions_partition_detailed_set() {
        let mut seen = BTreeSet::new();
        for broad in BroadRegion::ALL {
            for region in broad.detailed() {
                assert!(seen.insert(*region), "{region} appears twice");
                assert_eq!(region.broad(), broad);
            }
        }
        let all: BTreeSet<_> = DetailedRegion::ALL.into_iter().collect();
        assert_eq!(seen, all);
    }

    // -- region_list ------------------------------------------------------------

    #[test]
    fn region_list_covers_every_detailed_region_once() {
        let entries = region_list();
        assert_eq!(entries.len(), DetailedRegion::ALL.len());
        let regions: BTreeSet<_> = entries.iter().map(|e| e.region).collect();
        assert_eq!(regions.len(), DetailedRegion::ALL.len());
        for entry in &entries {
            assert_eq!(entry.broad, entry.region.broad());
        }
    }

    #[test]
    fn region_list_carries_labels() {
        let entries = region_list();
        assert_eq!(entries[0].label, "Head");
        let forearm = entries
            .iter()
            .find(|e| e.region == DetailedRegion::LeftForearm)
            .unwrap();
        assert_eq!(forearm.label, "Left forearm");
        assert_eq!(forearm.broad_label, "Left arm");

        let json = serde_json::to_value(forearm).unwrap();
        assert_eq!(json["region"], "left_forearm");
        assert_eq!(json["broad"], "left_arm");
    }

    // -- expand_to_detailed -------------------------------------------------------

    #[test]
    fn expand_detailed_token_is_not_widened() {
        assert_eq!(expand_to_detailed("Left Forearm!"), vec![DetailedRegion::LeftForearm]);
    }

    #[test]
    fn expand_broad_arm() {
        assert_eq!(
            expand_to_detailed("left arm"),
            vec![
                DetailedRegion::LeftShoulder,
                DetailedRegion::LeftUpperArm,
                DetailedRegion::LeftForearm,
                DetailedRegion::LeftHand,
            ]
        );
    }

    #[test]
    fn expand_broad_leg() {
        assert_eq!(
            expand_to_detailed("RIGHT_LEG"),
            vec![
                DetailedRegion::RightUpperLeg,
                DetailedRegion::RightLowerLeg,
                DetailedRegion::RightFoot,
            ]
        );
    }

    #[test]
    fn expand_unknown_is_empty() {
        assert!(expand_to_detailed("ankle area").is_empty());
        assert!(expand_to_detailed("").is_empty());
        assert!(expand_to_detailed("sharp").is_empty());
    }
}
