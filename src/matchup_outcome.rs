use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlateAppearanceOutcome {
    Single,
    Double,
    Triple,
    HomeRun,
    Walk,
    IntentionalWalk,
    HitByPitch,
    SacrificeFly,
    SacrificeBunt,
    CatcherInterference,
    // Outs, strikeouts, fielder's choice, errors: counted in PA and AB only.
    Other,
}

impl PlateAppearanceOutcome {
    /// Result strings as the matchup page prints them.
    pub const TAXONOMY: [(&'static str, PlateAppearanceOutcome); 10] = [
        ("Single", Self::Single),
        ("Double", Self::Double),
        ("Triple", Self::Triple),
        ("Home Run", Self::HomeRun),
        ("Walk", Self::Walk),
        ("Intentional Walk", Self::IntentionalWalk),
        ("Hit By Pitch", Self::HitByPitch),
        ("Sacrifice Fly", Self::SacrificeFly),
        ("Sacrifice Bunt", Self::SacrificeBunt),
        ("Catcher Interference", Self::CatcherInterference),
    ];

    pub fn label(self) -> &'static str {
        Self::TAXONOMY
            .iter()
            .find(|(_, outcome)| *outcome == self)
            .map(|(label, _)| *label)
            .unwrap_or("Other")
    }

    pub fn total_bases(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::HomeRun => 4,
            _ => 0,
        }
    }

    pub fn is_hit(self) -> bool {
        self.total_bases() > 0
    }

    pub fn is_walk(self) -> bool {
        matches!(self, Self::Walk | Self::IntentionalWalk)
    }

    pub fn is_hit_by_pitch(self) -> bool {
        self == Self::HitByPitch
    }

    pub fn is_sacrifice(self) -> bool {
        matches!(self, Self::SacrificeFly | Self::SacrificeBunt)
    }

    pub fn is_sacrifice_fly(self) -> bool {
        self == Self::SacrificeFly
    }

    pub fn is_plate_appearance(self) -> bool {
        !self.is_sacrifice()
    }

    pub fn is_at_bat(self) -> bool {
        !(self.is_walk()
            || self.is_hit_by_pitch()
            || self.is_sacrifice()
            || self == Self::CatcherInterference)
    }
}

/// Maps a raw result cell to an outcome.
pub trait OutcomeClassifier {
    fn classify(&self, raw: &str) -> PlateAppearanceOutcome;
}

/// Trimmed, case-sensitive lookup against [`PlateAppearanceOutcome::TAXONOMY`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl OutcomeClassifier for ExactMatch {
    fn classify(&self, raw: &str) -> PlateAppearanceOutcome {
        let text = raw.trim();
        PlateAppearanceOutcome::TAXONOMY
            .iter()
            .find(|(label, _)| *label == text)
            .map(|(_, outcome)| *outcome)
            .unwrap_or(PlateAppearanceOutcome::Other)
    }
}

/// Case-insensitive matcher for free-form play descriptions
/// ("Sac Fly to RF", "home run (walk-off)", "Single on a line drive").
///
/// Non-hit events match anywhere in the text. Hits only match as a prefix so
/// that "grounded into double play" stays an out.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatch;

impl OutcomeClassifier for FuzzyMatch {
    fn classify(&self, raw: &str) -> PlateAppearanceOutcome {
        let lowered = raw.to_lowercase().replace("walk-off", "").replace("walkoff", "");
        let text = lowered.trim();

        if text.contains("sacrifice fly") || text.contains("sac fly") {
            return PlateAppearanceOutcome::SacrificeFly;
        }
        if text.contains("sacrifice bunt") || text.contains("sac bunt") {
            return PlateAppearanceOutcome::SacrificeBunt;
        }
        if text.contains("intentional walk") || text == "ibb" {
            return PlateAppearanceOutcome::IntentionalWalk;
        }
        if text.contains("hit by pitch") || text == "hbp" {
            return PlateAppearanceOutcome::HitByPitch;
        }
        if text.contains("catcher interference") {
            return PlateAppearanceOutcome::CatcherInterference;
        }
        if text.starts_with("home run") || text.starts_with("homer") {
            return PlateAppearanceOutcome::HomeRun;
        }
        if starts_with_hit(text, "triple") {
            return PlateAppearanceOutcome::Triple;
        }
        if starts_with_hit(text, "double") {
            return PlateAppearanceOutcome::Double;
        }
        if text.starts_with("single") {
            return PlateAppearanceOutcome::Single;
        }
        if text.contains("walk") || text == "bb" {
            return PlateAppearanceOutcome::Walk;
        }
        PlateAppearanceOutcome::Other
    }
}

fn starts_with_hit(text: &str, word: &str) -> bool {
    let Some(rest) = text.strip_prefix(word) else {
        return false;
    };
    !rest.trim_start().starts_with("play")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    #[default]
    Exact,
    Fuzzy,
}

impl ClassifierMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "fuzzy" | "substring" => Some(Self::Fuzzy),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl OutcomeClassifier for ClassifierMode {
    fn classify(&self, raw: &str) -> PlateAppearanceOutcome {
        match self {
            Self::Exact => ExactMatch.classify(raw),
            Self::Fuzzy => FuzzyMatch.classify(raw),
        }
    }
}
