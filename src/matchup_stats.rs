use serde::Serialize;

use crate::matchup::MatchupError;
use crate::matchup_locate::MatchupTable;
use crate::matchup_outcome::{OutcomeClassifier, PlateAppearanceOutcome};

// Rows with fewer cells are summary/separator rows.
pub const MIN_ROW_CELLS: usize = 6;
pub const RESULT_CELL_INDEX: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchupCounters {
    pub plate_appearances: u32,
    pub at_bats: u32,
    pub hits: u32,
    pub walks: u32,
    pub hit_by_pitch: u32,
    pub total_bases: u32,
    pub sacrifice_flies: u32,
}

impl MatchupCounters {
    // Contributions are independent: a home run adds to PA, AB, H and TB.
    pub fn record(&mut self, outcome: PlateAppearanceOutcome) {
        if outcome.is_plate_appearance() {
            self.plate_appearances += 1;
        }
        if outcome.is_at_bat() {
            self.at_bats += 1;
        }
        if outcome.is_hit() {
            self.hits += 1;
        }
        if outcome.is_walk() {
            self.walks += 1;
        }
        if outcome.is_hit_by_pitch() {
            self.hit_by_pitch += 1;
        }
        if outcome.is_sacrifice_fly() {
            self.sacrifice_flies += 1;
        }
        self.total_bases += outcome.total_bases();
    }

    pub fn times_on_base(&self) -> u32 {
        self.hits + self.walks + self.hit_by_pitch
    }

    /// Plate appearances plus sacrifice flies, which are kept out of PA.
    pub fn on_base_opportunities(&self) -> u32 {
        self.plate_appearances + self.sacrifice_flies
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchupStatistics {
    pub counters: MatchupCounters,
    pub batting_average: f64,
    pub on_base_percentage: f64,
    pub slugging_percentage: f64,
    pub on_base_plus_slugging: f64,
}

impl MatchupStatistics {
    pub fn from_counters(counters: MatchupCounters) -> Self {
        let batting_average = ratio(counters.hits, counters.at_bats);
        let on_base_percentage = ratio(counters.times_on_base(), counters.on_base_opportunities());
        let slugging_percentage = ratio(counters.total_bases, counters.at_bats);
        Self {
            counters,
            batting_average,
            on_base_percentage,
            slugging_percentage,
            on_base_plus_slugging: on_base_percentage + slugging_percentage,
        }
    }

    pub fn stat_line(&self) -> MatchupStatLine {
        let c = &self.counters;
        MatchupStatLine {
            plate_appearances: c.plate_appearances,
            at_bats: c.at_bats,
            hits: c.hits,
            walks: c.walks,
            hit_by_pitch: c.hit_by_pitch,
            total_bases: c.total_bases,
            avg: format_rate(self.batting_average),
            obp: format_rate(self.on_base_percentage),
            slg: format_rate(self.slugging_percentage),
            ops: format_rate(self.on_base_plus_slugging),
        }
    }
}

/// Wire shape of a matchup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchupStatLine {
    #[serde(rename = "PA")]
    pub plate_appearances: u32,
    #[serde(rename = "AB")]
    pub at_bats: u32,
    #[serde(rename = "H")]
    pub hits: u32,
    #[serde(rename = "BB")]
    pub walks: u32,
    #[serde(rename = "HBP")]
    pub hit_by_pitch: u32,
    #[serde(rename = "totalBases")]
    pub total_bases: u32,
    #[serde(rename = "AVG")]
    pub avg: String,
    #[serde(rename = "OBP")]
    pub obp: String,
    #[serde(rename = "SLG")]
    pub slg: String,
    #[serde(rename = "OPS")]
    pub ops: String,
}

pub fn aggregate(
    table: &MatchupTable,
    classifier: &dyn OutcomeClassifier,
) -> Result<MatchupStatistics, MatchupError> {
    let counters = count_outcomes(table, classifier);
    if counters.plate_appearances == 0 {
        return Err(MatchupError::NoPlateAppearances);
    }
    Ok(MatchupStatistics::from_counters(counters))
}

pub fn count_outcomes(table: &MatchupTable, classifier: &dyn OutcomeClassifier) -> MatchupCounters {
    let mut counters = MatchupCounters::default();
    for row in table.data_rows() {
        if row.len() < MIN_ROW_CELLS {
            continue;
        }
        counters.record(classifier.classify(&row[RESULT_CELL_INDEX]));
    }
    counters
}

/// Zero when the denominator is zero.
pub fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    f64::from(numerator) / f64::from(denominator)
}

pub fn format_rate(value: f64) -> String {
    format!("{value:.3}")
}
