use chrono::NaiveDate;

use mlb_trending::batting_log::{BattingLogSource, DailyBattingLine, SqliteBattingLog};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
}

fn line(id: &str, name: &str, team: &str, day: u32, hits: u32, at_bats: u32) -> DailyBattingLine {
    DailyBattingLine {
        player_id: id.to_string(),
        player_name: name.to_string(),
        team: team.to_string(),
        game_date: date(day),
        hits,
        at_bats,
        home_runs: 0,
        rbi: 0,
        runs: 0,
        walks: 0,
        strikeouts: 0,
    }
}

fn seeded_log() -> SqliteBattingLog {
    let mut log = SqliteBattingLog::open_in_memory().expect("in-memory db");
    let mut lines = Vec::new();
    // Ramos: 12-for-24 over six games.
    for day in 1..=6 {
        lines.push(line("ID671218", "Heliot Ramos", "San Francisco Giants", day, 2, 4));
    }
    // Rodriguez: 9-for-24 with six walks.
    for day in 1..=6 {
        let mut l = line("ID677594", "Julio Rodriguez", "Seattle Mariners", day, 1, 4);
        if day % 2 == 0 {
            l.hits = 2;
        }
        l.walks = 1;
        l.home_runs = u32::from(day == 3);
        lines.push(l);
    }
    // Bench bat: too few at-bats for the leaderboard.
    lines.push(line("ID600001", "Ramon Backup", "Seattle Mariners", 5, 3, 3));
    log.insert_daily_lines(&lines).expect("seed lines");
    log
}

#[test]
fn duplicate_lines_are_ignored() {
    let mut log = SqliteBattingLog::open_in_memory().expect("in-memory db");
    let first = line("ID1", "A Player", "Team", 1, 1, 4);
    assert_eq!(log.insert_daily_lines(&[first.clone()]).expect("insert"), 1);

    let mut corrected = first;
    corrected.hits = 4;
    assert_eq!(log.insert_daily_lines(&[corrected]).expect("insert"), 0);

    let totals = log.player_totals("ID1", None).expect("totals");
    assert_eq!(totals[0].hits, 1);
}

#[test]
fn search_is_case_insensitive_substring() {
    let log = seeded_log();
    let found = log.search_players("RAM").expect("search");
    let names = found.iter().map(|p| p.player_name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Heliot Ramos", "Ramon Backup"]);
    assert_eq!(found[0].player_id, "ID671218");
}

#[test]
fn blank_search_returns_nothing() {
    let log = seeded_log();
    assert!(log.search_players("   ").expect("search").is_empty());
}

#[test]
fn trending_orders_by_average_and_applies_minimum() {
    let log = seeded_log();
    let hot = log.trending(date(1), 20).expect("trending");
    assert_eq!(hot.len(), 2);
    assert_eq!(hot[0].player_name, "Heliot Ramos");
    assert_eq!(hot[0].hits, 12);
    assert_eq!(hot[0].at_bats, 24);
    assert_eq!(hot[0].avg, "0.500");
    assert_eq!(hot[1].player_name, "Julio Rodriguez");
    assert_eq!(hot[1].avg, "0.375");
    assert_eq!(hot[1].home_runs, 1);
}

#[test]
fn trending_window_excludes_older_games() {
    let log = seeded_log();
    // Days 4..=6 only: 12 at-bats each, below the minimum.
    assert!(log.trending(date(4), 20).expect("trending").is_empty());
    assert_eq!(log.trending(date(4), 10).expect("trending").len(), 2);
}

#[test]
fn player_totals_compute_average_and_obp() {
    let log = seeded_log();
    let totals = log.player_totals("ID677594", None).expect("totals");
    assert_eq!(totals.len(), 1);
    let julio = &totals[0];
    assert_eq!(julio.hits, 9);
    assert_eq!(julio.at_bats, 24);
    assert_eq!(julio.walks, 6);
    assert_eq!(julio.avg, "0.375");
    assert_eq!(julio.obp, "0.500");

    let recent = log.player_totals("ID677594", Some(date(5))).expect("totals");
    assert_eq!(recent[0].at_bats, 8);
}

#[test]
fn traded_player_has_one_row_per_team() {
    let mut log = SqliteBattingLog::open_in_memory().expect("in-memory db");
    log.insert_daily_lines(&[
        line("ID9", "Moved Guy", "Old Club", 1, 1, 4),
        line("ID9", "Moved Guy", "New Club", 2, 0, 3),
    ])
    .expect("insert");
    let totals = log.player_totals("ID9", None).expect("totals");
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].team, "New Club");
    assert_eq!(totals[0].avg, "0.000");
}

#[test]
fn unknown_player_has_no_totals() {
    let log = seeded_log();
    assert!(log.player_totals("ID0", None).expect("totals").is_empty());
}
