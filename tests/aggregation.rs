//! Integration tests for period filtering, rankings, head-to-head and the leaderboard.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use domino_score_web::{
    aggregate_rankings, compare_head_to_head, daily_player_summary, entity_stats,
    filter_games_by_period, leaderboard, EntityKind, EntityRef, GameMode, GameRecord, Medal,
    Period, ScoreError, Scoreboard, StreakKind,
};
use rstest::rstest;
use uuid::Uuid;

fn tz() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

/// Local time in a +02:00 zone, as stored (UTC).
fn local(m: u32, d: u32, h: u32) -> DateTime<Utc> {
    tz().with_ymd_and_hms(2024, m, d, h, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Monday 2024-06-03, evening.
fn monday() -> DateTime<FixedOffset> {
    tz().with_ymd_and_hms(2024, 6, 3, 21, 0, 0).unwrap()
}

fn game(
    mode: GameMode,
    winner: EntityRef,
    loser: EntityRef,
    special: bool,
    date: DateTime<Utc>,
) -> GameRecord {
    GameRecord {
        id: Uuid::new_v4(),
        game_mode: mode,
        winner,
        loser,
        winner_score: 150,
        loser_score: if special { 20 } else { 100 },
        date,
        duration_ms: 300_000,
        is_special_win: special,
        game_value: if special { 2 } else { 1 },
        was_comeback: false,
    }
}

fn single(winner: &str, loser: &str, special: bool, date: DateTime<Utc>) -> GameRecord {
    game(
        GameMode::Single,
        EntityRef::player(winner),
        EntityRef::player(loser),
        special,
        date,
    )
}

fn board(names: &[&str]) -> Scoreboard {
    let mut board = Scoreboard::default();
    for name in names {
        board.add_player(name).unwrap();
    }
    board
}

#[test]
fn weekly_excludes_last_saturday_on_monday() {
    let games = vec![
        single("Ann", "Ben", false, local(6, 1, 20)), // Saturday
        single("Ann", "Ben", false, local(6, 2, 0)),  // Sunday midnight
        single("Ben", "Ann", false, local(6, 3, 9)),  // Monday
    ];
    let weekly = filter_games_by_period(&games, Period::Weekly, &monday());
    assert_eq!(weekly.len(), 2);
    assert!(weekly.iter().all(|g| g.date >= local(6, 2, 0)));
}

#[rstest]
#[case(Period::Daily, 1)]
#[case(Period::Weekly, 2)]
#[case(Period::Monthly, 3)]
#[case(Period::AllTime, 4)]
fn period_filter_counts(#[case] period: Period, #[case] expected: usize) {
    let games = vec![
        single("Ann", "Ben", false, local(5, 31, 12)),
        single("Ann", "Ben", false, local(6, 1, 12)),
        single("Ann", "Ben", false, local(6, 2, 12)),
        single("Ann", "Ben", false, local(6, 3, 12)),
    ];
    assert_eq!(
        filter_games_by_period(&games, period, &monday()).len(),
        expected
    );
}

#[test]
fn rankings_order_by_rate_then_wins_with_medals() {
    let mut b = board(&["Ann", "Ben", "Cy", "Di", "Idle"]);
    let d = local(6, 3, 12);
    b.games = vec![
        single("Ann", "Ben", false, d),
        single("Ann", "Ben", false, d),
        single("Cy", "Ben", false, d),
        single("Ben", "Di", false, d),
        single("Di", "Cy", false, d),
    ];
    let rows = aggregate_rankings(&b, &b.games, EntityKind::Player);
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    // Ann 2-0, Cy 1-1 and Di 1-1 (tie broken by name), Ben 1-3. Idle never played.
    assert_eq!(names, ["Ann", "Cy", "Di", "Ben"]);
    assert_eq!(rows[0].medal, Some(Medal::Gold));
    assert_eq!(rows[1].medal, Some(Medal::Silver));
    assert_eq!(rows[2].medal, Some(Medal::Bronze));
    assert_eq!(rows[3].medal, None);
    assert_eq!(rows[3].rank, 4);
    assert!((rows[3].win_rate - 0.25).abs() < 1e-9);
}

#[test]
fn special_wins_weigh_double_in_rates() {
    let mut b = board(&["Ann", "Ben"]);
    let d = local(6, 3, 12);
    b.games = vec![single("Ann", "Ben", true, d), single("Ben", "Ann", false, d)];
    let ann = entity_stats(&b.teams, &b.games, &EntityRef::player("Ann"));
    assert_eq!((ann.wins, ann.losses), (2, 1));
    assert_eq!((ann.specials_given, ann.specials_received), (1, 0));
    assert!((ann.win_rate() - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn players_are_credited_for_team_games() {
    let mut b = Scoreboard::default();
    let ab = b.create_team("Al", "Bo").unwrap();
    let cd = b.create_team("Cy", "Di").unwrap();
    b.games = vec![game(
        GameMode::Team,
        EntityRef::Team(ab.id),
        EntityRef::Team(cd.id),
        false,
        local(6, 3, 12),
    )];

    let players = aggregate_rankings(&b, &b.games, EntityKind::Player);
    assert_eq!(players.len(), 4);
    let al = players.iter().find(|r| r.name == "Al").unwrap();
    assert_eq!((al.stats.wins, al.stats.losses), (1, 0));

    let teams = aggregate_rankings(&b, &b.games, EntityKind::Team);
    assert_eq!(teams[0].name, "Al & Bo");
    assert_eq!(teams[1].name, "Cy & Di");
}

#[test]
fn head_to_head_compares_overall_records() {
    let mut b = board(&["Ann", "Ben", "Cy"]);
    b.games = vec![
        single("Ann", "Ben", false, local(6, 3, 10)),
        single("Ann", "Cy", false, local(6, 3, 11)),
        single("Cy", "Ben", false, local(5, 20, 11)),
    ];
    let h2h = compare_head_to_head(
        &b,
        &EntityRef::player("Ann"),
        &EntityRef::player("Ben"),
        Period::Weekly,
        &monday(),
    )
    .unwrap();
    assert_eq!(h2h.a.stats.wins, 2);
    assert_eq!(h2h.a.win_rate, Some(1.0));
    assert_eq!((h2h.b.stats.wins, h2h.b.stats.losses), (0, 1));

    let idle = compare_head_to_head(
        &b,
        &EntityRef::player("Cy"),
        &EntityRef::player("Ben"),
        Period::Daily,
        &tz().with_ymd_and_hms(2024, 6, 4, 9, 0, 0).unwrap(),
    )
    .unwrap();
    assert_eq!(idle.a.win_rate, None);
}

#[test]
fn head_to_head_rejects_same_or_unknown_entity() {
    let b = board(&["Ann"]);
    let ann = EntityRef::player("Ann");
    assert!(matches!(
        compare_head_to_head(&b, &ann, &ann, Period::AllTime, &monday()),
        Err(ScoreError::Validation(_))
    ));
    assert!(matches!(
        compare_head_to_head(
            &b,
            &ann,
            &EntityRef::Team(Uuid::new_v4()),
            Period::AllTime,
            &monday()
        ),
        Err(ScoreError::NotFound(_))
    ));
}

#[test]
fn leaderboard_collects_streaks_and_specials() {
    let mut b = board(&["Ann", "Ben", "Cy"]);
    b.games = vec![
        single("Ann", "Ben", false, local(6, 3, 10)),
        single("Ann", "Cy", true, local(6, 3, 11)),
        single("Ann", "Ben", false, local(6, 3, 12)),
        single("Cy", "Ben", false, local(6, 3, 13)),
        // Before this week: not counted.
        single("Ben", "Ann", true, local(5, 1, 13)),
    ];
    let lb = leaderboard(&b, Period::Weekly, &monday());

    assert_eq!(lb.player_rankings[0].name, "Ann");
    assert!(lb.team_rankings.is_empty());

    assert_eq!(lb.winning_streaks.len(), 1);
    assert_eq!(lb.winning_streaks[0].name, "Ann");
    assert_eq!(lb.winning_streaks[0].kind, StreakKind::Win);
    assert_eq!(lb.winning_streaks[0].length, 4);

    assert_eq!(lb.losing_streaks.len(), 1);
    assert_eq!(lb.losing_streaks[0].name, "Ben");
    assert_eq!(lb.losing_streaks[0].length, 3);

    assert_eq!(lb.most_specials_given.len(), 1);
    assert_eq!(lb.most_specials_given[0].name, "Ann");
    assert_eq!(lb.most_specials_received[0].name, "Cy");
}

#[test]
fn daily_summary_lists_todays_games_per_player() {
    let mut b = Scoreboard::default();
    let ab = b.create_team("Al", "Bo").unwrap();
    let cd = b.create_team("Cy", "Di").unwrap();
    let gone = b.create_team("Gus", "Hal").unwrap();
    b.delete_team(gone.id).unwrap();
    b.games = vec![
        game(
            GameMode::Team,
            EntityRef::Team(ab.id),
            EntityRef::Team(cd.id),
            true,
            local(6, 3, 12),
        ),
        // Eve and Zed were never registered but still get a line.
        single("Eve", "Al", false, local(6, 3, 10)),
        game(
            GameMode::Team,
            EntityRef::Team(gone.id),
            EntityRef::Team(cd.id),
            false,
            local(6, 3, 13),
        ),
        // Yesterday.
        single("Zed", "Al", false, local(6, 2, 12)),
    ];

    let summary = daily_player_summary(&b, &monday());
    let names: Vec<&str> = summary.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Al", "Bo", "Cy", "Di", "Eve"]);

    let al = &summary[0];
    assert_eq!((al.wins, al.losses), (2, 1));
    assert_eq!(al.games.len(), 2);
    // Lines follow game time: the 10:00 single before the 12:00 team game.
    assert!(!al.games[0].won);
    assert_eq!(al.games[0].partner, None);
    assert_eq!(al.games[0].opponents, "Eve");
    assert_eq!((al.games[0].own_score, al.games[0].opponent_score), (100, 150));
    let team_line = &al.games[1];
    assert!(team_line.won && team_line.is_special_win);
    assert_eq!(team_line.partner.as_deref(), Some("Bo"));
    assert_eq!(team_line.opponents, "Cy & Di");

    let di = &summary[3];
    assert_eq!((di.wins, di.losses), (0, 2));
    assert_eq!(di.games.len(), 1);
    assert_eq!(di.games[0].partner.as_deref(), Some("Cy"));
    assert_eq!(di.games[0].opponents, "Al & Bo");
    assert_eq!((di.games[0].own_score, di.games[0].opponent_score), (20, 150));

    assert_eq!((summary[4].wins, summary[4].losses), (1, 0));
}

#[test]
fn daily_summary_is_empty_without_games_today() {
    let mut b = board(&["Ann", "Ben"]);
    b.games = vec![single("Ann", "Ben", false, local(6, 2, 23))];
    assert!(daily_player_summary(&b, &monday()).is_empty());
}
