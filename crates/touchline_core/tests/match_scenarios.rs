//! Match Scenario Tests
//!
//! Drives whole matches through the public API:
//! 1. Two halves with goals either side of the break
//! 2. Missed goals filed after a period has closed
//! 3. Restart mid-period from the file store
//! 4. Arbitrary start/end sequences keep one start and one end per period

use proptest::prelude::*;
use tempfile::tempdir;

use touchline_core::export::event_line;
use touchline_core::summary::goal_minute;
use touchline_core::time::format_hms;
use touchline_core::{
    AgeGroup, EndOutcome, EventKind, ExportOptions, FileStore, ManualClock, MatchConfig,
    MatchPhase, MatchTracker, Period, PeriodFormat, Side, TickOutcome, TimeOfDay,
};

fn halves_of_ten() -> MatchConfig {
    MatchConfig::for_age_group(AgeGroup::U11, "Home", "Away")
        .unwrap()
        .with_format(PeriodFormat::Halves)
        .unwrap()
        .with_period_length_secs(600)
        .unwrap()
}

#[test]
fn test_two_halves_one_all() {
    let clock = ManualClock::at_kickoff();
    let mut t = MatchTracker::new(halves_of_ten(), clock.clone());

    t.start_period(Period::H1).unwrap();
    clock.advance_secs(342);
    assert_eq!(t.clock_display().as_deref(), Some("05:42"));
    let home_goal = t.record_goal(Side::Home, Some(3), false, None).unwrap();

    clock.advance_secs(258);
    assert!(matches!(t.tick(), TickOutcome::PeriodEnded { .. }));
    let h1_end = t.ledger().period_end(Period::H1).unwrap();
    assert_eq!(format_hms(h1_end.cumulative_secs), "00:10:00");

    clock.advance_secs(300);
    t.start_period(Period::H2).unwrap();
    let away_goal = t.record_goal(Side::Away, None, false, None).unwrap();
    let away = t.ledger().get(away_goal).unwrap();
    assert_eq!(format_hms(away.cumulative_secs), "00:10:00");
    assert_eq!(goal_minute(away, t.ledger(), 600), 11);

    let home = t.ledger().get(home_goal).unwrap();
    assert_eq!(goal_minute(home, t.ledger(), 600), 6);
    assert_eq!(home.timestamp, TimeOfDay::from_hms(18, 5, 42));

    assert_eq!(
        t.end_period(None).unwrap(),
        EndOutcome::Ended {
            period: Period::H2,
            match_complete: true
        }
    );
    assert!(t.ledger().has_match_end());
    assert_eq!(t.phase(), MatchPhase::Complete);

    let text = t.export_text(ExportOptions::events_only(true), &[]);
    assert!(text.starts_with("Home 1\u{2013}1 Away\n"));
    assert!(text.contains("Goal - Home (#3 Player 3) - 18:05:42 [00:05:42]"));
    assert!(text.ends_with("Match End - 18:15:00 [00:20:00]\n"));
}

#[test]
fn test_missed_goal_lands_before_period_end() {
    let clock = ManualClock::at_kickoff();
    let mut t = MatchTracker::new(halves_of_ten(), clock.clone());
    t.start_period(Period::H1).unwrap();
    clock.advance_secs(600);
    t.tick();
    clock.advance_secs(120);

    let k = t.ledger().position_of_period_end(Period::H1).unwrap();
    let id = t
        .record_goal(Side::Home, None, false, Some(Period::H1))
        .unwrap();

    assert_eq!(t.ledger().index_of(id), Some(k));
    assert_eq!(t.ledger().position_of_period_end(Period::H1), Some(k + 1));

    let goal = t.ledger().get(id).unwrap();
    let end = t.ledger().period_end(Period::H1).unwrap();
    assert_eq!(goal.cumulative_secs, end.cumulative_secs);
    assert_eq!(goal.timestamp, end.timestamp);
    assert_eq!(goal.timestamp, TimeOfDay::from_hms(18, 10, 0));
    assert_eq!(goal_minute(goal, t.ledger(), 600), 10);
    assert_eq!(t.summary().home.goals, 1);
}

#[test]
fn test_missed_goal_after_full_time_keeps_match_end_last() {
    let clock = ManualClock::at_kickoff();
    let mut t = MatchTracker::new(halves_of_ten(), clock.clone());
    t.start_period(Period::H1).unwrap();
    t.end_period(None).unwrap();
    t.start_period(Period::H2).unwrap();
    clock.advance_secs(600);
    t.tick();

    t.record_goal(Side::Away, None, true, Some(Period::H2))
        .unwrap();
    let kinds: Vec<&EventKind> = t.ledger().iter().map(|e| &e.kind).collect();
    assert!(matches!(kinds[kinds.len() - 3], EventKind::Goal { .. }));
    assert!(matches!(kinds[kinds.len() - 2], EventKind::PeriodEnd));
    assert!(matches!(kinds[kinds.len() - 1], EventKind::MatchEnd));
}

#[test]
fn test_correction_moves_goal_and_rebases_timestamp() {
    let clock = ManualClock::at_kickoff();
    let mut t = MatchTracker::new(halves_of_ten(), clock.clone());
    t.start_period(Period::H1).unwrap();
    clock.advance_secs(100);
    let id = t.record_goal(Side::Home, None, false, None).unwrap();

    let attribution = t.goal_attribution(Side::Away, Some(5), false).unwrap();
    t.correct_event(id, 240, Some(attribution)).unwrap();

    let goal = t.ledger().get(id).unwrap();
    assert_eq!(goal.cumulative_secs, 240);
    assert_eq!(goal.timestamp, TimeOfDay::from_hms(18, 4, 0));
    assert_eq!(goal.goal_team(), Some(Side::Away));
    assert_eq!(
        event_line(goal, t.config(), true),
        "Goal - Away (#5 Player 5) - 18:04:00 [00:04:00]"
    );

    t.remove_event(id).unwrap();
    assert_eq!(t.summary().away.goals, 0);
}

#[test]
fn test_restart_mid_period_from_disk() {
    let dir = tempdir().unwrap();
    let clock = ManualClock::at_kickoff();

    {
        let mut t = MatchTracker::new(halves_of_ten(), clock.clone());
        t.attach_store(Box::new(FileStore::new(dir.path())));
        t.rename_player(3, "Alex").unwrap();
        t.start_period(Period::H1).unwrap();
        clock.advance_secs(200);
        t.record_goal(Side::Home, Some(3), false, None).unwrap();
    }

    // The app was closed for a while; the clock kept going
    clock.advance_secs(500);
    let mut t = MatchTracker::restore(
        Box::new(FileStore::new(dir.path())),
        halves_of_ten(),
        clock.clone(),
    );
    assert_eq!(t.roster().get(3).unwrap().name, "Alex");
    assert_eq!(t.summary().home.goals, 1);
    assert_eq!(t.elapsed_secs(), 600);
    assert!(matches!(
        t.tick(),
        TickOutcome::PeriodEnded {
            period: Period::H1,
            match_complete: false
        }
    ));
    assert_eq!(t.next_period(), Some(Period::H2));
}

#[test]
fn test_minutes_played_across_a_substitution() {
    let clock = ManualClock::at_kickoff();
    let mut t = MatchTracker::new(halves_of_ten(), clock.clone());
    let sam = t.add_player("Sam");
    t.set_starting_lineup(&[1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();

    t.start_period(Period::H1).unwrap();
    clock.advance_secs(600);
    t.tick();
    t.start_period(Period::H2).unwrap();
    clock.advance_secs(150);
    t.record_substitution(3, sam).unwrap();
    clock.advance_secs(450);
    t.tick();

    let summary = t.summary();
    let three = summary
        .starting
        .iter()
        .find(|l| l.player.number == 3)
        .unwrap();
    assert_eq!(three.minutes_played, 13);
    let sam_line = summary
        .substitutes
        .iter()
        .find(|l| l.player.number == sam)
        .unwrap();
    assert_eq!(sam_line.minutes_played, 8);
    let one = summary
        .starting
        .iter()
        .find(|l| l.player.number == 1)
        .unwrap();
    assert_eq!(one.minutes_played, 20);
}

#[derive(Debug, Clone, Copy)]
enum Action {
    StartNext,
    EndCurrent,
    EndNamed(usize),
    Wait(u32),
    Tick,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::StartNext),
        Just(Action::EndCurrent),
        (0usize..4).prop_map(Action::EndNamed),
        (0u32..900).prop_map(Action::Wait),
        Just(Action::Tick),
    ]
}

proptest! {
    #[test]
    fn prop_period_markers_stay_unique(actions in prop::collection::vec(action(), 0..40)) {
        let clock = ManualClock::at_kickoff();
        let config = MatchConfig::for_age_group(AgeGroup::U9, "Home", "Away").unwrap();
        let periods = config.format.periods();
        let mut t = MatchTracker::new(config, clock.clone());

        for a in actions {
            match a {
                Action::StartNext => { let _ = t.start_next_period(); }
                Action::EndCurrent => { let _ = t.end_period(None); }
                Action::EndNamed(i) => { let _ = t.end_period(Some(periods[i % periods.len()])); }
                Action::Wait(secs) => clock.advance_secs(secs),
                Action::Tick => { t.tick(); }
            }
        }

        for period in periods {
            let starts = t.ledger().iter().filter(|e| e.is_period_start_of(*period)).count();
            let ends = t.ledger().iter().filter(|e| e.is_period_end_of(*period)).count();
            prop_assert!(starts <= 1);
            prop_assert!(ends <= starts);
        }
        let match_ends = t
            .ledger()
            .iter()
            .filter(|e| matches!(e.kind, EventKind::MatchEnd))
            .count();
        prop_assert!(match_ends <= 1);
        prop_assert_eq!(match_ends == 1, t.phase() == MatchPhase::Complete);
    }
}
