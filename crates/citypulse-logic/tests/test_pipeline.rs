//! Integration tests for the full venue pipeline.
//!
//! Exercises: raw opening hours → rules → open/closed → density,
//! plus the feed that wraps them.
//!
//! All tests are pure logic and read no clock.

use citypulse_logic::constants::feed::DEFAULT_OPENING_HOURS;
use citypulse_logic::constants::weekdays::*;
use citypulse_logic::density::{base_density, estimate, DensityEstimator, FixedNoise};
use citypulse_logic::evaluator::{first_match, is_open_at, Sample};
use citypulse_logic::schedule::{parse, parse_block, parse_with, ParsePolicy, TimeWindowRule};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

/// Run the whole pipeline with zero noise.
fn run_pipeline(raw: &str, weekday: u8, hour: u8, minute: u8) -> (bool, u32) {
    let rules = parse(raw).expect("schedule should parse");
    let sample = Sample::at(weekday, hour, minute).expect("sample in range");
    let open = is_open_at(&rules, sample);
    let density = estimate(open, hour, weekday, &mut FixedNoise(0.0)).unwrap();
    (open, density)
}

fn day_in(start: u8, end: u8, day: u8) -> bool {
    if start <= end {
        start <= day && day <= end
    } else {
        day >= start || day <= end
    }
}

// ── Scenario tests ─────────────────────────────────────────────────────

#[test]
fn tuesday_open_at_ten_closed_after_six() {
    let raw = "Mo-We 10:00-18:00; Th 10:00-21:00";
    assert_eq!(run_pipeline(raw, TUESDAY, 10, 0), (true, 150));
    assert!(run_pipeline(raw, TUESDAY, 18, 0).0);
    assert_eq!(run_pipeline(raw, TUESDAY, 18, 1), (false, 0));
}

#[test]
fn default_schedule_week_sweep() {
    let rules = parse(DEFAULT_OPENING_HOURS).unwrap();
    // (weekday, first open minute, last open minute)
    let expected = [
        (SUNDAY, 660, 1020),
        (MONDAY, 600, 1080),
        (TUESDAY, 600, 1080),
        (WEDNESDAY, 600, 1080),
        (THURSDAY, 600, 1260),
        (FRIDAY, 600, 1380),
        (SATURDAY, 600, 1080),
    ];
    for (day, open, close) in expected {
        let opened: Vec<u16> = (0..1440)
            .filter(|m| is_open_at(&rules, Sample::new(day, *m).unwrap()))
            .collect();
        assert_eq!(opened.first(), Some(&open), "day {day}");
        assert_eq!(opened.last(), Some(&close), "day {day}");
        assert_eq!(opened.len() as u16, close - open + 1, "day {day}");
    }
}

#[test]
fn weekend_night_market_wraps_week() {
    let rules = parse("Fr-Su 18:00-23:30").unwrap();
    for day in [FRIDAY, SATURDAY, SUNDAY] {
        assert!(is_open_at(&rules, Sample::at(day, 20, 0).unwrap()), "day {day}");
    }
    for day in [MONDAY, TUESDAY, WEDNESDAY, THURSDAY] {
        assert!(!is_open_at(&rules, Sample::at(day, 20, 0).unwrap()), "day {day}");
    }
}

#[test]
fn saturday_dinner_density() {
    let (open, density) = run_pipeline("Sa-Mo 10:00-22:00", SATURDAY, 19, 0);
    assert!(open);
    assert_eq!(density, 585);
}

#[test]
fn monday_lunch_density() {
    let (open, density) = run_pipeline("Mo 12:00-14:00", MONDAY, 13, 0);
    assert!(open);
    assert_eq!(density, 195);
}

#[test]
fn empty_schedule_is_never_open() {
    for day in 0..=6 {
        assert_eq!(run_pipeline("", day, 12, 0), (false, 0));
    }
}

#[test]
fn skipped_blocks_do_not_affect_good_ones() {
    let parsed = parse_with(
        "Mo-Fr 09:00-17:00; Sa 9am-5pm; Su 10:00-16:00",
        ParsePolicy::SkipInvalid,
    )
    .unwrap();
    assert_eq!(parsed.rules.len(), 2);
    assert_eq!(parsed.rejected.len(), 1);
    assert!(!is_open_at(&parsed.rules, Sample::at(SATURDAY, 12, 0).unwrap()));
    assert!(is_open_at(&parsed.rules, Sample::at(SUNDAY, 12, 0).unwrap()));
}

#[test]
fn overlapping_rules_first_match_wins() {
    let rules = parse("Mo-Su 08:00-20:00; Fr 08:00-23:00").unwrap();
    let friday_late = Sample::at(FRIDAY, 22, 0).unwrap();
    assert_eq!(first_match(&rules, friday_late), Some(&rules[1]));
    let friday_noon = Sample::at(FRIDAY, 12, 0).unwrap();
    assert_eq!(first_match(&rules, friday_noon), Some(&rules[0]));
}

#[test]
fn estimator_with_pinned_noise() {
    let mut estimator = DensityEstimator::new(FixedNoise(5.0));
    assert_eq!(estimator.estimate(true, 10, MONDAY).unwrap(), 155);
    assert_eq!(estimator.estimate(false, 10, MONDAY).unwrap(), 0);
}

// ── Properties ─────────────────────────────────────────────────────────

fn arb_rule() -> impl Strategy<Value = TimeWindowRule> {
    (0u8..=6, 0u8..=6, 0u16..1440, 0u16..1440).prop_map(|(sd, ed, a, b)| {
        TimeWindowRule::new(sd, ed, a.min(b), a.max(b)).unwrap()
    })
}

proptest! {
    #[test]
    fn prop_membership_matches_definition(
        rule in arb_rule(),
        day in 0u8..=6,
        minute in 0u16..1440,
    ) {
        let expected = day_in(rule.start_day(), rule.end_day(), day)
            && rule.start_minute() <= minute
            && minute <= rule.end_minute();
        let sample = Sample::new(day, minute).unwrap();
        prop_assert_eq!(rule.contains(sample), expected);
        prop_assert_eq!(is_open_at(&[rule], sample), expected);
    }

    #[test]
    fn prop_boundaries_inclusive(rule in arb_rule()) {
        let day = rule.start_day();
        prop_assert!(rule.contains(Sample::new(day, rule.start_minute()).unwrap()));
        prop_assert!(rule.contains(Sample::new(day, rule.end_minute()).unwrap()));
        if rule.start_minute() > 0 {
            prop_assert!(!rule.contains(Sample::new(day, rule.start_minute() - 1).unwrap()));
        }
        if rule.end_minute() < 1439 {
            prop_assert!(!rule.contains(Sample::new(day, rule.end_minute() + 1).unwrap()));
        }
    }

    #[test]
    fn prop_rule_order_does_not_change_outcome(
        rules in proptest::collection::vec(arb_rule(), 0..8),
        day in 0u8..=6,
        minute in 0u16..1440,
    ) {
        let sample = Sample::new(day, minute).unwrap();
        let mut reversed = rules.clone();
        reversed.reverse();
        prop_assert_eq!(is_open_at(&rules, sample), is_open_at(&reversed, sample));
    }

    #[test]
    fn prop_display_parses_back(rule in arb_rule()) {
        prop_assert_eq!(parse_block(&rule.to_string()).unwrap(), rule);
    }

    #[test]
    fn prop_closed_is_zero(hour in 0u8..24, day in 0u8..=6, noise in -50.0..50.0f64) {
        prop_assert_eq!(estimate(false, hour, day, &mut FixedNoise(noise)).unwrap(), 0);
    }

    #[test]
    fn prop_zero_noise_is_floored_base(hour in 0u8..24, day in 0u8..=6) {
        let base = base_density(hour, day).unwrap();
        let first = estimate(true, hour, day, &mut FixedNoise(0.0)).unwrap();
        let second = estimate(true, hour, day, &mut FixedNoise(0.0)).unwrap();
        prop_assert_eq!(first, base.floor() as u32);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_parse_is_idempotent(rules in proptest::collection::vec(arb_rule(), 0..6)) {
        let raw = rules.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("; ");
        prop_assert_eq!(parse(&raw).unwrap(), parse(&raw).unwrap());
        prop_assert_eq!(parse(&raw).unwrap(), rules);
    }
}
