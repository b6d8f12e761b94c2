//! CityPulse Headless Feed
//!
//! Runs the dashboard pipeline in-process. No browser, no map, no charts.
//! By default it ticks the feed on the configured interval and prints each
//! reading; `--check` instead runs a validation sweep over the logic.
//!
//! Usage:
//!   cargo run -p citypulse-feed
//!   cargo run -p citypulse-feed -- --ticks 3 --station 02001 --verbose
//!   cargo run -p citypulse-feed -- --hours "Sa-Mo 10:00-22:00" --seed 7 --json
//!   cargo run -p citypulse-feed -- --check

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use citypulse_logic::config::{validate_config, FeedConfig};
use citypulse_logic::constants::weekdays;
use citypulse_logic::density::{self, FixedNoise};
use citypulse_logic::error::BlockFault;
use citypulse_logic::evaluator::{is_open_at, Sample};
use citypulse_logic::feed::{DashboardFeed, TickReport};
use citypulse_logic::schedule::{self, ParsePolicy};
use citypulse_logic::traffic::{self, TrafficDataset, TrafficStation};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

// ── Traffic stations (bundled sample of the city dataset) ───────────────
const STATIONS_JSON: &str = include_str!("../../../data/traffic_stations.json");

// ── Command line ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    hours: Option<String>,
    stations: Option<PathBuf>,
    station: Option<String>,
    ticks: Option<usize>,
    seed: Option<u64>,
    verbose: bool,
    json: bool,
    check: bool,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    while let Some(flag) = argv.next() {
        let mut value = || {
            argv.next()
                .with_context(|| format!("{flag} expects a value"))
        };
        match flag.as_str() {
            "--config" => args.config = Some(value()?.into()),
            "--hours" => args.hours = Some(value()?),
            "--stations" => args.stations = Some(value()?.into()),
            "--station" => args.station = Some(value()?),
            "--ticks" => {
                args.ticks = Some(value()?.parse::<usize>().context("--ticks expects a count")?)
            }
            "--seed" => args.seed = Some(value()?.parse::<u64>().context("--seed expects a u64")?),
            "--verbose" => args.verbose = true,
            "--json" => args.json = true,
            "--check" => args.check = true,
            other => bail!("unknown argument `{other}`"),
        }
    }
    Ok(args)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    init_logging(args.verbose);

    if args.check {
        let failed = run_checks(args.verbose);
        if failed > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    run_feed(&args)
}

// ── Feed loop ───────────────────────────────────────────────────────────

const DEFAULT_TICKS: usize = 12;

fn load_stations(args: &Args) -> Result<TrafficDataset> {
    match &args.stations {
        Some(path) => TrafficDataset::from_path(path)
            .with_context(|| format!("loading stations from {}", path.display())),
        None => TrafficDataset::from_json_str(STATIONS_JSON).context("bundled station data"),
    }
}

fn run_feed(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => FeedConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FeedConfig::default(),
    };
    let errors = validate_config(&config);
    if !errors.is_empty() {
        for e in &errors {
            log::error!("{}", e);
        }
        bail!("invalid configuration ({} error(s))", errors.len());
    }

    let stations = load_stations(args)?.unique_stations();
    let in_area: Vec<TrafficStation> = traffic::within_bounds(&stations, &config.bounds)
        .cloned()
        .collect();
    log::info!(
        "{} unique stations, {} inside the configured bounds",
        stations.len(),
        in_area.len()
    );

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let interval = config.tick_interval();
    let mut feed = DashboardFeed::new(config, rng);

    feed.select_opening_hours(args.hours.as_deref());
    if let Some(id) = &args.station {
        let station = in_area
            .iter()
            .find(|s| s.station_id.0 == *id)
            .cloned()
            .with_context(|| format!("no station `{id}` inside the configured bounds"))?;
        feed.select_station(Some(station));
    }

    let ticks = args.ticks.unwrap_or(DEFAULT_TICKS);
    println!("=== CityPulse Feed ===");
    println!("  hours:   {}", feed.opening_hours());
    println!(
        "  station: {}",
        feed.station().map_or("(none)", |s| s.display_name())
    );
    println!("  ticks:   {} every {:?}\n", ticks, interval);

    for i in 0..ticks {
        if i > 0 {
            std::thread::sleep(interval);
        }
        let report = feed.tick_now().context("evaluating opening hours")?;
        print_report(&report, args.json)?;
    }

    println!("\n--- History (oldest first) ---");
    println!("  mall:      {:?}", feed.mall_history().values());
    println!(
        "  transport: {:?}",
        feed.transport_history()
            .iter()
            .map(|r| r.value.round())
            .collect::<Vec<_>>()
    );
    Ok(())
}

fn print_report(report: &TickReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    let day = weekdays::code(report.sample.weekday()).unwrap_or("??");
    let state = if report.mall.is_open { "open" } else { "closed" };
    println!(
        "  {} {} mall {:6} density {:4}  transport {:7.1}{}",
        report.time.format("%H:%M:%S"),
        day,
        state,
        report.mall.density,
        report.transport,
        if report.rejected_blocks > 0 {
            format!("  ({} block(s) skipped)", report.rejected_blocks)
        } else {
            String::new()
        }
    );
    Ok(())
}

// ── Validation sweep ────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn run_checks(verbose: bool) -> usize {
    println!("=== CityPulse Logic Harness ===\n");

    let mut results = Vec::new();

    // 1. Schedule parsing
    results.extend(validate_schedule_parsing(verbose));

    // 2. Day and time membership
    results.extend(validate_membership(verbose));

    // 3. Density heuristics
    results.extend(validate_density_table(verbose));

    // 4. Traffic dataset
    results.extend(validate_traffic_dataset(verbose));

    // 5. Default configuration
    results.extend(validate_default_config(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed
}

// ── 1. Schedule parsing ─────────────────────────────────────────────────

fn validate_schedule_parsing(verbose: bool) -> Vec<TestResult> {
    println!("--- Schedule Parsing ---");
    let mut results = Vec::new();

    let default_hours = FeedConfig::default().default_opening_hours;
    match schedule::parse(&default_hours) {
        Ok(rules) => {
            results.push(TestResult {
                name: "default_schedule_rules".into(),
                passed: rules.len() == 5,
                detail: format!("{} rules parsed", rules.len()),
            });
            if verbose {
                for r in &rules {
                    println!("    {}", r);
                }
            }
            let canonical = rules
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            results.push(TestResult {
                name: "default_schedule_canonical".into(),
                passed: canonical == default_hours,
                detail: canonical,
            });
        }
        Err(e) => results.push(TestResult {
            name: "default_schedule_rules".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    let malformed: [(&str, BlockFault); 5] = [
        ("Mo-We", BlockFault::TokenCount(1)),
        ("Xy 10:00-18:00", BlockFault::UnknownDay("Xy".into())),
        ("Mo-We-Fr 10:00-18:00", BlockFault::DayRange("Mo-We-Fr".into())),
        ("Mo 10:00", BlockFault::TimeRange("10:00".into())),
        ("Mo 24:00-25:00", BlockFault::ClockOutOfRange("24:00".into())),
    ];
    let wrong: Vec<String> = malformed
        .iter()
        .filter(|(raw, fault)| schedule::parse_block(raw).err().as_ref() != Some(fault))
        .map(|(raw, _)| raw.to_string())
        .collect();
    results.push(TestResult {
        name: "malformed_blocks_rejected".into(),
        passed: wrong.is_empty(),
        detail: if wrong.is_empty() {
            format!("{} malformed blocks rejected with the right fault", malformed.len())
        } else {
            format!("unexpected result for: {}", wrong.join(", "))
        },
    });

    let mixed = "Mo 10:00-18:00; Xy 10:00-18:00; Tu 10:00-18:00";
    let fail_fast = schedule::parse_with(mixed, ParsePolicy::FailFast).is_err();
    let skipped = schedule::parse_with(mixed, ParsePolicy::SkipInvalid)
        .map(|p| (p.rules.len(), p.rejected.len()))
        .ok();
    results.push(TestResult {
        name: "parse_policies".into(),
        passed: fail_fast && skipped == Some((2, 1)),
        detail: format!("fail_fast errored={fail_fast}, skip_invalid kept/rejected={skipped:?}"),
    });

    results
}

// ── 2. Day & time membership ────────────────────────────────────────────

fn matching_days(raw: &str, minute: u16) -> Vec<u8> {
    let rules = schedule::parse(raw).unwrap_or_default();
    (0..=weekdays::LAST)
        .filter(|d| {
            Sample::new(*d, minute)
                .map(|s| is_open_at(&rules, s))
                .unwrap_or(false)
        })
        .collect()
}

fn validate_membership(_verbose: bool) -> Vec<TestResult> {
    println!("--- Day & Time Membership ---");
    let mut results = Vec::new();

    // Sa-Mo wraps the week: Sat, Sun, Mon
    let wrap = matching_days("Sa-Mo 00:00-23:59", 720);
    results.push(TestResult {
        name: "wraparound_sa_mo".into(),
        passed: wrap == vec![weekdays::SUNDAY, weekdays::MONDAY, weekdays::SATURDAY],
        detail: format!("open on days {:?}", wrap),
    });

    let plain = matching_days("Tu-Th 00:00-23:59", 720);
    results.push(TestResult {
        name: "plain_range_tu_th".into(),
        passed: plain == vec![weekdays::TUESDAY, weekdays::WEDNESDAY, weekdays::THURSDAY],
        detail: format!("open on days {:?}", plain),
    });

    let edges: Vec<bool> = [599, 600, 1080, 1081]
        .iter()
        .map(|m| !matching_days("Tu 10:00-18:00", *m).is_empty())
        .collect();
    results.push(TestResult {
        name: "inclusive_time_bounds".into(),
        passed: edges == vec![false, true, true, false],
        detail: format!("09:59/10:00/18:00/18:01 → {:?}", edges),
    });

    let midnight: usize = (0..1440)
        .map(|m| matching_days("Mo-Su 22:00-02:00", m).len())
        .sum();
    results.push(TestResult {
        name: "midnight_crossing_inert".into(),
        passed: midnight == 0,
        detail: format!("{} matches for a 22:00-02:00 range (known limitation)", midnight),
    });

    results
}

// ── 3. Density heuristics ───────────────────────────────────────────────

fn validate_density_table(verbose: bool) -> Vec<TestResult> {
    println!("--- Density Heuristics ---");
    let mut results = Vec::new();

    let quiet = |open: bool, hour: u8, day: u8| {
        density::estimate(open, hour, day, &mut FixedNoise(0.0)).unwrap_or(u32::MAX)
    };

    let spot = [
        (13, weekdays::MONDAY, 195),
        (19, weekdays::SATURDAY, 585),
        (19, weekdays::WEDNESDAY, 292),
        (10, weekdays::THURSDAY, 150),
        (8, weekdays::FRIDAY, 125),
    ];
    let off: Vec<String> = spot
        .iter()
        .filter(|(h, d, want)| quiet(true, *h, *d) != *want)
        .map(|(h, d, want)| format!("{h}h/day {d}: got {} want {want}", quiet(true, *h, *d)))
        .collect();
    results.push(TestResult {
        name: "density_spot_values".into(),
        passed: off.is_empty(),
        detail: if off.is_empty() {
            format!("{} spot values match", spot.len())
        } else {
            off.join("; ")
        },
    });

    let mut closed_nonzero = 0;
    let mut min_open = u32::MAX;
    let mut max_open = 0;
    for day in 0..=weekdays::LAST {
        for hour in 0..24 {
            if quiet(false, hour, day) != 0 {
                closed_nonzero += 1;
            }
            let v = quiet(true, hour, day);
            min_open = min_open.min(v);
            max_open = max_open.max(v);
        }
    }
    results.push(TestResult {
        name: "density_closed_is_zero".into(),
        passed: closed_nonzero == 0,
        detail: format!("{} closed samples with non-zero density", closed_nonzero),
    });
    results.push(TestResult {
        name: "density_open_range".into(),
        passed: min_open == 125 && max_open == 585,
        detail: format!("open density spans {}..={}", min_open, max_open),
    });

    if verbose {
        println!("  Density by hour (noise pinned at 0):");
        println!("    hour   Mo   Tu   We   Th   Fr   Sa   Su");
        for hour in 0..24 {
            let row: Vec<String> = [1, 2, 3, 4, 5, 6, 0]
                .iter()
                .map(|d| format!("{:4}", quiet(true, hour, *d)))
                .collect();
            println!("    {:4} {}", hour, row.join(" "));
        }
    }

    results
}

// ── 4. Traffic dataset ──────────────────────────────────────────────────

fn validate_traffic_dataset(verbose: bool) -> Vec<TestResult> {
    println!("--- Traffic Dataset ---");
    let mut results = Vec::new();

    let dataset = match TrafficDataset::from_json_str(STATIONS_JSON) {
        Ok(d) => d,
        Err(e) => {
            results.push(TestResult {
                name: "stations_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    let rows = dataset.rows.len();
    let stations = dataset.unique_stations();
    results.push(TestResult {
        name: "stations_deduplicated".into(),
        passed: stations.len() < rows,
        detail: format!("{} rows → {} unique stations", rows, stations.len()),
    });

    let in_area: Vec<&TrafficStation> =
        traffic::within_bounds(&stations, &traffic::SYDNEY_BOUNDS).collect();
    results.push(TestResult {
        name: "stations_in_sydney".into(),
        passed: !in_area.is_empty() && in_area.len() < stations.len(),
        detail: format!("{} of {} inside Sydney bounds", in_area.len(), stations.len()),
    });

    let incomplete: Vec<&str> = in_area
        .iter()
        .filter(|s| s.hourly_counts().iter().any(|c| c.is_none()))
        .map(|s| s.display_name())
        .collect();
    results.push(TestResult {
        name: "stations_full_day".into(),
        passed: incomplete.is_empty(),
        detail: if incomplete.is_empty() {
            "every station has 24 hourly counts".into()
        } else {
            format!("missing hours: {}", incomplete.join(", "))
        },
    });

    if verbose {
        for s in &in_area {
            println!(
                "    {:6} {:28} {:>6} veh/day",
                s.station_id.0,
                s.display_name(),
                s.daily_total.unwrap_or(0.0)
            );
        }
    }

    results
}

// ── 5. Default configuration ────────────────────────────────────────────

fn validate_default_config(_verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let config = FeedConfig::default();
    let errors = validate_config(&config);
    vec![TestResult {
        name: "default_config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!(
                "tick every {} ms, {} readings kept",
                config.tick_interval_ms, config.history_len
            )
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    }]
}
