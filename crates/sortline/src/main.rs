//! Sortline CLI.
//!
//! Runs the sorting line headless for a fixed number of ticks, either
//! stepped as fast as possible or on the 60 Hz realtime clock, then
//! prints per-belt statistics.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use sortline::audit_log::AuditLog;
use sortline::prelude::*;
use sortline::report;

#[derive(Parser)]
#[command(name = "sortline")]
#[command(about = "Headless parcel-sorting line simulation")]
struct Cli {
    /// Number of ticks to run (60 ticks = 1 simulated second)
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Seed for spawn attributes and positions
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Initial sensor mode: weight, color, size
    #[arg(long, default_value = "weight")]
    mode: SensorMode,

    /// Number of reusable package slots
    #[arg(long, default_value_t = 10)]
    pool_size: usize,

    /// Switch mode at a tick, e.g. 600:color (repeatable)
    #[arg(long = "switch", value_name = "TICK:MODE", value_parser = parse_switch)]
    switches: Vec<ModeSwitch>,

    /// Tick on the wall clock at the configured rate instead of as fast as possible.
    /// Stops on exactly --ticks either way.
    #[arg(long)]
    realtime: bool,

    /// Append timestamped audit lines to this file
    #[arg(long)]
    audit_log: Option<PathBuf>,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ModeSwitch {
    at: u64,
    mode: SensorMode,
}

fn parse_switch(s: &str) -> Result<ModeSwitch, String> {
    let (tick, mode) = s
        .split_once(':')
        .ok_or_else(|| format!("expected TICK:MODE, got '{s}'"))?;
    let at = tick
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("bad tick '{tick}': {e}"))?;
    let mode = mode.parse::<SensorMode>().map_err(|e| e.to_string())?;
    Ok(ModeSwitch { at, mode })
}

fn commands_for(switches: &[ModeSwitch], tick: u64) -> Vec<Command> {
    switches
        .iter()
        .filter(|s| s.at == tick)
        .map(|s| Command::SetMode(s.mode))
        .collect()
}

/// Switches that fall within the run, last-due first so `pop` yields the next.
fn pending_switches(switches: &[ModeSwitch], ticks: u64) -> Vec<ModeSwitch> {
    let mut pending: Vec<ModeSwitch> = switches
        .iter()
        .copied()
        .filter(|s| s.at <= ticks)
        .collect();
    pending.sort_by_key(|s| std::cmp::Reverse(s.at));
    pending
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let config = LineConfig {
        pool_capacity: cli.pool_size,
        seed: cli.seed,
        initial_mode: cli.mode,
        ..LineConfig::default()
    };
    config.validate().context("invalid line configuration")?;

    let mut audit = match &cli.audit_log {
        Some(path) => Some(
            AuditLog::open(path)
                .with_context(|| format!("opening audit log {}", path.display()))?,
        ),
        None => None,
    };

    info!(
        ticks = cli.ticks,
        seed = cli.seed,
        mode = %cli.mode,
        realtime = cli.realtime,
        "starting"
    );

    let snapshot = if cli.realtime {
        run_realtime(config, &cli, &mut audit)?
    } else {
        run_lockstep(config, &cli, &mut audit)?
    };

    if let Some(log) = audit {
        let lines = log.lines();
        log.finish().context("flushing audit log")?;
        info!(lines, "audit log written");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for pkg in &snapshot.packages {
            println!("{}", report::package_line(pkg));
        }
        println!("{}", report::summary(&snapshot));
    }
    Ok(())
}

fn run_lockstep(
    config: LineConfig,
    cli: &Cli,
    audit: &mut Option<AuditLog<std::io::BufWriter<std::fs::File>>>,
) -> Result<LineSnapshot> {
    let mut line = LockstepLine::new(config)?;
    for tick in 1..=cli.ticks {
        let result = line.step_sync(commands_for(&cli.switches, tick));
        if let Some(log) = audit.as_mut() {
            log.record_all(&result.audit)?;
        }
    }
    Ok(line.snapshot().to_line_snapshot())
}

fn run_realtime(
    config: LineConfig,
    cli: &Cli,
    audit: &mut Option<AuditLog<std::io::BufWriter<std::fs::File>>>,
) -> Result<LineSnapshot> {
    let mut pending = pending_switches(&cli.switches, cli.ticks);

    let line = RealtimeLine::with_tick_limit(config, cli.ticks)?;
    loop {
        // Checked before the tick: a finished clock has published its last one.
        let running = line.is_running();
        let tick = line.current_tick().0;
        // A command lands on the tick after it is submitted.
        while pending.last().is_some_and(|s| s.at <= tick + 1) {
            if let Some(s) = pending.pop() {
                if let Err(e) = line.set_mode(s.mode) {
                    warn!(at = s.at, mode = %s.mode, error = %e, "mode switch missed");
                }
            }
        }
        if let Some(log) = audit.as_mut() {
            log.record_all(&line.drain_audit())?;
        }
        if tick >= cli.ticks {
            break;
        }
        if !running {
            bail!("clock thread stopped unexpectedly at tick {tick}");
        }
        thread::sleep(Duration::from_millis(5));
    }

    let events = line.drain_audit();
    let engine = line.shutdown()?;
    if let Some(log) = audit.as_mut() {
        log.record_all(&events)?;
    }
    Ok(engine.owned_snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_switch_accepts_tick_and_mode() {
        assert_eq!(
            parse_switch("600:color").unwrap(),
            ModeSwitch {
                at: 600,
                mode: SensorMode::Color,
            }
        );
        assert_eq!(parse_switch(" 5 : Size").unwrap().mode, SensorMode::Size);
    }

    #[test]
    fn parse_switch_rejects_garbage() {
        assert!(parse_switch("600").is_err());
        assert!(parse_switch("x:color").is_err());
        assert!(parse_switch("10:shape").is_err());
    }

    #[test]
    fn commands_for_selects_matching_tick() {
        let switches = [
            ModeSwitch {
                at: 3,
                mode: SensorMode::Color,
            },
            ModeSwitch {
                at: 7,
                mode: SensorMode::Size,
            },
        ];
        assert_eq!(commands_for(&switches, 3).len(), 1);
        assert!(commands_for(&switches, 4).is_empty());
    }

    #[test]
    fn pending_switches_drop_late_ones_and_pop_in_order() {
        let switches = [
            ModeSwitch {
                at: 50,
                mode: SensorMode::Size,
            },
            ModeSwitch {
                at: 500,
                mode: SensorMode::Weight,
            },
            ModeSwitch {
                at: 10,
                mode: SensorMode::Color,
            },
        ];
        let mut pending = pending_switches(&switches, 100);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.pop().map(|s| s.at), Some(10));
        assert_eq!(pending.pop().map(|s| s.at), Some(50));
        assert!(pending.is_empty());
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "sortline",
            "--ticks",
            "120",
            "--mode",
            "size",
            "--switch",
            "60:weight",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.ticks, 120);
        assert_eq!(cli.mode, SensorMode::Size);
        assert_eq!(cli.switches.len(), 1);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.realtime);
    }
}
