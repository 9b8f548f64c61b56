//! Replays a recorded device session through the serial monitor and prints the
//! `/timer` body after every line.
//!
//! Usage: `verify_replay [transcript]`
//!
//! Each transcript line is `<host_offset_ms> <device line>`. Without an
//! argument a built-in session of one full run is replayed.

use std::fs;
use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use line_timer_lib::clock::{format_elapsed, ManualClock};
use line_timer_lib::monitor::{Poll, SerialMonitor};
use line_timer_lib::state::TimerStore;

const SAMPLE_SESSION: &str = "\
0 WAITING
1500 START 48213
13845 STOP 60558
13846 TIME 0:12:345
20000 WAITING
21000 START 75120
";

fn main() -> Result<()> {
    let transcript = match std::env::args().nth(1) {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?,
        None => SAMPLE_SESSION.to_string(),
    };

    let clock = ManualClock::new(0);
    let store = TimerStore::new();

    println!("Replaying session...");
    for (number, entry) in transcript.lines().enumerate() {
        if entry.trim().is_empty() {
            continue;
        }
        let (offset, line) = entry
            .trim()
            .split_once(' ')
            .ok_or_else(|| anyhow!("line {}: expected `<offset_ms> <line>`", number + 1))?;
        let offset: i64 = offset
            .parse()
            .with_context(|| format!("line {}: bad offset {offset:?}", number + 1))?;

        clock.set(offset);
        let mut monitor = SerialMonitor::new(Cursor::new(format!("{line}\n")), clock.clone(), store.clone());
        let poll = monitor.poll_once()?;

        let snapshot = store.snapshot();
        println!(
            "[{:>9}] {:<20} {:?} -> {}",
            format_elapsed(offset),
            line,
            poll,
            serde_json::to_string(&snapshot)?
        );
        if let Poll::Line(event) = poll {
            if event.is_timer_event() {
                if let (Some(start), Some(stop)) = (snapshot.start, snapshot.stop) {
                    println!("            host measured {}", format_elapsed(stop - start));
                }
            }
        }
    }

    println!("Replay finished.");
    Ok(())
}
