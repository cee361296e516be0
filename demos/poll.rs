//! Poll the MJC3 and print each sample.
//!
//! Usage: `cargo run --example poll -- [timeout_ms] [config.toml]`

use mjc3::backends::HidApiTransport;
use mjc3::logger::{self, OutcomeLogger};
use mjc3::{Config, Dispatcher, OutcomeFilter};
use std::time::{Duration, Instant};

fn main() {
    let mut args = std::env::args().skip(1);
    let timeout_ms = args.next().and_then(|s| s.parse::<u32>().ok());
    let config = match args.next() {
        Some(path) => Config::load(&path).unwrap_or_else(|e| {
            eprintln!("{path}: {e}; using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    logger::init(&config.log.filter);

    let mut joystick = Dispatcher::new(HidApiTransport::new(), config);
    joystick.add_listener(OutcomeLogger::new(), OutcomeFilter::FailuresOnly);

    let info = joystick.info();
    println!(
        "{}",
        serde_json::to_string_pretty(&info).unwrap_or_else(|_| format!("{info:?}"))
    );

    // Print at most every 40 ms so a fast device doesn't flood the terminal.
    let flush_every = Duration::from_millis(40);
    let mut last_flush = Instant::now();
    let mut last = None;

    loop {
        match joystick.read(timeout_ms) {
            Some(sample) => last = Some(sample),
            None if !joystick.is_open() => {
                // Not plugged in yet; back off before retrying the open.
                std::thread::sleep(Duration::from_millis(500));
            }
            None => {}
        }

        if last_flush.elapsed() >= flush_every {
            if let Some(s) = last.take() {
                println!(
                    "x={:4} y={:4} z={:4} button={} speed={:3}",
                    s.x, s.y, s.z, s.button, s.speed_knob
                );
            }
            last_flush = Instant::now();
        }
    }
}
