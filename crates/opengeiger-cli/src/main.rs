//! geigersim - OpenGeiger host/device simulator
//!
//! Runs the complete counting core against a simulated radiation source
//! and a scripted host: a hardware thread drives pulse and tick
//! "interrupts" into the acquisition engine while the main loop polls the
//! protocol driver over a channel-backed serial link, exactly the way the
//! device firmware interleaves its work.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod host;
mod sim;
mod store;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossbeam::channel;
use tracing::info;
use tracing_subscriber::EnvFilter;

use opengeiger_engine::{
    Acquisition, AcquisitionHandle, DisplayController, Driver, DriverStep, EngineConfig,
    TimerMode,
};
use opengeiger_session::{Personality, Session, SessionState};
use opengeiger_stats::StatsConfig;

use crate::host::{host_script, ChannelSource, ConsoleScreen, HostLink};
use crate::sim::RadiationSource;
use crate::store::FileParamStore;

#[derive(Parser, Debug)]
#[command(name = "geigersim")]
#[command(about = "Simulate the OpenGeiger counting core end to end")]
#[command(version)]
struct Args {
    /// Mean source strength in counts per minute
    #[arg(long, default_value_t = 90)]
    rate_cpm: u32,

    /// Timer ticks per accumulation interval
    #[arg(long, default_value_t = 10)]
    ticks_per_interval: u16,

    /// Measurement length in intervals (sample table capacity)
    #[arg(long, default_value_t = 30)]
    intervals: usize,

    /// Wall-clock milliseconds per simulated tick
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// Milliseconds between scripted INTERMEDIATE requests (0 = never)
    #[arg(long, default_value_t = 800)]
    intermediate_ms: u64,

    /// Milliseconds between display refreshes
    #[arg(long, default_value_t = 250)]
    display_ms: u64,

    /// Seed for the pulse random source
    #[arg(long, env = "GEIGERSIM_SEED", default_value_t = 0x4747_4349)]
    seed: u64,

    /// Parameter store path
    #[arg(long, default_value = "geigersim-params.json")]
    param_store: PathBuf,

    /// Hex-dump every response frame
    #[arg(long)]
    dump_frames: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let stats = StatsConfig::default();
    stats.validate()?;

    let acquisition = Arc::new(Acquisition::with_feedback(
        &EngineConfig {
            stats: stats.clone(),
            table_capacity: args.intervals,
            mode: TimerMode::IntervalRotation,
        },
        Box::new(sim::ClickFeedback),
    ));

    // Serial link: host thread -> device driver.
    let (uart_tx, uart_rx) = channel::unbounded::<u8>();
    // Completion signal: device loop -> host thread.
    let (done_tx, done_rx) = channel::bounded::<()>(1);

    let session = Session::new(
        Personality::geiger_time_series(args.intervals),
        HostLink::new(args.dump_frames),
        AcquisitionHandle::new(Arc::clone(&acquisition)),
        FileParamStore::new(args.param_store.clone()),
    );
    let mut driver = Driver::new(session, Arc::clone(&acquisition), ChannelSource::new(uart_rx), 2);

    let stop = Arc::new(AtomicBool::new(false));
    let source = RadiationSource::new(args.rate_cpm, args.ticks_per_interval, args.seed);
    let hardware = sim::spawn_hardware(
        Arc::clone(&acquisition),
        Arc::clone(&stop),
        source,
        Duration::from_millis(args.tick_ms),
    );
    let host = host_script(
        uart_tx,
        done_rx,
        args.ticks_per_interval,
        Duration::from_millis(args.intermediate_ms),
    );

    info!(
        rate_cpm = args.rate_cpm,
        intervals = args.intervals,
        ticks_per_interval = args.ticks_per_interval,
        "simulation starting"
    );

    let mut controller = DisplayController::new(stats);
    let mut screen = ConsoleScreen::default();
    let mut last_display = Instant::now();
    let mut done_reported = false;

    loop {
        match driver.poll_once() {
            DriverStep::Continue => {}
            DriverStep::Restart => {
                info!("device restart requested, simulation over");
                break;
            }
            DriverStep::Disconnected => {
                info!("host disconnected, simulation over");
                break;
            }
        }

        if !done_reported && driver.session().state() == SessionState::Done {
            done_reported = true;
            drop(done_tx.try_send(()));
        }

        if last_display.elapsed() >= Duration::from_millis(args.display_ms) {
            last_display = Instant::now();
            controller.update(&acquisition, &mut screen)?;
        }

        // Polling loop; idle cheaply between bytes.
        std::thread::sleep(Duration::from_micros(200));
    }

    stop.store(true, Ordering::SeqCst);
    // A session that faulted never signalled completion; dropping the
    // sender unblocks the host script either way.
    drop(done_tx);
    if hardware.join().is_err() {
        tracing::warn!("hardware thread panicked");
    }
    if host.join().is_err() {
        tracing::warn!("host thread panicked");
    }

    info!(
        total_counts = acquisition.total_counts(),
        elapsed_intervals = acquisition.elapsed_intervals(),
        "simulation complete"
    );
    Ok(())
}
