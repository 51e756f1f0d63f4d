//! # Example: headless
//!
//! Runs the full control core against the in-memory engine. Input comes from
//! stdin, one event per line:
//!
//! ```text
//! key 34 down     # digit 5 → speed 5
//! key 6 down      # C → toggle collision
//! mouse 10 -5     # look around
//! exit            # or ESC (key 41 down), EOF, Ctrl-C
//! ```
//!
//! Debris spawns every half second in real time while the demo runs.
//!
//! ## Run
//! ```bash
//! cargo run --example headless --features logging
//! cargo run --example headless --features logging -- --verbose
//! ```

use std::rc::Rc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use orbitvisor::engine::InputEvent;
use orbitvisor::engine::headless::{ChannelEvents, HeadlessWorld, MonotonicClock, RecordingObserver};
use orbitvisor::{Config, LogWriter, ObserverController, Subscribe, Supervisor, shutdown};

/// Pause between scheduler turns, roughly one frame.
const FRAME: Duration = Duration::from_millis(8);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let cfg = Config::default();

    let log: Rc<dyn Subscribe> = if verbose {
        Rc::new(LogWriter::verbose())
    } else {
        Rc::new(LogWriter::new())
    };

    let world = HeadlessWorld::shared();
    let mut sup = Supervisor::builder(cfg.clone(), world)
        .with_subscribers(vec![log])
        .build();

    let token = sup.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = shutdown::cancel_on_shutdown_signal(token).await {
            eprintln!("[headless] signal listener failed: {e}");
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(read_stdin(tx));

    let observer = RecordingObserver::new();
    let controller = ObserverController::new(cfg.observer.clone(), Box::new(observer.clone()));
    let spawner = sup.spawn_policy(cfg.spawn.clone(), Rc::new(MonotonicClock::new()));

    sup.populate_world()?;
    sup.register(controller.into_task(Box::new(ChannelEvents::new(rx))));
    sup.register(spawner.into_task());

    loop {
        match sup.turn() {
            Ok(true) => tokio::time::sleep(FRAME).await,
            Ok(false) => break,
            Err(err) => {
                sup.finish();
                return Err(err.into());
            }
        }
    }

    let report = sup.finish();
    println!(
        "[headless] turns={} finished={} killed={} shapes_released={} observer={:?}",
        report.turns,
        report.finished,
        report.killed,
        report.shapes_released,
        *observer.log(),
    );
    Ok(())
}

/// Forwards parsed stdin lines until EOF; dropping `tx` then reads as `Exit`.
async fn read_stdin(tx: mpsc::UnboundedSender<InputEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<InputEvent>() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    return;
                }
            }
            Err(e) => eprintln!("[headless] ignoring {line:?}: {e}"),
        }
    }
}
