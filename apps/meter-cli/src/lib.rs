//! # Taxi Meter Terminal Front End
//!
//! Presentation layer for the meter: reads operator commands from stdin,
//! renders every published [`TripState`] to stdout.
//!
//! ## Module Organization
//! ```text
//! meter_cli/
//! ├── lib.rs      ◄─── You are here (startup, command loop)
//! ├── command.rs  ◄─── stdin command parsing
//! ├── render.rs   ◄─── text / JSON line rendering
//! ├── sensor.rs   ◄─── simulated positioning sensor
//! └── error.rs    ◄─── CLI error type
//! ```
//!
//! ## Task Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  main task     stdin lines ──► MeterHandle::toggle / reset / shutdown  │
//! │  meter task    Meter actor (taxi-meter)                                │
//! │  render task   watch<TripState>::changed ──► stdout                    │
//! │  sensor task   SimulatedSensor ──► PositionFeed                        │
//! │                                                                         │
//! │  Logs go to stderr so JSON output on stdout stays machine-readable.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod error;
pub mod render;
pub mod sensor;

use taxi_core::TripState;
use taxi_meter::{MeterBuilder, MeterConfig, MeterResult, PositionDistanceSource};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::{CliCommand, HELP};
use crate::error::CliResult;
use crate::render::OutputFormat;
use crate::sensor::SimulatedSensor;

/// Runs the meter until the operator quits or stdin closes.
pub async fn run() -> CliResult<()> {
    init_tracing();

    let config = MeterConfig::load_or_default(None);
    info!(
        device = %config.device.name,
        device_id = %config.device_id(),
        "Starting taxi meter"
    );

    let format = OutputFormat::from_env();
    let currency = config.rates.currency.clone();

    let source = PositionDistanceSource::from_settings(&config.tracking);
    let sensor = SimulatedSensor::new(SimulatedSensor::speed_from_env(), config.clock.tick_interval())
        .spawn(source.feed());

    let (meter, handle) = MeterBuilder::from_config(&config)
        .with_distance_source(source)
        .build()?;
    let meter_task = meter.spawn();
    let render_task = spawn_renderer(handle.subscribe(), format, currency);

    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let result = match line.parse::<CliCommand>() {
            Ok(CliCommand::Toggle) => handle.toggle().await,
            Ok(CliCommand::Reset) => handle.reset().await,
            Ok(CliCommand::Quit) => break,
            Err(e) => {
                warn!(error = %e, "Ignoring input");
                eprintln!("{HELP}");
                continue;
            }
        };

        if !keep_going(result)? {
            break;
        }
    }

    let last = match handle.shutdown().await {
        Ok(state) => state,
        Err(e) if e.is_terminal() => handle.snapshot(),
        Err(e) => return Err(e.into()),
    };
    sensor.abort();

    join_meter(meter_task).await;

    match render_task.await {
        Ok(result) => result?,
        Err(e) => warn!(error = %e, "Render task failed"),
    }

    info!(
        elapsed_seconds = last.elapsed_seconds,
        distance_km = last.distance_km,
        total_fare = last.total_fare(),
        "Taxi meter stopped"
    );
    Ok(())
}

/// Decides whether the command loop continues after a meter command.
/// Returns `Ok(false)` once the meter is gone.
fn keep_going(result: MeterResult<TripState>) -> CliResult<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.is_terminal() => {
            warn!(error = %e, "Meter is gone, leaving command loop");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Waits for the meter task, logging a panic or cancellation.
/// Returns true if the task finished cleanly.
async fn join_meter(task: JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Meter task failed");
            false
        }
    }
}

/// Writes one line per published state until the meter goes away.
fn spawn_renderer(
    mut states: watch::Receiver<TripState>,
    format: OutputFormat,
    currency: String,
) -> JoinHandle<CliResult<()>> {
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();

        loop {
            let line = {
                let state = states.borrow_and_update();
                format.render(&state, &currency)?
            };

            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;

            if states.changed().await.is_err() {
                break;
            }
        }

        Ok(())
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show every fare recomputation
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use taxi_meter::MeterError;

    #[test]
    fn test_keep_going_after_command() {
        assert!(keep_going(Ok(TripState::new("Day rate"))).unwrap());
    }

    #[test]
    fn test_stop_loop_when_meter_is_gone() {
        assert!(!keep_going(Err(MeterError::ShuttingDown)).unwrap());
    }

    #[test]
    fn test_other_meter_errors_propagate() {
        let err = keep_going(Err(MeterError::InvalidConfig("bad".into()))).unwrap_err();
        assert!(matches!(err, CliError::Meter(MeterError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_join_meter_reports_panic() {
        let task = tokio::spawn(async {
            panic!("meter crashed");
        });
        assert!(!join_meter(task).await);
    }

    #[tokio::test]
    async fn test_join_meter_clean_exit() {
        let task = tokio::spawn(async {});
        assert!(join_meter(task).await);
    }
}
