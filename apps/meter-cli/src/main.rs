//! # Taxi Meter Terminal Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load meter.toml + environment overrides
//! 3. Build the meter with an interval clock and a GPS-fed distance source
//! 4. Start the simulated positioning sensor
//! 5. Render every state change, read commands from stdin until `q`

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The actual setup is in lib.rs for better testability
    meter_cli::run().await?;
    Ok(())
}
