//! # Trip Rendering
//!
//! Turns a [`TripState`] into one line of output.
//!
//! ## Text Layout
//! ```text
//! ● 00:04:12  1.37 km  55.27 kr  (start 39.00 kr + distance 15.07 kr + time 25.20 kr)  Day rate (06:00-17:00): ...
//! ○ 00:00:00  0.00 km  39.00 kr  (start 39.00 kr + distance 0.00 kr + time 0.00 kr)  Day rate (06:00-17:00): ...
//! ```
//!
//! Rounding to two decimals happens here and nowhere else.

use taxi_core::TripState;

use crate::error::CliResult;

/// How each state change is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable single line.
    #[default]
    Text,

    /// One JSON object per line (camelCase fields).
    Json,
}

impl OutputFormat {
    /// Reads `TAXIMETER_OUTPUT` (`text` or `json`).
    pub fn from_env() -> Self {
        match std::env::var("TAXIMETER_OUTPUT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }

    /// Renders one state according to this format.
    pub fn render(&self, state: &TripState, currency: &str) -> CliResult<String> {
        match self {
            OutputFormat::Text => Ok(render_text(state, currency)),
            OutputFormat::Json => Ok(serde_json::to_string(state)?),
        }
    }
}

/// Formats whole seconds as `HH:MM:SS`. Hours keep growing past 99.
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats an amount with two decimals and the currency label.
pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

/// Renders the text line for one state.
pub fn render_text(state: &TripState, currency: &str) -> String {
    let marker = if state.running { '●' } else { '○' };
    let mut line = format!(
        "{marker} {}  {:.2} km  {}",
        format_elapsed(state.elapsed_seconds),
        state.distance_km,
        format_amount(state.total_fare(), currency),
    );

    if let Some(fare) = state.fare_breakdown {
        line.push_str(&format!(
            "  (start {} + distance {} + time {})",
            format_amount(fare.start_fare, currency),
            format_amount(fare.distance_fare, currency),
            format_amount(fare.time_fare, currency),
        ));
    }

    line.push_str("  ");
    line.push_str(&state.rate_info_text);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_core::FareBreakdown;

    fn sample_state() -> TripState {
        TripState {
            running: true,
            elapsed_seconds: 65,
            distance_km: 0.5,
            fare_breakdown: Some(FareBreakdown {
                start_fare: 30.0,
                distance_fare: 5.0,
                time_fare: 2.1666666,
                total_fare: 37.1666666,
                is_night_rate: false,
            }),
            rate_info_text: "Day rate".into(),
        }
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(65), "00:01:05");
        assert_eq!(format_elapsed(3661), "01:01:01");
        assert_eq!(format_elapsed(100 * 3600), "100:00:00");
    }

    #[test]
    fn test_format_amount_rounds_to_two_decimals() {
        assert_eq!(format_amount(35.0333, "kr"), "35.03 kr");
        assert_eq!(format_amount(0.0, "kr"), "0.00 kr");
        assert_eq!(format_amount(12.349, "EUR"), "12.35 EUR");
    }

    #[test]
    fn test_render_text_running() {
        let line = render_text(&sample_state(), "kr");
        assert_eq!(
            line,
            "● 00:01:05  0.50 km  37.17 kr  (start 30.00 kr + distance 5.00 kr + time 2.17 kr)  Day rate"
        );
    }

    #[test]
    fn test_render_text_before_first_computation() {
        let state = TripState::new("Night rate");
        let line = render_text(&state, "kr");
        assert_eq!(line, "○ 00:00:00  0.00 km  0.00 kr  Night rate");
    }

    #[test]
    fn test_render_json_uses_camel_case() {
        let json = OutputFormat::Json.render(&sample_state(), "kr").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["elapsedSeconds"], 65);
        assert_eq!(value["running"], true);
        assert_eq!(value["fareBreakdown"]["startFare"], 30.0);
        assert_eq!(value["rateInfoText"], "Day rate");
        assert!(!json.contains('\n'));
    }
}
