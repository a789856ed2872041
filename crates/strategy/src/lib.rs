pub mod analysis;
pub mod pairs;
pub mod services;
pub mod session_clock;

pub use pairs::{InvalidPair, SignalRequest, VALID_PAIRS};
pub use services::signal_generator::SignalGenerator;
pub use session_clock::{SessionStatus, TradingSession};

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
