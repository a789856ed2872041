use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use common::models::SignalStyle;

pub const VALID_PAIRS: &[&str] = &["EUR/USD", "GBP/USD", "USD/JPY", "XAU/USD", "AUD/USD", "USD/CAD"];

#[derive(Error, Debug, PartialEq)]
#[error("Invalid pair {pair}. Use: {}", VALID_PAIRS.join(", "))]
pub struct InvalidPair {
    pub pair: String,
}

/// Parsed arguments of a signal request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRequest {
    pub symbol: Option<&'static str>,
    pub style: SignalStyle,
}

impl Default for SignalRequest {
    fn default() -> Self {
        Self {
            symbol: None,
            style: SignalStyle::Normal,
        }
    }
}

impl SignalRequest {
    /// Scans whitespace separated arguments such as `EUR/USD quick`.
    /// Tokens that are neither a style nor shaped like a pair are ignored.
    pub fn parse(args: &str) -> Result<Self, InvalidPair> {
        let mut request = Self::default();

        for arg in args.split_whitespace() {
            if let Some(style) = SignalStyle::parse_arg(arg) {
                request.style = style;
            } else if let Some(candidate) = normalize_pair(arg) {
                request.symbol = Some(validate_pair(&candidate)?);
            }
        }

        Ok(request)
    }
}

/// Normalizes `eurusd`, `EUR_USD`, `eur-usd` and `EUR/USD` to `EUR/USD`.
/// Returns `None` when the token does not look like a pair at all.
pub fn normalize_pair(arg: &str) -> Option<String> {
    let upper = arg.trim().to_ascii_uppercase().replace(['_', '-'], "/");

    if upper.contains('/') {
        return Some(upper);
    }

    if upper.len() == 6 && upper.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(format!("{}/{}", &upper[..3], &upper[3..]));
    }

    None
}

pub fn validate_pair(pair: &str) -> Result<&'static str, InvalidPair> {
    VALID_PAIRS
        .iter()
        .find(|p| **p == pair)
        .copied()
        .ok_or_else(|| InvalidPair {
            pair: pair.to_string(),
        })
}

pub fn random_pair<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    VALID_PAIRS.choose(rng).copied().unwrap_or(VALID_PAIRS[0])
}
