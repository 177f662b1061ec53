//! Break countdown readout shown on the primary curtain surface

use std::time::Duration;

use serde::Serialize;

use super::countdown::ceil_secs;

/// Everything a presenter needs to draw the break countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readout {
    pub remaining_secs: u64,
    pub duration_secs: u64,
    /// `m:ss`
    pub text: String,
    /// Binary dots, most significant bit first, lit where `remaining_secs` has a one
    pub dots: Vec<bool>,
}

impl Readout {
    pub fn new(remaining: Duration, duration: Duration) -> Self {
        let remaining_secs = ceil_secs(remaining);
        let duration_secs = ceil_secs(duration);
        Self {
            remaining_secs,
            duration_secs,
            text: format!("{}:{:02}", remaining_secs / 60, remaining_secs % 60),
            dots: dots(remaining_secs, duration_secs),
        }
    }
}

fn dots(value: u64, duration_secs: u64) -> Vec<bool> {
    let width = (u64::BITS - duration_secs.leading_zeros()).max(1);
    (0..width).rev().map(|bit| value & (1 << bit) != 0).collect()
}
