//! Placement strategy trait and execution context.

use crate::panel::Panel;
use crate::piece::UnitPiece;
use crate::result::PlacementResult;
use crate::settings::Settings;
use crate::{Error, Result};
use rand::RngCore;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rough running-time class of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EstimatedTime {
    /// Single greedy pass.
    Fast,
    /// Bounded search.
    Medium,
    /// Population-based search.
    Slow,
}

/// Static description of a registered strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AlgorithmInfo {
    /// Registry name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Whether pieces may be turned by 90 degrees.
    pub supports_rotation: bool,
    /// Whether more than one sheet may be opened.
    pub supports_multi_sheet: bool,
    /// Running-time class.
    pub estimated_time: EstimatedTime,
}

/// Wall-clock limit for a search.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// Starts a deadline of `timeout_ms` milliseconds (None = unlimited).
    pub fn new(timeout_ms: Option<u64>) -> Self {
        Self {
            start: Instant::now(),
            limit: timeout_ms.map(Duration::from_millis),
        }
    }

    /// A deadline that never expires.
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Returns true once the limit has passed.
    pub fn expired(&self) -> bool {
        self.limit.map_or(false, |limit| self.start.elapsed() >= limit)
    }

    /// Time left before expiry (None = unlimited).
    pub fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()))
    }

    /// Time since the deadline was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// Per-call state handed to a strategy.
pub struct SolveContext<'a> {
    /// Random source for stochastic strategies.
    pub rng: &'a mut dyn RngCore,
    /// Search deadline.
    pub deadline: Deadline,
}

impl<'a> SolveContext<'a> {
    /// Creates a context with a deadline taken from the settings.
    pub fn new(rng: &'a mut dyn RngCore, settings: &Settings) -> Self {
        Self {
            rng,
            deadline: Deadline::new(settings.timeout_ms),
        }
    }

    /// Replaces the deadline.
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Milliseconds since the context was created.
    pub fn elapsed_ms(&self) -> u64 {
        self.deadline.elapsed().as_millis() as u64
    }
}

/// A placement algorithm.
///
/// Implementations are stateless between calls, so one instance can serve
/// concurrent requests.
pub trait PlacementStrategy: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Capabilities and description.
    fn info(&self) -> AlgorithmInfo;

    /// Places expanded `pieces` onto copies of the first panel.
    fn execute(
        &self,
        pieces: &[UnitPiece],
        panels: &[Panel],
        settings: &Settings,
        ctx: &mut SolveContext<'_>,
    ) -> Result<PlacementResult>;
}

/// Returns the panel a request is cut from.
pub fn primary_panel(panels: &[Panel]) -> Result<&Panel> {
    panels
        .first()
        .ok_or_else(|| Error::ConfigError("No panels supplied".to_string()))
}
