//! Tension filter: separates real mass changes from noise and extruder pull.
//!
//! Bands on `|delta|` against the last accepted reading:
//!
//! | band     | range                          | action             |
//! |----------|--------------------------------|--------------------|
//! | noise    | `< resolution`                 | hold               |
//! | real     | `resolution ..< tension`       | accept             |
//! | artifact | `>= tension`                   | hold (last good)   |
//!
//! With `artifact_accept_after = Some(n)`, an artifact-band reading is accepted once
//! `n` artifacts have been held back to back; this is how a roll mounted on an empty
//! mount gets picked up. The default is 3. `None` holds artifacts forever.

use crate::config::FilterCfg;

/// The only weight value the estimator and status machine ever see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableReading {
    pub net_weight_g: f32,
    pub cycle: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Noise,
    Real,
    Artifact,
}

/// Classify a delta. `NaN` lands in the artifact band.
pub fn classify(delta_g: f32, resolution_g: f32, tension_threshold_g: f32) -> Band {
    let d = delta_g.abs();
    if d < resolution_g {
        Band::Noise
    } else if d < tension_threshold_g {
        Band::Real
    } else {
        Band::Artifact
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOutcome {
    /// First reading after construction or reset.
    Baseline(StableReading),
    /// Real mass change.
    Accepted {
        previous: StableReading,
        current: StableReading,
    },
    /// Noise; the previous reading is held.
    Steady(StableReading),
    /// Tension artifact; the previous reading is held.
    Artifact {
        held: StableReading,
        delta_g: f32,
        streak: u32,
    },
}

impl FilterOutcome {
    /// The reading published for this cycle.
    pub fn reading(&self) -> StableReading {
        match *self {
            Self::Baseline(r) | Self::Steady(r) => r,
            Self::Accepted { current, .. } => current,
            Self::Artifact { held, .. } => held,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Signed change of an accepted update; `None` for every other outcome.
    pub fn accepted_delta(&self) -> Option<f32> {
        match self {
            Self::Accepted { previous, current } => {
                Some(current.net_weight_g - previous.net_weight_g)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TensionFilter {
    cfg: FilterCfg,
    last: Option<StableReading>,
    artifact_streak: u32,
}

impl TensionFilter {
    pub fn new(cfg: FilterCfg) -> Self {
        Self {
            cfg,
            last: None,
            artifact_streak: 0,
        }
    }

    pub fn config(&self) -> &FilterCfg {
        &self.cfg
    }

    /// Last accepted reading, if any.
    pub fn last(&self) -> Option<StableReading> {
        self.last
    }

    /// Drop the history; the next reading becomes the baseline.
    pub fn reset(&mut self) {
        self.last = None;
        self.artifact_streak = 0;
    }

    pub fn update(&mut self, net_weight_g: f32, cycle: u64) -> FilterOutcome {
        let current = StableReading { net_weight_g, cycle };
        let Some(previous) = self.last else {
            self.last = Some(current);
            self.artifact_streak = 0;
            return FilterOutcome::Baseline(current);
        };

        let delta_g = net_weight_g - previous.net_weight_g;
        match classify(delta_g, self.cfg.resolution_g, self.cfg.tension_threshold_g) {
            Band::Noise => {
                self.artifact_streak = 0;
                FilterOutcome::Steady(previous)
            }
            Band::Real => self.accept(previous, current),
            Band::Artifact => {
                if let Some(n) = self.cfg.artifact_accept_after
                    && self.artifact_streak >= n
                    && net_weight_g.is_finite()
                {
                    tracing::info!(
                        delta_g,
                        held = self.artifact_streak,
                        "persistent change accepted after held artifacts"
                    );
                    return self.accept(previous, current);
                }
                self.artifact_streak = self.artifact_streak.saturating_add(1);
                tracing::warn!(delta_g, streak = self.artifact_streak, "tension artifact held");
                FilterOutcome::Artifact {
                    held: previous,
                    delta_g,
                    streak: self.artifact_streak,
                }
            }
        }
    }

    fn accept(&mut self, previous: StableReading, current: StableReading) -> FilterOutcome {
        self.last = Some(current);
        self.artifact_streak = 0;
        FilterOutcome::Accepted { previous, current }
    }
}
