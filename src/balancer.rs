//! Adaptive loss balancing.
//!
//! Early in training the stiff momentum residual can be many orders of
//! magnitude larger than the initial-condition or interface terms and
//! starve them of gradient. The balancer tracks an exponential moving
//! average of each term's magnitude and rescales weights so every term
//! lands on a comparable scale, with the momentum (physics) weight anchored
//! at 1.0. Weights change only on the update cadence; between updates they
//! are applied as-is.

/// Named loss terms, in a fixed order shared with history records and the
/// database schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossTerm {
    Momentum,
    Continuity,
    Darcy,
    Transport,
    Boundary,
    Interface,
    Initial,
}

pub const NUM_TERMS: usize = 7;

impl LossTerm {
    pub const ALL: [LossTerm; NUM_TERMS] = [
        LossTerm::Momentum,
        LossTerm::Continuity,
        LossTerm::Darcy,
        LossTerm::Transport,
        LossTerm::Boundary,
        LossTerm::Interface,
        LossTerm::Initial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LossTerm::Momentum => "momentum",
            LossTerm::Continuity => "continuity",
            LossTerm::Darcy => "darcy",
            LossTerm::Transport => "transport",
            LossTerm::Boundary => "boundary",
            LossTerm::Interface => "interface",
            LossTerm::Initial => "initial",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Stateful weight balancer. The only mutator is [`LossBalancer::observe`];
/// everything else reads.
///
/// Each term's EMA is seeded by the first finite magnitude observed for it
/// and blended thereafter. Non-finite magnitudes never enter the EMA, even
/// during warm-up: a diverged batch early on must not poison a term's
/// history, because the NaN would persist through every later blend.
pub struct LossBalancer {
    cadence: usize,
    decay: f64,
    seeded: [bool; NUM_TERMS],
    ema: [f64; NUM_TERMS],
    weights: [f64; NUM_TERMS],
}

impl LossBalancer {
    /// `cadence`: iterations between weight updates. `decay`: weight on
    /// history in the EMA (0.9 keeps ~10 updates of memory).
    pub fn new(cadence: usize, decay: f64) -> Self {
        Self {
            cadence: cadence.max(1),
            decay,
            seeded: [false; NUM_TERMS],
            ema: [0.0; NUM_TERMS],
            weights: [1.0; NUM_TERMS],
        }
    }

    pub fn weight(&self, term: LossTerm) -> f64 {
        self.weights[term.index()]
    }

    pub fn weights(&self) -> &[f64; NUM_TERMS] {
        &self.weights
    }

    /// Feed the freshly measured per-term magnitudes for `iteration`.
    /// Weights are recomputed only when the iteration hits the cadence;
    /// otherwise this is a no-op and the current weights keep applying.
    pub fn observe(&mut self, iteration: usize, magnitudes: &[f64; NUM_TERMS]) {
        if iteration % self.cadence != 0 {
            return;
        }
        for i in 0..NUM_TERMS {
            let mag = magnitudes[i];
            if !mag.is_finite() {
                continue;
            }
            if self.seeded[i] {
                self.ema[i] = self.decay * self.ema[i] + (1.0 - self.decay) * mag;
            } else {
                self.ema[i] = mag;
                self.seeded[i] = true;
            }
        }
        // inverse-EMA weights, renormalized so momentum stays at 1.0; an
        // unseeded term keeps the neutral weight 1.0 until it has history
        if !self.seeded[LossTerm::Momentum.index()] {
            return;
        }
        let anchor = self.ema[LossTerm::Momentum.index()].max(1e-12);
        for i in 0..NUM_TERMS {
            if self.seeded[i] {
                self.weights[i] = anchor / self.ema[i].max(1e-12);
            }
        }
    }

    /// Weighted total of the per-term scalar losses.
    pub fn weighted_total(&self, losses: &[tch::Tensor; NUM_TERMS]) -> tch::Tensor {
        let mut total = &losses[0] * self.weights[0];
        for i in 1..NUM_TERMS {
            total = total + &losses[i] * self.weights[i];
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_seeds_ema_and_anchors_momentum() {
        let mut b = LossBalancer::new(100, 0.9);
        let mags = [4.0, 2.0, 1.0, 1.0, 0.5, 0.25, 0.1];
        b.observe(0, &mags);
        assert_eq!(b.weight(LossTerm::Momentum), 1.0);
        assert_eq!(b.weight(LossTerm::Continuity), 2.0);
        assert_eq!(b.weight(LossTerm::Initial), 40.0);
    }

    #[test]
    fn weights_fixed_between_updates() {
        let mut b = LossBalancer::new(100, 0.9);
        b.observe(0, &[1.0; NUM_TERMS]);
        let before = *b.weights();
        b.observe(57, &[100.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(*b.weights(), before);
    }

    #[test]
    fn steady_update_blends_history() {
        let mut b = LossBalancer::new(1, 0.9);
        b.observe(0, &[1.0; NUM_TERMS]);
        b.observe(1, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 11.0]);
        // initial EMA: 0.9*1 + 0.1*11 = 2.0, so its weight halves
        assert!((b.weight(LossTerm::Initial) - 0.5).abs() < 1e-12);
        assert_eq!(b.weight(LossTerm::Momentum), 1.0);
    }

    #[test]
    fn non_finite_first_observation_does_not_poison_a_term() {
        let mut b = LossBalancer::new(1, 0.9);
        // interface diverges on the very first observed batch
        b.observe(0, &[4.0, 1.0, 1.0, 1.0, 1.0, f64::NAN, 1.0]);
        assert_eq!(b.weight(LossTerm::Interface), 1.0);
        assert_eq!(b.weight(LossTerm::Continuity), 4.0);
        // once it turns finite it seeds normally instead of blending with NaN
        b.observe(1, &[4.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0]);
        let w = b.weight(LossTerm::Interface);
        assert!(w.is_finite());
        assert!((w - 8.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_magnitude_leaves_ema_untouched() {
        let mut b = LossBalancer::new(1, 0.9);
        b.observe(0, &[1.0; NUM_TERMS]);
        let w = *b.weights();
        b.observe(1, &[f64::NAN, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(*b.weights(), w);
    }
}
