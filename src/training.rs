//! PINN training loop.
//!
//! One iteration is a fully blocking sequence: sample (on cadence), forward
//! + derivative extraction, residual assembly, balancing, finiteness check,
//! backward, Adam step. Network weights live in the caller's `VarStore`;
//! the balancer state lives here for the duration of a run.

use anyhow::{bail, Result};
use tch::nn::{self, OptimizerConfig};

use crate::balancer::{LossBalancer, LossTerm, NUM_TERMS};
use crate::boundary::boundary_losses;
use crate::network::NvuNet;
use crate::params::{NonFiniteAction, Parameters};
use crate::residuals::interior_losses;
use crate::sampling::Sampler;

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Collocation points are redrawn every this many epochs.
    pub resample_every: usize,
    /// Balancer update cadence (iterations).
    pub balance_every: usize,
    /// EMA decay of the balancer.
    pub balance_decay: f64,
    /// Progress log cadence.
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 1000,
            learning_rate: 1e-3,
            resample_every: 200,
            balance_every: 100,
            balance_decay: 0.9,
            log_every: 100,
        }
    }
}

/// Scalar loss breakdown of one epoch, ordered as [`LossTerm::ALL`].
#[derive(Debug, Clone)]
pub struct EpochRecord {
    pub epoch: usize,
    pub total: f64,
    pub terms: [f64; NUM_TERMS],
}

#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochRecord>,
}

impl TrainingHistory {
    pub fn final_total(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.total)
    }
}

/// Train the network in place; returns the per-epoch loss history.
pub fn train(
    vs: &nn::VarStore,
    net: &NvuNet,
    sampler: &Sampler,
    p: &Parameters,
    cfg: &TrainConfig,
) -> Result<TrainingHistory> {
    p.validate()?;
    let mut opt = nn::Adam::default().build(vs, cfg.learning_rate)?;
    let mut balancer = LossBalancer::new(cfg.balance_every, cfg.balance_decay);
    let mut history = TrainingHistory::default();

    let mut batch = sampler.sample();
    let mut skipped = 0usize;

    for epoch in 0..cfg.epochs {
        if epoch > 0 && epoch % cfg.resample_every.max(1) == 0 {
            batch = sampler.sample();
        }

        let interior = interior_losses(net, &batch, p);
        let bc = boundary_losses(net, &batch, p);
        let losses = [
            interior.momentum,
            interior.continuity,
            interior.darcy,
            interior.transport,
            bc.boundary,
            bc.interface,
            bc.initial,
        ];

        let mut magnitudes = [0.0f64; NUM_TERMS];
        for (m, loss) in magnitudes.iter_mut().zip(&losses) {
            *m = f64::from(loss);
        }
        balancer.observe(epoch, &magnitudes);

        let total = balancer.weighted_total(&losses);
        let total_val = f64::from(&total);

        if !total_val.is_finite() {
            match p.non_finite {
                NonFiniteAction::Abort => {
                    bail!("non-finite total loss {total_val} at epoch {epoch}")
                }
                NonFiniteAction::Skip => {
                    skipped += 1;
                    log::warn!("epoch {epoch}: non-finite loss, update skipped");
                    history.epochs.push(EpochRecord { epoch, total: total_val, terms: magnitudes });
                    continue;
                }
            }
        }

        opt.zero_grad();
        total.backward();
        opt.step();

        history.epochs.push(EpochRecord { epoch, total: total_val, terms: magnitudes });

        if epoch % cfg.log_every.max(1) == 0 {
            log::info!(
                "epoch {epoch}: total={total_val:.6e} momentum={:.3e} transport={:.3e} \
                 interface={:.3e} initial={:.3e}",
                magnitudes[LossTerm::Momentum.index()],
                magnitudes[LossTerm::Transport.index()],
                magnitudes[LossTerm::Interface.index()],
                magnitudes[LossTerm::Initial.index()],
            );
        }
    }

    if skipped > 0 {
        log::warn!("{skipped} updates skipped due to non-finite losses");
    }
    Ok(history)
}
