//! Scalar validation summaries against published experimental ranges.
//!
//! The trained network is evaluated on a canonical (r, z) grid at the end
//! of the simulated horizon; domain-mean scalars are compared against
//! literature ranges for capillary blood velocity, brain extracellular
//! glucose and interstitial flow speed.

use anyhow::Result;
use ndarray::Array2;
use tch::{Device, Kind, Tensor};

use crate::network::NvuNet;
use crate::params::Parameters;

/// Published experimental ranges the summaries are held against.
pub const BLOOD_VELOCITY_RANGE_MMS: (f64, f64) = (0.99, 2.03);
pub const BRAIN_CONCENTRATION_RANGE_MM: (f64, f64) = (1.03, 2.2);
/// ISF bulk flow is of order 1e-7 m/s; accept within a decade.
pub const ISF_SPEED_RANGE_MS: (f64, f64) = (1.0e-8, 1.0e-6);

/// Network fields evaluated on a regular (r, z) grid at a fixed time.
/// Row index = radial point, column index = axial point.
pub struct FieldGrid {
    pub n_r: usize,
    pub n_z: usize,
    pub concentration: Array2<f64>,
    pub u_r: Array2<f64>,
    pub u_z: Array2<f64>,
}

impl FieldGrid {
    pub fn zeros(n_r: usize, n_z: usize) -> Self {
        Self {
            n_r,
            n_z,
            concentration: Array2::zeros((n_r, n_z)),
            u_r: Array2::zeros((n_r, n_z)),
            u_z: Array2::zeros((n_r, n_z)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Mean axial blood velocity in the lumen (mm/s).
    pub mean_blood_velocity_mms: f64,
    /// Mean brain-domain glucose concentration (mM).
    pub mean_brain_concentration_mm: f64,
    /// Mean interstitial flow speed in the brain domain (m/s).
    pub mean_isf_speed_ms: f64,
    pub blood_velocity_ok: bool,
    pub brain_concentration_ok: bool,
    pub isf_speed_ok: bool,
}

impl ValidationReport {
    pub fn all_ok(&self) -> bool {
        self.blood_velocity_ok && self.brain_concentration_ok && self.isf_speed_ok
    }
}

/// Evaluate the network on an `n_r` x `n_z` grid at t = `p.t_end`.
pub fn evaluate_grid(
    net: &NvuNet,
    p: &Parameters,
    n_r: usize,
    n_z: usize,
    device: Device,
) -> Result<FieldGrid> {
    let n = (n_r * n_z) as i64;
    let r_lin = Tensor::linspace(0.0, p.r_outer(), n_r as i64, (Kind::Float, device));
    let z_lin = Tensor::linspace(0.0, p.l_axial, n_z as i64, (Kind::Float, device));
    let r = r_lin.reshape([n_r as i64, 1]).repeat([1, n_z as i64]).reshape([n, 1]);
    let z = z_lin.reshape([1, n_z as i64]).repeat([n_r as i64, 1]).reshape([n, 1]);
    let t = Tensor::full([n, 1], p.t_end, (Kind::Float, device));

    let fields = tch::no_grad(|| net.forward_fields(&r, &z, &t));
    let column = |t: &Tensor| -> Result<Vec<f64>> {
        Ok(Vec::<f64>::try_from(&t.reshape([n]).to_kind(Kind::Double))?)
    };
    let c = column(&fields.c)?;
    let ur = column(&fields.u_r)?;
    let uz = column(&fields.u_z)?;

    let mut grid = FieldGrid::zeros(n_r, n_z);
    for i in 0..n_r {
        for j in 0..n_z {
            let k = i * n_z + j;
            grid.concentration[[i, j]] = c[k];
            grid.u_r[[i, j]] = ur[k];
            grid.u_z[[i, j]] = uz[k];
        }
    }
    Ok(grid)
}

/// Domain-mean summaries of an evaluated grid, compared against the
/// literature ranges.
pub fn validate(grid: &FieldGrid, p: &Parameters) -> ValidationReport {
    let dr = p.r_outer() / (grid.n_r.max(2) - 1) as f64;
    let r_barrier_outer = p.r_barrier_outer();

    let mut blood_v = 0.0;
    let mut blood_n = 0usize;
    let mut brain_c = 0.0;
    let mut isf_v = 0.0;
    let mut brain_n = 0usize;

    for i in 0..grid.n_r {
        let r = i as f64 * dr;
        for j in 0..grid.n_z {
            if r < p.r_lumen {
                blood_v += grid.u_z[[i, j]];
                blood_n += 1;
            } else if r > r_barrier_outer {
                brain_c += grid.concentration[[i, j]];
                isf_v += (grid.u_r[[i, j]].powi(2) + grid.u_z[[i, j]].powi(2)).sqrt();
                brain_n += 1;
            }
        }
    }

    let mean_blood_velocity_mms = if blood_n > 0 {
        blood_v / blood_n as f64 * 1.0e3
    } else {
        0.0
    };
    let (mean_brain_concentration_mm, mean_isf_speed_ms) = if brain_n > 0 {
        (brain_c / brain_n as f64, isf_v / brain_n as f64)
    } else {
        (0.0, 0.0)
    };

    let in_range = |v: f64, (lo, hi): (f64, f64)| v >= lo && v <= hi;
    ValidationReport {
        mean_blood_velocity_mms,
        mean_brain_concentration_mm,
        mean_isf_speed_ms,
        blood_velocity_ok: in_range(mean_blood_velocity_mms, BLOOD_VELOCITY_RANGE_MMS),
        brain_concentration_ok: in_range(mean_brain_concentration_mm, BRAIN_CONCENTRATION_RANGE_MM),
        isf_speed_ok: in_range(mean_isf_speed_ms, ISF_SPEED_RANGE_MS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_flags_ranges() {
        let p = Parameters::default();
        let mut grid = FieldGrid::zeros(50, 20);
        // fill blood rows with 1.5 mm/s axial flow, brain rows with 1.5 mM
        // glucose and 1e-7 m/s drift
        let dr = p.r_outer() / 49.0;
        for i in 0..50 {
            let r = i as f64 * dr;
            for j in 0..20 {
                if r < p.r_lumen {
                    grid.u_z[[i, j]] = 1.5e-3;
                } else if r > p.r_barrier_outer() {
                    grid.concentration[[i, j]] = 1.5;
                    grid.u_r[[i, j]] = 1.0e-7;
                }
            }
        }
        let report = validate(&grid, &p);
        assert!(report.blood_velocity_ok);
        assert!(report.brain_concentration_ok);
        assert!(report.isf_speed_ok);
        assert!(report.all_ok());
    }
}
