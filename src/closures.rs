//! Pure physics closures: shear-dependent viscosity, transporter flux,
//! CBF shift factor and consumption kinetics.
//!
//! Every tensor closure is differentiable end-to-end because it appears
//! inside residuals that are themselves differentiated during training.
//! Each has a scalar twin used by validation and tests.

use tch::Tensor;

use crate::params::{CbfShift, Parameters};

/// Carreau viscosity at shear rate `gamma_dot`.
///
/// mu = mu_inf + (mu0 - mu_inf) * [1 + (lambda*gamma_dot)^2]^((n-1)/2)
///
/// The exponent base is >= 1, so the power is finite as gamma_dot -> 0
/// (mu -> mu0) and decays toward mu_inf for large shear.
pub fn carreau_viscosity(gamma_dot: &Tensor, p: &Parameters) -> Tensor {
    let lg = gamma_dot * p.carreau_lambda;
    let base: Tensor = lg.square() + 1.0;
    base.pow_tensor_scalar((p.carreau_n - 1.0) / 2.0) * (p.mu_zero - p.mu_inf) + p.mu_inf
}

/// Scalar twin of [`carreau_viscosity`].
pub fn carreau_viscosity_scalar(gamma_dot: f64, p: &Parameters) -> f64 {
    let lg = p.carreau_lambda * gamma_dot;
    p.mu_inf + (p.mu_zero - p.mu_inf) * (1.0 + lg * lg).powf((p.carreau_n - 1.0) / 2.0)
}

/// Number of `shift_width`s past the onset at which the ramp crosses its
/// midpoint. Keeps the factor within sigma(-3) ~ 5% of the amplitude away
/// from 1 for all t <= shift_onset.
const SHIFT_RAMP_OFFSET: f64 = 3.0;

/// Time-dependent pressure-shift factor for a CBF perturbation.
///
/// Holds at 1 up to the onset, then ramps over a few `shift_width` seconds
/// to 1 + amplitude (increase) or 1 - amplitude (decrease) via a logistic
/// sigmoid whose midpoint sits [`SHIFT_RAMP_OFFSET`] widths past the onset.
pub fn cbf_shift_factor(t: &Tensor, p: &Parameters) -> Tensor {
    let signed = match p.cbf_shift {
        CbfShift::None => return t.ones_like(),
        CbfShift::Increase => p.shift_amplitude,
        CbfShift::Decrease => -p.shift_amplitude,
    };
    let ramp = ((t - p.shift_onset) / p.shift_width - SHIFT_RAMP_OFFSET).sigmoid();
    ramp * signed + 1.0
}

/// Scalar twin of [`cbf_shift_factor`].
pub fn cbf_shift_factor_scalar(t: f64, p: &Parameters) -> f64 {
    let signed = match p.cbf_shift {
        CbfShift::None => return 1.0,
        CbfShift::Increase => p.shift_amplitude,
        CbfShift::Decrease => -p.shift_amplitude,
    };
    let arg = (t - p.shift_onset) / p.shift_width - SHIFT_RAMP_OFFSET;
    1.0 + signed / (1.0 + (-arg).exp())
}

/// Saturating GLUT1 transporter flux (mol m^-2 s^-1) across a membrane
/// carrying `density` transporters per m^2.
///
/// Flux(c) = density * k_cat / (N_A * (K_m + c)) * c
pub fn glut1_flux(c: &Tensor, density: f64, p: &Parameters) -> Tensor {
    let vmax = density * p.glut1_kcat / p.avogadro;
    c * vmax / (c + p.glut1_km)
}

/// Scalar twin of [`glut1_flux`].
pub fn glut1_flux_scalar(c: f64, density: f64, p: &Parameters) -> f64 {
    density * p.glut1_kcat / p.avogadro * c / (p.glut1_km + c)
}

/// Cellular sub-regions with distinct consumption kinetics. The basal
/// lamina is acellular and consumes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumingRegion {
    Blood,
    Endothelium,
    BasalLamina,
    Brain,
}

/// Hill-inhibited maximal consumption rate for a region (mol m^-3 s^-1).
///
/// eps = k_glc * c_ATP / (1 + (c_ATP / K_I,ATP)^nH)
pub fn consumption_eps(region: ConsumingRegion, p: &Parameters) -> f64 {
    let (k_glc, c_atp) = match region {
        ConsumingRegion::Blood => (p.k_glc_blood, p.c_atp_blood),
        ConsumingRegion::Endothelium => (p.k_glc_endothelium, p.c_atp_endothelium),
        ConsumingRegion::Brain => (p.k_glc_brain, p.c_atp_brain),
        ConsumingRegion::BasalLamina => return 0.0,
    };
    k_glc * c_atp / (1.0 + (c_atp / p.k_i_atp).powf(p.hill_n))
}

/// Michaelis-Menten consumption term f_con(c) = -eps * c / (c + K_Glc).
pub fn consumption_rate(c: &Tensor, region: ConsumingRegion, p: &Parameters) -> Tensor {
    let eps = consumption_eps(region, p);
    c * (-eps) / (c + p.k_glc_half)
}

/// Scalar twin of [`consumption_rate`].
pub fn consumption_rate_scalar(c: f64, region: ConsumingRegion, p: &Parameters) -> f64 {
    -consumption_eps(region, p) * c / (c + p.k_glc_half)
}

/// Frobenius-norm shear rate of the axisymmetric strain-rate tensor,
/// gamma_dot = sqrt(2 sum eps_ij^2), from the velocity gradients in
/// cylindrical r-z coordinates.
///
/// eps_rr = du_r/dr, eps_zz = du_z/dz, eps_tt = u_r / r,
/// eps_rz = (du_r/dz + du_z/dr) / 2.
pub fn shear_rate(
    u_r: &Tensor,
    du_r_dr: &Tensor,
    du_r_dz: &Tensor,
    du_z_dr: &Tensor,
    du_z_dz: &Tensor,
    r_safe: &Tensor,
) -> Tensor {
    let eps_tt = u_r / r_safe;
    let eps_rz = (du_r_dz + du_z_dr) * 0.5;
    let sum_sq = du_r_dr.square() + du_z_dz.square() + eps_tt.square() + eps_rz.square() * 2.0;
    // small floor keeps the sqrt differentiable at zero strain
    (sum_sq * 2.0 + 1e-30).sqrt()
}
