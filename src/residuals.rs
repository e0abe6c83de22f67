//! Interior (governing-equation) residuals.
//!
//! Each anatomical domain gets its residuals evaluated on its own
//! collocation subset, so no network capacity is spent forcing equations
//! where their fields do not exist. Every bare 1/r division uses r + eps to
//! keep the symmetry axis non-singular.

use tch::Tensor;

use crate::closures::{
    carreau_viscosity, consumption_eps, consumption_rate, shear_rate, ConsumingRegion,
};
use crate::derivatives::{self, DerivativeBundle};
use crate::network::NvuNet;
use crate::params::Parameters;
use crate::sampling::CollocationSet;

/// Mean-squared interior residuals, one scalar tensor per equation family.
pub struct InteriorLosses {
    /// r- and z-momentum in the blood lumen.
    pub momentum: Tensor,
    /// Incompressibility in blood and brain.
    pub continuity: Tensor,
    /// Darcy velocity-pressure relation in brain ECS.
    pub darcy: Tensor,
    /// Convection-diffusion-reaction glucose transport, all domains.
    pub transport: Tensor,
}

fn mean_sq(residual: &Tensor) -> Tensor {
    residual.square().mean(tch::Kind::Float)
}

/// Radius used as a divisor: r shifted away from zero by an offset that is
/// a small fraction of the lumen radius, so interior points see the true
/// 1/r geometry to well under a percent.
pub fn axis_regularized(r: &Tensor, p: &Parameters) -> Tensor {
    r + p.axis_epsilon
}

/// Blood lumen: cylindrical incompressible Navier-Stokes with Carreau
/// viscosity, plus convective glucose transport.
fn blood_residuals(d: &DerivativeBundle, r: &Tensor, p: &Parameters) -> (Tensor, Tensor, Tensor) {
    let r_safe = axis_regularized(r, p);
    let f = &d.fields;

    let gamma = shear_rate(&f.u_r, &d.u_r_r, &d.u_r_z, &d.u_z_r, &d.u_z_z, &r_safe);
    let mu = carreau_viscosity(&gamma, p);

    // r-momentum: rho Du_r/Dt = -dp/dr + mu (lap(u_r) - u_r/r^2)
    let visc_r = &d.u_r_rr + &d.u_r_r / &r_safe - &f.u_r / r_safe.square() + &d.u_r_zz;
    let mom_r = (&d.u_r_t + &f.u_r * &d.u_r_r + &f.u_z * &d.u_r_z) * p.rho_blood + &d.p_r
        - &mu * visc_r;

    // z-momentum: rho Du_z/Dt = -dp/dz + mu lap(u_z)
    let visc_z = &d.u_z_rr + &d.u_z_r / &r_safe + &d.u_z_zz;
    let mom_z = (&d.u_z_t + &f.u_r * &d.u_z_r + &f.u_z * &d.u_z_z) * p.rho_blood + &d.p_z
        - &mu * visc_z;

    let continuity = &d.u_r_r + &f.u_r / &r_safe + &d.u_z_z;

    let lap_c = &d.c_rr + &d.c_r / &r_safe + &d.c_zz;
    let transport = &d.c_t + &f.u_r * &d.c_r + &f.u_z * &d.c_z
        - lap_c * p.d_blood
        - consumption_rate(&f.c, ConsumingRegion::Blood, p);

    (mean_sq(&mom_r) + mean_sq(&mom_z), mean_sq(&continuity), mean_sq(&transport))
}

/// Barrier: diffusion-only transport. Consumption is confined to the
/// endothelial sublayer; the acellular basal lamina beyond
/// r_lumen + h_endothelium consumes nothing.
fn barrier_residual(d: &DerivativeBundle, r: &Tensor, p: &Parameters) -> Tensor {
    let r_safe = axis_regularized(r, p);
    let f = &d.fields;

    let r_endo_outer = p.r_lumen + p.h_endothelium;
    let endo = ((r - r_endo_outer) / (-p.mask_width)).sigmoid();
    let eps = consumption_eps(ConsumingRegion::Endothelium, p);
    let consumption = endo * (&f.c * (-eps) / (&f.c + p.k_glc_half));

    let lap_c = &d.c_rr + &d.c_r / &r_safe + &d.c_zz;
    let transport = &d.c_t - lap_c * p.d_barrier - consumption;
    mean_sq(&transport)
}

/// Brain ECS: Darcy flow, incompressibility and porosity-weighted transport
/// with velocity-dependent dispersion.
fn brain_residuals(d: &DerivativeBundle, r: &Tensor, p: &Parameters) -> (Tensor, Tensor, Tensor) {
    let r_safe = axis_regularized(r, p);
    let f = &d.fields;
    let mobility = p.kappa_brain / p.mu_isf;

    let darcy_r = &f.u_r + &d.p_r * mobility;
    let darcy_z = &f.u_z + &d.p_z * mobility;

    let continuity = &d.u_r_r + &f.u_r / &r_safe + &d.u_z_z;

    let speed = (f.u_r.square() + f.u_z.square() + 1e-30).sqrt();
    let d_eff = speed * p.brain_dispersivity + p.brain_porosity * p.d_brain;
    let lap_c = &d.c_rr + &d.c_r / &r_safe + &d.c_zz;
    let transport = &d.c_t * p.brain_porosity + &f.u_r * &d.c_r + &f.u_z * &d.c_z
        - d_eff * lap_c
        - consumption_rate(&f.c, ConsumingRegion::Brain, p);

    (
        mean_sq(&darcy_r) + mean_sq(&darcy_z),
        mean_sq(&continuity),
        mean_sq(&transport),
    )
}

/// Assemble all interior residual losses for one collocation set.
pub fn interior_losses(net: &NvuNet, batch: &CollocationSet, p: &Parameters) -> InteriorLosses {
    let blood = derivatives::evaluate(net, &batch.blood.r, &batch.blood.z, &batch.blood.t);
    let barrier = derivatives::evaluate(net, &batch.barrier.r, &batch.barrier.z, &batch.barrier.t);
    let brain = derivatives::evaluate(net, &batch.brain.r, &batch.brain.z, &batch.brain.t);

    let (momentum, cont_blood, trans_blood) = blood_residuals(&blood, &batch.blood.r, p);
    let trans_barrier = barrier_residual(&barrier, &batch.barrier.r, p);
    let (darcy, cont_brain, trans_brain) = brain_residuals(&brain, &batch.brain.r, p);

    InteriorLosses {
        momentum,
        continuity: cont_blood + cont_brain,
        darcy,
        transport: trans_blood + trans_barrier + trans_brain,
    }
}
