//! Boundary, interface and initial-condition residuals.
//!
//! Normal directions follow the outward radial convention: at each radial
//! interface the condition is written for -n.(J + u c) with n = +r, where
//! J = -D grad(c), so the flux expression is D dc/dr - u_r c.

use tch::Tensor;

use crate::closures::{cbf_shift_factor, glut1_flux};
use crate::derivatives;
use crate::network::NvuNet;
use crate::params::{EndFeetBlend, Parameters};
use crate::sampling::CollocationSet;

/// Mean-squared boundary-condition losses grouped by family.
pub struct BoundaryLosses {
    /// Inlet Danckwerts + outlet zero-convective-flux + pressure drop
    /// (CBF-shifted) + wall no-slip + axis symmetry.
    pub boundary: Tensor,
    /// The three transporter-mediated interface conditions, with the
    /// end-feet condition coverage-blended.
    pub interface: Tensor,
    /// Concentration mismatch against the literature initial state at t=0.
    pub initial: Tensor,
}

fn mean_sq(residual: &Tensor) -> Tensor {
    residual.square().mean(tch::Kind::Float)
}

/// Assemble every boundary/interface/initial loss for one collocation set.
pub fn boundary_losses(net: &NvuNet, batch: &CollocationSet, p: &Parameters) -> BoundaryLosses {
    // --- inlet: Danckwerts condition and shifted pressure ---
    let inlet = derivatives::evaluate(net, &batch.inlet.r, &batch.inlet.z, &batch.inlet.t);
    let fi = &inlet.fields;
    let danckwerts = &fi.u_z * &fi.c - &inlet.c_z * p.d_blood - &fi.u_z * p.c_inlet;
    let p_in = cbf_shift_factor(&batch.inlet.t, p) * p.p_inlet;
    let inlet_pressure = &fi.p - p_in;

    // --- outlet: zero diffusive flux, outlet pressure ---
    let outlet = derivatives::evaluate(net, &batch.outlet.r, &batch.outlet.z, &batch.outlet.t);
    let outlet_flux = &outlet.c_z * p.d_blood;
    let outlet_pressure = &outlet.fields.p - p.p_outlet;

    // --- symmetry axis: u_r = 0 and du_z/dr = 0 ---
    let axis = derivatives::evaluate(net, &batch.axis.r, &batch.axis.z, &batch.axis.t);
    let axis_loss = mean_sq(&axis.fields.u_r) + mean_sq(&axis.u_z_r);

    // --- lumen wall: no-slip and luminal GLUT1 flux ---
    let luminal = derivatives::evaluate(net, &batch.luminal.r, &batch.luminal.z, &batch.luminal.t);
    let fl = &luminal.fields;
    let wall_loss = mean_sq(&fl.u_r) + mean_sq(&fl.u_z);
    let luminal_flux = &luminal.c_r * p.d_blood - &fl.u_r * &fl.c
        - glut1_flux(&fl.c, p.glut1_luminal, p);

    // --- abluminal interface (barrier outer edge, basal lamina side) ---
    let abluminal =
        derivatives::evaluate(net, &batch.abluminal.r, &batch.abluminal.z, &batch.abluminal.t);
    let fa = &abluminal.fields;
    let abluminal_flux = &abluminal.c_r * p.d_barrier - &fa.u_r * &fa.c
        - glut1_flux(&fa.c, p.glut1_abluminal, p);

    // --- end-feet interface, coverage-weighted ---
    let endfeet = derivatives::evaluate(net, &batch.endfeet.r, &batch.endfeet.z, &batch.endfeet.t);
    let fe = &endfeet.fields;
    let total_flux = &endfeet.c_r * p.d_brain - &fe.u_r * &fe.c;
    let transporter = &total_flux - glut1_flux(&fe.c, p.glut1_endfeet, p);
    // open clefts pass glucose by free diffusion across the gap; the gap
    // conductance is the basal-lamina diffusivity over its thickness
    let p_cleft = p.d_barrier / p.h_basal_lamina;
    let cleft = &total_flux - (&fe.c - p.c_init_brain) * p_cleft;
    let delta = p.endfeet_coverage;
    let endfeet_loss = match p.endfeet_blend {
        // one heterogeneous boundary: blend the expressions, then square
        EndFeetBlend::WeightedExpression => {
            mean_sq(&(transporter * delta + cleft * (1.0 - delta)))
        }
        // two independently sampled boundaries: weight the squared means
        EndFeetBlend::WeightedSquares => {
            mean_sq(&transporter) * delta + mean_sq(&cleft) * (1.0 - delta)
        }
    };

    // --- initial condition ---
    let f0 = net.forward_fields(&batch.initial.r, &batch.initial.z, &batch.initial.t);
    let m0 = net.mask_geometry().masks(&batch.initial.r);
    let c_target = &m0.blood * p.c_init_blood
        + &m0.barrier * p.c_init_barrier
        + &m0.brain * p.c_init_brain;
    let initial_loss = mean_sq(&(&f0.c - c_target));

    BoundaryLosses {
        boundary: mean_sq(&danckwerts)
            + mean_sq(&inlet_pressure)
            + mean_sq(&outlet_flux)
            + mean_sq(&outlet_pressure)
            + axis_loss
            + wall_loss,
        interface: mean_sq(&luminal_flux) + mean_sq(&abluminal_flux) + endfeet_loss,
        initial: initial_loss,
    }
}
