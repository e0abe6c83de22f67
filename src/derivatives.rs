//! Derivative extraction for the PINN residuals.
//!
//! The governing equations need first derivatives of every field and second
//! derivatives of the velocity components and the concentration. Both levels
//! come from one forward pass: the first backward sweep runs with
//! `create_graph = true` so its outputs are themselves graph nodes, and the
//! second sweep differentiates those outputs against the same coordinate
//! leaves.
//!
//! Any derivative the graph cannot supply (a field that a domain mask has
//! pinned to a constant, or a first derivative that came back constant)
//! degrades to a zero tensor of the same shape. Masking makes such requests
//! routine, so they are recovered locally and never surfaced.

use tch::Tensor;

use crate::network::{Fields, NvuNet};

/// Every field value and partial derivative the residual assemblers consume,
/// all of shape `[n, 1]`. Rebuilt fresh for each batch; never persisted.
pub struct DerivativeBundle {
    pub fields: Fields,

    // first derivatives
    pub u_r_r: Tensor,
    pub u_r_z: Tensor,
    pub u_r_t: Tensor,
    pub u_z_r: Tensor,
    pub u_z_z: Tensor,
    pub u_z_t: Tensor,
    pub p_r: Tensor,
    pub p_z: Tensor,
    pub c_r: Tensor,
    pub c_z: Tensor,
    pub c_t: Tensor,

    // second derivatives needed by the viscous and diffusive terms
    pub u_r_rr: Tensor,
    pub u_r_zz: Tensor,
    pub u_z_rr: Tensor,
    pub u_z_zz: Tensor,
    pub c_rr: Tensor,
    pub c_zz: Tensor,
}

/// Gradient of `output` with respect to each coordinate leaf, with the
/// safe-gradient fallback: an untraceable derivative becomes zeros.
///
/// `create_graph` must be true for any gradient that will be differentiated
/// again.
pub fn safe_grad(output: &Tensor, leaves: &[&Tensor], create_graph: bool) -> Vec<Tensor> {
    match Tensor::f_run_backward(&[output], leaves, true, create_graph) {
        Ok(grads) => grads
            .into_iter()
            .zip(leaves)
            .map(|(g, leaf)| if g.defined() { g } else { leaf.zeros_like() })
            .collect(),
        Err(_) => leaves.iter().map(|leaf| leaf.zeros_like()).collect(),
    }
}

fn second(first: &Tensor, leaf: &Tensor) -> Tensor {
    safe_grad(first, &[leaf], false).remove(0)
}

/// Evaluate the network at `(r, z, t)` and extract the full derivative set.
///
/// Fresh leaf tensors are created here so the incoming batch tensors need
/// not require gradients themselves.
pub fn evaluate(net: &NvuNet, r: &Tensor, z: &Tensor, t: &Tensor) -> DerivativeBundle {
    let r = r.detach().set_requires_grad(true);
    let z = z.detach().set_requires_grad(true);
    let t = t.detach().set_requires_grad(true);

    let fields = net.forward_fields(&r, &z, &t);
    let leaves: [&Tensor; 3] = [&r, &z, &t];

    let mut g = safe_grad(&fields.u_r, &leaves, true);
    let (u_r_r, u_r_z, u_r_t) = (g.remove(0), g.remove(0), g.remove(0));
    let mut g = safe_grad(&fields.u_z, &leaves, true);
    let (u_z_r, u_z_z, u_z_t) = (g.remove(0), g.remove(0), g.remove(0));
    let mut g = safe_grad(&fields.p, &leaves, true);
    let (p_r, p_z, _p_t) = (g.remove(0), g.remove(0), g.remove(0));
    let mut g = safe_grad(&fields.c, &leaves, true);
    let (c_r, c_z, c_t) = (g.remove(0), g.remove(0), g.remove(0));

    let u_r_rr = second(&u_r_r, &r);
    let u_r_zz = second(&u_r_z, &z);
    let u_z_rr = second(&u_z_r, &r);
    let u_z_zz = second(&u_z_z, &z);
    let c_rr = second(&c_r, &r);
    let c_zz = second(&c_z, &z);

    DerivativeBundle {
        fields,
        u_r_r,
        u_r_z,
        u_r_t,
        u_z_r,
        u_z_z,
        u_z_t,
        p_r,
        p_z,
        c_r,
        c_z,
        c_t,
        u_r_rr,
        u_r_zz,
        u_z_rr,
        u_z_zz,
        c_rr,
        c_zz,
    }
}
