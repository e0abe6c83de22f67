//! Domain-decomposed PINN for the neurovascular unit.
//!
//! A shared encoder embeds the (r, z, t) coordinates; three output heads
//! predict the physical fields of the blood lumen, the barrier
//! (endothelium + basal lamina) and the brain tissue. Head outputs are
//! gated by analytic domain masks computed from r alone, so each head only
//! shapes the fields inside its own sub-region. The hard partition places a
//! field discontinuity at each interface that is matched by the GLUT1 flux
//! discontinuity conditions; that is intentional.

use tch::nn::{self, Module};
use tch::Tensor;

use crate::params::Parameters;

const HIDDEN: i64 = 64;

/// Network-predicted physical fields at a batch of collocation points,
/// each of shape `[n, 1]`.
pub struct Fields {
    /// Radial velocity (m/s); zero in the barrier.
    pub u_r: Tensor,
    /// Axial velocity (m/s); zero in the barrier.
    pub u_z: Tensor,
    /// Pressure (Pa); zero in the barrier.
    pub p: Tensor,
    /// Glucose concentration (mol/m^3), defined everywhere.
    pub c: Tensor,
}

/// Smoothed indicator of each anatomical sub-region as a function of r.
pub struct DomainMasks {
    pub blood: Tensor,
    pub barrier: Tensor,
    pub brain: Tensor,
}

pub struct NvuNet {
    encoder: nn::Sequential,
    blood_head: nn::Linear,
    barrier_head: nn::Linear,
    brain_head: nn::Linear,
    geom: MaskGeometry,
    // coordinate normalization and output scaling
    r_span: f64,
    z_span: f64,
    t_span: f64,
    scale_velocity: f64,
    scale_pressure: f64,
    scale_concentration: f64,
}

/// Geometry needed to evaluate the masks, copied out of [`Parameters`] so
/// mask evaluation does not borrow the full bundle.
#[derive(Debug, Clone, Copy)]
pub struct MaskGeometry {
    /// Lumen / barrier interface radius (m).
    pub r_lumen: f64,
    /// Barrier / brain interface radius (m).
    pub r_barrier_outer: f64,
    /// Sigmoid transition width (m).
    pub width: f64,
}

impl MaskGeometry {
    pub fn from_params(p: &Parameters) -> Self {
        Self {
            r_lumen: p.r_lumen,
            r_barrier_outer: p.r_barrier_outer(),
            width: p.mask_width,
        }
    }

    /// Evaluate the three smoothed region indicators at radii `r` ([n, 1]).
    ///
    /// Away from the two transition bands exactly one indicator is ~1 and
    /// the three sum to ~1 everywhere.
    pub fn masks(&self, r: &Tensor) -> DomainMasks {
        let a = (r - self.r_lumen) / self.width;
        let b = (r - self.r_barrier_outer) / self.width;
        let blood = (-&a).sigmoid();
        let brain = b.sigmoid();
        let barrier = a.sigmoid() * (-&b).sigmoid();
        DomainMasks { blood, barrier, brain }
    }

    /// Scalar mask evaluation, used by validation and tests.
    pub fn masks_scalar(&self, r: f64) -> (f64, f64, f64) {
        let sig = |x: f64| 1.0 / (1.0 + (-x).exp());
        let a = (r - self.r_lumen) / self.width;
        let b = (r - self.r_barrier_outer) / self.width;
        (sig(-a), sig(a) * sig(-b), sig(b))
    }
}

impl NvuNet {
    pub fn new(root: &nn::Path, p: &Parameters) -> Self {
        let encoder = nn::seq()
            .add(nn::linear(root / "enc1", 3, HIDDEN, Default::default()))
            .add_fn(|x| x.tanh())
            .add(nn::linear(root / "enc2", HIDDEN, HIDDEN, Default::default()))
            .add_fn(|x| x.tanh())
            .add(nn::linear(root / "enc3", HIDDEN, HIDDEN, Default::default()))
            .add_fn(|x| x.tanh());

        // blood and brain predict (u_r, u_z, p, c); the barrier carries no
        // bulk flow and predicts concentration only
        let blood_head = nn::linear(root / "blood", HIDDEN, 4, Default::default());
        let barrier_head = nn::linear(root / "barrier", HIDDEN, 1, Default::default());
        let brain_head = nn::linear(root / "brain", HIDDEN, 4, Default::default());

        Self {
            encoder,
            blood_head,
            barrier_head,
            brain_head,
            geom: MaskGeometry::from_params(p),
            r_span: p.r_outer(),
            z_span: p.l_axial,
            t_span: p.t_end,
            scale_velocity: p.scale_velocity,
            scale_pressure: p.scale_pressure,
            scale_concentration: p.scale_concentration,
        }
    }

    pub fn mask_geometry(&self) -> MaskGeometry {
        self.geom
    }

    /// Forward pass: predict the masked physical fields at (r, z, t).
    ///
    /// The coordinate tensors must be `[n, 1]` leaves; derivatives are
    /// taken with respect to them, so normalization happens inside the
    /// graph and the chain rule carries through.
    pub fn forward_fields(&self, r: &Tensor, z: &Tensor, t: &Tensor) -> Fields {
        let input = Tensor::cat(
            &[r / self.r_span, z / self.z_span, t / self.t_span],
            1,
        );
        let h = self.encoder.forward(&input);

        let blood = self.blood_head.forward(&h);
        let barrier = self.barrier_head.forward(&h);
        let brain = self.brain_head.forward(&h);

        let m = self.geom.masks(r);

        let u_r = (&m.blood * blood.narrow(1, 0, 1) + &m.brain * brain.narrow(1, 0, 1))
            * self.scale_velocity;
        let u_z = (&m.blood * blood.narrow(1, 1, 1) + &m.brain * brain.narrow(1, 1, 1))
            * self.scale_velocity;
        let p = (&m.blood * blood.narrow(1, 2, 1) + &m.brain * brain.narrow(1, 2, 1))
            * self.scale_pressure;
        let c = (&m.blood * blood.narrow(1, 3, 1)
            + &m.barrier * barrier.narrow(1, 0, 1)
            + &m.brain * brain.narrow(1, 3, 1))
            * self.scale_concentration;

        Fields { u_r, u_z, p, c }
    }
}
