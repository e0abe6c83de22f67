//! Collocation-point sampling.
//!
//! Each residual family is evaluated on its own coordinate subset: interior
//! points are drawn per anatomical domain (so domain residuals are selected
//! by construction rather than mask-multiplied), boundary points are tagged
//! by the boundary they belong to, and initial points sit at t = 0. Batches
//! are cheap to regenerate and are resampled on a configurable cadence.

use tch::{Device, Kind, Tensor};

use crate::params::Parameters;

/// A batch of (r, z, t) coordinate columns, each `[n, 1]`.
pub struct Coords {
    pub r: Tensor,
    pub z: Tensor,
    pub t: Tensor,
}

impl Coords {
    pub fn len(&self) -> i64 {
        self.r.size()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of collocation points per subset.
#[derive(Debug, Clone, Copy)]
pub struct BatchSizes {
    pub blood: i64,
    pub barrier: i64,
    pub brain: i64,
    pub boundary: i64,
    pub initial: i64,
}

impl Default for BatchSizes {
    fn default() -> Self {
        Self { blood: 512, barrier: 256, brain: 512, boundary: 128, initial: 256 }
    }
}

/// The three disjoint collocation families of one training iteration.
pub struct CollocationSet {
    // interior, per domain
    pub blood: Coords,
    pub barrier: Coords,
    pub brain: Coords,
    // boundaries, tagged
    pub inlet: Coords,
    pub outlet: Coords,
    pub axis: Coords,
    /// Lumen wall / luminal GLUT1 interface at r = R0.
    pub luminal: Coords,
    /// Abluminal GLUT1 interface at the barrier outer radius.
    pub abluminal: Coords,
    /// Astrocyte end-feet interface, brain side of the barrier outer radius.
    pub endfeet: Coords,
    // t = 0
    pub initial: Coords,
}

pub struct Sampler {
    device: Device,
    sizes: BatchSizes,
    r_lumen: f64,
    r_barrier_outer: f64,
    r_outer: f64,
    l_axial: f64,
    t_end: f64,
}

impl Sampler {
    pub fn new(p: &Parameters, sizes: BatchSizes, device: Device) -> Self {
        Self {
            device,
            sizes,
            r_lumen: p.r_lumen,
            r_barrier_outer: p.r_barrier_outer(),
            r_outer: p.r_outer(),
            l_axial: p.l_axial,
            t_end: p.t_end,
        }
    }

    fn uniform(&self, n: i64, lo: f64, hi: f64) -> Tensor {
        Tensor::rand([n, 1], (Kind::Float, self.device)) * (hi - lo) + lo
    }

    fn constant(&self, n: i64, value: f64) -> Tensor {
        Tensor::full([n, 1], value, (Kind::Float, self.device))
    }

    fn volume(&self, n: i64, r_lo: f64, r_hi: f64) -> Coords {
        Coords {
            r: self.uniform(n, r_lo, r_hi),
            z: self.uniform(n, 0.0, self.l_axial),
            t: self.uniform(n, 0.0, self.t_end),
        }
    }

    fn radial_shell(&self, n: i64, radius: f64) -> Coords {
        Coords {
            r: self.constant(n, radius),
            z: self.uniform(n, 0.0, self.l_axial),
            t: self.uniform(n, 0.0, self.t_end),
        }
    }

    fn axial_plane(&self, n: i64, z_value: f64) -> Coords {
        Coords {
            r: self.uniform(n, 0.0, self.r_lumen),
            z: self.constant(n, z_value),
            t: self.uniform(n, 0.0, self.t_end),
        }
    }

    /// Draw a fresh, fully independent collocation set.
    pub fn sample(&self) -> CollocationSet {
        let s = &self.sizes;
        CollocationSet {
            blood: self.volume(s.blood, 0.0, self.r_lumen),
            barrier: self.volume(s.barrier, self.r_lumen, self.r_barrier_outer),
            brain: self.volume(s.brain, self.r_barrier_outer, self.r_outer),

            inlet: self.axial_plane(s.boundary, 0.0),
            outlet: self.axial_plane(s.boundary, self.l_axial),
            axis: self.radial_shell(s.boundary, 0.0),
            luminal: self.radial_shell(s.boundary, self.r_lumen),
            abluminal: self.radial_shell(s.boundary, self.r_barrier_outer),
            endfeet: self.radial_shell(s.boundary, self.r_barrier_outer),

            initial: Coords {
                r: self.uniform(s.initial, 0.0, self.r_outer),
                z: self.uniform(s.initial, 0.0, self.l_axial),
                t: self.constant(s.initial, 0.0),
            },
        }
    }
}
