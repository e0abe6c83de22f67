//! Physics-informed neural network for glucose transport through the
//! neurovascular unit: non-Newtonian capillary blood flow, blood-brain
//! barrier transport with GLUT1 kinetics, and Darcy interstitial flow in
//! brain tissue, solved jointly on a cylindrical r-z-t domain by residual
//! minimization.

pub mod balancer;
pub mod boundary;
pub mod closures;
pub mod db;
pub mod derivatives;
pub mod models;
pub mod network;
pub mod params;
pub mod residuals;
pub mod sampling;
pub mod schema;
pub mod training;
pub mod validation;
pub mod visualization;

pub use balancer::{LossBalancer, LossTerm, NUM_TERMS};
pub use network::{DomainMasks, Fields, MaskGeometry, NvuNet};
pub use params::{CbfShift, EndFeetBlend, NonFiniteAction, Parameters};
pub use sampling::{BatchSizes, CollocationSet, Sampler};
pub use training::{train, TrainConfig, TrainingHistory};
pub use validation::{evaluate_grid, validate, FieldGrid, ValidationReport};
