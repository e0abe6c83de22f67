//! Physical, geometric and training parameters for the neurovascular unit.
//!
//! All physiological constants carry their literature source. The bundle is
//! built once at configuration time, validated eagerly, and never mutated
//! during training.

use anyhow::{bail, Result};

/// Direction of the cerebral-blood-flow perturbation applied to the
/// inlet pressure drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CbfShift {
    None,
    Increase,
    Decrease,
}

impl CbfShift {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(CbfShift::None),
            "increase" => Ok(CbfShift::Increase),
            "decrease" => Ok(CbfShift::Decrease),
            other => bail!("unknown CBF shift type '{other}' (expected none|increase|decrease)"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CbfShift::None => "none",
            CbfShift::Increase => "increase",
            CbfShift::Decrease => "decrease",
        }
    }
}

/// How the coverage-weighted end-feet boundary condition combines the
/// transporter-flux and cleft free-diffusion expressions.
///
/// `WeightedExpression` blends the two residual expressions before squaring,
/// modelling a single spatially heterogeneous boundary. `WeightedSquares`
/// weights the squared residuals instead, which treats the two conditions as
/// independently sampled boundaries. The literature does not disambiguate;
/// both are implemented and the choice is configuration-significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndFeetBlend {
    #[default]
    WeightedExpression,
    WeightedSquares,
}

/// What to do when a training iteration produces a non-finite loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonFiniteAction {
    /// Skip the parameter update and keep iterating.
    #[default]
    Skip,
    /// Abort the training run with an error.
    Abort,
}

/// Immutable bundle of every physical and geometric constant.
///
/// Units: SI throughout, with concentrations in mol/m^3 (numerically equal
/// to mM for glucose).
#[derive(Debug, Clone)]
pub struct Parameters {
    // --- Carreau viscosity of whole blood ---
    /// Zero-shear viscosity (Pa s). Cho & Kensey, Biorheology 1991.
    pub mu_zero: f64,
    /// Infinite-shear viscosity (Pa s). Cho & Kensey, Biorheology 1991.
    pub mu_inf: f64,
    /// Carreau relaxation time (s). Cho & Kensey, Biorheology 1991.
    pub carreau_lambda: f64,
    /// Carreau power index. Cho & Kensey, Biorheology 1991.
    pub carreau_n: f64,
    /// Blood density (kg/m^3).
    pub rho_blood: f64,

    // --- Glucose diffusion ---
    /// Free glucose diffusivity in plasma (m^2/s).
    pub d_blood: f64,
    /// Glucose diffusivity in the endothelium / basal lamina (m^2/s).
    pub d_barrier: f64,
    /// Effective glucose diffusivity in brain extracellular space (m^2/s),
    /// tortuosity-corrected. Sykova & Nicholson, Physiol Rev 2008.
    pub d_brain: f64,
    /// Longitudinal dispersivity of the brain ECS (m).
    pub brain_dispersivity: f64,
    /// Brain extracellular volume fraction. Sykova & Nicholson 2008.
    pub brain_porosity: f64,

    // --- Interstitial (Darcy) flow ---
    /// ISF dynamic viscosity (Pa s).
    pub mu_isf: f64,
    /// Darcy permeability of brain ECS (m^2).
    pub kappa_brain: f64,

    // --- GLUT1 transporter kinetics ---
    /// Catalytic turnover (1/s). Lowe & Walmsley, Biochim Biophys Acta 1986.
    pub glut1_kcat: f64,
    /// Michaelis constant (mol/m^3).
    pub glut1_km: f64,
    /// Luminal membrane areal density (1/m^2).
    pub glut1_luminal: f64,
    /// Abluminal membrane areal density (1/m^2). Roughly 3x luminal,
    /// Simpson et al., J Cereb Blood Flow Metab 2007.
    pub glut1_abluminal: f64,
    /// Astrocyte end-feet areal density (1/m^2).
    pub glut1_endfeet: f64,
    /// Avogadro constant (1/mol).
    pub avogadro: f64,

    // --- Glucose consumption (Michaelis-Menten with ATP Hill inhibition) ---
    /// Erythrocyte glycolysis rate constant (1/s); small against tissue.
    pub k_glc_blood: f64,
    /// Endothelial rate constant (1/s).
    pub k_glc_endothelium: f64,
    /// Brain tissue rate constant (1/s).
    pub k_glc_brain: f64,
    /// Blood ATP concentration (mol/m^3).
    pub c_atp_blood: f64,
    /// Endothelial ATP concentration (mol/m^3).
    pub c_atp_endothelium: f64,
    /// Brain ATP concentration (mol/m^3).
    pub c_atp_brain: f64,
    /// ATP inhibition constant (mol/m^3).
    pub k_i_atp: f64,
    /// Hill exponent of ATP inhibition.
    pub hill_n: f64,
    /// Glucose half-saturation for consumption (mol/m^3).
    pub k_glc_half: f64,

    // --- Geometry (cylindrical r-z, axis at r = 0) ---
    /// Capillary lumen radius (m).
    pub r_lumen: f64,
    /// Endothelium thickness (m).
    pub h_endothelium: f64,
    /// Basal lamina thickness (m).
    pub h_basal_lamina: f64,
    /// Surrounding brain tissue shell thickness (m).
    pub l_brain: f64,
    /// Axial segment length (m).
    pub l_axial: f64,
    /// Smoothing width of the domain-mask transitions (m).
    pub mask_width: f64,
    /// Additive offset applied to r wherever it appears as a divisor (m).
    /// Must stay small against r_lumen so it only regularizes the axis
    /// instead of distorting 1/r terms across the lumen interior.
    pub axis_epsilon: f64,

    // --- Time schedule ---
    /// Simulated horizon (s).
    pub t_end: f64,
    /// CBF shift onset time (s).
    pub shift_onset: f64,
    /// CBF shift transition width (s).
    pub shift_width: f64,

    // --- Perturbation / coverage configuration ---
    /// Astrocyte end-feet coverage fraction of the outer interface.
    /// Valid range 0.20-0.86; Mathiisen et al., Glia 2010.
    pub endfeet_coverage: f64,
    /// CBF shift direction.
    pub cbf_shift: CbfShift,
    /// CBF shift amplitude, 0 <= amplitude < 1.
    pub shift_amplitude: f64,
    /// End-feet residual blending rule.
    pub endfeet_blend: EndFeetBlend,
    /// Non-finite-loss policy.
    pub non_finite: NonFiniteAction,

    // --- Driving pressures and concentrations ---
    /// Inlet gauge pressure (Pa) over the segment.
    pub p_inlet: f64,
    /// Outlet gauge pressure (Pa).
    pub p_outlet: f64,
    /// Inlet plasma glucose concentration (mol/m^3). Normoglycemia ~5.5 mM.
    pub c_inlet: f64,
    /// Initial plasma concentration (mol/m^3).
    pub c_init_blood: f64,
    /// Initial barrier concentration (mol/m^3).
    pub c_init_barrier: f64,
    /// Initial brain ECS concentration (mol/m^3). Literature 1.0-2.0 mM.
    pub c_init_brain: f64,

    // --- Network output scaling ---
    /// Velocity scale (m/s); capillary blood moves at ~1 mm/s.
    pub scale_velocity: f64,
    /// Pressure scale (Pa).
    pub scale_pressure: f64,
    /// Concentration scale (mol/m^3).
    pub scale_concentration: f64,
}

impl Parameters {
    /// Radius of the outer edge of the basal lamina, i.e. the
    /// barrier / brain interface.
    pub fn r_barrier_outer(&self) -> f64 {
        self.r_lumen + self.h_endothelium + self.h_basal_lamina
    }

    /// Outermost radius of the modelled tissue shell.
    pub fn r_outer(&self) -> f64 {
        self.r_barrier_outer() + self.l_brain
    }

    /// Rejects invalid configurations before any training starts.
    pub fn validate(&self) -> Result<()> {
        if !(0.20..=0.86).contains(&self.endfeet_coverage) {
            bail!(
                "end-feet coverage fraction {} outside valid range [0.20, 0.86]",
                self.endfeet_coverage
            );
        }
        if !(0.0..1.0).contains(&self.shift_amplitude) {
            bail!(
                "CBF shift amplitude {} must lie in [0, 1)",
                self.shift_amplitude
            );
        }
        let positive = [
            ("mu_zero", self.mu_zero),
            ("mu_inf", self.mu_inf),
            ("carreau_lambda", self.carreau_lambda),
            ("carreau_n", self.carreau_n),
            ("rho_blood", self.rho_blood),
            ("d_blood", self.d_blood),
            ("d_barrier", self.d_barrier),
            ("d_brain", self.d_brain),
            ("brain_porosity", self.brain_porosity),
            ("mu_isf", self.mu_isf),
            ("kappa_brain", self.kappa_brain),
            ("glut1_kcat", self.glut1_kcat),
            ("glut1_km", self.glut1_km),
            ("glut1_luminal", self.glut1_luminal),
            ("glut1_abluminal", self.glut1_abluminal),
            ("glut1_endfeet", self.glut1_endfeet),
            ("r_lumen", self.r_lumen),
            ("h_endothelium", self.h_endothelium),
            ("h_basal_lamina", self.h_basal_lamina),
            ("l_brain", self.l_brain),
            ("l_axial", self.l_axial),
            ("mask_width", self.mask_width),
            ("t_end", self.t_end),
            ("shift_width", self.shift_width),
            ("c_inlet", self.c_inlet),
            ("k_glc_half", self.k_glc_half),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                bail!("parameter {name} must be strictly positive, got {value}");
            }
        }
        if self.mu_zero < self.mu_inf {
            bail!(
                "Carreau zero-shear viscosity {} below infinite-shear viscosity {}",
                self.mu_zero,
                self.mu_inf
            );
        }
        if self.brain_porosity > 1.0 {
            bail!("brain porosity {} exceeds 1", self.brain_porosity);
        }
        if self.axis_epsilon <= 0.0 || self.axis_epsilon > 1.0e-2 * self.r_lumen {
            bail!(
                "axis offset {} must be positive and below 1% of the lumen radius {}",
                self.axis_epsilon,
                self.r_lumen
            );
        }
        Ok(())
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            // Cho & Kensey 1991 whole-blood Carreau fit
            mu_zero: 0.056,
            mu_inf: 0.00345,
            carreau_lambda: 3.313,
            carreau_n: 0.3568,
            rho_blood: 1050.0,

            d_blood: 9.0e-10,
            d_barrier: 2.6e-10,
            d_brain: 2.3e-10,
            brain_dispersivity: 1.0e-6,
            brain_porosity: 0.2,

            mu_isf: 7.0e-4,
            kappa_brain: 1.8e-17,

            glut1_kcat: 1.2e3,
            glut1_km: 8.0,
            glut1_luminal: 4.0e15,
            glut1_abluminal: 1.2e16,
            glut1_endfeet: 8.0e15,
            avogadro: 6.022_140_76e23,

            k_glc_blood: 0.02,
            k_glc_endothelium: 0.8,
            k_glc_brain: 0.5,
            c_atp_blood: 1.5,
            c_atp_endothelium: 2.0,
            c_atp_brain: 2.5,
            k_i_atp: 3.0,
            hill_n: 4.0,
            k_glc_half: 0.05,

            // Capillary segment geometry; radii from electron microscopy of
            // cortical capillaries (Mathiisen et al. 2010)
            r_lumen: 4.0e-6,
            h_endothelium: 0.5e-6,
            h_basal_lamina: 0.1e-6,
            l_brain: 20.0e-6,
            l_axial: 100.0e-6,
            mask_width: 0.05e-6,
            // 1e-3 * r_lumen: negligible off-axis, still tames 1/r^2 at r=0
            axis_epsilon: 4.0e-9,

            t_end: 10.0,
            shift_onset: 5.0,
            shift_width: 0.5,

            endfeet_coverage: 0.50,
            cbf_shift: CbfShift::None,
            shift_amplitude: 0.0,
            endfeet_blend: EndFeetBlend::default(),
            non_finite: NonFiniteAction::default(),

            // ~15 Pa drop over 100 um drives ~1 mm/s centerline flow
            p_inlet: 15.0,
            p_outlet: 0.0,
            c_inlet: 5.5,
            c_init_blood: 5.5,
            c_init_barrier: 2.0,
            c_init_brain: 1.25,

            scale_velocity: 1.0e-3,
            scale_pressure: 15.0,
            scale_concentration: 5.5,
        }
    }
}
