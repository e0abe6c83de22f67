//! Closed-form closure properties: viscosity asymptotics, transporter flux
//! saturation, shift-factor continuity and consumption kinetics.

use nvu_pinn::closures::{
    carreau_viscosity_scalar, cbf_shift_factor_scalar, consumption_eps, consumption_rate_scalar,
    glut1_flux_scalar, ConsumingRegion,
};
use nvu_pinn::params::{CbfShift, Parameters};

#[test]
fn viscosity_tends_to_mu_zero_at_rest() {
    let p = Parameters::default();
    for gamma in [0.0, 1e-6, 1e-4] {
        let mu = carreau_viscosity_scalar(gamma, &p);
        assert!((mu - p.mu_zero).abs() / p.mu_zero < 1e-3, "gamma={gamma}, mu={mu}");
    }
}

#[test]
fn viscosity_tends_to_mu_inf_at_high_shear() {
    let p = Parameters::default();
    let mu = carreau_viscosity_scalar(1e9, &p);
    assert!((mu - p.mu_inf).abs() / p.mu_inf < 1e-2);
}

#[test]
fn viscosity_decreases_with_shear() {
    let p = Parameters::default();
    let mut prev = carreau_viscosity_scalar(0.0, &p);
    for exp in -2..6 {
        let mu = carreau_viscosity_scalar(10f64.powi(exp), &p);
        assert!(mu <= prev + 1e-15);
        prev = mu;
    }
}

#[test]
fn glut1_flux_zero_at_zero_and_saturating() {
    let p = Parameters::default();
    for density in [p.glut1_luminal, p.glut1_abluminal, p.glut1_endfeet] {
        assert_eq!(glut1_flux_scalar(0.0, density, &p), 0.0);
        let vmax = density * p.glut1_kcat / p.avogadro;
        assert!(glut1_flux_scalar(1e7, density, &p) <= vmax);
        assert!(glut1_flux_scalar(1e7, density, &p) / vmax > 0.999);
    }
}

#[test]
fn glut1_flux_increasing_in_concentration() {
    let p = Parameters::default();
    let mut prev = 0.0;
    for c in [0.5, 1.0, 2.0, 5.0, 10.0, 50.0] {
        let f = glut1_flux_scalar(c, p.glut1_luminal, &p);
        assert!(f > prev);
        prev = f;
    }
}

#[test]
fn shift_factor_is_identity_without_perturbation() {
    let p = Parameters::default();
    for t in [0.0, 2.5, 5.0, 10.0] {
        assert_eq!(cbf_shift_factor_scalar(t, &p), 1.0);
    }
}

#[test]
fn shift_factor_plateaus() {
    let mut p = Parameters::default();
    p.cbf_shift = CbfShift::Increase;
    p.shift_amplitude = 0.3;
    // well before the onset
    assert!((cbf_shift_factor_scalar(0.0, &p) - 1.0).abs() < 1e-3);
    // at and just before the onset the factor has not visibly left 1
    let at_onset = cbf_shift_factor_scalar(p.shift_onset, &p);
    assert!((at_onset - 1.0).abs() <= 0.05 * p.shift_amplitude, "factor {at_onset} at onset");
    let before = cbf_shift_factor_scalar(p.shift_onset - p.shift_width, &p);
    assert!((before - 1.0).abs() <= 0.02 * p.shift_amplitude);
    // well past the transition band
    assert!((cbf_shift_factor_scalar(p.shift_onset + 10.0 * p.shift_width, &p) - 1.3).abs() < 1e-3);

    p.cbf_shift = CbfShift::Decrease;
    assert!((cbf_shift_factor_scalar(p.shift_onset + 10.0 * p.shift_width, &p) - 0.7).abs() < 1e-3);
}

#[test]
fn shift_factor_is_continuous() {
    let mut p = Parameters::default();
    p.cbf_shift = CbfShift::Increase;
    p.shift_amplitude = 0.5;
    let mut prev = cbf_shift_factor_scalar(0.0, &p);
    let dt = 0.01;
    let mut t = dt;
    while t < p.t_end {
        let f = cbf_shift_factor_scalar(t, &p);
        // bounded slope through the transition band
        assert!(
            (f - prev).abs() < 2.0 * dt * p.shift_amplitude / p.shift_width,
            "jump at t={t}"
        );
        prev = f;
        t += dt;
    }
}

#[test]
fn consumption_vanishes_in_basal_lamina_only() {
    let p = Parameters::default();
    assert_eq!(consumption_eps(ConsumingRegion::BasalLamina, &p), 0.0);
    for region in [ConsumingRegion::Blood, ConsumingRegion::Endothelium, ConsumingRegion::Brain] {
        assert!(consumption_eps(region, &p) > 0.0);
        assert!(consumption_rate_scalar(1.0, region, &p) < 0.0);
    }
}

#[test]
fn consumption_magnitude_bounded_by_eps() {
    let p = Parameters::default();
    let eps = consumption_eps(ConsumingRegion::Brain, &p);
    for c in [0.1, 1.0, 10.0, 100.0] {
        assert!(consumption_rate_scalar(c, ConsumingRegion::Brain, &p).abs() <= eps);
    }
}
