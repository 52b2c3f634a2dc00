//! # Bearing Capacity Factors
//!
//! Closed-form bearing factors shared by the four methods. All angles are in
//! radians.
//!
//! | Method         | Nq                          | Nγ                                              |
//! |----------------|-----------------------------|-------------------------------------------------|
//! | Brinch Hansen  | exp(π tanφ) tan²(π/4 + φ/2) | 1.5 (Nq − 1) tanφ                               |
//! | Caquot-Kérisel | same                        | cos(π/4 − φ/2) / (2 sin²(π/4 + φ/2)) · (Kp − sin(π/4 − φ/2)) |
//! | Meyerhof       | same                        | (Nq − 1) tan(1.4 φ)                             |
//! | De Beer        | F(φu, φ') tanφ' r^(tanφu/tanφ') − tanφ'/tanφu + 1 | Vpg(φu)                   |
//!
//! where `r = qp / q0p` and `Kp = tan²(π/4 + φ/2)`.

use std::f64::consts::{FRAC_PI_4, PI};

use super::BearingMethod;

/// Angles below this (rad) give zero bearing factors in the reporting helpers
pub const MIN_FRICTION_ANGLE_RAD: f64 = 0.001;

/// Prandtl-Reissner Nq with the π exponent.
pub fn nq_prandtl(phi: f64) -> f64 {
    (PI * phi.tan()).exp() * (FRAC_PI_4 + phi / 2.0).tan().powi(2)
}

/// Passive earth pressure coefficient tan²(π/4 + φ/2)
pub fn passive_coefficient(phi: f64) -> f64 {
    (FRAC_PI_4 + phi / 2.0).tan().powi(2)
}

pub fn n_gamma_brinch_hansen(phi: f64) -> f64 {
    1.5 * (nq_prandtl(phi) - 1.0) * phi.tan()
}

pub fn n_gamma_caquot_kerisel(phi: f64) -> f64 {
    let kp = passive_coefficient(phi);
    (FRAC_PI_4 - phi / 2.0).cos() / (2.0 * (FRAC_PI_4 + phi / 2.0).sin().powi(2))
        * (kp - (FRAC_PI_4 - phi / 2.0).sin())
}

pub fn n_gamma_meyerhof(phi: f64) -> f64 {
    (nq_prandtl(phi) - 1.0) * (1.4 * phi).tan()
}

/// De Beer shape factor F(φu, φ').
pub fn de_beer_f(phi_u: f64, phi_p: f64) -> f64 {
    let exponent = phi_u.tan() / phi_p.tan();
    let term1 = (1.0 + phi_p.sin()).powf(exponent);
    let term2 = ((PI + phi_p - phi_u) * phi_u.tan()).exp();
    let term3 = (1.0 + phi_u.sin()) / (phi_u.sin() * phi_u.cos());
    term1 * term2 * term3
}

/// De Beer Nq for a stress ratio `qp / q0p`.
pub fn de_beer_nq(phi_u: f64, phi_p: f64, stress_ratio: f64) -> f64 {
    let tan_u = phi_u.tan();
    let tan_p = phi_p.tan();
    de_beer_f(phi_u, phi_p) * tan_p * stress_ratio.powf(tan_u / tan_p) - tan_p / tan_u + 1.0
}

/// De Beer weight factor Vpg(φu), used in place of Nγ.
pub fn vpg(phi_u: f64) -> f64 {
    let t = phi_u.tan();
    let th = (FRAC_PI_4 + phi_u / 2.0).tan();
    let growth = (1.5 * PI * t).exp();

    let term1 = (1.0 + th * th) / (1.0 + 9.0 * t * t);
    let term2 = (3.0 * t * th - 1.0) * growth;
    let term3 = 3.0 * t + th;
    let term4 = 2.0 * growth * th * th;
    (term1 * (term2 + term3) + term4 - 2.0 * th) / 8.0
}

/// Nq reported for a method, from angles in degrees.
///
/// Zero when φu (or φ' for De Beer) is below [`MIN_FRICTION_ANGLE_RAD`].
/// De Beer uses a unit stress ratio (no level change after works).
pub fn bearing_factor_nq(method: BearingMethod, phi_u_deg: f64, phi_prime_deg: f64) -> f64 {
    let phi_u = phi_u_deg.to_radians();
    if phi_u < MIN_FRICTION_ANGLE_RAD {
        return 0.0;
    }
    match method {
        BearingMethod::BrinchHansen | BearingMethod::CaquotKerisel | BearingMethod::Meyerhof => {
            nq_prandtl(phi_u)
        }
        BearingMethod::DeBeer => {
            let phi_p = phi_prime_deg.to_radians();
            if phi_p < MIN_FRICTION_ANGLE_RAD {
                return 0.0;
            }
            de_beer_nq(phi_u, phi_p, 1.0)
        }
    }
}

/// Nγ reported for a method (Vpg for De Beer), from φu in degrees.
pub fn bearing_factor_n_gamma(method: BearingMethod, phi_u_deg: f64) -> f64 {
    let phi_u = phi_u_deg.to_radians();
    if phi_u < MIN_FRICTION_ANGLE_RAD {
        return 0.0;
    }
    match method {
        BearingMethod::BrinchHansen => n_gamma_brinch_hansen(phi_u),
        BearingMethod::CaquotKerisel => n_gamma_caquot_kerisel(phi_u),
        BearingMethod::Meyerhof => n_gamma_meyerhof(phi_u),
        BearingMethod::DeBeer => vpg(phi_u),
    }
}
