//! # Friction Angle Solver
//!
//! Recovers the internal friction angle from the ratio `vbd = qc / σ'v0` by
//! inverting a bearing-factor relationship with bisection.
//!
//! ## Model
//!
//! ```text
//! Nq(φ)  = exp(2π·tanφ) · tan²(π/4 + φ/2)
//! f_A(φ) = 1.3 · ((Nq − 1) · tan30° / tanφ + 1)     fine / intermediate soils
//! f_B(φ) = 1.3 · Nq                                 cohesionless soils
//! ```
//!
//! Stage A solves `f_A(φ) = vbd` on [0, π/2]. When the result is at or above
//! 30° the cohesionless form governs and stage B re-solves with `f_B`.
//! φu is the solution; φ' is φu above 30° and 30° otherwise.
//!
//! Note that this Nq uses 2π in the exponent, unlike the bearing-capacity
//! Nq of [`crate::bearing`].

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI};

use serde::{Deserialize, Serialize};

/// Convergence threshold on |f(φ) − target|
pub const BISECTION_TOLERANCE: f64 = 1e-6;

/// Iteration cap of the bisection
pub const MAX_ITERATIONS: usize = 1000;

/// Granular clamp for φ' (degrees)
pub const PHI_PRIME_FLOOR_DEG: f64 = 30.0;

/// Reissner bearing factor with the 2π exponent.
pub fn nq_reissner(phi: f64) -> f64 {
    (2.0 * PI * phi.tan()).exp() * (FRAC_PI_4 + phi / 2.0).tan().powi(2)
}

/// Target function for fine and intermediate soils (0 for φ ≤ 0).
pub fn vbd_fine_soil(phi: f64) -> f64 {
    if phi <= 0.0 {
        return 0.0;
    }
    let ratio = FRAC_PI_6.tan() / phi.tan();
    1.3 * ((nq_reissner(phi) - 1.0) * ratio + 1.0)
}

/// Target function for cohesionless soils.
pub fn vbd_granular(phi: f64) -> f64 {
    1.3 * nq_reissner(phi)
}

/// Bisection of a monotone increasing `f` for `f(φ) = target` on
/// `[lower, upper]`.
///
/// Returns the first midpoint within [`BISECTION_TOLERANCE`] of the target,
/// or the midpoint of the final bracket after [`MAX_ITERATIONS`].
pub fn bisect<F>(target: f64, f: F, mut lower: f64, mut upper: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    for _ in 0..MAX_ITERATIONS {
        let mid = (lower + upper) / 2.0;
        let value = f(mid);
        if (value - target).abs() <= BISECTION_TOLERANCE {
            return mid;
        }
        if value > target {
            upper = mid;
        } else {
            lower = mid;
        }
    }
    (lower + upper) / 2.0
}

/// Friction angle (radians) for a resistance ratio. Returns 0 for `vbd ≤ 0`.
pub fn solve_friction_angle(vbd: f64) -> f64 {
    if vbd <= 0.0 {
        return 0.0;
    }
    let phi = bisect(vbd, vbd_fine_soil, 0.0, FRAC_PI_2);
    if phi >= FRAC_PI_6 {
        bisect(vbd, vbd_granular, 0.0, FRAC_PI_2)
    } else {
        phi
    }
}

/// Friction angles at one depth, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionAngles {
    /// Effective angle, clamped to 30° for granular behaviour
    pub phi_prime_deg: f64,
    /// Raw solved angle
    pub phi_u_deg: f64,
}

/// Friction angles from corrected qc and σ'v0 (same unit).
///
/// Returns `None` when either input is non-positive.
///
/// # Example
///
/// ```rust
/// use cpt_core::friction_angle::friction_angles;
///
/// let angles = friction_angles(120.0, 0.4).unwrap();
/// assert!(angles.phi_u_deg > 30.0);
/// assert_eq!(angles.phi_prime_deg, angles.phi_u_deg);
///
/// assert!(friction_angles(0.0, 0.4).is_none());
/// ```
pub fn friction_angles(qc: f64, q0: f64) -> Option<FrictionAngles> {
    if q0 <= 0.0 || qc <= 0.0 {
        return None;
    }
    let phi = solve_friction_angle(qc / q0);
    let phi_u_deg = phi.to_degrees();
    let phi_prime_deg = if phi > FRAC_PI_6 {
        phi_u_deg
    } else {
        PHI_PRIME_FLOOR_DEG
    };
    Some(FrictionAngles {
        phi_prime_deg,
        phi_u_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(phi: f64) -> f64 {
        if phi < FRAC_PI_6 {
            vbd_fine_soil(phi)
        } else {
            vbd_granular(phi)
        }
    }

    #[test]
    fn test_bisection_recovers_known_angles() {
        for deg in [5.0_f64, 15.0, 25.0, 35.0, 45.0] {
            let phi_true = deg.to_radians();
            let recovered = solve_friction_angle(forward(phi_true));
            assert!(
                (recovered - phi_true).abs() < 1e-4,
                "{}°: recovered {} rad, expected {}",
                deg,
                recovered,
                phi_true
            );
        }
    }

    #[test]
    fn test_branches_meet_at_thirty_degrees() {
        let a = vbd_fine_soil(FRAC_PI_6);
        let b = vbd_granular(FRAC_PI_6);
        assert!((a - b).abs() < 1e-9 * b);
    }

    #[test]
    fn test_fine_soil_clamps_phi_prime() {
        let vbd = vbd_fine_soil(20.0_f64.to_radians());
        let angles = friction_angles(vbd, 1.0).unwrap();
        assert!((angles.phi_u_deg - 20.0).abs() < 1e-3);
        assert_eq!(angles.phi_prime_deg, 30.0);
    }

    #[test]
    fn test_granular_keeps_phi_u() {
        let vbd = vbd_granular(38.0_f64.to_radians());
        let angles = friction_angles(2.0 * vbd, 2.0).unwrap();
        assert!((angles.phi_u_deg - 38.0).abs() < 1e-3);
        assert_eq!(angles.phi_prime_deg, angles.phi_u_deg);
    }

    #[test]
    fn test_non_positive_inputs() {
        assert!(friction_angles(0.0, 1.0).is_none());
        assert!(friction_angles(10.0, 0.0).is_none());
        assert!(friction_angles(-5.0, 1.0).is_none());
        assert_eq!(solve_friction_angle(0.0), 0.0);
    }

    #[test]
    fn test_bisect_returns_bracket_midpoint_when_unreachable() {
        // Target above the range: the bracket collapses onto the upper bound
        let phi = bisect(10.0, |x| x, 0.0, 1.0);
        assert!((phi - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vbd_fine_soil_zero_angle() {
        assert_eq!(vbd_fine_soil(0.0), 0.0);
        assert_eq!(vbd_fine_soil(-0.1), 0.0);
    }
}
