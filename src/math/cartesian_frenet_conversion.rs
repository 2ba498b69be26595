//! Cartesian / Frenet frame conversion
//!
//! Relations between a pose expressed in world coordinates and the same
//! pose expressed as lateral offset `l(s)` from a reference line, with
//! derivatives taken w.r.t. the reference station `s`.

use std::f64::consts::PI;

use crate::common::{CartesianPoint, ReferencePoint};

/// Step of the central difference used for the curvature rate [m]
const DKAPPA_STEP: f64 = 1e-3;

/// Normalize angle to [-pi, pi); non-finite input comes back as NaN
pub fn normalize_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// First derivative of the lateral offset w.r.t. station
pub fn lateral_derivative(ref_heading: f64, heading: f64, l: f64, ref_kappa: f64) -> f64 {
    (1.0 - ref_kappa * l) * normalize_angle(heading - ref_heading).tan()
}

/// Second derivative of the lateral offset w.r.t. station
pub fn second_order_lateral_derivative(
    ref_heading: f64,
    heading: f64,
    ref_kappa: f64,
    kappa: f64,
    ref_dkappa: f64,
    l: f64,
) -> f64 {
    let dl = lateral_derivative(ref_heading, heading, l, ref_kappa);
    let delta_theta = normalize_angle(heading - ref_heading);
    let cos_delta = delta_theta.cos();
    let one_minus_kappa_r_l = 1.0 - ref_kappa * l;

    -(ref_dkappa * l + ref_kappa * dl) * delta_theta.tan()
        + one_minus_kappa_r_l / (cos_delta * cos_delta)
            * (kappa * one_minus_kappa_r_l / cos_delta - ref_kappa)
}

/// Heading of the path point
pub fn heading(ref_heading: f64, ref_kappa: f64, l: f64, dl: f64) -> f64 {
    normalize_angle(ref_heading + dl.atan2(1.0 - ref_kappa * l))
}

/// Curvature of the path point
pub fn curvature(ref_kappa: f64, ref_dkappa: f64, l: f64, dl: f64, ddl: f64) -> f64 {
    let one_minus_kappa_r_l = 1.0 - ref_kappa * l;
    let delta_theta = dl.atan2(one_minus_kappa_r_l);
    let cos_delta = delta_theta.cos();
    let tan_delta = dl / one_minus_kappa_r_l;
    let kappa_r_l_prime = ref_dkappa * l + ref_kappa * dl;

    ((ddl + kappa_r_l_prime * tan_delta) * cos_delta * cos_delta / one_minus_kappa_r_l + ref_kappa)
        * cos_delta
        / one_minus_kappa_r_l
}

/// Curvature rate w.r.t. path arc length
///
/// Central difference of [`curvature`] along the reference, with `l`
/// propagated by its Taylor expansion and the reference curvature
/// linearised with `ref_dkappa`.
pub fn curvature_rate(ref_kappa: f64, ref_dkappa: f64, l: f64, dl: f64, ddl: f64, dddl: f64) -> f64 {
    let h = DKAPPA_STEP;
    let shifted = |sign: f64| {
        let dh = sign * h;
        let l_h = l + dh * dl + 0.5 * dh * dh * ddl + dh * dh * dh * dddl / 6.0;
        let dl_h = dl + dh * ddl + 0.5 * dh * dh * dddl;
        let ddl_h = ddl + dh * dddl;
        curvature(ref_kappa + dh * ref_dkappa, ref_dkappa, l_h, dl_h, ddl_h)
    };
    let dkappa_ds_ref = (shifted(1.0) - shifted(-1.0)) / (2.0 * h);

    let one_minus_kappa_r_l = 1.0 - ref_kappa * l;
    let ds_path_ds_ref = (one_minus_kappa_r_l * one_minus_kappa_r_l + dl * dl).sqrt();
    if ds_path_ds_ref < 1e-9 {
        return 0.0;
    }
    dkappa_ds_ref / ds_path_ds_ref
}

/// Full Frenet to Cartesian conversion at one reference point
pub fn frenet_to_cartesian(
    reference: &ReferencePoint,
    l: f64,
    dl: f64,
    ddl: f64,
    dddl: f64,
) -> CartesianPoint {
    let (sin_r, cos_r) = reference.heading.sin_cos();
    CartesianPoint {
        x: reference.x - sin_r * l,
        y: reference.y + cos_r * l,
        theta: heading(reference.heading, reference.kappa, l, dl),
        kappa: curvature(reference.kappa, reference.dkappa, l, dl, ddl),
        dkappa: curvature_rate(reference.kappa, reference.dkappa, l, dl, ddl, dddl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_reference() -> ReferencePoint {
        ReferencePoint {
            x: 5.0,
            y: 0.0,
            heading: 0.0,
            kappa: 0.0,
            dkappa: 0.0,
        }
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(3.0 * PI).abs(), PI, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-2.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(0.5 + 4.0 * PI), 0.5, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(1e6), 1e6_f64.sin().atan2(1e6_f64.cos()), epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_non_finite_angle() {
        assert!(normalize_angle(f64::INFINITY).is_nan());
        assert!(normalize_angle(f64::NEG_INFINITY).is_nan());
        assert!(normalize_angle(f64::NAN).is_nan());
    }

    #[test]
    fn test_offset_on_straight_line() {
        let p = frenet_to_cartesian(&straight_reference(), 1.5, 0.0, 0.0, 0.0);
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 1.5);
        assert_relative_eq!(p.kappa, 0.0);
    }

    #[test]
    fn test_circle_curvature() {
        // Reference is a circle of radius 10; offset inward by 2 gives radius 8
        let reference = ReferencePoint {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            kappa: 0.1,
            dkappa: 0.0,
        };
        let kappa = curvature(reference.kappa, reference.dkappa, 2.0, 0.0, 0.0);
        assert_relative_eq!(kappa, 1.0 / 8.0, epsilon = 1e-12);
        let dkappa = curvature_rate(reference.kappa, reference.dkappa, 2.0, 0.0, 0.0, 0.0);
        assert!(dkappa.abs() < 1e-6);
    }

    #[test]
    fn test_derivative_round_trip() {
        let (ref_heading, ref_kappa, ref_dkappa) = (0.3, 0.02, 0.001);
        let (l, dl, ddl) = (0.8, 0.1, 0.01);
        let theta = heading(ref_heading, ref_kappa, l, dl);
        let kappa = curvature(ref_kappa, ref_dkappa, l, dl, ddl);

        assert_relative_eq!(
            lateral_derivative(ref_heading, theta, l, ref_kappa),
            dl,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            second_order_lateral_derivative(ref_heading, theta, ref_kappa, kappa, ref_dkappa, l),
            ddl,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_curvature_rate_on_cubic_offset() {
        // On a straight reference with small slope, kappa ~ ddl and dkappa ~ dddl
        let dkappa = curvature_rate(0.0, 0.0, 0.0, 0.0, 0.0, 0.02);
        assert_relative_eq!(dkappa, 0.02, epsilon = 1e-6);
    }
}
