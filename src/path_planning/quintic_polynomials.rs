use nalgebra::{Matrix3, Vector3};

/// Quintic polynomial x(t) pinned by value, first and second derivative
/// at both ends of `[0, param]`.
///
/// In the road graph `t` is the station relative to the segment start and
/// `x` is the lateral offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuinticPolynomial {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub a4: f64,
    pub a5: f64,
    param: f64,
}

impl QuinticPolynomial {
    pub fn new(xs: f64, vxs: f64, axs: f64, xe: f64, vxe: f64, axe: f64, param: f64) -> Self {
        let a0 = xs;
        let a1 = vxs;
        let a2 = axs / 2.0;

        if param <= f64::EPSILON {
            return QuinticPolynomial {
                a0,
                a1,
                a2,
                a3: 0.0,
                a4: 0.0,
                a5: 0.0,
                param: 0.0,
            };
        }

        let t2 = param * param;
        let t3 = t2 * param;
        let t4 = t3 * param;
        let t5 = t4 * param;

        // Solve for a3, a4, a5
        let a = Matrix3::new(
            t3, t4, t5,
            3.0 * t2, 4.0 * t3, 5.0 * t4,
            6.0 * param, 12.0 * t2, 20.0 * t3,
        );

        let b = Vector3::new(
            xe - a0 - a1 * param - a2 * t2,
            vxe - a1 - 2.0 * a2 * param,
            axe - 2.0 * a2,
        );

        let x = a.lu().solve(&b).unwrap_or_else(Vector3::zeros);

        QuinticPolynomial {
            a0,
            a1,
            a2,
            a3: x[0],
            a4: x[1],
            a5: x[2],
            param,
        }
    }

    /// Length of the interval the end conditions were imposed on
    pub fn param(&self) -> f64 {
        self.param
    }

    /// Evaluate the `order`-th derivative at `t`; orders above 5 are zero
    pub fn evaluate(&self, order: u32, t: f64) -> f64 {
        match order {
            0 => self.calc_point(t),
            1 => self.calc_first_derivative(t),
            2 => self.calc_second_derivative(t),
            3 => self.calc_third_derivative(t),
            4 => 24.0 * self.a4 + 120.0 * self.a5 * t,
            5 => 120.0 * self.a5,
            _ => 0.0,
        }
    }

    pub fn calc_point(&self, t: f64) -> f64 {
        self.a0 + self.a1 * t + self.a2 * t.powi(2) +
        self.a3 * t.powi(3) + self.a4 * t.powi(4) + self.a5 * t.powi(5)
    }

    pub fn calc_first_derivative(&self, t: f64) -> f64 {
        self.a1 + 2.0 * self.a2 * t +
        3.0 * self.a3 * t.powi(2) + 4.0 * self.a4 * t.powi(3) + 5.0 * self.a5 * t.powi(4)
    }

    pub fn calc_second_derivative(&self, t: f64) -> f64 {
        2.0 * self.a2 + 6.0 * self.a3 * t +
        12.0 * self.a4 * t.powi(2) + 20.0 * self.a5 * t.powi(3)
    }

    pub fn calc_third_derivative(&self, t: f64) -> f64 {
        6.0 * self.a3 + 24.0 * self.a4 * t + 60.0 * self.a5 * t.powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_end_conditions_hold() {
        let qp = QuinticPolynomial::new(0.5, 0.1, -0.02, -1.0, 0.0, 0.0, 12.0);
        assert_relative_eq!(qp.evaluate(0, 0.0), 0.5);
        assert_relative_eq!(qp.evaluate(1, 0.0), 0.1);
        assert_relative_eq!(qp.evaluate(2, 0.0), -0.02);
        assert_relative_eq!(qp.evaluate(0, 12.0), -1.0, epsilon = 1e-9);
        assert_relative_eq!(qp.evaluate(1, 12.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(qp.evaluate(2, 12.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_offset_is_flat() {
        let qp = QuinticPolynomial::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 10.0);
        for i in 0..=10 {
            let t = i as f64;
            assert_relative_eq!(qp.calc_point(t), 1.0, epsilon = 1e-12);
            assert_relative_eq!(qp.calc_third_derivative(t), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_param() {
        let qp = QuinticPolynomial::new(2.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0);
        assert_eq!(qp.param(), 0.0);
        assert_eq!(qp.calc_point(0.0), 2.0);
        assert_eq!(qp.evaluate(7, 1.0), 0.0);
    }
}
