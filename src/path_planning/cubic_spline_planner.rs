// https://github.com/AtsushiSakai/PythonRobotics/tree/master/PathPlanning/CubicSpline
// https://github.com/onlytailei/CppRobotics/blob/master/include/cubic_spline.h
// Cubic spline planner
//
// Author: Atsushi Sakai(@Atsushi_twi)
//         TAI Lei
//         Ryohei Sasaki(@rsasaki0109)

extern crate nalgebra as na;

use crate::common::{PlannerError, PlannerResult};

/// Natural cubic spline y(x)
#[derive(Debug, Clone)]
pub struct Spline {
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
    x: Vec<f64>,
}

impl Spline {
    pub fn new(x: &[f64], y: &[f64]) -> PlannerResult<Spline> {
        let nx = x.len();
        if nx < 2 || nx != y.len() {
            return Err(PlannerError::InputUnavailable(
                "spline needs at least 2 knots and matching x, y".to_string(),
            ));
        }
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|&hi| hi <= 0.0) {
            return Err(PlannerError::InputUnavailable(
                "spline knots must be strictly increasing".to_string(),
            ));
        }

        let a = y.to_vec();
        let a_mat = Spline::calc_a(&h);
        let b_mat = Spline::calc_b(&h, &a);

        let c_na = a_mat.lu().solve(&b_mat).ok_or_else(|| {
            PlannerError::InputUnavailable("singular spline system".to_string())
        })?;
        let c: Vec<f64> = c_na.iter().copied().collect();

        let mut b: Vec<f64> = Vec::with_capacity(nx - 1);
        let mut d: Vec<f64> = Vec::with_capacity(nx - 1);
        for i in 0..nx - 1 {
            d.push((c[i + 1] - c[i]) / (3. * h[i]));
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }

        Ok(Spline {
            a,
            b,
            c,
            d,
            x: x.to_vec(),
        })
    }

    pub fn calc(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    pub fn calcd(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.b[i] + 2. * self.c[i] * dx + 3. * self.d[i] * dx.powi(2)
    }

    pub fn calcdd(&self, t: f64) -> f64 {
        let i = self.search_index(t);
        let dx = t - self.x[i];
        2. * self.c[i] + 6. * self.d[i] * dx
    }

    pub fn calcddd(&self, t: f64) -> f64 {
        6. * self.d[self.search_index(t)]
    }

    fn search_index(&self, t: f64) -> usize {
        // segment i covers [x[i], x[i+1]); out-of-range values extrapolate
        match self.x.binary_search_by(|probe| probe.total_cmp(&t)) {
            Ok(i) => i.min(self.x.len() - 2),
            Err(0) => 0,
            Err(i) => (i - 1).min(self.x.len() - 2),
        }
    }

    fn calc_a(h: &[f64]) -> na::DMatrix<f64> {
        let nx = h.len() + 1;
        let mut a = na::DMatrix::zeros(nx, nx);
        a[(0, 0)] = 1.;
        for i in 0..nx - 1 {
            if i != nx - 2 {
                a[(i + 1, i + 1)] = 2.0 * (h[i] + h[i + 1]);
            }
            a[(i + 1, i)] = h[i];
            a[(i, i + 1)] = h[i];
        }
        a[(0, 1)] = 0.;
        a[(nx - 1, nx - 2)] = 0.;
        a[(nx - 1, nx - 1)] = 1.;
        a
    }

    fn calc_b(h: &[f64], a: &[f64]) -> na::DVector<f64> {
        let nx = h.len() + 1;
        let mut b = na::DVector::zeros(nx);
        for i in 0..nx - 2 {
            b[i + 1] = 3.0 * (a[i + 2] - a[i + 1]) / h[i + 1] - 3.0 * (a[i + 1] - a[i]) / h[i];
        }
        b
    }
}

/// Planar curve (x(s), y(s)) parameterised by cumulative chord length
#[derive(Debug, Clone)]
pub struct Spline2D {
    pub s: Vec<f64>,
    sx: Spline,
    sy: Spline,
}

impl Spline2D {
    pub fn new(x: &[f64], y: &[f64]) -> PlannerResult<Spline2D> {
        if x.len() != y.len() {
            return Err(PlannerError::InputUnavailable(
                "waypoint x and y must have the same length".to_string(),
            ));
        }
        let s = Spline2D::calc_s(x, y);
        let sx = Spline::new(&s, x)?;
        let sy = Spline::new(&s, y)?;

        Ok(Spline2D { s, sx, sy })
    }

    fn calc_s(x: &[f64], y: &[f64]) -> Vec<f64> {
        let mut s: Vec<f64> = Vec::with_capacity(x.len());
        s.push(0.);
        for i in 1..x.len() {
            let ds = ((x[i] - x[i - 1]).powi(2) + (y[i] - y[i - 1]).powi(2)).sqrt();
            s.push(s[i - 1] + ds);
        }
        s
    }

    pub fn length(&self) -> f64 {
        self.s.last().copied().unwrap_or(0.0)
    }

    pub fn calc_position(&self, is: f64) -> (f64, f64) {
        (self.sx.calc(is), self.sy.calc(is))
    }

    /// First derivative (dx/ds, dy/ds)
    pub fn calc_tangent(&self, is: f64) -> (f64, f64) {
        (self.sx.calcd(is), self.sy.calcd(is))
    }

    /// Second derivative (d2x/ds2, d2y/ds2)
    pub fn calc_second_derivative(&self, is: f64) -> (f64, f64) {
        (self.sx.calcdd(is), self.sy.calcdd(is))
    }

    pub fn calc_curvature(&self, is: f64) -> f64 {
        let dx = self.sx.calcd(is);
        let ddx = self.sx.calcdd(is);
        let dy = self.sy.calcd(is);
        let ddy = self.sy.calcdd(is);
        (ddy * dx - ddx * dy) / (dx.powi(2) + dy.powi(2)).powf(3. / 2.)
    }

    /// Derivative of the curvature w.r.t. the spline parameter
    pub fn calc_curvature_derivative(&self, is: f64) -> f64 {
        let dx = self.sx.calcd(is);
        let ddx = self.sx.calcdd(is);
        let dddx = self.sx.calcddd(is);
        let dy = self.sy.calcd(is);
        let ddy = self.sy.calcdd(is);
        let dddy = self.sy.calcddd(is);

        let a = dx * ddy - dy * ddx;
        let b = dx * dddy - dy * dddx;
        let c = dx * ddx + dy * ddy;
        let d = dx * dx + dy * dy;
        (b * d - 3.0 * a * c) / d.powf(5. / 2.)
    }

    pub fn calc_yaw(&self, is: f64) -> f64 {
        let dx = self.sx.calcd(is);
        let dy = self.sy.calcd(is);
        dy.atan2(dx)
    }
}
