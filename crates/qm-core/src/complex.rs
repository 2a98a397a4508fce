use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::constants::EPSILON;

/// Complex amplitude.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl PartialEq for Complex {
    fn eq(&self, other: &Self) -> bool {
        (self.re - other.re).abs() < EPSILON && (self.im - other.im).abs() < EPSILON
    }
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// r·e^{iθ}
    pub fn from_polar(r: f64, theta: f64) -> Self {
        Self {
            re: r * theta.cos(),
            im: r * theta.sin(),
        }
    }

    /// |z|²
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// |z|
    pub fn abs(self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Phase angle in (-π, π].
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    pub fn scale(self, k: f64) -> Self {
        Self {
            re: self.re * k,
            im: self.im * k,
        }
    }
}

impl Add for Complex {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self::new(self.re + o.re, self.im + o.im)
    }
}

impl AddAssign for Complex {
    fn add_assign(&mut self, o: Self) {
        self.re += o.re;
        self.im += o.im;
    }
}

impl Sub for Complex {
    type Output = Self;
    fn sub(self, o: Self) -> Self {
        Self::new(self.re - o.re, self.im - o.im)
    }
}

impl Mul for Complex {
    type Output = Self;
    fn mul(self, o: Self) -> Self {
        Self::new(
            self.re * o.re - self.im * o.im,
            self.re * o.im + self.im * o.re,
        )
    }
}

/// Ordered sequence of complex amplitudes with a fixed dimension.
///
/// After `normalize`, the L2 norm is 1 unless the raw norm was 0, in which
/// case the vector is left as the zero vector.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexVector {
    components: Vec<Complex>,
}

impl ComplexVector {
    pub fn zeros(dimension: usize) -> Self {
        Self {
            components: vec![Complex::ZERO; dimension],
        }
    }

    pub fn from_components(components: Vec<Complex>) -> Self {
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[Complex] {
        &self.components
    }

    /// Release the backing buffer (for the vector free-list).
    pub fn into_inner(self) -> Vec<Complex> {
        self.components
    }

    pub fn norm_sqr(&self) -> f64 {
        self.components.iter().map(|c| c.norm_sqr()).sum()
    }

    pub fn l2_norm(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.components.iter().all(|c| c.re == 0.0 && c.im == 0.0)
    }

    /// Scale to unit L2 norm. A zero vector stays zero.
    pub fn normalize(&mut self) {
        let sum = self.norm_sqr();
        if sum <= 0.0 {
            return;
        }
        let inv = 1.0 / sum.sqrt();
        for c in &mut self.components {
            *c = c.scale(inv);
        }
    }

    pub fn magnitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.components.iter().map(|c| c.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_from_polar_roundtrip() {
        let z = Complex::from_polar(2.0, FRAC_PI_2);
        assert!((z.abs() - 2.0).abs() < 1e-12);
        assert!((z.arg() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_mul_rotates_phase() {
        let a = Complex::from_polar(1.0, PI / 4.0);
        let b = Complex::from_polar(1.0, PI / 4.0);
        let p = a * b;
        assert!((p.arg() - FRAC_PI_2).abs() < 1e-12);
        assert!((p.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_unit_norm() {
        let mut v = ComplexVector::from_components(vec![
            Complex::new(3.0, 0.0),
            Complex::new(0.0, 4.0),
        ]);
        v.normalize();
        assert!((v.l2_norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        let mut v = ComplexVector::zeros(8);
        v.normalize();
        assert!(v.is_zero());
        assert_eq!(v.len(), 8);
        assert!(v.components().iter().all(|c| !c.re.is_nan()));
    }
}
