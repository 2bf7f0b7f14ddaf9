//! NACA four-digit airfoil family.

use crate::error::{FoilError, Result};
use crate::traits::AirfoilShape;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A NACA 4-digit section with normalized maximum camber `m`, camber location `p`
/// and thickness ratio `t`, all as fractions of the chord.
///
/// Only the validating constructors build a section; there is no `Deserialize`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Naca4 {
    pub m: f64,
    pub p: f64,
    pub t: f64,
}

impl Naca4 {
    pub fn new(m: f64, p: f64, t: f64) -> Result<Self> {
        if !(m.is_finite() && p.is_finite() && t.is_finite()) {
            return Err(FoilError::invalid("NACA parameters must be finite"));
        }
        if !(0.0..=0.095).contains(&m) {
            return Err(FoilError::invalid(format!(
                "maximum camber must lie in [0, 0.095], got {m}"
            )));
        }
        if !(0.0..=0.9).contains(&p) {
            return Err(FoilError::invalid(format!(
                "camber location must lie in [0, 0.9], got {p}"
            )));
        }
        if t <= 0.0 || t > 0.99 {
            return Err(FoilError::invalid(format!(
                "thickness ratio must lie in (0, 0.99], got {t}"
            )));
        }
        if m > 0.0 && p == 0.0 {
            return Err(FoilError::invalid(
                "cambered section needs a non-zero camber location",
            ));
        }
        Ok(Self { m, p, t })
    }

    /// Builds a section from its designation digits in written order, e.g. `[2, 4, 1, 2]`.
    pub fn from_digits(digits: [u8; 4]) -> Result<Self> {
        if let Some(bad) = digits.iter().find(|&&d| d > 9) {
            return Err(FoilError::invalid(format!(
                "airfoil digits must be in 0-9, got {bad}"
            )));
        }
        let [camber, location, tens, units] = digits.map(f64::from);
        Self::new(camber / 100.0, location / 10.0, (tens * 10.0 + units) / 100.0)
    }

    /// Designation digits, rounded from the normalized parameters.
    pub fn digits(&self) -> [u8; 4] {
        let thickness = (self.t * 100.0).round() as u8;
        [
            (self.m * 100.0).round() as u8,
            (self.p * 10.0).round() as u8,
            thickness / 10,
            thickness % 10,
        ]
    }

    pub fn is_symmetric(&self) -> bool {
        self.m == 0.0
    }
}

impl AirfoilShape for Naca4 {
    fn camber(&self, x: f64) -> f64 {
        let (m, p) = (self.m, self.p);
        if m == 0.0 {
            0.0
        } else if x < p {
            m / (p * p) * (2.0 * p * x - x * x)
        } else {
            m / ((1.0 - p) * (1.0 - p)) * (1.0 - 2.0 * p + 2.0 * p * x - x * x)
        }
    }

    fn half_thickness(&self, x: f64) -> f64 {
        let x = x.max(0.0);
        5.0 * self.t
            * (0.29690 * x.sqrt() - 0.12600 * x - 0.35160 * x.powi(2) + 0.28430 * x.powi(3)
                - 0.10150 * x.powi(4))
    }
}

impl FromStr for Naca4 {
    type Err = FoilError;

    /// Accepts `"2412"`, `"NACA2412"` or `"naca 2412"`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = match trimmed.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("naca") => trimmed[4..].trim_start(),
            _ => trimmed,
        };
        let bytes = body.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(FoilError::invalid(format!(
                "expected a four-digit NACA designation, got \"{s}\""
            )));
        }
        let mut digits = [0u8; 4];
        for (slot, byte) in digits.iter_mut().zip(bytes) {
            *slot = byte - b'0';
        }
        Self::from_digits(digits)
    }
}

impl fmt::Display for Naca4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.digits();
        write!(f, "NACA {a}{b}{c}{d}")
    }
}
