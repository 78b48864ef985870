use crate::sample::{AXES, SampleError};
use serde::Serialize;
use std::fmt;

/// Scale from m/s² RMS to the mm/s figure used for severity, assuming a
/// 1 Hz integration bandwidth.
pub const MPS2_TO_MMS: f64 = 1000.0;

/// Overall vibration severity (mm/s) of a 3-axis acceleration RMS vector.
///
/// ```
/// let severity = vibration::severity(&[0.0, 0.003, 0.004]);
/// assert!((severity - 5.0).abs() < 1e-9);
/// ```
pub fn severity(accel_rms: &[f64; AXES]) -> f64 {
    let norm = accel_rms.iter().map(|v| v * v).sum::<f64>().sqrt();
    norm * MPS2_TO_MMS
}

/// Same as [`severity`] for callers holding an unchecked slice.
///
/// # Errors
/// [`SampleError::AccelArity`] when the slice does not hold exactly three values.
pub fn try_severity(accel_rms: &[f64]) -> Result<f64, SampleError> {
    let axes: &[f64; AXES] = accel_rms
        .try_into()
        .map_err(|_| SampleError::AccelArity(accel_rms.len()))?;
    Ok(severity(axes))
}

/// Machine condition zones for ISO 10816-1 class I machines (small machines
/// up to 15 kW), boundaries in mm/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SeverityZone {
    /// Newly commissioned machines.
    A,
    /// Acceptable for unrestricted long-term operation.
    B,
    /// Unsatisfactory for long-term continuous operation.
    C,
    /// Severe enough to cause damage.
    D,
}

impl SeverityZone {
    const AB: f64 = 0.71;
    const BC: f64 = 1.8;
    const CD: f64 = 4.5;

    pub fn classify(severity_mm_s: f64) -> Self {
        if severity_mm_s < Self::AB {
            SeverityZone::A
        } else if severity_mm_s < Self::BC {
            SeverityZone::B
        } else if severity_mm_s < Self::CD {
            SeverityZone::C
        } else {
            SeverityZone::D
        }
    }
}

impl fmt::Display for SeverityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeverityZone::A => "A (good)",
            SeverityZone::B => "B (acceptable)",
            SeverityZone::C => "C (unsatisfactory)",
            SeverityZone::D => "D (unacceptable)",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_scaled_euclidean_norm() {
        let cases: [[f64; 3]; 5] = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.012, 0.009, 0.021],
            [-0.5, 0.25, 3.75],
            [1e-6, 2e-6, 3e-6],
        ];

        for v in cases {
            let expected = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt() * 1000.0;
            let got = severity(&v);
            assert!(
                (got - expected).abs() <= 1e-9 * expected.max(1.0),
                "{:?}: {} != {}",
                v,
                got,
                expected
            );
        }
    }

    #[test]
    fn pythagorean_triple() {
        assert_eq!(severity(&[3.0, 4.0, 12.0]), 13_000.0);
    }

    #[test]
    fn try_severity_fails_fast_on_wrong_arity() {
        assert_eq!(try_severity(&[1.0, 2.0]), Err(SampleError::AccelArity(2)));
        assert_eq!(
            try_severity(&[1.0, 2.0, 2.0, 0.0]),
            Err(SampleError::AccelArity(4))
        );
        assert_eq!(try_severity(&[1.0, 2.0, 2.0]), Ok(3000.0));
    }

    #[test]
    fn zone_boundaries() {
        assert_eq!(SeverityZone::classify(0.0), SeverityZone::A);
        assert_eq!(SeverityZone::classify(0.70), SeverityZone::A);
        assert_eq!(SeverityZone::classify(0.71), SeverityZone::B);
        assert_eq!(SeverityZone::classify(1.8), SeverityZone::C);
        assert_eq!(SeverityZone::classify(4.49), SeverityZone::C);
        assert_eq!(SeverityZone::classify(4.5), SeverityZone::D);
        assert_eq!(SeverityZone::classify(120.0), SeverityZone::D);
    }
}
