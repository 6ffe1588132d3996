use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Current value of one parameter.
///
/// The tag is the same for every parameter of an engine at any instant:
/// [`ParameterValue::Scalar`] in static mode, [`ParameterValue::Vector`] of
/// the shared trial count in stochastic mode. Arithmetic broadcasts a scalar
/// against a vector, so model code written once runs in both modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Deterministic representative.
    Scalar(f64),
    /// One value per Monte Carlo trial.
    Vector(Vec<f64>),
}

impl ParameterValue {
    /// Returns the scalar, if this is one.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParameterValue::Scalar(value) => Some(*value),
            ParameterValue::Vector(_) => None,
        }
    }

    /// Values as a slice; a scalar is a slice of length one.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            ParameterValue::Scalar(value) => std::slice::from_ref(value),
            ParameterValue::Vector(values) => values,
        }
    }

    /// True for [`ParameterValue::Scalar`].
    pub fn is_scalar(&self) -> bool {
        matches!(self, ParameterValue::Scalar(_))
    }

    /// Number of trials carried, `None` for a scalar.
    pub fn trial_count(&self) -> Option<usize> {
        match self {
            ParameterValue::Scalar(_) => None,
            ParameterValue::Vector(values) => Some(values.len()),
        }
    }

    /// Value for trial `index`. A scalar answers for every trial.
    pub fn at(&self, index: usize) -> Option<f64> {
        match self {
            ParameterValue::Scalar(value) => Some(*value),
            ParameterValue::Vector(values) => values.get(index).copied(),
        }
    }

    /// Arithmetic mean over trials (the value itself for a scalar).
    pub fn mean(&self) -> f64 {
        let values = self.as_slice();
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Applies `f` to every value, keeping the shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> ParameterValue {
        match self {
            ParameterValue::Scalar(value) => ParameterValue::Scalar(f(*value)),
            ParameterValue::Vector(values) => {
                ParameterValue::Vector(values.iter().map(|v| f(*v)).collect())
            }
        }
    }

    /// Combines two values elementwise with scalar broadcasting.
    ///
    /// Returns `None` when both sides are vectors of different lengths.
    pub fn try_zip_with(
        &self,
        rhs: &ParameterValue,
        f: impl Fn(f64, f64) -> f64,
    ) -> Option<ParameterValue> {
        let combined = match (self, rhs) {
            (ParameterValue::Scalar(a), ParameterValue::Scalar(b)) => {
                ParameterValue::Scalar(f(*a, *b))
            }
            (ParameterValue::Scalar(a), ParameterValue::Vector(b)) => {
                ParameterValue::Vector(b.iter().map(|b| f(*a, *b)).collect())
            }
            (ParameterValue::Vector(a), ParameterValue::Scalar(b)) => {
                ParameterValue::Vector(a.iter().map(|a| f(*a, *b)).collect())
            }
            (ParameterValue::Vector(a), ParameterValue::Vector(b)) => {
                if a.len() != b.len() {
                    return None;
                }
                ParameterValue::Vector(a.iter().zip(b).map(|(a, b)| f(*a, *b)).collect())
            }
        };
        Some(combined)
    }

    /// Like [`Self::try_zip_with`].
    ///
    /// # Panics
    ///
    /// Panics when both sides are vectors of different lengths. Values read
    /// from one engine snapshot always share a length.
    pub fn zip_with(&self, rhs: &ParameterValue, f: impl Fn(f64, f64) -> f64) -> ParameterValue {
        match self.try_zip_with(rhs, f) {
            Some(value) => value,
            None => panic!(
                "trial count mismatch: {:?} vs {:?}",
                self.trial_count(),
                rhs.trial_count()
            ),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<Vec<f64>> for ParameterValue {
    fn from(values: Vec<f64>) -> Self {
        ParameterValue::Vector(values)
    }
}

impl PartialEq<f64> for ParameterValue {
    fn eq(&self, other: &f64) -> bool {
        self.as_scalar() == Some(*other)
    }
}

macro_rules! broadcast_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&ParameterValue> for &ParameterValue {
            type Output = ParameterValue;

            fn $method(self, rhs: &ParameterValue) -> ParameterValue {
                self.zip_with(rhs, |a, b| a $op b)
            }
        }

        impl $trait<ParameterValue> for ParameterValue {
            type Output = ParameterValue;

            fn $method(self, rhs: ParameterValue) -> ParameterValue {
                self.zip_with(&rhs, |a, b| a $op b)
            }
        }

        impl $trait<&ParameterValue> for ParameterValue {
            type Output = ParameterValue;

            fn $method(self, rhs: &ParameterValue) -> ParameterValue {
                self.zip_with(rhs, |a, b| a $op b)
            }
        }

        impl $trait<ParameterValue> for &ParameterValue {
            type Output = ParameterValue;

            fn $method(self, rhs: ParameterValue) -> ParameterValue {
                self.zip_with(&rhs, |a, b| a $op b)
            }
        }

        impl $trait<f64> for &ParameterValue {
            type Output = ParameterValue;

            fn $method(self, rhs: f64) -> ParameterValue {
                self.map(|a| a $op rhs)
            }
        }

        impl $trait<f64> for ParameterValue {
            type Output = ParameterValue;

            fn $method(self, rhs: f64) -> ParameterValue {
                self.map(|a| a $op rhs)
            }
        }

        impl $trait<&ParameterValue> for f64 {
            type Output = ParameterValue;

            fn $method(self, rhs: &ParameterValue) -> ParameterValue {
                rhs.map(|b| self $op b)
            }
        }

        impl $trait<ParameterValue> for f64 {
            type Output = ParameterValue;

            fn $method(self, rhs: ParameterValue) -> ParameterValue {
                rhs.map(|b| self $op b)
            }
        }
    };
}

broadcast_op!(Add, add, +);
broadcast_op!(Sub, sub, -);
broadcast_op!(Mul, mul, *);
broadcast_op!(Div, div, /);

impl Neg for &ParameterValue {
    type Output = ParameterValue;

    fn neg(self) -> ParameterValue {
        self.map(|a| -a)
    }
}

impl Neg for ParameterValue {
    type Output = ParameterValue;

    fn neg(self) -> ParameterValue {
        self.map(|a| -a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_stay_scalar() {
        let a = ParameterValue::Scalar(2.0);
        let b = ParameterValue::Scalar(3.0);
        assert_eq!(&a * &b, 6.0);
        assert_eq!(&a + 1.0, 3.0);
        assert_eq!(10.0 / &a, 5.0);
        assert_eq!(-a, -2.0);
    }

    #[test]
    fn scalar_broadcasts_over_vector() {
        let a = ParameterValue::Scalar(2.0);
        let v = ParameterValue::Vector(vec![1.0, 2.0, 3.0]);
        assert_eq!(&a * &v, ParameterValue::Vector(vec![2.0, 4.0, 6.0]));
        assert_eq!(&v - &a, ParameterValue::Vector(vec![-1.0, 0.0, 1.0]));
    }

    #[test]
    fn vectors_combine_elementwise() {
        let a = ParameterValue::Vector(vec![1.0, 2.0]);
        let b = ParameterValue::Vector(vec![3.0, 4.0]);
        assert_eq!(a * b, ParameterValue::Vector(vec![3.0, 8.0]));
    }

    #[test]
    fn mismatched_vectors_are_reported() {
        let a = ParameterValue::Vector(vec![1.0, 2.0]);
        let b = ParameterValue::Vector(vec![3.0]);
        assert!(a.try_zip_with(&b, |x, y| x + y).is_none());
    }

    #[test]
    #[should_panic(expected = "trial count mismatch")]
    fn mismatched_vectors_panic_in_operators() {
        let a = ParameterValue::Vector(vec![1.0, 2.0]);
        let b = ParameterValue::Vector(vec![3.0]);
        let _ = &a + &b;
    }

    #[test]
    fn accessors() {
        let s = ParameterValue::from(1.5);
        assert_eq!(s.as_slice(), &[1.5]);
        assert_eq!(s.at(42), Some(1.5));
        assert_eq!(s.trial_count(), None);

        let v = ParameterValue::from(vec![1.0, 3.0]);
        assert_eq!(v.trial_count(), Some(2));
        assert_eq!(v.at(2), None);
        assert_eq!(v.mean(), 2.0);
        assert!(v != 1.0);
    }
}
