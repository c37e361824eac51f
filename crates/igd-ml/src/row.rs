use crate::error::{MlError, MlResult};

/// The constant value of the bias feature added to every row.
pub const BIAS_VALUE: f64 = 1.0;

/// A labeled feature row.
///
/// The row owns its features. Views handed out by [`Row::features`] borrow
/// from the row and cannot outlive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    label: f64,
    features: Vec<f64>,
}

impl Row {
    pub fn new(label: f64, features: Vec<f64>) -> Self {
        Self { label, features }
    }

    /// Builds a row from a flat record laid out as `[label, features...]`.
    pub fn try_from_record(record: &[f64]) -> MlResult<Self> {
        let [label, features @ ..] = record else {
            return Err(MlError::input("empty record"));
        };
        Ok(Self::new(*label, features.to_vec()))
    }

    pub fn label(&self) -> f64 {
        self.label
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns an error unless the label and every feature is a number.
    pub fn validate(&self) -> MlResult<()> {
        if self.label.is_nan() {
            return Err(MlError::input("non-numeric label found"));
        }
        if let Some(position) = self.features.iter().position(|x| x.is_nan()) {
            return Err(MlError::input(format!(
                "non-numeric feature found at position {position}"
            )));
        }
        Ok(())
    }
}

pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y.iter()).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_row_from_record() {
        let row = Row::try_from_record(&[17.592, 1.0, 6.1101]).unwrap();
        assert_eq!(row.label(), 17.592);
        assert_eq!(row.features(), &[1.0, 6.1101]);
        assert_eq!(row.len(), 2);
        assert!(Row::try_from_record(&[]).is_err());
    }

    #[test]
    fn test_row_validate() {
        assert!(Row::new(1.0, vec![1.0, 2.0]).validate().is_ok());
        assert!(matches!(
            Row::new(f64::NAN, vec![1.0]).validate(),
            Err(MlError::InvalidInput(_))
        ));
        assert!(matches!(
            Row::new(1.0, vec![1.0, f64::NAN]).validate(),
            Err(MlError::InvalidInput(_))
        ));
    }
}
