//! Measurement payloads
//!
//! Sensors hand measurements around as [`Data`], a closed set of shapes.
//! A shape mismatch on access is reported as [`ModelError::DataCast`].

use nalgebra::{DMatrix, DVector};

use crate::filter::errors::ModelError;

/// Measurement or auxiliary payload exchanged with models
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Data {
    /// No payload
    #[default]
    Empty,
    /// Single scalar
    Scalar(f64),
    /// Column vector
    Vector(DVector<f64>),
    /// Matrix, typically one column per sample or mixture component
    Matrix(DMatrix<f64>),
}

impl Data {
    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Data::Empty => "empty",
            Data::Scalar(_) => "scalar",
            Data::Vector(_) => "vector",
            Data::Matrix(_) => "matrix",
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Data::Empty)
    }

    /// Borrow the payload as a matrix
    pub fn as_matrix(&self) -> Result<&DMatrix<f64>, ModelError> {
        match self {
            Data::Matrix(m) => Ok(m),
            other => Err(ModelError::DataCast {
                expected: "matrix",
                found: other.kind(),
            }),
        }
    }

    /// Convert any non-empty payload into a matrix
    ///
    /// Scalars become `1×1`, vectors become a single column.
    pub fn to_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        match self {
            Data::Scalar(s) => Ok(DMatrix::from_element(1, 1, *s)),
            Data::Vector(v) => Ok(DMatrix::from_column_slice(v.len(), 1, v.as_slice())),
            Data::Matrix(m) => Ok(m.clone()),
            Data::Empty => Err(ModelError::DataCast {
                expected: "matrix",
                found: "empty",
            }),
        }
    }

    /// Borrow the payload as a vector
    pub fn as_vector(&self) -> Result<&DVector<f64>, ModelError> {
        match self {
            Data::Vector(v) => Ok(v),
            other => Err(ModelError::DataCast {
                expected: "vector",
                found: other.kind(),
            }),
        }
    }

    pub fn as_scalar(&self) -> Result<f64, ModelError> {
        match self {
            Data::Scalar(s) => Ok(*s),
            other => Err(ModelError::DataCast {
                expected: "scalar",
                found: other.kind(),
            }),
        }
    }
}

impl From<DMatrix<f64>> for Data {
    fn from(m: DMatrix<f64>) -> Self {
        Data::Matrix(m)
    }
}

impl From<DVector<f64>> for Data {
    fn from(v: DVector<f64>) -> Self {
        Data::Vector(v)
    }
}

impl From<f64> for Data {
    fn from(s: f64) -> Self {
        Data::Scalar(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_failure_is_explicit() {
        let data = Data::Scalar(2.0);
        let err = data.as_matrix().unwrap_err();
        assert!(matches!(
            err,
            ModelError::DataCast {
                expected: "matrix",
                found: "scalar"
            }
        ));
    }

    #[test]
    fn test_to_matrix_promotes_shapes() {
        let v = Data::from(DVector::from_vec(vec![1.0, 2.0]));
        let m = v.to_matrix().unwrap();
        assert_eq!(m.shape(), (2, 1));
        assert_eq!(m[(1, 0)], 2.0);

        assert_eq!(Data::Scalar(3.0).to_matrix().unwrap()[(0, 0)], 3.0);
        assert!(Data::Empty.to_matrix().is_err());
    }

    #[test]
    fn test_typed_accessors() {
        assert_eq!(Data::Scalar(1.5).as_scalar().unwrap(), 1.5);
        let v = Data::from(DVector::from_vec(vec![1.0, 2.0]));
        assert_eq!(v.as_vector().unwrap().len(), 2);
        assert!(v.as_scalar().is_err());
        assert!(Data::Empty.as_vector().is_err());
    }
}
