//! Shape descriptions of vector-valued quantities
//!
//! A [`VectorDescription`] tells the estimation machinery how a state or
//! measurement vector is laid out: an ordinary (linear) prefix, a circular
//! suffix, and optionally trailing noise components used for augmentation.

use serde::{Deserialize, Serialize};

/// Storage convention for circular components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CircularType {
    /// One scalar angle per component
    #[default]
    Euler,
    /// One unit quaternion (4 stored values, 3 degrees of freedom) per component
    Quaternion,
}

impl CircularType {
    /// Number of stored values per circular component
    #[inline]
    pub fn storage_size(self) -> usize {
        match self {
            CircularType::Euler => 1,
            CircularType::Quaternion => 4,
        }
    }

    /// Number of degrees of freedom per circular component
    #[inline]
    pub fn dof(self) -> usize {
        match self {
            CircularType::Euler => 1,
            CircularType::Quaternion => 3,
        }
    }
}

/// Linear/circular/noise layout of a vector
///
/// Invariants (established by every constructor):
/// - `circular_size == circular_components` for [`CircularType::Euler`]
/// - `circular_size == 4 * circular_components` for [`CircularType::Quaternion`]
/// - `total_size == linear_size + circular_size + noise_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VectorDescription {
    total_size: usize,
    linear_size: usize,
    circular_size: usize,
    noise_size: usize,
    linear_components: usize,
    circular_components: usize,
    noise_components: usize,
    circular_type: CircularType,
}

impl VectorDescription {
    /// Create a new description
    pub fn new(
        linear_components: usize,
        circular_components: usize,
        noise_components: usize,
        circular_type: CircularType,
    ) -> Self {
        let circular_size = circular_components * circular_type.storage_size();
        Self {
            total_size: linear_components + circular_size + noise_components,
            linear_size: linear_components,
            circular_size,
            noise_size: noise_components,
            linear_components,
            circular_components,
            noise_components,
            circular_type,
        }
    }

    /// Purely linear vector of `n` components
    pub fn linear(n: usize) -> Self {
        Self::new(n, 0, 0, CircularType::Euler)
    }

    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    #[inline]
    pub fn linear_size(&self) -> usize {
        self.linear_size
    }

    #[inline]
    pub fn circular_size(&self) -> usize {
        self.circular_size
    }

    #[inline]
    pub fn noise_size(&self) -> usize {
        self.noise_size
    }

    #[inline]
    pub fn linear_components(&self) -> usize {
        self.linear_components
    }

    #[inline]
    pub fn circular_components(&self) -> usize {
        self.circular_components
    }

    #[inline]
    pub fn noise_components(&self) -> usize {
        self.noise_components
    }

    #[inline]
    pub fn circular_type(&self) -> CircularType {
        self.circular_type
    }

    #[inline]
    pub fn is_quaternion(&self) -> bool {
        self.circular_type == CircularType::Quaternion
    }

    /// Degrees of freedom of the circular block (3 per quaternion)
    #[inline]
    pub fn circular_dof(&self) -> usize {
        self.circular_components * self.circular_type.dof()
    }

    /// Intrinsic dimensionality: the size of a covariance over this vector
    #[inline]
    pub fn dof_size(&self) -> usize {
        self.linear_size + self.circular_dof() + self.noise_size
    }

    /// Same layout with `noise_components` trailing noise entries
    pub fn with_noise(&self, noise_components: usize) -> Self {
        Self::new(
            self.linear_components,
            self.circular_components,
            noise_components,
            self.circular_type,
        )
    }

    /// Same layout with the noise block removed
    pub fn noiseless(&self) -> Self {
        self.with_noise(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euler_sizes() {
        let d = VectorDescription::new(3, 2, 1, CircularType::Euler);
        assert_eq!(d.circular_size(), 2);
        assert_eq!(d.total_size(), 6);
        assert_eq!(d.dof_size(), 6);
    }

    #[test]
    fn test_quaternion_sizes() {
        let d = VectorDescription::new(3, 2, 0, CircularType::Quaternion);
        assert_eq!(d.circular_size(), 8);
        assert_eq!(d.total_size(), 11);
        // Each quaternion contributes 3 degrees of freedom
        assert_eq!(d.dof_size(), 9);
    }

    #[test]
    fn test_size_invariant_holds_for_all_layouts() {
        for linear in 0..4 {
            for circular in 0..4 {
                for noise in 0..3 {
                    for ty in [CircularType::Euler, CircularType::Quaternion] {
                        let d = VectorDescription::new(linear, circular, noise, ty);
                        assert_eq!(
                            d.total_size(),
                            d.linear_size() + d.circular_size() + d.noise_size()
                        );
                        let expected = if ty == CircularType::Quaternion {
                            4 * circular
                        } else {
                            circular
                        };
                        assert_eq!(d.circular_size(), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_with_noise_roundtrip() {
        let d = VectorDescription::new(2, 1, 0, CircularType::Euler);
        let augmented = d.with_noise(2);
        assert_eq!(augmented.noise_size(), 2);
        assert_eq!(augmented.total_size(), 5);
        assert_eq!(augmented.noiseless(), d);
    }

    #[test]
    fn test_serde_roundtrip_shape() {
        let d = VectorDescription::new(1, 1, 0, CircularType::Quaternion);
        let json = serde_json::to_string(&d).unwrap();
        let back: VectorDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
