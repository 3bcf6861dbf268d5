//! Particle set initialisation
//!
//! - [`InitSurveillanceAreaGrid`] - regular grid over a rectangular 2-D area
//! - [`InitFixedState`] - every particle at the same state

use log::warn;
use nalgebra::DVector;

use crate::filter::errors::FilterError;
use crate::filter::traits::ParticleSetInitialization;
use crate::types::ParticleSet;

/// Places particles on a regular grid over `[x_inf, x_sup] × [y_inf, y_sup]`
///
/// The first two state rows receive the grid coordinates, every other row
/// is zeroed. The grid must have exactly as many nodes as there are
/// particles.
#[derive(Debug, Clone)]
pub struct InitSurveillanceAreaGrid {
    x_inf: f64,
    x_sup: f64,
    y_inf: f64,
    y_sup: f64,
    num_x: usize,
    num_y: usize,
}

impl InitSurveillanceAreaGrid {
    pub fn new(x_inf: f64, x_sup: f64, y_inf: f64, y_sup: f64, num_x: usize, num_y: usize) -> Result<Self, FilterError> {
        if num_x == 0 || num_y == 0 {
            return Err(FilterError::configuration("surveillance grid needs at least one node per axis"));
        }
        if !(x_sup >= x_inf && y_sup >= y_inf) {
            return Err(FilterError::configuration("surveillance area bounds are inverted"));
        }
        Ok(Self {
            x_inf,
            x_sup,
            y_inf,
            y_sup,
            num_x,
            num_y,
        })
    }

    /// Grid over `[0, x] × [0, y]`
    pub fn from_extent(x: f64, y: f64, num_x: usize, num_y: usize) -> Result<Self, FilterError> {
        Self::new(0.0, x, 0.0, y, num_x, num_y)
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_x * self.num_y
    }
}

/// Node `i` of `n` evenly covering `[inf, sup]` (cell centres)
fn grid_coordinate(inf: f64, sup: f64, n: usize, i: usize) -> f64 {
    let cell = (sup - inf) / n as f64;
    inf + cell * (i as f64 + 0.5)
}

impl ParticleSetInitialization for InitSurveillanceAreaGrid {
    fn initialize(&mut self, particles: &mut ParticleSet) -> bool {
        if particles.num_particles() != self.num_nodes() || particles.dim() < 2 {
            warn!(
                "Surveillance grid has {} nodes for {} particles of size {}",
                self.num_nodes(),
                particles.num_particles(),
                particles.dim()
            );
            return false;
        }

        let mut state = particles.state_mut();
        state.fill(0.0);
        for i in 0..self.num_x {
            for j in 0..self.num_y {
                let col = i * self.num_y + j;
                state[(0, col)] = grid_coordinate(self.x_inf, self.x_sup, self.num_x, i);
                state[(1, col)] = grid_coordinate(self.y_inf, self.y_sup, self.num_y, j);
            }
        }
        particles.set_uniform_log_weights();
        true
    }
}

/// Puts every particle on the same known state
#[derive(Debug, Clone)]
pub struct InitFixedState {
    state: DVector<f64>,
}

impl InitFixedState {
    pub fn new(state: DVector<f64>) -> Self {
        Self { state }
    }
}

impl ParticleSetInitialization for InitFixedState {
    fn initialize(&mut self, particles: &mut ParticleSet) -> bool {
        if particles.dim() != self.state.len() {
            warn!(
                "Initial state of size {} for particles of size {}",
                self.state.len(),
                particles.dim()
            );
            return false;
        }
        let mut state = particles.state_mut();
        for mut col in state.column_iter_mut() {
            col.copy_from(&self.state);
        }
        particles.set_uniform_log_weights();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VectorDescription;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_grid_covers_area() {
        let mut init = InitSurveillanceAreaGrid::new(0.0, 10.0, -4.0, 4.0, 5, 2).unwrap();
        let mut particles = ParticleSet::new(10, VectorDescription::linear(4)).unwrap();
        assert!(init.initialize(&mut particles));

        let state = particles.state();
        assert_abs_diff_eq!(state[(0, 0)], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(state[(1, 0)], -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(state[(0, 9)], 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(state[(1, 9)], 2.0, epsilon = 1e-12);
        assert!(state.rows(2, 2).iter().all(|v| *v == 0.0));
        assert_abs_diff_eq!(particles.neff(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_grid_rejects_wrong_particle_count() {
        let mut init = InitSurveillanceAreaGrid::from_extent(1.0, 1.0, 2, 2).unwrap();
        let mut particles = ParticleSet::new(5, VectorDescription::linear(2)).unwrap();
        assert!(!init.initialize(&mut particles));
        assert!(InitSurveillanceAreaGrid::new(1.0, 0.0, 0.0, 1.0, 2, 2).is_err());
        assert!(InitSurveillanceAreaGrid::from_extent(1.0, 1.0, 0, 2).is_err());
    }

    #[test]
    fn test_fixed_state() {
        let mut init = InitFixedState::new(DVector::from_vec(vec![0.1]));
        let mut particles = ParticleSet::new(3, VectorDescription::linear(1)).unwrap();
        assert!(init.initialize(&mut particles));
        assert!(particles.state().iter().all(|v| *v == 0.1));

        let mut wrong = ParticleSet::new(3, VectorDescription::linear(2)).unwrap();
        assert!(!init.initialize(&mut wrong));
    }
}
