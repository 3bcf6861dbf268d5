//! State transition contracts
//!
//! - [`StateModel`] - minimal transition contract every state model implements
//! - [`AdditiveStateModel`] - transition plus additive Gaussian process noise
//! - [`HasTransitionProbability`] - optional density `p(x_t | x_{t-1})`
//! - [`ExogenousModel`] - extra input map applied after the transition
//!
//! All maps work on batches: one state per column.

use nalgebra::DMatrix;

use crate::filter::errors::ModelError;
use crate::types::VectorDescription;

/// Stochastic state transition
pub trait StateModel: Send {
    /// Deterministic part of the transition. Must not mutate the model.
    fn propagate(&self, cur_states: &DMatrix<f64>) -> DMatrix<f64>;

    /// Full stochastic transition of every column of `cur_states`
    ///
    /// When `cur_states` carries the noise entries of
    /// [`input_description`](Self::input_description), the model consumes
    /// them instead of drawing fresh noise.
    fn motion(&mut self, cur_states: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelError>;

    /// Covariance of the process noise
    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        Err(ModelError::unsupported("noise_covariance_matrix"))
    }

    /// Draw `num` process noise samples, one per column
    fn noise_sample(&mut self, _num: usize) -> Result<DMatrix<f64>, ModelError> {
        Err(ModelError::unsupported("noise_sample"))
    }

    /// Best-effort dynamic reconfiguration
    fn set_property(&mut self, _property: &str) -> bool {
        false
    }

    fn state_description(&self) -> VectorDescription;

    /// Layout of the vector accepted by [`motion`](Self::motion)
    fn input_description(&self) -> VectorDescription {
        self.state_description()
    }
}

/// State model whose noise enters additively: `x' = f(x) + w`, `w ~ N(0, Q)`
pub trait AdditiveStateModel: StateModel {
    /// `propagate` followed by the noise term
    ///
    /// If `cur_states` has the noise-augmented size, its trailing rows are
    /// used as `w`; otherwise one noise sample is drawn per column.
    fn additive_motion(&mut self, cur_states: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelError> {
        let state_size = self.state_description().total_size();
        if cur_states.nrows() > state_size {
            let noise = cur_states.rows(state_size, cur_states.nrows() - state_size);
            let states = cur_states.rows(0, state_size).into_owned();
            let mut out = self.propagate(&states);
            if noise.nrows() != out.nrows() {
                return Err(ModelError::DimensionMismatch {
                    expected: out.nrows(),
                    actual: noise.nrows(),
                    context: "augmented process noise".to_string(),
                });
            }
            out += noise;
            return Ok(out);
        }

        let mut out = self.propagate(cur_states);
        out += self.noise_sample(out.ncols())?;
        Ok(out)
    }

    /// State description extended with one noise entry per row of `Q`
    fn additive_input_description(&self) -> VectorDescription {
        let noise = self
            .noise_covariance_matrix()
            .map(|q| q.nrows())
            .unwrap_or(0);
        self.state_description().with_noise(noise)
    }
}

/// Capability: evaluate the transition density
pub trait HasTransitionProbability: StateModel {
    /// `p(cur_i | prev_i)` for every column pair
    fn transition_probability(
        &self,
        prev_states: &DMatrix<f64>,
        cur_states: &DMatrix<f64>,
    ) -> nalgebra::DVector<f64>;
}

/// Additional input applied to predicted states (e.g. a known control)
pub trait ExogenousModel: Send {
    fn propagate(&self, cur_states: &DMatrix<f64>) -> DMatrix<f64>;

    fn set_property(&mut self, _property: &str) -> bool {
        false
    }
}

impl<T: StateModel + ?Sized> StateModel for Box<T> {
    fn propagate(&self, cur_states: &DMatrix<f64>) -> DMatrix<f64> {
        (**self).propagate(cur_states)
    }

    fn motion(&mut self, cur_states: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelError> {
        (**self).motion(cur_states)
    }

    fn noise_covariance_matrix(&self) -> Result<DMatrix<f64>, ModelError> {
        (**self).noise_covariance_matrix()
    }

    fn noise_sample(&mut self, num: usize) -> Result<DMatrix<f64>, ModelError> {
        (**self).noise_sample(num)
    }

    fn set_property(&mut self, property: &str) -> bool {
        (**self).set_property(property)
    }

    fn state_description(&self) -> VectorDescription {
        (**self).state_description()
    }

    fn input_description(&self) -> VectorDescription {
        (**self).input_description()
    }
}

impl<T: AdditiveStateModel + ?Sized> AdditiveStateModel for Box<T> {
    fn additive_motion(&mut self, cur_states: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelError> {
        (**self).additive_motion(cur_states)
    }

    fn additive_input_description(&self) -> VectorDescription {
        (**self).additive_input_description()
    }
}

impl<T: HasTransitionProbability + ?Sized> HasTransitionProbability for Box<T> {
    fn transition_probability(
        &self,
        prev_states: &DMatrix<f64>,
        cur_states: &DMatrix<f64>,
    ) -> nalgebra::DVector<f64> {
        (**self).transition_probability(prev_states, cur_states)
    }
}

/// Constant additive input `x' = x + u` applied to every column
#[derive(Debug, Clone)]
pub struct ConstantInput {
    input: nalgebra::DVector<f64>,
}

impl ConstantInput {
    pub fn new(input: nalgebra::DVector<f64>) -> Self {
        Self { input }
    }
}

impl ExogenousModel for ConstantInput {
    fn propagate(&self, cur_states: &DMatrix<f64>) -> DMatrix<f64> {
        let mut out = cur_states.clone();
        for mut col in out.column_iter_mut() {
            col += &self.input;
        }
        out
    }
}
