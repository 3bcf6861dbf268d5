//! Particle prediction by sampling the transition
//!
//! Every particle is moved with [`StateModel::motion`], i.e. deterministic
//! propagation plus one noise draw per particle. Importance weights are
//! carried over unchanged.

use log::debug;

use crate::filter::traits::{PfPrediction, SkipFlags};
use crate::models::StateModel;
use crate::types::ParticleSet;

/// Draw-and-propagate prediction
pub struct DrawParticles {
    model: Box<dyn StateModel>,
    flags: SkipFlags,
}

impl DrawParticles {
    pub fn new(model: Box<dyn StateModel>) -> Self {
        Self {
            model,
            flags: SkipFlags::default(),
        }
    }

    pub fn state_model_mut(&mut self) -> &mut dyn StateModel {
        self.model.as_mut()
    }
}

impl PfPrediction for DrawParticles {
    fn predict(&mut self, prev: &ParticleSet) -> ParticleSet {
        let mut pred = prev.clone();
        if self.flags.state {
            return pred;
        }

        let moved = match self.model.motion(prev.state()) {
            Ok(moved) => moved,
            Err(e) => {
                debug!("Particle prediction skipped: {}", e);
                return pred;
            }
        };
        if let Err(e) = pred.set_state(moved) {
            debug!("Particle prediction skipped: {}", e);
        }
        pred
    }

    fn skip_flags(&self) -> SkipFlags {
        self.flags
    }

    fn skip_flags_mut(&mut self) -> &mut SkipFlags {
        &mut self.flags
    }

    fn state_model(&self) -> &dyn StateModel {
        self.model.as_ref()
    }
}
