//! A single capture-channel-to-render-channel path, with its own filter
//! chain and gating conditions.

use crate::condition::{Condition, ConditionRegistry};
use sp_core::{Channel, Sample};
use sp_dsp::Filter;

/// One path from an input channel to a render-block slot. A route owns its
/// filter chain outright: no two routes ever share a filter instance, so
/// resetting one route's state can never perturb another's.
#[derive(Debug, Clone)]
pub struct Route {
    destination: Channel,
    filters: Vec<Filter>,
    conditions: Vec<Condition>,
    valid: bool,
}

impl Route {
    pub fn new(destination: Channel, filters: Vec<Filter>, conditions: Vec<Condition>) -> Route {
        Route {
            destination,
            filters,
            conditions,
            valid: true,
        }
    }

    pub fn destination(&self) -> Channel {
        self.destination
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Recompute validity by ANDing every condition against the current
    /// registry snapshot. Called by the supervisor's ~100ms housekeeping
    /// pass, never on the audio thread.
    pub fn eval_conditions(&mut self, registry: &ConditionRegistry) {
        self.valid = ConditionRegistry::evaluate(&self.conditions, registry);
    }

    /// Process one sample through this route's filter chain and add the
    /// result into `render_block` at this route's destination index. A no-op
    /// when the route is currently gated off by a failed condition.
    #[inline(always)]
    pub fn process(&mut self, input: Sample, render_block: &mut [Sample]) {
        if !self.valid {
            return;
        }
        let mut x = input;
        for filter in &mut self.filters {
            x = filter.process(x);
        }
        if let Some(slot) = render_block.get_mut(self.destination.index()) {
            *slot += x;
        }
    }

    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}
