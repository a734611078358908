//! A capture channel and the routes fed by it.

use crate::condition::ConditionRegistry;
use crate::route::Route;
use sp_core::{Channel, Sample};

/// One capture channel's identity plus every route it feeds. `is_playing`
/// tracks whether this channel has produced a non-zero sample recently; the
/// capture loop sets it per-batch, the supervisor reads it to drive the
/// `SILENT` condition and to decide whether this input's routes need a
/// click-free reset.
#[derive(Debug, Clone)]
pub struct Input {
    channel: Channel,
    routes: Vec<Route>,
    is_playing: bool,
}

impl Input {
    pub fn new(channel: Channel, routes: Vec<Route>) -> Input {
        Input {
            channel,
            routes,
            is_playing: false,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Mark this channel as currently producing non-silent audio.
    pub fn mark_playing(&mut self) {
        self.is_playing = true;
    }

    /// Called when a batch of silence has been observed: resets every
    /// route's filter state once (so the next real audio starts click-free)
    /// and flips `is_playing` off.
    pub fn reset_if_was_playing(&mut self) {
        if self.is_playing {
            for route in &mut self.routes {
                route.reset();
            }
        }
        self.is_playing = false;
    }

    pub fn eval_conditions(&mut self, registry: &ConditionRegistry) {
        for route in &mut self.routes {
            route.eval_conditions(registry);
        }
    }

    #[inline(always)]
    pub fn process(&mut self, input: Sample, render_block: &mut [Sample]) {
        for route in &mut self.routes {
            route.process(input, render_block);
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_dsp::{DelayLine, Filter};

    #[test]
    fn reset_only_fires_after_having_been_playing() {
        let mut input = Input::new(
            Channel::L,
            vec![Route::new(Channel::L, vec![Filter::Delay(DelayLine::new(2).unwrap())], vec![])],
        );
        // never marked playing: reset_if_was_playing must not disturb anything
        input.reset_if_was_playing();
        assert!(!input.is_playing());

        let mut block = [0.0; 8];
        input.mark_playing();
        input.process(1.0, &mut block);
        input.reset_if_was_playing();
        assert!(!input.is_playing());

        let mut block = [0.0; 8];
        input.process(0.0, &mut block);
        assert_eq!(block[Channel::L.index()], 0.0);
    }

    #[test]
    fn process_fans_out_to_every_route() {
        let mut input = Input::new(
            Channel::C,
            vec![
                Route::new(Channel::L, vec![], vec![]),
                Route::new(Channel::R, vec![], vec![]),
            ],
        );
        let mut block = [0.0; 8];
        input.process(1.0, &mut block);
        assert_eq!(block[Channel::L.index()], 1.0);
        assert_eq!(block[Channel::R.index()], 1.0);
    }
}
