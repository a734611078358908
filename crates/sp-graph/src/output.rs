//! A render channel's own filter chain, mute flag and clip metering.

use sp_core::{Channel, Sample};
use sp_dsp::Filter;

/// One render channel's identity, filter chain and peak-clip accumulator.
/// Filters here run after every route has summed into this channel's render
/// block slot, so they see the fully mixed signal for that channel.
#[derive(Debug, Clone)]
pub struct Output {
    channel: Channel,
    filters: Vec<Filter>,
    muted: bool,
    peak_clip: Sample,
}

impl Output {
    pub fn new(channel: Channel, filters: Vec<Filter>, muted: bool) -> Output {
        Output {
            channel,
            filters,
            muted,
            peak_clip: 0.0,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn peak_clip(&self) -> Sample {
        self.peak_clip
    }

    /// Process the mixed sample for this channel. Muted channels short
    /// circuit to silence before the filter chain runs at all. Anything
    /// leaving the chain outside [-1, 1] is clamped, and the peak excursion
    /// is accumulated for the supervisor's clip-warning housekeeping.
    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> Sample {
        if self.muted {
            return 0.0;
        }
        let mut x = input;
        for filter in &mut self.filters {
            x = filter.process(x);
        }
        if x.abs() > 1.0 {
            self.peak_clip = self.peak_clip.max(x.abs());
            x = x.clamp(-1.0, 1.0);
        }
        x
    }

    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }

    /// Drain the peak-clip accumulator back to zero; called by the
    /// supervisor's ~5s housekeeping pass after it has logged a clip warning.
    pub fn reset_clipping(&mut self) -> Sample {
        std::mem::replace(&mut self.peak_clip, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_dsp::Gain;

    #[test]
    fn muted_output_is_always_silent() {
        let mut out = Output::new(Channel::L, vec![Filter::Gain(Gain::new(20.0, false))], true);
        assert_eq!(out.process(1.0), 0.0);
    }

    #[test]
    fn overshoot_is_clamped_and_recorded() {
        let mut out = Output::new(Channel::L, vec![Filter::Gain(Gain::new(12.0, false))], false);
        let y = out.process(1.0);
        assert_eq!(y, 1.0);
        assert!(out.peak_clip() > 1.0);
    }

    #[test]
    fn reset_clipping_drains_the_accumulator() {
        let mut out = Output::new(Channel::L, vec![Filter::Gain(Gain::new(12.0, false))], false);
        out.process(1.0);
        assert!(out.peak_clip() > 0.0);
        let drained = out.reset_clipping();
        assert!(drained > 0.0);
        assert_eq!(out.peak_clip(), 0.0);
    }

    #[test]
    fn in_range_signal_is_untouched() {
        let mut out = Output::new(Channel::L, vec![], false);
        assert_eq!(out.process(0.5), 0.5);
        assert_eq!(out.peak_clip(), 0.0);
    }
}
