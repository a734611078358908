//! Route conditions and the process-wide condition registry.

use sp_core::Channel;

/// A route condition. `Silent` is the only defined kind: it holds while the
/// named capture channel has produced no non-zero sample in the last
/// evaluation window (~5s, driven by the supervisor thread).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Silent(Channel),
}

impl Condition {
    fn channel(self) -> Channel {
        match self {
            Condition::Silent(channel) => channel,
        }
    }

    fn eval(self, registry: &ConditionRegistry) -> bool {
        match self {
            Condition::Silent(channel) => registry.is_silent(channel),
        }
    }
}

/// Process-wide "is this capture channel currently silent" table. Written by
/// the supervisor thread roughly every 5 seconds, read per-sample by the
/// hot path. A writer updates whole `bool` entries; readers tolerate one
/// evaluation window of staleness (spec.md's documented eventual
/// consistency), so no synchronization stronger than the caller's own
/// discipline is required here — callers behind a lock (see sp-pipeline)
/// provide the actual cross-thread visibility.
#[derive(Debug, Clone)]
pub struct ConditionRegistry {
    silent: Vec<bool>,
}

impl ConditionRegistry {
    pub fn new(num_input_channels: usize) -> ConditionRegistry {
        ConditionRegistry {
            silent: vec![true; num_input_channels],
        }
    }

    pub fn is_silent(&self, channel: Channel) -> bool {
        self.silent.get(channel.index()).copied().unwrap_or(true)
    }

    pub fn set_silent(&mut self, channel: Channel, silent: bool) {
        if let Some(slot) = self.silent.get_mut(channel.index()) {
            *slot = silent;
        }
    }

    pub fn evaluate(conditions: &[Condition], registry: &ConditionRegistry) -> bool {
        conditions.iter().all(|c| c.eval(registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_condition_list_is_always_true() {
        let registry = ConditionRegistry::new(8);
        assert!(ConditionRegistry::evaluate(&[], &registry));
    }

    #[test]
    fn silent_condition_follows_the_registry_flag() {
        let mut registry = ConditionRegistry::new(8);
        let cond = [Condition::Silent(Channel::Sbl)];
        assert!(ConditionRegistry::evaluate(&cond, &registry));
        registry.set_silent(Channel::Sbl, false);
        assert!(!ConditionRegistry::evaluate(&cond, &registry));
    }

    #[test]
    fn unrelated_channel_condition_is_unaffected() {
        let mut registry = ConditionRegistry::new(8);
        registry.set_silent(Channel::Sbl, false);
        let cond = [Condition::Silent(Channel::Sbr)];
        assert!(ConditionRegistry::evaluate(&cond, &registry));
    }
}
