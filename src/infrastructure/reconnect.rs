use std::time::Duration;

/// Reconnection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectState {
    /// Never connected
    Idle,
    /// Connection open, attempt counter at zero
    Connected,
    /// Closed unexpectedly; attempts used so far
    Reconnecting { attempts: u32 },
    /// Attempt ceiling reached; only a manual connect leaves this state
    GivenUp,
}

/// What to do after an unexpected close or a failed reattempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Schedule attempt number `attempt` after `delay`
    Retry { attempt: u32, delay: Duration },
    /// Ceiling reached; stop until a manual connect
    GiveUp,
}

/// Fixed-interval reconnection state machine.
///
/// The delay is deliberately constant rather than exponential: the dashboard
/// tolerates a bounded, predictable staleness window, and a fixed interval
/// keeps worst-case recovery time known.
#[derive(Debug)]
pub struct ReconnectPolicy {
    interval: Duration,
    max_attempts: u32,
    state: ReconnectState,
}

impl ReconnectPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            state: ReconnectState::Idle,
        }
    }

    pub fn state(&self) -> ReconnectState {
        self.state
    }

    /// A connection opened successfully; the attempt counter resets.
    pub fn on_open(&mut self) {
        self.state = ReconnectState::Connected;
    }

    /// A manual disconnect; automatic reconnection is off until `on_open`.
    pub fn reset(&mut self) {
        self.state = ReconnectState::Idle;
    }

    /// An unexpected close or a failed reattempt. Advances the machine and
    /// returns the scheduling decision.
    pub fn next_attempt(&mut self) -> ReconnectDecision {
        let attempts = match self.state {
            ReconnectState::Reconnecting { attempts } => attempts,
            ReconnectState::GivenUp => return ReconnectDecision::GiveUp,
            _ => 0,
        };

        if attempts >= self.max_attempts {
            self.state = ReconnectState::GivenUp;
            return ReconnectDecision::GiveUp;
        }

        let attempt = attempts + 1;
        self.state = ReconnectState::Reconnecting { attempts: attempt };
        ReconnectDecision::Retry {
            attempt,
            delay: self.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> ReconnectPolicy {
        ReconnectPolicy::new(Duration::from_millis(100), max_attempts)
    }

    #[test]
    fn idle_to_connected_on_first_open() {
        let mut policy = policy(3);
        assert_eq!(policy.state(), ReconnectState::Idle);
        policy.on_open();
        assert_eq!(policy.state(), ReconnectState::Connected);
    }

    #[test]
    fn retries_with_fixed_delay_until_ceiling() {
        let mut policy = policy(2);
        policy.on_open();

        assert_eq!(
            policy.next_attempt(),
            ReconnectDecision::Retry {
                attempt: 1,
                delay: Duration::from_millis(100)
            }
        );
        assert_eq!(
            policy.next_attempt(),
            ReconnectDecision::Retry {
                attempt: 2,
                delay: Duration::from_millis(100)
            }
        );
        assert_eq!(policy.next_attempt(), ReconnectDecision::GiveUp);
        assert_eq!(policy.state(), ReconnectState::GivenUp);
    }

    #[test]
    fn successful_open_resets_attempt_counter() {
        let mut policy = policy(2);
        policy.on_open();
        policy.next_attempt();
        policy.on_open();
        assert_eq!(policy.state(), ReconnectState::Connected);

        // Full budget available again after the reset
        assert!(matches!(
            policy.next_attempt(),
            ReconnectDecision::Retry { attempt: 1, .. }
        ));
    }

    #[test]
    fn given_up_stays_given_up_without_manual_open() {
        let mut policy = policy(1);
        policy.on_open();
        policy.next_attempt();
        assert_eq!(policy.next_attempt(), ReconnectDecision::GiveUp);
        assert_eq!(policy.next_attempt(), ReconnectDecision::GiveUp);

        policy.on_open();
        assert_eq!(policy.state(), ReconnectState::Connected);
    }

    #[test]
    fn zero_ceiling_gives_up_immediately() {
        let mut policy = policy(0);
        policy.on_open();
        assert_eq!(policy.next_attempt(), ReconnectDecision::GiveUp);
    }
}
