//! Interactive repaint timer.
//!
//! The timer itself is owned by the runner; this module only decides when it is armed. Every
//! re-evaluation starts a new epoch, and a tick armed in an older epoch is ignored when it fires.

use embassy_time::Duration;

/// Epoch a tick was armed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickToken(u32);

impl TickToken {
    pub fn epoch(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerCommand {
    /// Fire `token` after `delay`, replacing any tick already armed.
    Arm { token: TickToken, delay: Duration },
    /// Drop any armed tick.
    Disarm,
}

#[derive(Debug)]
pub struct TickTimer {
    epoch: u32,
    running: bool,
    period: Duration,
    command: Option<TimerCommand>,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            epoch: 0,
            running: false,
            period,
            command: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn token(&self) -> TickToken {
        TickToken(self.epoch)
    }

    /// Cancel every outstanding tick and, if `should_run`, arm one immediately.
    pub fn update(&mut self, should_run: bool) {
        self.epoch = self.epoch.wrapping_add(1);
        self.running = should_run;
        self.command = Some(if should_run {
            TimerCommand::Arm {
                token: self.token(),
                delay: Duration::from_ticks(0),
            }
        } else {
            TimerCommand::Disarm
        });
    }

    /// Handle a tick armed with `token`. Returns whether it is current, in which case the next tick
    /// is armed at the following period boundary of `now_ms`.
    pub fn fire(&mut self, token: TickToken, now_ms: u64) -> bool {
        if !self.running || token != self.token() {
            trace!("stale tick {}", token.epoch());
            return false;
        }
        let delay = delay_to_next_boundary(now_ms, self.period.as_millis());
        self.command = Some(TimerCommand::Arm {
            token,
            delay: Duration::from_millis(delay),
        });
        true
    }

    /// Command for the runner, if the timer changed since the last call.
    pub fn take_command(&mut self) -> Option<TimerCommand> {
        self.command.take()
    }
}

/// Milliseconds from `now_ms` to the next multiple of `period_ms`.
pub fn delay_to_next_boundary(now_ms: u64, period_ms: u64) -> u64 {
    if period_ms == 0 {
        return 0;
    }
    period_ms - (now_ms % period_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_aligns_to_the_next_second() {
        assert_eq!(delay_to_next_boundary(12_345, 1000), 655);
        assert_eq!(delay_to_next_boundary(12_999, 1000), 1);
        assert_eq!(delay_to_next_boundary(13_000, 1000), 1000);
        assert_eq!(delay_to_next_boundary(0, 1000), 1000);
    }

    #[test]
    fn update_arms_immediately_in_a_new_epoch() {
        let mut timer = TickTimer::new(Duration::from_millis(1000));
        let before = timer.token();
        timer.update(true);
        assert!(timer.is_running());
        assert_ne!(timer.token(), before);
        assert_eq!(
            timer.take_command(),
            Some(TimerCommand::Arm {
                token: timer.token(),
                delay: Duration::from_ticks(0)
            })
        );
        assert_eq!(timer.take_command(), None);
    }

    #[test]
    fn tick_from_an_older_epoch_is_dropped() {
        let mut timer = TickTimer::new(Duration::from_millis(1000));
        timer.update(true);
        let old = timer.token();
        timer.update(true);
        timer.take_command();

        assert!(!timer.fire(old, 5_250));
        assert_eq!(timer.take_command(), None);
        assert!(timer.fire(timer.token(), 5_250));
        assert_eq!(
            timer.take_command(),
            Some(TimerCommand::Arm {
                token: timer.token(),
                delay: Duration::from_millis(750)
            })
        );
    }

    #[test]
    fn stopped_timer_ignores_its_own_token() {
        let mut timer = TickTimer::new(Duration::from_millis(1000));
        timer.update(false);
        assert_eq!(timer.take_command(), Some(TimerCommand::Disarm));
        assert!(!timer.fire(timer.token(), 0));
    }
}
