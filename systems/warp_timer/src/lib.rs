#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic cruise/warp toggle driven by elapsed frame time.

use std::time::Duration;

use tracing::debug;
use warpfield_core::{Command, WarpMode};

/// Default interval between warp toggles.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

/// Configuration parameters required to construct the warp timer.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    period: Duration,
}

impl Config {
    /// Creates a new configuration toggling warp once per `period`.
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Interval between toggles.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

/// Pure system that flips the warp signal on a fixed interval.
#[derive(Debug)]
pub struct WarpTimer {
    period: Duration,
    accumulator: Duration,
}

impl WarpTimer {
    /// Creates a new warp timer using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            period: config.period,
            accumulator: Duration::ZERO,
        }
    }

    /// Accumulates `dt` and emits one toggle per elapsed period.
    ///
    /// When several periods elapse within a single call the emitted modes
    /// alternate, starting from the opposite of `current`.
    pub fn handle(&mut self, dt: Duration, current: WarpMode, out: &mut Vec<Command>) {
        if self.period.is_zero() || dt.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);

        let mut mode = current;
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            mode = mode.toggled();
            debug!(?mode, "warp timer elapsed");
            out.push(Command::SetWarp { mode });
        }
    }

    /// Time accumulated toward the next toggle.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.accumulator
    }
}

impl Default for WarpTimer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(timer: &mut WarpTimer, dt: Duration, current: WarpMode) -> Vec<Command> {
        let mut out = Vec::new();
        timer.handle(dt, current, &mut out);
        out
    }

    #[test]
    fn does_not_toggle_before_period_elapses() {
        let mut timer = WarpTimer::default();

        for _ in 0..299 {
            assert!(run(&mut timer, Duration::from_millis(16), WarpMode::Cruise).is_empty());
        }
        assert_eq!(timer.elapsed(), Duration::from_millis(16 * 299));
    }

    #[test]
    fn toggles_once_per_period() {
        let mut timer = WarpTimer::new(Config::new(Duration::from_secs(5)));

        assert!(run(&mut timer, Duration::from_millis(4_900), WarpMode::Cruise).is_empty());
        assert_eq!(
            run(&mut timer, Duration::from_millis(200), WarpMode::Cruise),
            vec![Command::SetWarp {
                mode: WarpMode::Warp
            }]
        );
        assert_eq!(timer.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn alternates_when_several_periods_elapse_at_once() {
        let mut timer = WarpTimer::new(Config::new(Duration::from_secs(5)));

        let commands = run(&mut timer, Duration::from_secs(16), WarpMode::Warp);

        assert_eq!(
            commands,
            vec![
                Command::SetWarp {
                    mode: WarpMode::Cruise
                },
                Command::SetWarp {
                    mode: WarpMode::Warp
                },
                Command::SetWarp {
                    mode: WarpMode::Cruise
                },
            ]
        );
        assert_eq!(timer.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn zero_period_never_toggles() {
        let mut timer = WarpTimer::new(Config::new(Duration::ZERO));

        assert!(run(&mut timer, Duration::from_secs(60), WarpMode::Cruise).is_empty());
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }
}
