//! Wall-clock countdown shared between two clients.
//!
//! Both clients anchor to the same `(started_at_ms, duration)` pair
//! from the match record, so their displays agree to within clock skew
//! without any extra coordination. The caller injects `now_ms` on every
//! tick, which keeps this type deterministic and testable.

/// Where the countdown currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    /// No countdown anchored.
    Idle,
    /// Counting down; `remaining_s` is whole seconds left.
    Counting {
        /// Whole seconds until expiry.
        remaining_s: u32,
    },
    /// The countdown has elapsed.
    Expired,
}

/// Fire-once countdown latch driven by an injected clock.
#[derive(Debug, Default)]
pub struct CountdownSync {
    anchor: Option<Anchor>,
    fired: bool,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    started_at_ms: i64,
    duration_s: u32,
}

impl CountdownSync {
    /// A synchroniser with nothing anchored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor a fresh countdown, rearming the expiry latch.
    pub fn anchor(&mut self, started_at_ms: i64, duration_s: u32) {
        self.anchor = Some(Anchor {
            started_at_ms,
            duration_s,
        });
        self.fired = false;
    }

    /// Drop the anchor, returning to idle.
    pub fn clear(&mut self) {
        self.anchor = None;
        self.fired = false;
    }

    /// Current phase at `now_ms`.
    ///
    /// Remaining time is `duration - floor(elapsed / 1000)` clamped at
    /// zero, so an anchor in the future still reads as the full
    /// duration rather than overflowing.
    pub fn phase(&self, now_ms: i64) -> CountdownPhase {
        let Some(anchor) = self.anchor else {
            return CountdownPhase::Idle;
        };

        let elapsed_s = (now_ms - anchor.started_at_ms).max(0) / 1000;
        let remaining = i64::from(anchor.duration_s) - elapsed_s;
        if remaining <= 0 {
            CountdownPhase::Expired
        } else {
            CountdownPhase::Counting {
                remaining_s: remaining as u32,
            }
        }
    }

    /// Return `true` exactly once, the first time the countdown is
    /// observed expired. Clients use this to trigger the round start
    /// call a single time no matter how often they tick.
    pub fn fire(&mut self, now_ms: i64) -> bool {
        if self.fired || self.phase(now_ms) != CountdownPhase::Expired {
            return false;
        }
        self.fired = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_anchored() {
        let sync = CountdownSync::new();
        assert_eq!(sync.phase(1_000_000), CountdownPhase::Idle);
    }

    #[test]
    fn remaining_is_monotone_non_increasing() {
        let mut sync = CountdownSync::new();
        sync.anchor(10_000, 5);

        let mut last = u32::MAX;
        for now in (10_000..16_500).step_by(250) {
            match sync.phase(now) {
                CountdownPhase::Counting { remaining_s } => {
                    assert!(remaining_s <= last);
                    last = remaining_s;
                }
                CountdownPhase::Expired => break,
                CountdownPhase::Idle => panic!("anchored countdown reported idle"),
            }
        }
    }

    #[test]
    fn full_duration_shown_at_anchor_instant() {
        let mut sync = CountdownSync::new();
        sync.anchor(10_000, 5);
        assert_eq!(sync.phase(10_000), CountdownPhase::Counting { remaining_s: 5 });
        // A skewed clock slightly behind the anchor must not overflow.
        assert_eq!(sync.phase(9_400), CountdownPhase::Counting { remaining_s: 5 });
    }

    #[test]
    fn expires_at_duration_boundary() {
        let mut sync = CountdownSync::new();
        sync.anchor(10_000, 5);
        assert_eq!(sync.phase(14_999), CountdownPhase::Counting { remaining_s: 1 });
        assert_eq!(sync.phase(15_000), CountdownPhase::Expired);
    }

    #[test]
    fn fires_exactly_once() {
        let mut sync = CountdownSync::new();
        sync.anchor(0, 1);

        assert!(!sync.fire(500));
        assert!(sync.fire(1_000));
        assert!(!sync.fire(1_001));
        assert!(!sync.fire(60_000));
    }

    #[test]
    fn rearming_resets_the_latch() {
        let mut sync = CountdownSync::new();
        sync.anchor(0, 1);
        assert!(sync.fire(2_000));

        sync.anchor(10_000, 1);
        assert_eq!(sync.phase(10_000), CountdownPhase::Counting { remaining_s: 1 });
        assert!(sync.fire(11_000));
        assert!(!sync.fire(12_000));
    }
}
