//! Arbitration between user-driven and engine-driven slider position.
//!
//! ```text
//!            begin_drag              finish_drag(Some(seq))
//!   Live ───────────────> Dragging ───────────────────────> Seeking{seq}
//!    ^                       │                                   │
//!    │    finish_drag(None)  │   confirm_seek / tick / failed    │
//!    └───────────────────────┴───────────────────────────────────┘
//! ```
//!
//! Engine positions (poll ticks and event re-syncs) are only accepted in
//! `Live`. `Seeking` lasts until the engine status actually shows the
//! target. A seek the engine acknowledged but never reports falls back to
//! `Live` after a bounded number of poll ticks.

/// How far a reported engine position may be from the seek target and
/// still count as the seek having landed.
pub const SEEK_TOLERANCE_MS: f64 = 1_500.0;

/// Who owns the position shown on the slider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionArbiter {
    /// Engine-driven.
    #[default]
    Live,
    /// User-driven; every drag frame writes the position locally.
    Dragging,
    /// Drag finished and a seek was queued. `ticks_left` starts counting
    /// once the engine has acknowledged the seek command.
    Seeking {
        target_ms: f64,
        seq: u64,
        ticks_left: Option<u32>,
    },
}

impl PositionArbiter {
    pub fn begin_drag(&mut self) {
        *self = PositionArbiter::Dragging;
    }

    /// Ends a drag at `target_ms`. With a queued seek the arbiter waits for
    /// it, otherwise engine positions are accepted again immediately.
    pub fn finish_drag(&mut self, target_ms: f64, seek_seq: Option<u64>) {
        *self = match seek_seq {
            Some(seq) => PositionArbiter::Seeking {
                target_ms,
                seq,
                ticks_left: None,
            },
            None => PositionArbiter::Live,
        };
    }

    /// The engine accepted seek `seq`. Starts the fallback countdown of
    /// `settle_ticks` poll ticks; stale acknowledgements are ignored.
    pub fn seek_acknowledged(&mut self, seq: u64, settle_ticks: u32) -> bool {
        match self {
            PositionArbiter::Seeking {
                seq: pending,
                ticks_left,
                ..
            } if *pending == seq => {
                ticks_left.get_or_insert(settle_ticks);
                true
            }
            _ => false,
        }
    }

    /// The engine rejected seek `seq`; nothing is left to wait for.
    pub fn seek_failed(&mut self, seq: u64) -> bool {
        match *self {
            PositionArbiter::Seeking { seq: pending, .. } if pending == seq => {
                *self = PositionArbiter::Live;
                true
            }
            _ => false,
        }
    }

    /// Returns to `Live` when `engine_position_ms` shows the pending seek
    /// has landed.
    pub fn confirm_seek(&mut self, engine_position_ms: f64) -> bool {
        match *self {
            PositionArbiter::Seeking { target_ms, .. }
                if (engine_position_ms - target_ms).abs() <= SEEK_TOLERANCE_MS =>
            {
                *self = PositionArbiter::Live;
                true
            }
            _ => false,
        }
    }

    /// One poll tick without confirmation. Returns `true` when the
    /// acknowledged seek has waited long enough and the arbiter gave up.
    pub fn tick(&mut self) -> bool {
        match self {
            PositionArbiter::Seeking {
                ticks_left: Some(ticks),
                ..
            } => {
                if *ticks <= 1 {
                    *self = PositionArbiter::Live;
                    true
                } else {
                    *ticks -= 1;
                    false
                }
            }
            _ => false,
        }
    }

    /// Drops a pending seek wait without touching an active drag.
    pub fn release_seek(&mut self) {
        if matches!(self, PositionArbiter::Seeking { .. }) {
            *self = PositionArbiter::Live;
        }
    }

    pub fn accepts_engine_position(&self) -> bool {
        matches!(self, PositionArbiter::Live)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, PositionArbiter::Dragging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeking(target_ms: f64, seq: u64) -> PositionArbiter {
        let mut arbiter = PositionArbiter::default();
        arbiter.begin_drag();
        arbiter.finish_drag(target_ms, Some(seq));
        arbiter
    }

    #[test]
    fn test_drag_without_seek_returns_live() {
        let mut arbiter = PositionArbiter::default();
        assert!(arbiter.accepts_engine_position());

        arbiter.begin_drag();
        assert!(arbiter.is_dragging());
        assert!(!arbiter.accepts_engine_position());

        arbiter.finish_drag(1_000.0, None);
        assert_eq!(arbiter, PositionArbiter::Live);
    }

    #[test]
    fn test_acknowledgement_alone_keeps_holding() {
        let mut arbiter = seeking(75_000.0, 3);
        assert_eq!(
            arbiter,
            PositionArbiter::Seeking {
                target_ms: 75_000.0,
                seq: 3,
                ticks_left: None
            }
        );

        assert!(!arbiter.seek_acknowledged(2, 5));
        assert!(arbiter.seek_acknowledged(3, 5));
        assert!(!arbiter.accepts_engine_position());

        // The engine still reports where it was before the seek.
        assert!(!arbiter.confirm_seek(5_000.0));
        assert!(!arbiter.accepts_engine_position());

        assert!(arbiter.confirm_seek(75_400.0));
        assert!(arbiter.accepts_engine_position());
    }

    #[test]
    fn test_ticks_only_count_after_acknowledgement() {
        let mut arbiter = seeking(40_000.0, 1);
        for _ in 0..10 {
            assert!(!arbiter.tick());
        }
        assert!(!arbiter.accepts_engine_position());

        arbiter.seek_acknowledged(1, 3);
        assert!(!arbiter.tick());
        assert!(!arbiter.tick());
        assert!(arbiter.tick());
        assert_eq!(arbiter, PositionArbiter::Live);
    }

    #[test]
    fn test_failed_seek_releases_hold() {
        let mut arbiter = seeking(10_000.0, 4);
        assert!(!arbiter.seek_failed(3));
        assert!(arbiter.seek_failed(4));
        assert!(arbiter.accepts_engine_position());
    }

    #[test]
    fn test_new_drag_supersedes_pending_seek() {
        let mut arbiter = seeking(10.0, 1);
        arbiter.begin_drag();

        // Late news about the old seek must not end the new drag.
        assert!(!arbiter.seek_acknowledged(1, 2));
        assert!(!arbiter.seek_failed(1));
        assert!(!arbiter.confirm_seek(10.0));
        assert!(!arbiter.tick());
        assert!(arbiter.is_dragging());
    }

    #[test]
    fn test_release_seek_keeps_drag() {
        let mut arbiter = PositionArbiter::Dragging;
        arbiter.release_seek();
        assert!(arbiter.is_dragging());

        let mut arbiter = seeking(5.0, 9);
        arbiter.release_seek();
        assert!(arbiter.accepts_engine_position());
    }
}
