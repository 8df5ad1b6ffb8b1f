use std::time::Instant;

use crate::theme::ActiveTrack;

/// Monotonically increasing identifier of a theme request.
pub type RequestSeq = u64;

/// Phase of the single active-track slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePhase {
    /// No track, or the last request failed; the scheme is empty.
    #[default]
    Idle,
    /// A request is in flight.
    Loading {
        /// Sequence number of the request being waited on.
        seq: RequestSeq,
    },
    /// The scheme of the given request is on screen.
    Applied {
        /// Sequence number of the request that produced the scheme.
        seq: RequestSeq,
    },
}

impl ThemePhase {
    /// Lowercase label used in status payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePhase::Idle => "idle",
            ThemePhase::Loading { .. } => "loading",
            ThemePhase::Applied { .. } => "applied",
        }
    }
}

/// Why a request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestReason {
    /// A new track became active.
    TrackChanged,
    /// The dark-mode flag flipped for the same track.
    AppearanceChanged,
}

/// One `(track, dark mode)` pair in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeRequest {
    /// Sequence number assigned at issue time.
    pub seq: RequestSeq,
    /// Track whose artwork feeds the request.
    pub track: ActiveTrack,
    /// Whether dark-mode tones are requested.
    pub is_dark: bool,
    /// What triggered the request.
    pub reason: RequestReason,
    /// When the request was issued.
    pub issued_at: Instant,
}

/// Outcome of matching a completed request against the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The result is current and must be presented.
    Apply {
        /// Sequence number of the applied request.
        seq: RequestSeq,
    },
    /// The current request failed; the scheme must be cleared.
    Reset {
        /// Sequence number of the failed request.
        seq: RequestSeq,
    },
    /// A newer request or a clear superseded this one; drop the result.
    Stale {
        /// Sequence number of the late request.
        seq: RequestSeq,
        /// Latest sequence number issued so far.
        latest: RequestSeq,
    },
}

/// Snapshot of the request state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Current phase.
    pub phase: ThemePhase,
    /// Highest sequence number issued (clears included).
    pub latest: RequestSeq,
    /// Sequence number of the last request whose scheme was presented.
    pub last_applied: Option<RequestSeq>,
}

/// Last-request-wins bookkeeping for theme requests.
///
/// Every issued request and every clear takes a fresh sequence number. Only a completion
/// carrying the latest number while the machine is still loading it can change the phase.
#[derive(Debug, Clone, Default)]
pub struct ThemeStateMachine {
    phase: ThemePhase,
    latest: RequestSeq,
    last_applied: Option<RequestSeq>,
}

impl ThemeStateMachine {
    /// Create a machine in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> ThemePhase {
        self.phase
    }

    /// Highest sequence number handed out so far.
    pub fn latest(&self) -> RequestSeq {
        self.latest
    }

    /// Create a snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            latest: self.latest,
            last_applied: self.last_applied,
        }
    }

    /// Issue a new request, superseding anything in flight, and move to `Loading`.
    pub fn issue(&mut self, track: ActiveTrack, is_dark: bool, reason: RequestReason) -> ThemeRequest {
        self.latest += 1;
        self.phase = ThemePhase::Loading { seq: self.latest };
        ThemeRequest {
            seq: self.latest,
            track,
            is_dark,
            reason,
            issued_at: Instant::now(),
        }
    }

    /// Drop back to `Idle`, invalidating every request in flight.
    pub fn clear(&mut self) -> RequestSeq {
        self.latest += 1;
        self.phase = ThemePhase::Idle;
        self.latest
    }

    /// Match a completion against the latest request.
    pub fn resolve(&mut self, seq: RequestSeq, succeeded: bool) -> Resolution {
        if self.phase != (ThemePhase::Loading { seq }) {
            return Resolution::Stale {
                seq,
                latest: self.latest,
            };
        }

        if succeeded {
            self.phase = ThemePhase::Applied { seq };
            self.last_applied = Some(seq);
            Resolution::Apply { seq }
        } else {
            self.phase = ThemePhase::Idle;
            Resolution::Reset { seq }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode::ImageReference, theme::ArtSource};

    fn track(id: &str) -> ActiveTrack {
        ActiveTrack {
            track_id: id.into(),
            art: ArtSource::Image(ImageReference::path(format!("{id}.jpg"))),
        }
    }

    #[test]
    fn initial_state_is_idle() {
        let sm = ThemeStateMachine::new();
        assert_eq!(sm.phase(), ThemePhase::Idle);
        assert_eq!(sm.snapshot(), Snapshot::default());
    }

    #[test]
    fn issue_then_apply() {
        let mut sm = ThemeStateMachine::new();
        let request = sm.issue(track("a"), false, RequestReason::TrackChanged);
        assert_eq!(request.seq, 1);
        assert_eq!(sm.phase(), ThemePhase::Loading { seq: 1 });

        assert_eq!(sm.resolve(1, true), Resolution::Apply { seq: 1 });
        assert_eq!(sm.phase(), ThemePhase::Applied { seq: 1 });
        assert_eq!(sm.snapshot().last_applied, Some(1));
    }

    #[test]
    fn later_request_wins_over_earlier_completion() {
        let mut sm = ThemeStateMachine::new();
        let first = sm.issue(track("a"), false, RequestReason::TrackChanged);
        let second = sm.issue(track("b"), false, RequestReason::TrackChanged);

        assert_eq!(sm.resolve(second.seq, true), Resolution::Apply { seq: 2 });
        assert_eq!(
            sm.resolve(first.seq, true),
            Resolution::Stale { seq: 1, latest: 2 }
        );
        assert_eq!(sm.phase(), ThemePhase::Applied { seq: 2 });
    }

    #[test]
    fn earlier_completion_while_later_in_flight_is_stale() {
        let mut sm = ThemeStateMachine::new();
        let first = sm.issue(track("a"), false, RequestReason::TrackChanged);
        sm.issue(track("a"), true, RequestReason::AppearanceChanged);

        assert_eq!(
            sm.resolve(first.seq, true),
            Resolution::Stale { seq: 1, latest: 2 }
        );
        assert_eq!(sm.phase(), ThemePhase::Loading { seq: 2 });
        assert_eq!(sm.snapshot().last_applied, None);
    }

    #[test]
    fn failure_resets_to_idle() {
        let mut sm = ThemeStateMachine::new();
        let request = sm.issue(track("a"), false, RequestReason::TrackChanged);
        assert_eq!(sm.resolve(request.seq, false), Resolution::Reset { seq: 1 });
        assert_eq!(sm.phase(), ThemePhase::Idle);
    }

    #[test]
    fn clear_invalidates_in_flight_requests() {
        let mut sm = ThemeStateMachine::new();
        let request = sm.issue(track("a"), false, RequestReason::TrackChanged);
        assert_eq!(sm.clear(), 2);
        assert_eq!(sm.phase(), ThemePhase::Idle);

        assert_eq!(
            sm.resolve(request.seq, true),
            Resolution::Stale { seq: 1, latest: 2 }
        );
        assert_eq!(sm.phase(), ThemePhase::Idle);
    }

    #[test]
    fn duplicate_completion_is_stale() {
        let mut sm = ThemeStateMachine::new();
        let request = sm.issue(track("a"), false, RequestReason::TrackChanged);
        sm.resolve(request.seq, true);
        assert!(matches!(
            sm.resolve(request.seq, false),
            Resolution::Stale { .. }
        ));
        assert_eq!(sm.phase(), ThemePhase::Applied { seq: 1 });
    }

    #[test]
    fn phase_labels() {
        assert_eq!(ThemePhase::Idle.as_str(), "idle");
        assert_eq!(ThemePhase::Loading { seq: 3 }.as_str(), "loading");
        assert_eq!(ThemePhase::Applied { seq: 3 }.as_str(), "applied");
    }
}
