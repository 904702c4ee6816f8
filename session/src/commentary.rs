//! Announcer commentary contract.
//!
//! The text itself comes from an outside service. The session only decides
//! when to ask, throttles the asks, and accepts at most the newest answer
//! while the session is live. Every failure turns into a canned line.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const FALLBACK_LINES: [&str; 8] = [
    "KEEP YOUR EYES ON THE TRACK!",
    "WATCH OUT FOR THE MUD PITS!",
    "TURBO BOOST FOR MAXIMUM SPEED!",
    "GREAT JUMP! KEEP IT UP!",
    "STAY STEADY ON THE LANDINGS!",
    "YOU'RE TEARING UP THE TRACK!",
    "WATCH THAT TEMPERATURE GAUGE!",
    "NES RACING AT ITS FINEST!",
];

/// Shown when the service answers with nothing
pub const EMPTY_REPLY_LINE: &str = "GREAT RACING!";

/// Race figures handed to the announcer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceStats {
    pub score: u32,
    pub crashes: u32,
    pub max_speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommentaryRequest {
    pub ticket: u64,
    pub stats: RaceStats,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentaryError {
    #[error("commentary service is rate limiting")]
    RateLimited,
    #[error("commentary service unavailable: {0}")]
    Unavailable(String),
}

/// Outside text service. Answers arrive later through
/// [`crate::RaceSession::deliver_commentary`] with the request's ticket.
pub trait CommentaryBackend {
    fn request(&self, request: &CommentaryRequest);
}

pub struct Commentator {
    backend: Option<Box<dyn CommentaryBackend>>,
    rng: StdRng,
    min_interval_ms: u64,
    rate_limit_backoff_ms: u64,
    last_call_ms: Option<u64>, // May sit in the future after a rate limit
    latest_ticket: u64,
    in_flight: Option<u64>,
    line: Option<String>,
    live: bool,
}

impl Commentator {
    pub fn new(min_interval_ms: u64, rate_limit_backoff_ms: u64, seed: u64) -> Self {
        Self {
            backend: None,
            rng: StdRng::seed_from_u64(seed),
            min_interval_ms,
            rate_limit_backoff_ms,
            last_call_ms: None,
            latest_ticket: 0,
            in_flight: None,
            line: None,
            live: true,
        }
    }

    pub fn set_backend(&mut self, backend: Box<dyn CommentaryBackend>) {
        self.backend = Some(backend);
    }

    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    pub fn set_line(&mut self, line: impl Into<String>) {
        self.line = Some(line.into());
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Ask for a line. Returns the ticket when the backend was called.
    pub fn request(&mut self, stats: RaceStats, now_ms: u64) -> Option<u64> {
        if !self.live {
            return None;
        }
        let throttled = self
            .last_call_ms
            .is_some_and(|last| now_ms < last.saturating_add(self.min_interval_ms));
        let Some(backend) = self.backend.as_ref().filter(|_| !throttled) else {
            self.fall_back();
            return None;
        };

        // Tickets are only issued for real backend calls
        self.latest_ticket += 1;
        let ticket = self.latest_ticket;
        self.last_call_ms = Some(now_ms);
        self.in_flight = Some(ticket);
        backend.request(&CommentaryRequest { ticket, stats });
        Some(ticket)
    }

    /// Accept an answer. Stale tickets and answers after shutdown are dropped.
    pub fn deliver(
        &mut self,
        ticket: u64,
        reply: Result<String, CommentaryError>,
        now_ms: u64,
    ) -> bool {
        if !self.live || self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;

        match reply {
            Ok(text) => {
                let text = text.trim();
                self.line = Some(if text.is_empty() {
                    EMPTY_REPLY_LINE.to_string()
                } else {
                    text.to_string()
                });
            }
            Err(err) => {
                log::warn!("commentary falling back to local lines: {err}");
                if err == CommentaryError::RateLimited {
                    self.last_call_ms = Some(now_ms + self.rate_limit_backoff_ms);
                }
                self.fall_back();
            }
        }
        true
    }

    /// Stop accepting answers; anything still in flight is ignored
    pub fn shutdown(&mut self) {
        self.live = false;
        self.in_flight = None;
        self.backend = None;
    }

    fn fall_back(&mut self) {
        let idx = self.rng.gen_range(0..FALLBACK_LINES.len());
        self.line = Some(FALLBACK_LINES[idx].to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingBackend {
        requests: Rc<RefCell<Vec<CommentaryRequest>>>,
    }

    impl CommentaryBackend for RecordingBackend {
        fn request(&self, request: &CommentaryRequest) {
            self.requests.borrow_mut().push(*request);
        }
    }

    fn stats(score: u32) -> RaceStats {
        RaceStats {
            score,
            crashes: 1,
            max_speed: 4.8,
        }
    }

    fn commentator() -> (Commentator, RecordingBackend) {
        let backend = RecordingBackend::default();
        let mut commentator = Commentator::new(20_000, 40_000, 1);
        commentator.set_backend(Box::new(backend.clone()));
        (commentator, backend)
    }

    fn is_fallback(line: Option<&str>) -> bool {
        line.is_some_and(|l| FALLBACK_LINES.contains(&l))
    }

    #[test]
    fn test_calls_are_throttled() {
        let (mut c, backend) = commentator();
        assert_eq!(c.request(stats(600), 1_000), Some(1));
        assert_eq!(c.request(stats(1200), 10_000), None);
        assert!(is_fallback(c.line()));
        assert_eq!(c.request(stats(1800), 21_000), Some(2));
        assert_eq!(backend.requests.borrow().len(), 2);
        assert_eq!(backend.requests.borrow()[0].stats.score, 600);
    }

    #[test]
    fn test_reply_becomes_the_line() {
        let (mut c, _backend) = commentator();
        let ticket = c.request(stats(600), 0).unwrap();
        assert!(c.deliver(ticket, Ok("  WHAT A RIDE!  ".into()), 500));
        assert_eq!(c.line(), Some("WHAT A RIDE!"));

        let ticket = c.request(stats(1200), 30_000).unwrap();
        assert!(c.deliver(ticket, Ok(String::new()), 30_500));
        assert_eq!(c.line(), Some(EMPTY_REPLY_LINE));
    }

    #[test]
    fn test_failure_falls_back() {
        let (mut c, _backend) = commentator();
        let ticket = c.request(stats(600), 0).unwrap();
        assert!(c.deliver(ticket, Err(CommentaryError::Unavailable("offline".into())), 100));
        assert!(is_fallback(c.line()));
        assert_eq!(c.request(stats(1200), 20_000), Some(2));
    }

    #[test]
    fn test_rate_limit_backs_off_further() {
        let (mut c, _backend) = commentator();
        let ticket = c.request(stats(600), 0).unwrap();
        assert!(c.deliver(ticket, Err(CommentaryError::RateLimited), 1_000));

        assert_eq!(c.request(stats(1200), 30_000), None);
        assert_eq!(c.request(stats(1800), 60_999), None);
        assert!(c.request(stats(2400), 61_000).is_some());
    }

    #[test]
    fn test_stale_tickets_are_dropped() {
        let (mut c, _backend) = commentator();
        let first = c.request(stats(600), 0).unwrap();
        let second = c.request(stats(1200), 21_000).unwrap();
        assert!(!c.deliver(first, Ok("LATE".into()), 22_000));
        assert_ne!(c.line(), Some("LATE"));
        assert!(c.deliver(second, Ok("ON TIME".into()), 22_500));
        assert_eq!(c.line(), Some("ON TIME"));
    }

    #[test]
    fn test_rate_limit_after_throttled_ask_still_backs_off() {
        let (mut c, backend) = commentator();
        let ticket = c.request(stats(600), 0).unwrap();
        assert_eq!(c.request(stats(1200), 5_000), None);
        assert!(is_fallback(c.line()));

        assert!(c.deliver(ticket, Err(CommentaryError::RateLimited), 6_000));
        assert_eq!(c.request(stats(1800), 25_000), None);
        assert_eq!(c.request(stats(2400), 65_999), None);
        assert_eq!(c.request(stats(3000), 66_000), Some(2));
        assert_eq!(backend.requests.borrow().len(), 2);
    }

    #[test]
    fn test_no_effect_after_shutdown() {
        let (mut c, backend) = commentator();
        let ticket = c.request(stats(600), 0).unwrap();
        c.shutdown();
        assert!(!c.deliver(ticket, Ok("TOO LATE".into()), 100));
        assert_eq!(c.request(stats(1200), 50_000), None);
        assert_eq!(backend.requests.borrow().len(), 1);
        assert!(!c.is_live());
    }

    #[test]
    fn test_without_backend_every_ask_is_local() {
        let mut c = Commentator::new(20_000, 40_000, 9);
        assert_eq!(c.request(stats(600), 0), None);
        assert!(is_fallback(c.line()));
    }
}
