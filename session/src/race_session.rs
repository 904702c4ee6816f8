use proto::PeerMsg;
use race_core::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::commentary::{CommentaryBackend, CommentaryError, Commentator, RaceStats};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::replication::{adopt_track, racer_state, rider_snapshot, track_message};
use crate::replication::{LastWriteWins, Reconciler};

/// How riders are split between this peer and the other one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// One local rider
    Single,
    /// Two riders on this peer, input slots 0 and 1
    TwoPlayer,
    /// Local rider 0, remote rider 1; owns the track
    OnlineHost,
    /// Remote rider 0, local rider 1; adopts the host's track
    OnlineJoin,
}

impl GameMode {
    /// (rider id, control) for every rider in this mode
    pub fn roster(self) -> Vec<(u8, Control)> {
        match self {
            GameMode::Single => vec![(0, Control::Local { slot: 0 })],
            GameMode::TwoPlayer => vec![
                (0, Control::Local { slot: 0 }),
                (1, Control::Local { slot: 1 }),
            ],
            GameMode::OnlineHost => vec![(0, Control::Local { slot: 0 }), (1, Control::Remote)],
            GameMode::OnlineJoin => vec![(0, Control::Remote), (1, Control::Local { slot: 0 })],
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, GameMode::OnlineHost | GameMode::OnlineJoin)
    }

    pub fn is_authoritative(self) -> bool {
        self != GameMode::OnlineJoin
    }

    /// Rider the camera follows; also the one wearing the garage upgrades
    pub fn primary_rider(self) -> u8 {
        match self {
            GameMode::OnlineJoin => 1,
            _ => 0,
        }
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePhase {
    /// Joiner waiting for INIT_TRACK
    AwaitingTrack,
    /// Stage in progress
    Racing,
    /// Stage finished; results available
    StageComplete,
    /// A fatal sync error ended the session
    Failed,
    /// Torn down by leave()
    Left,
}

/// Already-open connection to the other peer
pub trait PeerLink {
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), SessionError>;
}

/// Wall clock
pub trait Environment {
    fn now(&self) -> u64; // ms
}

/// One player's view of a race: drives ticks, owns authority, and talks to
/// the other peer.
pub struct RaceSession {
    pub env: Box<dyn Environment>,
    pub link: Option<Box<dyn PeerLink>>,
    pub config: SessionConfig,
    pub race_config: Config,
    pub mode: GameMode,
    pub phase: RacePhase,
    pub race: RaceState,
    pub upgrades: Upgrades, // Garage loadout of the primary rider
    pub reconciler: Box<dyn Reconciler>,
    pub commentator: Commentator,
    pub last_commentary_score: u32,
    pub awaiting_ticks: u64,
    seeds: StdRng,
}

impl RaceSession {
    pub fn new(mode: GameMode, env: Box<dyn Environment>, config: SessionConfig) -> Self {
        let race_config = Config::new();
        let mut seeds = StdRng::seed_from_u64(config.seed);
        let commentator = Commentator::new(
            config.commentary_min_interval_ms,
            config.commentary_rate_limit_backoff_ms,
            seeds.gen(),
        );
        let race = RaceState::new(0, race_config.clone(), 0);

        let mut session = Self {
            env,
            link: None,
            config,
            race_config,
            mode,
            phase: RacePhase::AwaitingTrack,
            race,
            upgrades: Upgrades::default(),
            reconciler: Box::new(LastWriteWins),
            commentator,
            last_commentary_score: 0,
            awaiting_ticks: 0,
            seeds,
        };
        session.reset_stage(0);
        session
    }

    pub fn with_upgrades(mut self, upgrades: Upgrades) -> Self {
        self.set_upgrades(upgrades);
        self
    }

    pub fn set_reconciler(&mut self, reconciler: Box<dyn Reconciler>) {
        self.reconciler = reconciler;
    }

    pub fn set_commentary_backend(&mut self, backend: Box<dyn CommentaryBackend>) {
        self.commentator.set_backend(backend);
    }

    // ------------------------------------------------------------------
    // Stage lifecycle
    // ------------------------------------------------------------------

    /// Throw the race away and build `stage_index` from scratch
    fn reset_stage(&mut self, stage_index: u32) {
        let seed = self.seeds.gen();
        let mut race = RaceState::new(stage_index, self.race_config.clone(), seed);
        race.authoritative = self.mode.is_authoritative();
        race.camera_rider = self.mode.primary_rider();
        race.timestep = FixedTimestep::new(self.config.fixed_dt, self.config.max_frame_dt);
        self.race = race;
        self.last_commentary_score = 0;
        self.awaiting_ticks = 0;
        self.commentator
            .set_line(format!("STAGE {} - READY?", stage_index + 1));

        if self.mode.is_authoritative() {
            self.race.generate_stage();
            self.spawn_riders();
            self.phase = RacePhase::Racing;
            log::info!(
                "Stage {} ({:?}) generated for {:?}",
                stage_index,
                self.race.theme,
                self.mode
            );
        } else {
            self.spawn_riders();
            self.phase = RacePhase::AwaitingTrack;
            log::info!("Stage {} waiting for host track", stage_index);
        }
    }

    fn spawn_riders(&mut self) {
        let primary = self.mode.primary_rider();
        for (id, control) in self.mode.roster() {
            let upgrades = if id == primary {
                self.upgrades
            } else {
                Upgrades::default()
            };
            self.race.add_rider(id, control, upgrades);
        }
    }

    /// Advance to the next stage in the theme cycle
    pub fn next_stage(&mut self) -> Result<(), SessionError> {
        if self.is_closed() {
            return Ok(());
        }
        let next = (self.race.stage_index + 1) % Theme::SEQUENCE.len() as u32;
        self.reset_stage(next);
        self.send_track()
    }

    /// Replay the current stage on a freshly generated track
    pub fn retry(&mut self) -> Result<(), SessionError> {
        if self.is_closed() {
            return Ok(());
        }
        self.reset_stage(self.race.stage_index);
        self.send_track()
    }

    // ------------------------------------------------------------------
    // Peer link
    // ------------------------------------------------------------------

    /// Attach the open peer connection. The host sends its track right away.
    pub fn connect(&mut self, link: Box<dyn PeerLink>) -> Result<(), SessionError> {
        if self.is_closed() {
            return Ok(());
        }
        log::info!("Peer connected ({:?})", self.mode);
        self.link = Some(link);
        self.send_track()
    }

    fn send(&self, msg: &PeerMsg) -> Result<(), SessionError> {
        let Some(link) = self.link.as_ref() else {
            return Ok(());
        };
        let bytes = msg.to_bytes()?;
        link.send_bytes(&bytes)
    }

    fn send_track(&self) -> Result<(), SessionError> {
        if self.mode != GameMode::OnlineHost || self.link.is_none() {
            return Ok(());
        }
        let msg = track_message(self.race.stage_index, &self.race.track, &self.race.npcs());
        log::debug!(
            "Sending INIT_TRACK: {} segments, {} obstacles",
            self.race.track.segments.len(),
            self.race.track.obstacles.len()
        );
        self.send(&msg)
    }

    /// SYNC_STATE for every rider this peer controls
    fn send_sync(&self) -> Result<(), SessionError> {
        if !self.mode.is_online() || self.link.is_none() {
            return Ok(());
        }
        for snapshot in self.race.riders() {
            if snapshot.rider.is_local() {
                let msg = PeerMsg::SyncState {
                    racer: racer_state(&snapshot),
                };
                self.send(&msg)?;
            }
        }
        Ok(())
    }

    /// Apply one inbound peer message
    pub fn handle_message(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        if self.is_closed() {
            return Ok(());
        }
        let msg = match PeerMsg::from_bytes(bytes) {
            Ok(msg) => msg,
            Err(err) if self.phase == RacePhase::AwaitingTrack => {
                return Err(self.fail(SessionError::CorruptTrack(err.to_string())));
            }
            Err(err) => {
                log::warn!("Dropping undecodable peer message: {err}");
                return Err(err.into());
            }
        };

        match msg {
            PeerMsg::InitTrack {
                stage_index,
                segments,
                obstacles,
                npcs,
            } => {
                if self.mode != GameMode::OnlineJoin {
                    return Err(SessionError::UnexpectedMessage("INIT_TRACK"));
                }
                let layout = match adopt_track(&segments, &obstacles, &npcs) {
                    Ok(layout) => layout,
                    Err(err) => return Err(self.fail(err)),
                };
                if stage_index != self.race.stage_index || self.phase != RacePhase::AwaitingTrack
                {
                    self.reset_stage(stage_index);
                }
                self.race.install_layout(layout);
                self.phase = RacePhase::Racing;
                log::info!(
                    "Adopted host track for stage {}: {} segments, {} obstacles",
                    stage_index,
                    segments.len(),
                    obstacles.len()
                );
                Ok(())
            }
            PeerMsg::SyncState { racer } => {
                let Some(entity) = self.race.rider_entity(racer.id) else {
                    log::debug!("SYNC_STATE for unknown rider {}", racer.id);
                    return Ok(());
                };
                let is_remote = self
                    .race
                    .world
                    .get::<&Rider>(entity)
                    .map(|rider| !rider.is_local())
                    .unwrap_or(false);
                if !is_remote {
                    return Err(SessionError::UnexpectedMessage("SYNC_STATE"));
                }
                let snapshot = rider_snapshot(&racer, Control::Remote);
                self.reconciler
                    .apply_snapshot(&mut self.race.world, entity, snapshot);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    pub fn push_input(&mut self, slot: u8, controls: Controls) {
        if self.phase == RacePhase::Racing {
            self.race.input.push_input(slot, controls);
        }
    }

    /// Feed one presentation frame; runs however many ticks are due
    pub fn frame(&mut self, frame_dt: f64) -> Result<Option<RaceOutcome>, SessionError> {
        let ticks = self.race.timestep.advance(frame_dt);
        for _ in 0..ticks {
            if let Some(outcome) = self.tick()? {
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }

    /// One simulation tick followed by the outbound sync
    pub fn tick(&mut self) -> Result<Option<RaceOutcome>, SessionError> {
        match self.phase {
            RacePhase::AwaitingTrack => {
                self.awaiting_ticks += 1;
                if self.awaiting_ticks >= self.config.track_transfer_timeout_ticks {
                    let err = SessionError::TrackTransferTimeout(self.awaiting_ticks);
                    return Err(self.fail(err));
                }
                Ok(None)
            }
            RacePhase::Racing => {
                let outcome = step(&mut self.race);

                if self.race.clock.every(self.config.sync_interval_ticks) {
                    if let Err(err) = self.send_sync() {
                        log::warn!("SYNC_STATE not sent: {err}");
                    }
                }
                self.maybe_request_commentary();

                if let Some(outcome) = &outcome {
                    self.phase = RacePhase::StageComplete;
                    log::info!(
                        "Stage {} complete, reward {} points",
                        self.race.stage_index,
                        outcome.reward_points()
                    );
                }
                Ok(outcome)
            }
            RacePhase::StageComplete | RacePhase::Failed | RacePhase::Left => Ok(None),
        }
    }

    fn maybe_request_commentary(&mut self) {
        let Some(primary) = self.race.rider_snapshot(self.mode.primary_rider()) else {
            return;
        };
        let score = primary.rider.score;
        if score.saturating_sub(self.last_commentary_score) < self.config.commentary_step {
            return;
        }
        self.last_commentary_score = score;
        let stats = RaceStats {
            score,
            crashes: primary.rider.crash_count,
            max_speed: primary.rider.top_speed,
        };
        let now = self.env.now();
        self.commentator.request(stats, now);
    }

    /// Hand back an answer for a commentary ticket
    pub fn deliver_commentary(
        &mut self,
        ticket: u64,
        reply: Result<String, CommentaryError>,
    ) -> bool {
        if self.phase == RacePhase::Left {
            return false;
        }
        let now = self.env.now();
        self.commentator.deliver(ticket, reply, now)
    }

    /// Swap the primary rider's loadout; online peers hear about it at once
    pub fn set_upgrades(&mut self, upgrades: Upgrades) {
        self.upgrades = upgrades;
        let Some(entity) = self.race.rider_entity(self.mode.primary_rider()) else {
            return;
        };
        if let Ok(mut rider) = self.race.world.get::<&mut Rider>(entity) {
            rider.upgrades = upgrades;
        }
        if self.phase == RacePhase::Racing {
            if let Err(err) = self.send_sync() {
                log::warn!("SYNC_STATE after upgrade not sent: {err}");
            }
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    fn fail(&mut self, err: SessionError) -> SessionError {
        log::error!("Session failed: {err}");
        self.phase = RacePhase::Failed;
        self.link = None;
        self.commentator.shutdown();
        err
    }

    /// Leave the race: drop the link and ignore anything that arrives later
    pub fn leave(&mut self) {
        if self.phase == RacePhase::Left {
            return;
        }
        log::info!("Leaving race ({:?})", self.mode);
        self.link = None;
        self.commentator.shutdown();
        self.race.input.clear();
        self.phase = RacePhase::Left;
    }

    fn is_closed(&self) -> bool {
        matches!(self.phase, RacePhase::Failed | RacePhase::Left)
    }

    // ------------------------------------------------------------------
    // Read-only views for rendering and HUD collaborators
    // ------------------------------------------------------------------

    pub fn riders(&self) -> Vec<RiderSnapshot> {
        self.race.riders()
    }

    pub fn npcs(&self) -> Vec<NpcSpawn> {
        self.race.npcs()
    }

    pub fn track(&self) -> &Track {
        &self.race.track
    }

    pub fn events(&self) -> &Events {
        &self.race.events
    }

    pub fn outcome(&self) -> Option<&RaceOutcome> {
        self.race.outcome.as_ref()
    }

    pub fn commentary_line(&self) -> Option<&str> {
        self.commentator.line()
    }

    /// Camera left edge in world units
    pub fn camera_x(&self) -> f64 {
        self.race
            .rider_snapshot(self.mode.primary_rider())
            .map(|s| self.race.config.camera_x(s.racer.x))
            .unwrap_or(0.0)
    }
}
