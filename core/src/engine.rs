//! The simulation engine. Sole owner of every glass and of the clock.
//!
//! ORDER WITHIN ONE CLOCK SAMPLE (fixed):
//!   1. Scale the clamped raw delta by speed and add it to elapsed.
//!   2. Goal check against the new elapsed. If reached, stop and return
//!      without draining any glass this sample.
//!   3. Drain every Running glass.
//!   4. If any glass emptied, auto-pause once for the whole batch.
//!
//! RULES:
//!   - Every mutation goes through a method on SimEngine.
//!   - Observers are notified once, after the mutation is complete.
//!   - Ignored commands leave state untouched and notify nobody.

use crate::{
    clock::SimClock,
    command::Command,
    config::SimConfig,
    error::{SimError, SimResult, ValidationError},
    event::{IgnoreReason, SimEvent},
    flip_log::{FlipLog, FlipRecord},
    glass::{sequence_name, Glass, GlassStatus},
    observer::SimObserver,
    snapshot::{AckPrompt, GlassView, LogEntryView, SimSnapshot},
    types::{secs, DeltaSecs, GlassId},
    validate,
};
use std::{collections::BTreeSet, time::Duration};

pub struct SimEngine {
    pub config:   SimConfig,
    pub clock:    SimClock,
    glasses:      Vec<Glass>,
    next_id:      GlassId,
    /// Auto-name counter. Only `clear_all` rewinds it.
    name_index:   u64,
    total_flips:  u64,
    goal_target:  Option<u64>,
    goal_reached: bool,
    auto_paused:  bool,
    ack_open:     bool,
    log:          FlipLog,
    observers:    Vec<Box<dyn SimObserver>>,
    /// Events of the operation in progress, or of the last one.
    events:       Vec<SimEvent>,
}

impl SimEngine {
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: SimConfig) -> Self {
        Self {
            clock:        SimClock::new(config.default_speed, config.max_sample_delta()),
            glasses:      Vec::new(),
            next_id:      1,
            name_index:   0,
            total_flips:  0,
            goal_target:  None,
            goal_reached: false,
            auto_paused:  false,
            ack_open:     false,
            log:          FlipLog::new(config.flip_log_limit),
            observers:    Vec::new(),
            events:       Vec::new(),
            config,
        }
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn register(&mut self, observer: Box<dyn SimObserver>) {
        log::debug!("registered observer '{}'", observer.name());
        self.observers.push(observer);
    }

    /// Find a registered observer by concrete type.
    pub fn observer<T: 'static>(&self) -> Option<&T> {
        self.observers
            .iter()
            .find_map(|o| o.as_any().downcast_ref::<T>())
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn glasses(&self) -> &[Glass] {
        &self.glasses
    }

    pub fn glass(&self, id: GlassId) -> Option<&Glass> {
        self.glasses.iter().find(|g| g.id == id)
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed
    }

    pub fn total_flips(&self) -> u64 {
        self.total_flips
    }

    pub fn goal_target(&self) -> Option<u64> {
        self.goal_target
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn auto_paused(&self) -> bool {
        self.auto_paused
    }

    pub fn acknowledgment_open(&self) -> bool {
        self.ack_open
    }

    pub fn flip_log(&self) -> &FlipLog {
        &self.log
    }

    /// Events caused by the most recent operation.
    pub fn last_events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            glasses:          self.glasses.iter().map(GlassView::from).collect(),
            elapsed:          secs(self.clock.elapsed),
            running:          self.clock.running,
            paused:           self.clock.paused,
            auto_paused:      self.auto_paused,
            goal_target:      self.goal_target,
            goal_reached:     self.goal_reached,
            total_flips:      self.total_flips,
            speed_multiplier: self.clock.speed,
            log:              self.log.iter().map(LogEntryView::from).collect(),
            acknowledgment:   self.ack_open.then(|| AckPrompt::build(&self.glasses)),
        }
    }

    // ── Glass collection ───────────────────────────────────────

    /// Add a glass of `capacity_secs`. A blank name takes the next
    /// sequence name.
    pub fn add_glass(&mut self, capacity_secs: u64, name: Option<&str>) -> SimResult<GlassId> {
        self.begin();
        if capacity_secs == 0 {
            return Err(ValidationError::CapacityNotPositive.into());
        }
        if capacity_secs > self.config.max_capacity_secs {
            return Err(ValidationError::CapacityTooLarge {
                max_secs: self.config.max_capacity_secs,
            }
            .into());
        }
        if self.glasses.len() >= self.config.max_glasses {
            return Err(SimError::GlassLimitReached { max: self.config.max_glasses });
        }

        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => sequence_name(self.name_index),
        };
        self.name_index += 1;

        let id = self.next_id;
        self.next_id += 1;

        let now = self.clock.elapsed;
        let mut glass = Glass::new(id, name, Duration::from_secs(capacity_secs), now);
        if self.clock.running {
            glass.status = if self.clock.paused {
                GlassStatus::Paused
            } else {
                GlassStatus::Running
            };
        }

        log::debug!("add glass id={id} name={} capacity={capacity_secs}s", glass.name);
        self.events.push(SimEvent::GlassAdded {
            id,
            name: glass.name.clone(),
            capacity_secs,
        });
        self.glasses.push(glass);
        self.publish();
        Ok(id)
    }

    /// Add a glass from raw minute/second fields.
    pub fn add_glass_input(
        &mut self,
        minutes: &str,
        seconds: &str,
        name: Option<&str>,
    ) -> SimResult<GlassId> {
        let capacity = validate::parse_capacity(minutes, seconds, self.config.max_capacity_secs)?;
        self.add_glass(capacity, name)
    }

    pub fn remove_glass(&mut self, id: GlassId) {
        self.begin();
        let Some(idx) = self.index_of(id) else {
            return self.ignore("remove_glass", IgnoreReason::UnknownGlass);
        };
        let glass = self.glasses.remove(idx);
        log::info!("removed glass {} ({})", glass.id, glass.name);
        self.events.push(SimEvent::GlassRemoved { id, name: glass.name });
        self.lift_auto_pause_if_settled();
        self.publish();
    }

    /// Remove every glass and rewind all counters, including the name
    /// sequence. Goal target and speed survive.
    pub fn clear_all(&mut self) {
        self.begin();
        if self.glasses.is_empty() {
            return self.ignore("clear_all", IgnoreReason::NothingToClear);
        }
        let removed = self.glasses.len();
        self.glasses.clear();
        self.rewind();
        self.name_index = 0;
        self.events.push(SimEvent::AllCleared { removed });
        self.publish();
    }

    // ── Run control ────────────────────────────────────────────

    pub fn start(&mut self) {
        self.begin();
        if self.goal_reached {
            return self.ignore("start", IgnoreReason::GoalReached);
        }

        if self.clock.is_active() {
            // Glasses left idle by a flip that started the clock.
            let now = self.clock.elapsed;
            let mut activated = false;
            for g in self.glasses.iter_mut().filter(|g| g.status == GlassStatus::Idle) {
                g.activate(now);
                activated = true;
            }
            if !activated {
                return self.ignore("start", IgnoreReason::AlreadyRunning);
            }
            self.events.push(SimEvent::SimulationStarted);
            self.settle_empties();
            self.publish();
            return;
        }

        if self.auto_paused {
            let empty = self.empty_ids();
            if !empty.is_empty() {
                log::debug!("start refused: {} empty glass(es) awaiting acknowledgment", empty.len());
                self.ack_open = true;
                self.events.push(SimEvent::AcknowledgmentRequired { empty });
                self.publish();
                return;
            }
            self.auto_paused = false;
            self.events.push(SimEvent::AutoPauseLifted);
        }

        let resuming = self.clock.paused;
        self.clock.running = true;
        self.clock.paused = false;
        self.clock.clear_marker();

        let now = self.clock.elapsed;
        for g in &mut self.glasses {
            if matches!(g.status, GlassStatus::Idle | GlassStatus::Paused) {
                g.activate(now);
            }
        }
        self.events.push(if resuming {
            SimEvent::SimulationResumed
        } else {
            SimEvent::SimulationStarted
        });
        self.settle_empties();
        self.publish();
    }

    pub fn pause(&mut self) {
        self.begin();
        if self.goal_reached {
            return self.ignore("pause", IgnoreReason::GoalReached);
        }
        if !self.clock.is_active() {
            return self.ignore("pause", IgnoreReason::NotRunning);
        }
        self.clock.paused = true;
        self.clock.clear_marker();
        self.auto_paused = false;
        self.ack_open = false;
        self.demote_running();
        self.events.push(SimEvent::SimulationPaused);
        self.publish();
    }

    /// Refill every glass and stop at zero. Glasses, goal target and speed
    /// survive.
    pub fn reset(&mut self) {
        self.begin();
        self.rewind();
        for g in &mut self.glasses {
            g.reset();
        }
        self.events.push(SimEvent::SimulationReset);
        self.publish();
    }

    pub fn set_speed(&mut self, multiplier: f64) -> SimResult<()> {
        self.begin();
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(SimError::InvalidSpeed { multiplier });
        }
        self.clock.set_speed(multiplier);
        self.events.push(SimEvent::SpeedChanged { multiplier });
        self.publish();
        Ok(())
    }

    // ── Clock samples ──────────────────────────────────────────

    /// Feed a host timestamp. The first sample after any stop, pause or
    /// speed change only arms the marker.
    pub fn tick(&mut self, now: Duration) {
        self.begin();
        if !self.clock.is_active() {
            self.clock.clear_marker();
            return;
        }
        if let Some(raw) = self.clock.sample(now) {
            self.step(raw);
        }
    }

    /// Feed an already-measured raw delta. Clamped like any sample.
    pub fn advance(&mut self, raw: Duration) {
        self.begin();
        if !self.clock.is_active() {
            return;
        }
        let raw = self.clock.clamp(raw);
        self.step(raw);
    }

    /// Feed `total` real time as back-to-back maximal samples, stopping as
    /// soon as the simulation is no longer actively running.
    pub fn run_for(&mut self, total: Duration) {
        let slice = self.config.max_sample_delta();
        let mut left = total;
        while !left.is_zero() && self.clock.is_active() {
            let raw = left.min(slice);
            self.advance(raw);
            left -= raw;
        }
    }

    fn step(&mut self, raw: Duration) {
        let delta = self.clock.scale(raw);
        self.clock.elapsed = self.clock.elapsed.saturating_add(delta);

        if let Some(target) = self.goal_target {
            if !self.goal_reached && self.clock.elapsed >= Duration::from_secs(target) {
                self.reach_goal(target);
                self.publish();
                return;
            }
        }

        let mut emptied = Vec::new();
        for g in self.glasses.iter_mut().filter(|g| g.status == GlassStatus::Running) {
            if g.drain(delta) {
                emptied.push(g.id);
                self.events.push(SimEvent::GlassEmptied { id: g.id, name: g.name.clone() });
            }
        }
        if !emptied.is_empty() {
            self.auto_pause(emptied);
        }
        self.publish();
    }

    // ── Flip ───────────────────────────────────────────────────

    /// Flip one glass. Lifts auto-pause if this was the last empty glass.
    pub fn flip(&mut self, id: GlassId) {
        self.begin();
        if self.goal_reached {
            return self.ignore("flip", IgnoreReason::GoalReached);
        }
        let Some(idx) = self.index_of(id) else {
            return self.ignore("flip", IgnoreReason::UnknownGlass);
        };
        self.flip_at(idx);
        self.settle_empties();
        self.lift_auto_pause_if_settled();
        self.publish();
    }

    fn flip_at(&mut self, idx: usize) {
        let mode = self.clock.mode();
        let now = self.clock.elapsed;
        let glass = &mut self.glasses[idx];

        let since_last_flip = now.saturating_sub(glass.last_flip_at);
        let before = glass.invert(mode, now);

        self.log.record(FlipRecord {
            at_global_time:          now,
            glass_id:                glass.id,
            glass_name:              glass.name.clone(),
            remaining_at_flip:       before,
            elapsed_since_last_flip: since_last_flip,
        });
        self.total_flips += 1;
        self.events.push(SimEvent::GlassFlipped {
            id:             glass.id,
            name:           glass.name.clone(),
            flip_count:     glass.flip_count,
            remaining_secs: secs(glass.remaining),
        });

        // A flip on a stopped simulation starts it, but never un-pauses.
        if !self.clock.running {
            self.clock.running = true;
            self.clock.clear_marker();
        }
    }

    // ── Jumps ──────────────────────────────────────────────────

    /// Shift every started glass and the elapsed clock by `delta_secs`.
    pub fn jump_global(&mut self, delta_secs: DeltaSecs) {
        self.begin();
        if self.goal_reached {
            return self.ignore("jump_global", IgnoreReason::GoalReached);
        }
        if delta_secs == 0 {
            return self.ignore("jump_global", IgnoreReason::ZeroDelta);
        }

        self.clock.shift(delta_secs);
        self.events.push(SimEvent::Jumped { glass: None, delta_secs });
        let by = Duration::from_secs(delta_secs.unsigned_abs());

        if delta_secs > 0 {
            let mut emptied = Vec::new();
            for g in self.glasses.iter_mut().filter(|g| g.status.is_active()) {
                if g.drain(by) {
                    emptied.push(g.id);
                    self.events.push(SimEvent::GlassEmptied { id: g.id, name: g.name.clone() });
                }
            }
            // One auto-pause for the whole batch. A stopped simulation is
            // held in running+paused so the empties still need acknowledgment.
            if !emptied.is_empty() {
                self.clock.running = true;
                self.auto_pause(emptied);
            }
        } else {
            for g in self.glasses.iter_mut().filter(|g| g.status.is_active()) {
                g.refill(by);
            }
        }
        self.publish();
    }

    /// Shift one glass by `delta_secs`. Elapsed is untouched.
    pub fn jump_single(&mut self, id: GlassId, delta_secs: DeltaSecs) {
        self.begin();
        if self.goal_reached {
            return self.ignore("jump_single", IgnoreReason::GoalReached);
        }
        let Some(idx) = self.index_of(id) else {
            return self.ignore("jump_single", IgnoreReason::UnknownGlass);
        };
        if self.glasses[idx].status == GlassStatus::Empty {
            return self.ignore("jump_single", IgnoreReason::GlassEmpty);
        }
        if delta_secs == 0 {
            return self.ignore("jump_single", IgnoreReason::ZeroDelta);
        }

        self.events.push(SimEvent::Jumped { glass: Some(id), delta_secs });
        let by = Duration::from_secs(delta_secs.unsigned_abs());
        let glass = &mut self.glasses[idx];
        if delta_secs > 0 {
            if glass.drain(by) {
                self.events.push(SimEvent::GlassEmptied { id, name: glass.name.clone() });
                if self.clock.is_active() {
                    self.auto_pause(vec![id]);
                }
            }
        } else {
            glass.refill(by);
        }
        self.publish();
    }

    // ── Acknowledgment ─────────────────────────────────────────

    pub fn open_acknowledgment(&mut self) {
        self.begin();
        if !self.auto_paused {
            return self.ignore("open_acknowledgment", IgnoreReason::NoAcknowledgmentPending);
        }
        self.ack_open = true;
        let empty = self.empty_ids();
        self.events.push(SimEvent::AcknowledgmentRequired { empty });
        self.publish();
    }

    /// Close the prompt without resuming. The simulation stays auto-paused.
    pub fn dismiss_acknowledgment(&mut self) {
        self.begin();
        if !self.ack_open {
            return self.ignore("dismiss_acknowledgment", IgnoreReason::NoAcknowledgmentPending);
        }
        self.ack_open = false;
        self.events.push(SimEvent::AcknowledgmentDismissed);
        self.publish();
    }

    /// Resolve an auto-pause: optionally flip the selected glasses, then
    /// resume everything that was paused. Empty glasses left unflipped stay
    /// empty.
    pub fn apply_acknowledgment(&mut self, flip_selected: &BTreeSet<GlassId>, flip_first: bool) {
        self.begin();
        if !self.auto_paused {
            return self.ignore("apply_acknowledgment", IgnoreReason::NoAcknowledgmentPending);
        }

        let mut flipped = Vec::new();
        if flip_first {
            // Display order, not selection order.
            let ids: Vec<GlassId> = self
                .glasses
                .iter()
                .filter(|g| flip_selected.contains(&g.id))
                .map(|g| g.id)
                .collect();
            for id in ids {
                if let Some(idx) = self.index_of(id) {
                    self.flip_at(idx);
                    flipped.push(id);
                }
            }
        }

        self.ack_open = false;
        self.auto_paused = false;
        self.clock.running = true;
        self.clock.paused = false;
        self.clock.clear_marker();
        let now = self.clock.elapsed;
        for g in self.glasses.iter_mut().filter(|g| g.status == GlassStatus::Paused) {
            g.activate(now);
        }
        self.events.push(SimEvent::AcknowledgmentApplied { flipped });
        self.settle_empties();
        self.publish();
    }

    // ── Goal ───────────────────────────────────────────────────

    pub fn set_goal(&mut self, seconds: u64) -> SimResult<()> {
        self.begin();
        if seconds == 0 {
            return Err(ValidationError::GoalNotPositive.into());
        }
        if self.goal_reached {
            self.ignore("set_goal", IgnoreReason::GoalReached);
            return Ok(());
        }
        self.goal_target = Some(seconds);
        self.goal_reached = false;
        self.events.push(SimEvent::GoalSet { target_secs: seconds });
        self.publish();
        Ok(())
    }

    pub fn set_goal_input(&mut self, minutes: &str, seconds: &str) -> SimResult<()> {
        let goal = validate::parse_goal(minutes, seconds)?;
        self.set_goal(goal)
    }

    /// Drop the goal. Also re-arms a reached goal.
    pub fn clear_goal(&mut self) {
        self.begin();
        if self.goal_target.is_none() && !self.goal_reached {
            return self.ignore("clear_goal", IgnoreReason::NothingToClear);
        }
        self.goal_target = None;
        self.goal_reached = false;
        self.events.push(SimEvent::GoalCleared);
        self.publish();
    }

    fn reach_goal(&mut self, target: u64) {
        self.goal_reached = true;
        self.clock.running = false;
        self.clock.paused = false;
        self.clock.clear_marker();
        self.demote_running();
        log::info!("goal of {target}s reached at {:.3}s", secs(self.clock.elapsed));
        self.events.push(SimEvent::GoalReached {
            target_secs:  target,
            elapsed_secs: secs(self.clock.elapsed),
        });
    }

    // ── Commands ───────────────────────────────────────────────

    /// Dispatch a serialized command to the matching operation.
    pub fn apply(&mut self, command: Command) -> SimResult<()> {
        match command {
            Command::AddGlass { capacity_secs, name } => {
                self.add_glass(capacity_secs, name.as_deref())?;
            }
            Command::AddGlassInput { minutes, seconds, name } => {
                self.add_glass_input(&minutes, &seconds, name.as_deref())?;
            }
            Command::RemoveGlass { id }                  => self.remove_glass(id),
            Command::ClearAll                            => self.clear_all(),
            Command::Start                               => self.start(),
            Command::Pause                               => self.pause(),
            Command::Reset                               => self.reset(),
            Command::SetSpeed { multiplier }             => self.set_speed(multiplier)?,
            Command::Flip { id }                         => self.flip(id),
            Command::JumpGlobal { delta_secs }           => self.jump_global(delta_secs),
            Command::JumpSingle { id, delta_secs }       => self.jump_single(id, delta_secs),
            Command::OpenAcknowledgment                  => self.open_acknowledgment(),
            Command::DismissAcknowledgment               => self.dismiss_acknowledgment(),
            Command::ApplyAcknowledgment { flip_selected, flip_first } => {
                self.apply_acknowledgment(&flip_selected, flip_first)
            }
            Command::SetGoal { seconds }                 => self.set_goal(seconds)?,
            Command::SetGoalInput { minutes, seconds }   => self.set_goal_input(&minutes, &seconds)?,
            Command::ClearGoal                           => self.clear_goal(),
            Command::Tick { at_ms }                      => self.tick(Duration::from_millis(at_ms)),
            Command::Advance { ms }                      => self.advance(Duration::from_millis(ms)),
        }
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────

    fn begin(&mut self) {
        self.events.clear();
    }

    fn ignore(&mut self, command: &str, reason: IgnoreReason) {
        log::debug!("{command} ignored: {reason:?}");
        self.events.push(SimEvent::CommandIgnored {
            command: command.to_string(),
            reason,
        });
    }

    fn publish(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.on_update(&snapshot, &self.events);
        }
    }

    fn index_of(&self, id: GlassId) -> Option<usize> {
        self.glasses.iter().position(|g| g.id == id)
    }

    fn empty_ids(&self) -> Vec<GlassId> {
        self.glasses
            .iter()
            .filter(|g| g.status == GlassStatus::Empty)
            .map(|g| g.id)
            .collect()
    }

    fn demote_running(&mut self) {
        for g in self.glasses.iter_mut().filter(|g| g.status == GlassStatus::Running) {
            g.status = GlassStatus::Paused;
        }
    }

    /// Stopped at zero with no flips, log, auto-pause or reached goal.
    fn rewind(&mut self) {
        self.clock.reset();
        self.total_flips = 0;
        self.goal_reached = false;
        self.auto_paused = false;
        self.ack_open = false;
        self.log.clear();
    }

    fn auto_pause(&mut self, emptied: Vec<GlassId>) {
        log::info!("auto-pause: {} glass(es) emptied", emptied.len());
        self.clock.paused = true;
        self.clock.clear_marker();
        self.auto_paused = true;
        self.ack_open = true;
        self.demote_running();
        self.events.push(SimEvent::AutoPaused { emptied });
    }

    /// Started glasses with no sand left become Empty. If the simulation
    /// is running, that demands acknowledgment like any other emptying.
    fn settle_empties(&mut self) {
        let mut emptied = Vec::new();
        for g in &mut self.glasses {
            if g.settle() {
                emptied.push(g.id);
                self.events.push(SimEvent::GlassEmptied { id: g.id, name: g.name.clone() });
            }
        }
        if !emptied.is_empty() && self.clock.running {
            self.auto_pause(emptied);
        }
    }

    /// Once no empty glass remains, an auto-pause resolves itself.
    fn lift_auto_pause_if_settled(&mut self) {
        if !self.auto_paused || self.glasses.iter().any(|g| g.status == GlassStatus::Empty) {
            return;
        }
        self.auto_paused = false;
        self.ack_open = false;
        self.clock.paused = false;
        self.clock.clear_marker();
        let now = self.clock.elapsed;
        for g in self.glasses.iter_mut().filter(|g| g.status == GlassStatus::Paused) {
            g.activate(now);
        }
        self.events.push(SimEvent::AutoPauseLifted);
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::assemble(SimConfig::default())
    }
}
