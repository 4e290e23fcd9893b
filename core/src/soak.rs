//! Seeded random command streams.
//!
//! A soak run throws a long, reproducible sequence of user intents and
//! clock samples at an engine and checks the state laws after every step.

use crate::{
    command::Command,
    engine::SimEngine,
    error::{SimError, SimResult},
    event::SimEvent,
    glass::GlassStatus,
    invariants,
    rng::SimRng,
    types::GlassId,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Stable stream index for command generation.
const COMMAND_STREAM: u64 = 0;

pub struct CommandGenerator {
    rng:     SimRng,
    host_ms: u64,
}

impl CommandGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: SimRng::new(seed, COMMAND_STREAM), host_ms: 0 }
    }

    /// Draw the next command, aimed mostly at glasses that exist.
    pub fn next_command(&mut self, engine: &SimEngine) -> Command {
        let ids: Vec<GlassId> = engine.glasses().iter().map(|g| g.id).collect();
        let target = self.pick_id(&ids);
        let roll = self.rng.next_u64_below(100);

        match roll {
            0..=39 => {
                self.host_ms += self.rng.range_i64(1, 250) as u64;
                Command::Tick { at_ms: self.host_ms }
            }
            40..=47 => Command::AddGlass {
                capacity_secs: self.rng.range_i64(1, 90) as u64,
                name: self.rng.chance(0.2).then(|| "named".to_string()),
            },
            48..=51 => Command::RemoveGlass { id: target },
            52..=59 => Command::Start,
            60..=62 => Command::Pause,
            63..=70 => Command::Flip { id: target },
            71..=74 => Command::JumpGlobal { delta_secs: self.rng.range_i64(-60, 60) },
            75..=79 => Command::JumpSingle { id: target, delta_secs: self.rng.range_i64(-60, 60) },
            80..=87 => {
                let flip_selected: BTreeSet<GlassId> = engine
                    .glasses()
                    .iter()
                    .filter(|g| g.status == GlassStatus::Empty || self.rng.chance(0.1))
                    .map(|g| g.id)
                    .collect();
                Command::ApplyAcknowledgment { flip_selected, flip_first: self.rng.chance(0.8) }
            }
            88..=90 => Command::SetGoal { seconds: self.rng.range_i64(1, 600) as u64 },
            91 => Command::ClearGoal,
            92 => Command::Reset,
            93 => Command::ClearAll,
            94..=95 => Command::SetSpeed {
                multiplier: *self.rng.pick(&[0.5, 1.0, 2.0, 5.0, 10.0]).unwrap_or(&1.0),
            },
            96 => Command::OpenAcknowledgment,
            97 => Command::DismissAcknowledgment,
            _ => Command::Advance { ms: self.rng.range_i64(0, 1000) as u64 },
        }
    }

    /// An existing id most of the time, otherwise one that never existed.
    fn pick_id(&mut self, ids: &[GlassId]) -> GlassId {
        match self.rng.pick(ids) {
            Some(id) if !self.rng.chance(0.05) => *id,
            _ => u64::MAX,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SoakReport {
    pub steps:         u64,
    pub rejected:      u64,
    pub ignored:       u64,
    pub auto_pauses:   u64,
    pub goals_reached: u64,
    pub flips:         u64,
}

/// Drive `engine` with `steps` generated commands, checking invariants
/// after each. Validation and limit rejections are counted, not fatal.
pub fn run_soak(engine: &mut SimEngine, seed: u64, steps: u64) -> SimResult<SoakReport> {
    let mut generator = CommandGenerator::new(seed);
    let mut report = SoakReport::default();

    for step in 0..steps {
        let command = generator.next_command(engine);
        match engine.apply(command.clone()) {
            Ok(()) => {}
            Err(SimError::Validation(_) | SimError::GlassLimitReached { .. }) => {
                report.rejected += 1;
            }
            Err(e) => return Err(e),
        }

        for event in engine.last_events() {
            match event {
                SimEvent::CommandIgnored { .. } => report.ignored += 1,
                SimEvent::AutoPaused { .. }     => report.auto_pauses += 1,
                SimEvent::GoalReached { .. }    => report.goals_reached += 1,
                SimEvent::GlassFlipped { .. }   => report.flips += 1,
                _ => {}
            }
        }

        invariants::check(&engine.snapshot()).map_err(|e| {
            log::error!("step {step}: {command:?} broke an invariant");
            e
        })?;
        report.steps += 1;
    }
    Ok(report)
}
