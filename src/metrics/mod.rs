use crate::logging::{LogEvent, LogFields, LogLevel};
use crate::tree::MoveFamily;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Proposed/accepted/rejected tallies for one move family.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveTally {
    pub proposed: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub invalid: u64,
}

impl MoveTally {
    pub fn acceptance_ratio(&self) -> f64 {
        let evaluated = self.accepted + self.rejected;
        if evaluated == 0 {
            0.0
        } else {
            self.accepted as f64 / evaluated as f64
        }
    }
}

/// Counters accumulated by the annealer.
#[derive(Debug, Default, Clone)]
pub struct SearchMetrics {
    rotate: MoveTally,
    swap: MoveTally,
    relocate: MoveTally,
    packs: u64,
    temperature_steps: u64,
    improvements: u64,
    legal_packings: u64,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn tally_mut(&mut self, family: MoveFamily) -> &mut MoveTally {
        match family {
            MoveFamily::Rotate => &mut self.rotate,
            MoveFamily::Swap => &mut self.swap,
            MoveFamily::Relocate => &mut self.relocate,
        }
    }

    pub fn tally(&self, family: MoveFamily) -> MoveTally {
        match family {
            MoveFamily::Rotate => self.rotate,
            MoveFamily::Swap => self.swap,
            MoveFamily::Relocate => self.relocate,
        }
    }

    pub fn record_proposed(&mut self, family: MoveFamily) {
        let tally = self.tally_mut(family);
        tally.proposed = tally.proposed.saturating_add(1);
    }

    pub fn record_invalid(&mut self, family: MoveFamily) {
        let tally = self.tally_mut(family);
        tally.invalid = tally.invalid.saturating_add(1);
    }

    pub fn record_outcome(&mut self, family: MoveFamily, accepted: bool) {
        let tally = self.tally_mut(family);
        if accepted {
            tally.accepted = tally.accepted.saturating_add(1);
        } else {
            tally.rejected = tally.rejected.saturating_add(1);
        }
    }

    pub fn record_pack(&mut self, fits: bool) {
        self.packs = self.packs.saturating_add(1);
        if fits {
            self.legal_packings = self.legal_packings.saturating_add(1);
        }
    }

    pub fn record_temperature_step(&mut self) {
        self.temperature_steps = self.temperature_steps.saturating_add(1);
    }

    pub fn record_improvement(&mut self) {
        self.improvements = self.improvements.saturating_add(1);
    }

    pub fn snapshot(&self, elapsed: Duration) -> MetricSnapshot {
        MetricSnapshot {
            elapsed_ms: elapsed.as_millis() as u64,
            rotate: self.rotate,
            swap: self.swap,
            relocate: self.relocate,
            packs: self.packs,
            legal_packings: self.legal_packings,
            temperature_steps: self.temperature_steps,
            improvements: self.improvements,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    pub elapsed_ms: u64,
    pub rotate: MoveTally,
    pub swap: MoveTally,
    pub relocate: MoveTally,
    pub packs: u64,
    pub legal_packings: u64,
    pub temperature_steps: u64,
    pub improvements: u64,
}

impl MetricSnapshot {
    pub fn accepted(&self) -> u64 {
        self.rotate.accepted + self.swap.accepted + self.relocate.accepted
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "search_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("elapsed_ms".to_string(), json!(self.elapsed_ms));
        map.insert("packs".to_string(), json!(self.packs));
        map.insert("legal_packings".to_string(), json!(self.legal_packings));
        map.insert("temperature_steps".to_string(), json!(self.temperature_steps));
        map.insert("improvements".to_string(), json!(self.improvements));
        map.insert("rotate".to_string(), json!(self.rotate));
        map.insert("swap".to_string(), json!(self.swap));
        map.insert("relocate".to_string(), json!(self.relocate));
        map
    }
}
