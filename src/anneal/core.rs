use std::time::{Duration, Instant};

use rand::Rng;

use crate::circuit::Circuit;
use crate::cost::{Cost, CostModel, Norms};
use crate::error::Result;
use crate::logging::{LogLevel, Logger, TARGET_ANNEAL, TARGET_METRICS, event_with_fields, json_kv};
use crate::metrics::{MetricSnapshot, SearchMetrics};
use crate::tree::BStarTree;

use super::config::AnnealConfig;
use super::moves::MovePicker;

/// Best tree found by a run, already packed.
#[derive(Debug, Clone)]
pub struct AnnealOutcome {
    pub tree: BStarTree,
    pub cost: Cost,
    /// `alpha * area + (1 - alpha) * wirelength` of the best tree.
    pub raw_cost: f64,
    pub steps: usize,
    pub elapsed: Duration,
    pub metrics: MetricSnapshot,
}

/// Simulated-annealing driver over B*-tree perturbations.
///
/// All randomness comes from the caller's `Rng`, so a seeded generator
/// reproduces a run exactly.
pub struct Annealer<'a> {
    circuit: &'a Circuit,
    config: AnnealConfig,
    model: CostModel,
    picker: MovePicker,
    logger: Option<Logger>,
    metrics: SearchMetrics,
}

impl<'a> Annealer<'a> {
    pub fn new(circuit: &'a Circuit, config: AnnealConfig) -> Result<Self> {
        config.validate()?;
        let ids = circuit.blocks.iter().map(|block| block.id).collect();
        let picker = MovePicker::new(ids, &config.weights)?;
        Ok(Self {
            circuit,
            model: CostModel::new(config.cost),
            config,
            picker,
            logger: None,
            metrics: SearchMetrics::new(),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.model
    }

    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<AnnealOutcome> {
        let started = Instant::now();
        let circuit = self.circuit;
        let blocks = &circuit.blocks;

        let mut current = BStarTree::with_shape(blocks, self.config.initial_shape)?;
        let temperature = self.calibrate(&current, rng)?;
        let mut current_cost = self.score(&mut current)?;
        self.metrics.record_pack(current_cost.fits);

        self.log(
            LogLevel::Info,
            "anneal_started",
            [
                json_kv("blocks", blocks.len()),
                json_kv("temperature", temperature),
                json_kv("area_norm", self.model.norms().area),
                json_kv("wire_norm", self.model.norms().wirelength),
                json_kv("initial_cost", current_cost.value),
            ],
        );

        let mut best = current.clone();
        let mut best_cost = current_cost;
        let mut scratch = BStarTree::default();
        let moves_per_step = self.config.moves_per_block.saturating_mul(blocks.len()).max(1);

        let mut temperature = temperature;
        let mut steps = 0;
        let mut stale = 0;
        while !blocks.is_empty()
            && steps < self.config.max_steps
            && temperature > self.config.min_temperature
            && stale < self.config.frozen_steps
        {
            let mut accepted = 0usize;
            let mut improved = false;

            for _ in 0..moves_per_step {
                let Some(mv) = self.picker.pick(rng) else { break };
                let family = mv.family();
                self.metrics.record_proposed(family);
                if current.perturb_into(&mv, &mut scratch).is_err() {
                    self.metrics.record_invalid(family);
                    continue;
                }

                let cost = self.score(&mut scratch)?;
                self.metrics.record_pack(cost.fits);
                let delta = cost.value - current_cost.value;
                let accept = delta <= 0.0 || rng.gen_range(0.0..1.0) < (-delta / temperature).exp();
                self.metrics.record_outcome(family, accept);
                if !accept {
                    continue;
                }

                std::mem::swap(&mut current, &mut scratch);
                current_cost = cost;
                accepted += 1;
                if is_better(&current_cost, &best_cost) {
                    best.clone_from(&current);
                    best_cost = current_cost;
                    improved = true;
                    self.metrics.record_improvement();
                }
            }

            steps += 1;
            self.metrics.record_temperature_step();
            stale = if improved { 0 } else { stale + 1 };

            self.log(
                LogLevel::Debug,
                "temperature_step",
                [
                    json_kv("step", steps),
                    json_kv("temperature", temperature),
                    json_kv("accepted", accepted),
                    json_kv("current_cost", current_cost.value),
                    json_kv("best_cost", best_cost.value),
                    json_kv("best_fits", best_cost.fits),
                ],
            );
            if self.config.metrics_interval > 0 && steps % self.config.metrics_interval == 0 {
                self.emit_metrics(started.elapsed());
            }

            temperature *= self.config.cooling_rate;
        }

        if best.placement().is_none() {
            best.pack(blocks)?;
        }
        let elapsed = started.elapsed();
        let raw_cost = self.model.raw(&best_cost);
        self.log(
            LogLevel::Info,
            "anneal_finished",
            [
                json_kv("steps", steps),
                json_kv("elapsed_ms", elapsed.as_millis() as u64),
                json_kv("width", best_cost.width),
                json_kv("height", best_cost.height),
                json_kv("area", best_cost.area as f64),
                json_kv("wirelength", best_cost.wirelength),
                json_kv("fits", best_cost.fits),
                json_kv("raw_cost", raw_cost),
            ],
        );
        self.emit_metrics(elapsed);

        Ok(AnnealOutcome {
            tree: best,
            cost: best_cost,
            raw_cost,
            steps,
            elapsed,
            metrics: self.metrics.snapshot(elapsed),
        })
    }

    /// Random walk from `start` accepting every legal move. Averages of the
    /// visited costs become the norms; the start temperature makes an average
    /// uphill step acceptable with `initial_acceptance` probability.
    fn calibrate<R: Rng + ?Sized>(&mut self, start: &BStarTree, rng: &mut R) -> Result<f64> {
        self.model.set_norms(Norms::default());

        let mut walker = start.clone();
        let mut scratch = BStarTree::default();
        let mut samples = vec![self.score(&mut walker)?];

        for _ in 0..self.config.calibration_moves {
            let Some(mv) = self.picker.pick(rng) else { break };
            if walker.perturb_into(&mv, &mut scratch).is_err() {
                continue;
            }
            std::mem::swap(&mut walker, &mut scratch);
            samples.push(self.score(&mut walker)?);
        }

        self.model.set_norms(Norms::from_samples(&samples));
        let rescored: Vec<f64> = samples
            .into_iter()
            .map(|cost| self.model.rescore(cost, self.circuit).value)
            .collect();
        let uphill: Vec<f64> = rescored
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .filter(|delta| *delta > 0.0)
            .collect();

        if uphill.is_empty() {
            return Ok(1.0);
        }
        let average = uphill.iter().sum::<f64>() / uphill.len() as f64;
        Ok(-average / self.config.initial_acceptance.ln())
    }

    fn score(&self, tree: &mut BStarTree) -> Result<Cost> {
        let placement = tree.pack(&self.circuit.blocks)?;
        Ok(self.model.evaluate(self.circuit, placement))
    }

    fn emit_metrics(&self, elapsed: Duration) {
        if let Some(logger) = self.logger.as_ref() {
            let event = self.metrics.snapshot(elapsed).to_log_event(TARGET_METRICS);
            let _ = logger.log_event(event);
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            if logger.enabled(level) {
                let event = event_with_fields(level, TARGET_ANNEAL, message, fields);
                let _ = logger.log_event(event);
            }
        }
    }
}

/// Fitting the outline beats any cost; otherwise lower cost wins.
fn is_better(candidate: &Cost, incumbent: &Cost) -> bool {
    match (candidate.fits, incumbent.fits) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate.value < incumbent.value,
    }
}
