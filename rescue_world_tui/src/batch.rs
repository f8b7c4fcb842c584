//! Non-interactive runs: mode comparison and snapshot export.

use std::{collections::BTreeMap, fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use rescue_world_core::{
    agent::AgentMode,
    config::SimulationOptions,
    layout::Layout,
    simulation::{RunSummary, Simulation},
    snapshot::SnapshotRecorder,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl MetricStats {
    fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut stats = MetricStats {
            min: f64::INFINITY,
            mean: 0.0,
            max: f64::NEG_INFINITY,
        };
        for value in values {
            count += 1;
            stats.min = stats.min.min(value);
            stats.max = stats.max.max(value);
            stats.mean += value;
        }
        if count == 0 {
            return MetricStats {
                min: 0.0,
                mean: 0.0,
                max: 0.0,
            };
        }
        stats.mean /= count as f64;
        stats
    }
}

/// Aggregated outcome of many games played in one mode.
#[derive(Debug, Clone, Serialize)]
pub struct ModeReport {
    pub mode: AgentMode,
    pub games: usize,
    pub rescued: MetricStats,
    pub lost: MetricStats,
    pub damage: MetricStats,
    pub turns: MetricStats,
    pub final_fires: MetricStats,
    pub final_smoke: MetricStats,
    pub remaining_pois: MetricStats,
    /// Games per result; `unfinished` counts games that hit the turn cap.
    pub results: BTreeMap<String, usize>,
}

impl ModeReport {
    fn from_runs(mode: AgentMode, runs: &[RunSummary]) -> Self {
        let stat = |f: fn(&RunSummary) -> f64| MetricStats::of(runs.iter().map(f));
        let mut results = BTreeMap::new();
        for run in runs {
            let key = match run.result {
                Some(result) => format!("{result:?}"),
                None => "unfinished".to_string(),
            };
            *results.entry(key).or_insert(0) += 1;
        }

        ModeReport {
            mode,
            games: runs.len(),
            rescued: stat(|r| r.rescued as f64),
            lost: stat(|r| r.lost as f64),
            damage: stat(|r| r.damage as f64),
            turns: stat(|r| r.turns as f64),
            final_fires: stat(|r| r.final_fires as f64),
            final_smoke: stat(|r| r.final_smoke as f64),
            remaining_pois: stat(|r| r.remaining_pois as f64),
            results,
        }
    }

    /// Fraction of games that ended with `count` occurrences.
    fn share(&self, count: usize) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            count as f64 / self.games as f64
        }
    }

    fn victory_rate(&self) -> f64 {
        self.share(self.results.get("Victory").copied().unwrap_or(0))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub base_seed: u64,
    pub max_turns: u32,
    pub random: ModeReport,
    pub strategy: ModeReport,
}

/// Plays `iterations` games in each mode. Game `i` of both modes uses seed
/// `base_seed + i`, so the modes face the same sequence of random sources.
pub fn run_batch(
    layout: &Layout,
    base_seed: u64,
    iterations: u32,
    max_turns: u32,
) -> Result<BatchReport> {
    let play = |mode: AgentMode| -> Result<ModeReport> {
        let runs = (0..iterations)
            .map(|i| {
                let options = SimulationOptions::new(mode).with_seed(base_seed.wrapping_add(i.into()));
                let mut sim = Simulation::new(layout, options)?;
                Ok(sim.run_to_end(max_turns))
            })
            .collect::<Result<Vec<_>>>()?;
        let report = ModeReport::from_runs(mode, &runs);
        info!(?mode, games = report.games, mean_rescued = report.rescued.mean, "batch finished");
        Ok(report)
    };

    Ok(BatchReport {
        base_seed,
        max_turns,
        random: play(AgentMode::Random)?,
        strategy: play(AgentMode::Strategy)?,
    })
}

pub fn print_report(report: &BatchReport) {
    println!(
        "Batch of {} games per mode (seeds {}.., turn cap {})",
        report.random.games, report.base_seed, report.max_turns
    );
    for mode in [&report.random, &report.strategy] {
        println!();
        println!("{:?} mode", mode.mode);
        println!("  {:<15} {:>8} {:>8} {:>8}", "metric", "min", "mean", "max");
        for (name, stats) in [
            ("rescued", mode.rescued),
            ("lost", mode.lost),
            ("damage", mode.damage),
            ("turns", mode.turns),
            ("final fires", mode.final_fires),
            ("final smoke", mode.final_smoke),
            ("remaining POIs", mode.remaining_pois),
        ] {
            println!(
                "  {:<15} {:>8.1} {:>8.2} {:>8.1}",
                name, stats.min, stats.mean, stats.max
            );
        }
        println!("  results:");
        for (result, count) in &mode.results {
            println!(
                "    {result:<15} {count:>6} {:>6.1}%",
                mode.share(*count) * 100.0
            );
        }
    }

    let (random, strategy) = (&report.random, &report.strategy);
    println!();
    println!("Comparison (strategy - random)");
    println!(
        "  mean rescued  {:>8.2} vs {:>8.2}  ({:+.2})",
        strategy.rescued.mean,
        random.rescued.mean,
        strategy.rescued.mean - random.rescued.mean
    );
    println!(
        "  mean turns    {:>8.2} vs {:>8.2}  ({:+.2})",
        strategy.turns.mean,
        random.turns.mean,
        strategy.turns.mean - random.turns.mean
    );
    println!(
        "  victory rate  {:>7.1}% vs {:>7.1}%",
        strategy.victory_rate() * 100.0,
        random.victory_rate() * 100.0
    );
}

/// Plays up to `turns` turns and writes every recorded snapshot as JSON.
pub fn export_history(
    layout: &Layout,
    options: SimulationOptions,
    turns: u32,
    out: &Path,
) -> Result<()> {
    let simulation = Simulation::new(layout, options)?;
    let mut recorder = SnapshotRecorder::new(simulation);
    let summary = recorder.run_to_end(turns);

    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), recorder.history())
        .with_context(|| format!("writing {}", out.display()))?;

    info!(
        snapshots = recorder.history().len(),
        turns = summary.turns,
        result = ?summary.result,
        path = %out.display(),
        "snapshot history exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_cover_min_mean_max() {
        let stats = MetricStats::of([2.0, 4.0, 9.0]);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(MetricStats::of([]).mean, 0.0);
    }

    #[test]
    fn batch_plays_both_modes_on_shared_seeds() {
        let report = run_batch(&Layout::default(), 10, 3, 50).unwrap();
        assert_eq!(report.random.games, 3);
        assert_eq!(report.strategy.games, 3);
        assert_eq!(report.random.results.values().sum::<usize>(), 3);
        assert!(report.strategy.turns.max <= 50.0);

        let again = run_batch(&Layout::default(), 10, 3, 50).unwrap();
        assert_eq!(again.strategy.rescued, report.strategy.rescued);
        assert_eq!(again.random.results, report.random.results);
    }

    #[test]
    fn result_shares_cover_every_game() {
        let report = run_batch(&Layout::default(), 0, 4, 30).unwrap();
        for mode in [&report.random, &report.strategy] {
            let total: f64 = mode.results.values().map(|&count| mode.share(count)).sum();
            assert!((total - 1.0).abs() < 1e-9);
            assert_eq!(mode.share(mode.games), 1.0);
        }

        let empty = ModeReport::from_runs(AgentMode::Random, &[]);
        assert_eq!(empty.share(0), 0.0);
        assert_eq!(empty.victory_rate(), 0.0);
    }

    #[test]
    fn report_serialises_to_json() {
        let report = run_batch(&Layout::default(), 0, 1, 5).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["random"]["mode"], "random");
        assert!(json["strategy"]["rescued"]["mean"].is_number());
    }

    #[test]
    fn export_writes_history() {
        let out = std::env::temp_dir().join(format!("rescue-export-{}.json", std::process::id()));
        let options = SimulationOptions::new(AgentMode::Strategy).with_seed(1);
        export_history(&Layout::default(), options, 4, &out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let history: serde_json::Value = serde_json::from_str(&text).unwrap();
        let steps = history.as_array().unwrap();
        assert!(!steps.is_empty() && steps.len() <= 5);
        assert_eq!(steps[0]["step"], 0);
        std::fs::remove_file(&out).unwrap();
    }
}
