//! Duration estimation.
//!
//! The estimate action runs several bot-only simulations of the table's game
//! type on worker threads. Workers only ever touch their own simulated
//! copies; results come back through one `Mutex`-guarded buffer that the
//! live table polls from its tick. Abandoning an estimate raises a shared
//! cancel flag that every worker checks between simulated ticks.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::core::PlayerId;
use crate::game::Game;
use crate::simulation::Simulation;

#[derive(Debug, Default)]
struct EstimateBuffer {
    ticks: Vec<u64>,
    failures: usize,
}

impl EstimateBuffer {
    fn reported(&self) -> usize {
        self.ticks.len() + self.failures
    }
}

struct ActiveEstimate {
    requester: PlayerId,
    expected: usize,
    results: Arc<Mutex<EstimateBuffer>>,
    cancel: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl ActiveEstimate {
    fn cancel(self) {
        self.cancel.store(true, Ordering::Relaxed);
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}

/// In-flight estimate of a table. Runtime-only; a restored table has none.
#[derive(Default)]
pub(crate) struct EstimateRun {
    active: Option<ActiveEstimate>,
}

impl EstimateRun {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Cancel the running estimate and wait for its workers to stop. Their
    /// results are dropped with the buffer.
    pub fn abandon(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(workers = active.workers.len(), "abandoning duration estimate");
            active.cancel();
        }
    }
}

impl Drop for EstimateRun {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.store(true, Ordering::Relaxed);
        }
    }
}

/// Statistics over finished simulation lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct EstimateSummary {
    pub runs: usize,
    /// Mean length in ticks, outliers excluded.
    pub mean_ticks: f64,
    /// Population standard deviation, outliers excluded.
    pub std_dev_ticks: f64,
    pub outliers: usize,
}

impl EstimateSummary {
    /// Summarise run lengths. With four or more runs, values outside
    /// 1.5 IQR of the quartiles are dropped as outliers.
    #[must_use]
    pub fn from_ticks(ticks: &[u64]) -> Option<Self> {
        if ticks.is_empty() {
            return None;
        }
        let mut sorted = ticks.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();
        let kept: Vec<f64> = if n >= 4 {
            let q1 = sorted[n / 4] as f64;
            let q3 = sorted[3 * n / 4] as f64;
            let iqr = q3 - q1;
            let (low, high) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
            sorted
                .iter()
                .map(|&t| t as f64)
                .filter(|t| (low..=high).contains(t))
                .collect()
        } else {
            sorted.iter().map(|&t| t as f64).collect()
        };
        let mean = kept.iter().sum::<f64>() / kept.len() as f64;
        let variance = kept.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / kept.len() as f64;
        Some(Self {
            runs: n,
            mean_ticks: mean,
            std_dev_ticks: variance.sqrt(),
            outliers: n - kept.len(),
        })
    }

    /// Lines broadcast to the table.
    #[must_use]
    pub fn lines(&self, ticks_per_second: u64, human_multiplier: f64) -> Vec<String> {
        let mut lines = vec![
            format!("Estimated duration from {} simulations.", self.runs),
            format!(
                "Bots: {}, give or take {}.",
                format_duration(self.mean_ticks, ticks_per_second),
                format_duration(self.std_dev_ticks, ticks_per_second)
            ),
        ];
        match self.outliers {
            0 => {}
            1 => lines.push("1 outlier removed.".to_string()),
            n => lines.push(format!("{n} outliers removed.")),
        }
        lines.push(format!(
            "With humans, about {}.",
            format_duration(self.mean_ticks * human_multiplier, ticks_per_second)
        ));
        lines
    }
}

/// Format a tick count as `h:mm:ss`, `m:ss` or `N seconds`.
#[must_use]
pub fn format_duration(ticks: f64, ticks_per_second: u64) -> String {
    let total = (ticks.max(0.0) / ticks_per_second.max(1) as f64) as u64;
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else if minutes > 0 {
        format!("{minutes}:{seconds:02}")
    } else if seconds == 1 {
        "1 second".to_string()
    } else {
        format!("{seconds} seconds")
    }
}

/// Kick off simulations for the table's current game type and options.
pub fn start_estimate<G: Game>(game: &mut G, requester: &PlayerId) {
    if game.core().runtime.estimate.is_running() {
        game.core().speak_to(requester, "An estimate is already running.");
        return;
    }
    let core = game.core_mut();
    let config = core.config().clone();
    let expected = config.estimate_simulations.max(1);
    let bot_count = core
        .active_players()
        .len()
        .clamp(G::MIN_PLAYERS, G::MAX_PLAYERS.max(G::MIN_PLAYERS));
    let seeds: Vec<u64> = (0..expected).map(|_| core.rng.fork_seed()).collect();
    let results = Arc::new(Mutex::new(EstimateBuffer::default()));
    let cancel = Arc::new(AtomicBool::new(false));

    let workers = seeds
        .into_iter()
        .map(|seed| {
            let results = Arc::clone(&results);
            let cancel = Arc::clone(&cancel);
            let options = core.options.clone();
            let config = config.clone();
            thread::spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    Simulation::<G>::new(bot_count, seed)
                        .with_options(options)
                        .with_config(config)
                        .with_cancel(Arc::clone(&cancel))
                        .run()
                }));
                if cancel.load(Ordering::Relaxed) {
                    return;
                }
                let mut buffer = results.lock().unwrap_or_else(PoisonError::into_inner);
                match outcome {
                    Ok(Ok(report)) if report.finished => buffer.ticks.push(report.ticks),
                    Ok(Ok(report)) => {
                        debug!(seed, ticks = report.ticks, "estimate simulation hit the tick limit");
                        buffer.failures += 1;
                    }
                    Ok(Err(err)) => {
                        warn!(seed, error = %err, "estimate simulation failed");
                        buffer.failures += 1;
                    }
                    Err(_) => {
                        warn!(seed, "estimate simulation panicked");
                        buffer.failures += 1;
                    }
                }
            })
        })
        .collect();

    core.runtime.estimate.active = Some(ActiveEstimate {
        requester: requester.clone(),
        expected,
        results,
        cancel,
        workers,
    });
    info!(table = %core.table_id, simulations = expected, bots = bot_count, "duration estimate started");
    core.broadcast(&format!("Estimating duration with {expected} simulations..."));
}

/// Report the estimate once every worker has reported.
pub fn poll<G: Game>(game: &mut G) {
    let core = game.core_mut();
    let done = match &core.runtime.estimate.active {
        Some(active) => {
            let buffer = active.results.lock().unwrap_or_else(PoisonError::into_inner);
            buffer.reported() >= active.expected
        }
        None => false,
    };
    if !done {
        return;
    }
    let Some(active) = core.runtime.estimate.active.take() else {
        return;
    };
    for worker in active.workers {
        let _ = worker.join();
    }
    let buffer = active.results.lock().unwrap_or_else(PoisonError::into_inner);
    let config = core.config();
    match EstimateSummary::from_ticks(&buffer.ticks) {
        Some(summary) => {
            info!(
                table = %core.table_id,
                runs = summary.runs,
                mean_ticks = summary.mean_ticks,
                failures = buffer.failures,
                "duration estimate finished"
            );
            for line in summary.lines(config.ticks_per_second(), config.human_speed_multiplier) {
                core.broadcast(&line);
            }
        }
        None => {
            warn!(table = %core.table_id, failures = buffer.failures, "duration estimate failed");
            core.speak_to(&active.requester, "The duration estimate failed.");
        }
    }
}
