//! Output formatting utilities for CLI.

use conquest::GameResult;
use serde::Serialize;

/// Format a game result as human-readable text.
pub(super) fn format_text(result: &GameResult, label: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result ({label})\n"));
    if let Some(winner) = result.winner {
        let name = result
            .players
            .get(usize::from(winner))
            .map_or("Unknown", |p| p.name.as_str());
        output.push_str(&format!("  Winner: Player {winner} ({name})\n"));
    } else {
        output.push_str("  Winner: None\n");
    }
    output.push_str(&format!("  Ticks: {}\n", result.ticks_played));
    output.push_str(&format!("  Attacks in flight: {}\n\n", result.live_attacks));

    for player in &result.players {
        output.push_str(&format!(
            "  Player {}: {} tiles, {} troops ({})",
            player.id, player.territory, player.troops, player.name
        ));
        if let Some(tick) = player.eliminated_tick {
            output.push_str(&format!(" [eliminated tick {tick}]"));
        }
        output.push('\n');
    }

    let events = &result.events;
    output.push_str(&format!(
        "\n  Border events: {} gained, {} interior, {} exposed, {} interior lost\n",
        events.player_border, events.territory, events.target_border, events.interior_lost
    ));

    output
}

/// Outcome of one session in a batch.
#[derive(Debug, Clone)]
pub(super) struct BatchEntry {
    /// Position in the command line.
    pub(super) index: usize,
    /// Scenario file label.
    pub(super) label: String,
    /// Result, or the load error message.
    pub(super) outcome: Result<GameResult, String>,
}

/// Aggregated batch statistics.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Sessions that ran to completion.
    pub(super) sessions: u64,
    /// Scenarios that failed to load.
    pub(super) failures: u64,
    /// Sessions that ended with a single survivor.
    pub(super) decided: u64,
    /// Total ticks across all sessions.
    total_ticks: u64,
    /// Total eliminations across all sessions.
    total_eliminations: u64,
    /// Per-scenario outcomes, in completion order until sorted.
    entries: Vec<BatchEntry>,
}

impl BatchStats {
    /// Record one session outcome.
    pub(super) fn add(&mut self, entry: BatchEntry) {
        match &entry.outcome {
            Ok(result) => {
                self.sessions += 1;
                self.total_ticks += result.ticks_played;
                self.total_eliminations += result.elimination_order.len() as u64;
                if result.players.iter().filter(|p| p.alive).count() == 1 {
                    self.decided += 1;
                }
            }
            Err(_) => self.failures += 1,
        }
        self.entries.push(entry);
    }

    /// Merge another thread's stats into this one.
    pub(super) fn merge(&mut self, other: Self) {
        self.sessions += other.sessions;
        self.failures += other.failures;
        self.decided += other.decided;
        self.total_ticks += other.total_ticks;
        self.total_eliminations += other.total_eliminations;
        self.entries.extend(other.entries);
    }

    /// Sort entries back into command-line order.
    pub(super) fn sort(&mut self) {
        self.entries.sort_by_key(|e| e.index);
    }

    /// Per-scenario outcomes.
    pub(super) fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Get average session length.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_ticks(&self) -> f64 {
        if self.sessions == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.sessions as f64
    }

    /// Get average eliminations per session.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_eliminations(&self) -> f64 {
        if self.sessions == 0 {
            return 0.0;
        }
        self.total_eliminations as f64 / self.sessions as f64
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult<'a> {
    /// Sessions completed.
    sessions: u64,
    /// Scenarios that failed to load.
    failures: u64,
    /// Sessions with a single survivor.
    decided: u64,
    /// Average session length in ticks.
    avg_ticks: f64,
    /// Average eliminations per session.
    avg_eliminations: f64,
    /// Per-scenario rows.
    scenarios: Vec<JsonBatchScenario<'a>>,
}

/// JSON-serializable per-scenario batch row.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchScenario<'a> {
    /// Scenario file label.
    scenario: &'a str,
    /// Full result when the session ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a GameResult>,
    /// Error message when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> JsonBatchResult<'a> {
    /// Create from aggregated stats.
    pub(super) fn from_stats(stats: &'a BatchStats) -> Self {
        let scenarios = stats
            .entries()
            .iter()
            .map(|e| JsonBatchScenario {
                scenario: &e.label,
                result: e.outcome.as_ref().ok(),
                error: e.outcome.as_ref().err().map(String::as_str),
            })
            .collect();

        Self {
            sessions: stats.sessions,
            failures: stats.failures,
            decided: stats.decided,
            avg_ticks: stats.avg_ticks(),
            avg_eliminations: stats.avg_eliminations(),
            scenarios,
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Batch Results ({} sessions, {} failed)\n",
        stats.sessions, stats.failures
    ));
    output.push_str("========================================\n\n");

    for entry in stats.entries() {
        match &entry.outcome {
            Ok(result) => {
                let winner = result
                    .winner
                    .and_then(|w| result.players.get(usize::from(w)))
                    .map_or_else(|| "none".to_string(), |p| format!("{} ({})", p.id, p.name));
                output.push_str(&format!(
                    "  {}: winner {}, {} ticks, {} eliminated\n",
                    entry.label,
                    winner,
                    result.ticks_played,
                    result.elimination_order.len()
                ));
            }
            Err(message) => {
                output.push_str(&format!("  {}: FAILED ({message})\n", entry.label));
            }
        }
    }

    output.push_str(&format!("\nDecided Sessions: {}\n", stats.decided));
    output.push_str(&format!("Average Length: {:.0} ticks\n", stats.avg_ticks()));
    output.push_str(&format!(
        "Average Eliminations: {:.2}\n",
        stats.avg_eliminations()
    ));

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str("scenario,status,winner,ticks,eliminated,survivors\n");

    // Data rows
    for entry in stats.entries() {
        match &entry.outcome {
            Ok(result) => {
                output.push_str(&format!(
                    "{},ok,{},{},{},{}\n",
                    entry.label,
                    result.winner.map(|w| w.to_string()).unwrap_or_default(),
                    result.ticks_played,
                    result.elimination_order.len(),
                    result.players.iter().filter(|p| p.alive).count()
                ));
            }
            Err(_) => output.push_str(&format!("{},error,,,,\n", entry.label)),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest::game::EventTally;
    use conquest::session::PlayerSummary;

    fn sample_result(winner: Option<u16>, eliminated: Vec<u16>) -> GameResult {
        let players = (0..2)
            .map(|id| PlayerSummary {
                id,
                name: format!("p{id}"),
                territory: 10,
                troops: 100,
                alive: !eliminated.contains(&id),
                eliminated_tick: eliminated.contains(&id).then_some(7),
            })
            .collect();
        GameResult {
            ticks_played: 40,
            winner,
            players,
            elimination_order: eliminated,
            events: EventTally::default(),
            live_attacks: 0,
        }
    }

    fn sample_stats() -> BatchStats {
        let mut a = BatchStats::default();
        a.add(BatchEntry {
            index: 1,
            label: "b.json".to_string(),
            outcome: Err("broken".to_string()),
        });
        let mut b = BatchStats::default();
        b.add(BatchEntry {
            index: 0,
            label: "a.json".to_string(),
            outcome: Ok(sample_result(Some(0), vec![1])),
        });
        a.merge(b);
        a.sort();
        a
    }

    #[test]
    fn test_stats_merge_and_sort() {
        let stats = sample_stats();
        assert_eq!(stats.sessions, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.decided, 1);
        assert_eq!(stats.entries()[0].label, "a.json");
        assert!((stats.avg_ticks() - 40.0).abs() < f64::EPSILON);
        assert!((stats.avg_eliminations() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats_averages() {
        let stats = BatchStats::default();
        assert!(stats.avg_ticks().abs() < f64::EPSILON);
        assert!(stats.avg_eliminations().abs() < f64::EPSILON);
    }

    #[test]
    fn test_csv_rows() {
        let csv = format_batch_csv(&sample_stats());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "a.json,ok,0,40,1,1");
        assert_eq!(lines[2], "b.json,error,,,,");
    }

    #[test]
    fn test_text_mentions_winner_and_failure() {
        let text = format_batch_text(&sample_stats());
        assert!(text.contains("a.json: winner 0 (p0)"));
        assert!(text.contains("b.json: FAILED (broken)"));
    }

    #[test]
    fn test_game_text() {
        let text = format_text(&sample_result(Some(0), vec![1]), "duel");
        assert!(text.contains("Winner: Player 0 (p0)"));
        assert!(text.contains("[eliminated tick 7]"));
    }

    #[test]
    fn test_json_shape() {
        let stats = sample_stats();
        let json = serde_json::to_value(JsonBatchResult::from_stats(&stats)).unwrap();
        assert_eq!(json["sessions"], 1);
        assert_eq!(json["scenarios"][0]["result"]["winner"], 0);
        assert_eq!(json["scenarios"][1]["error"], "broken");
        assert!(json["scenarios"][1].get("result").is_none());
    }
}
