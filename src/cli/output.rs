//! Output formatting utilities for CLI.

// Averages over game counts
#![allow(clippy::cast_precision_loss)]

use forager::sim::SimResult;
use serde::Serialize;

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimResult {
    /// Random seed used.
    seed: u64,
    /// Winner player ID (null if no players).
    winner: Option<u8>,
    /// Total turns played.
    turns_played: u32,
    /// Per-player results.
    players: Vec<JsonPlayerResult>,
    /// Plan checks that failed.
    violations: Vec<JsonViolation>,
}

/// JSON-serializable player result.
#[derive(Debug, Serialize)]
struct JsonPlayerResult {
    /// Player ID (1-4).
    id: u8,
    /// Final budget.
    score: u32,
    /// Resource delivered over the game.
    deposited: u64,
    /// Agents alive at the end.
    agents: usize,
    /// Agents produced.
    spawned: u32,
    /// Agents lost to collisions.
    collisions: u32,
}

/// JSON-serializable plan violation.
#[derive(Debug, Serialize)]
struct JsonViolation {
    /// Turn the check failed on.
    turn: u32,
    /// What went wrong.
    message: String,
}

impl JsonSimResult {
    /// Create from a `SimResult`.
    pub(super) fn from_sim_result(result: &SimResult) -> Self {
        Self {
            seed: result.seed,
            winner: result.winner,
            turns_played: result.turns_played,
            players: result
                .players
                .iter()
                .map(|p| JsonPlayerResult {
                    id: p.id,
                    score: p.score,
                    deposited: p.deposited,
                    agents: p.agents,
                    spawned: p.spawned,
                    collisions: p.collisions,
                })
                .collect(),
            violations: result
                .violations
                .iter()
                .map(|(turn, v)| JsonViolation {
                    turn: *turn,
                    message: v.to_string(),
                })
                .collect(),
        }
    }
}

/// Format a game result as human-readable text.
pub(super) fn format_sim_text(result: &SimResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result (seed: {})\n", result.seed));
    match result.winner {
        Some(winner) => output.push_str(&format!("  Winner: Player {winner}\n")),
        None => output.push_str("  Winner: none\n"),
    }
    output.push_str(&format!("  Turns: {}\n\n", result.turns_played));

    for p in &result.players {
        output.push_str(&format!(
            "  Player {}: {} points, {} delivered, {} agents ({} spawned, {} lost)\n",
            p.id, p.score, p.deposited, p.agents, p.spawned, p.collisions
        ));
    }

    if !result.violations.is_empty() {
        output.push_str(&format!("\n  Plan violations: {}\n", result.violations.len()));
        for (turn, v) in &result.violations {
            output.push_str(&format!("    turn {turn}: {v}\n"));
        }
    }

    output
}

/// Aggregated statistics over many games.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Total games played.
    games_played: u64,
    /// Win count per player.
    wins: Vec<u64>,
    /// Total score per player.
    total_scores: Vec<f64>,
    /// Score sum of squares for std dev calculation.
    score_sq_sums: Vec<f64>,
    /// Total resource delivered per player.
    total_deposited: Vec<u64>,
    /// Total agents lost per player.
    total_collisions: Vec<u64>,
    /// Plan violations across all games.
    violations: u64,
    /// Total turns across all games.
    total_turns: u64,
}

impl BatchStats {
    /// Create new stats for n players.
    pub(super) fn new(num_players: usize) -> Self {
        Self {
            games_played: 0,
            wins: vec![0; num_players],
            total_scores: vec![0.0; num_players],
            score_sq_sums: vec![0.0; num_players],
            total_deposited: vec![0; num_players],
            total_collisions: vec![0; num_players],
            violations: 0,
            total_turns: 0,
        }
    }

    /// Add a game result to the stats.
    pub(super) fn add_result(&mut self, result: &SimResult) {
        self.games_played += 1;
        self.total_turns += u64::from(result.turns_played);
        self.violations += result.violations.len() as u64;

        // Player ids are 1-based
        let winner = result.winner.map(|id| usize::from(id).wrapping_sub(1));
        if let Some(wins) = winner.and_then(|idx| self.wins.get_mut(idx)) {
            *wins += 1;
        }

        for (i, p) in result.players.iter().enumerate().take(self.wins.len()) {
            let score = f64::from(p.score);
            self.total_scores[i] += score;
            self.score_sq_sums[i] += score * score;
            self.total_deposited[i] += p.deposited;
            self.total_collisions[i] += u64::from(p.collisions);
        }
    }

    /// Fold another thread's stats into these.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.total_turns += other.total_turns;
        self.violations += other.violations;
        for i in 0..self.wins.len().min(other.wins.len()) {
            self.wins[i] += other.wins[i];
            self.total_scores[i] += other.total_scores[i];
            self.score_sq_sums[i] += other.score_sq_sums[i];
            self.total_deposited[i] += other.total_deposited[i];
            self.total_collisions[i] += other.total_collisions[i];
        }
    }

    /// Number of players tracked.
    fn players(&self) -> usize {
        self.wins.len()
    }

    /// Get win rate for a player (0.0-1.0).
    fn win_rate(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins.get(player_idx).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Get average score for a player.
    fn avg_score(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_scores.get(player_idx).copied().unwrap_or(0.0) / self.games_played as f64
    }

    /// Get score standard deviation for a player.
    fn score_std_dev(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let n = self.games_played as f64;
        let mean = self.avg_score(player_idx);
        let sq_sum = self.score_sq_sums.get(player_idx).copied().unwrap_or(0.0);
        let variance = (sq_sum / n) - (mean * mean);
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Get average delivered resource for a player.
    fn avg_deposited(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_deposited.get(player_idx).copied().unwrap_or(0) as f64
            / self.games_played as f64
    }

    /// Get average agents lost per game for a player.
    fn avg_collisions(&self, player_idx: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_collisions.get(player_idx).copied().unwrap_or(0) as f64
            / self.games_played as f64
    }

    /// Get average game length.
    fn avg_turns(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games_played as f64
    }

    /// Throughput over `seconds` of wall time.
    pub(super) fn games_per_sec(&self, seconds: f64) -> f64 {
        self.games_played as f64 / seconds
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// Total games played.
    games_played: u64,
    /// Per-player statistics.
    players: Vec<JsonBatchPlayer>,
    /// Plan violations across all games.
    violations: u64,
    /// Average game length in turns.
    avg_turns: f64,
}

/// JSON-serializable per-player batch stats.
#[derive(Debug, Serialize)]
struct JsonBatchPlayer {
    /// Player ID (1-based).
    player: usize,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average score.
    avg_score: f64,
    /// Score standard deviation.
    score_std_dev: f64,
    /// Average resource delivered.
    avg_deposited: f64,
    /// Average agents lost to collisions.
    avg_collisions: f64,
}

impl JsonBatchResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &BatchStats) -> Self {
        let players = (0..stats.players())
            .map(|i| JsonBatchPlayer {
                player: i + 1,
                wins: stats.wins[i],
                win_rate: stats.win_rate(i),
                avg_score: stats.avg_score(i),
                score_std_dev: stats.score_std_dev(i),
                avg_deposited: stats.avg_deposited(i),
                avg_collisions: stats.avg_collisions(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            players,
            violations: stats.violations,
            avg_turns: stats.avg_turns(),
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("Batch Results ({} games)\n", stats.games_played));
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for i in 0..stats.players() {
        output.push_str(&format!(
            "  Player {}: {:.1}% ({} wins)\n",
            i + 1,
            stats.win_rate(i) * 100.0,
            stats.wins[i]
        ));
    }

    output.push_str("\nAverage Scores:\n");
    for i in 0..stats.players() {
        output.push_str(&format!(
            "  Player {}: {:.1} (+/- {:.1}), {:.0} delivered, {:.1} agents lost\n",
            i + 1,
            stats.avg_score(i),
            stats.score_std_dev(i),
            stats.avg_deposited(i),
            stats.avg_collisions(i)
        ));
    }

    output.push_str(&format!("\nAverage Game Length: {:.0} turns\n", stats.avg_turns()));
    output.push_str(&format!("Plan Violations: {}\n", stats.violations));

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str("player,wins,win_rate,avg_score,score_std_dev,avg_deposited,avg_collisions\n");

    // Data rows
    for i in 0..stats.players() {
        output.push_str(&format!(
            "{},{},{:.4},{:.2},{:.2},{:.2},{:.2}\n",
            i + 1,
            stats.wins[i],
            stats.win_rate(i),
            stats.avg_score(i),
            stats.score_std_dev(i),
            stats.avg_deposited(i),
            stats.avg_collisions(i)
        ));
    }

    output
}
