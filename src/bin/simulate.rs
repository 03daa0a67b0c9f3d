use chrono::{SecondsFormat, Utc};
use clap::Parser;
use dungeon_explorer::autopilot;
use dungeon_explorer::constants::{
    CELL_SIZE, TERRITORY_RADIUS, TICK_RATE, TICK_SECONDS, TREASURE_POINTS,
};
use dungeon_explorer::engine::{GameSession, SessionOptions};
use dungeon_explorer::grid::GridPos;
use dungeon_explorer::presentation::{outcome, Outcome};
use dungeon_explorer::types::{SessionEvent, SessionState, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 3)]
    runs: u32,
    #[arg(long, default_value_t = 300)]
    max_seconds: u32,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RunOutcome {
    Victory,
    Caught,
    Timeout,
}

impl RunOutcome {
    fn key(self) -> &'static str {
        match self {
            RunOutcome::Victory => "victory",
            RunOutcome::Caught => "caught",
            RunOutcome::Timeout => "timeout",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: u32,
    seed: u32,
    outcome: RunOutcome,
    #[serde(rename = "finalPhase")]
    final_phase: u32,
    score: i32,
    #[serde(rename = "treasuresCollected")]
    treasures_collected: u32,
    #[serde(rename = "phasesAdvanced")]
    phases_advanced: u32,
    #[serde(rename = "elapsedSeconds")]
    elapsed_seconds: f32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct SessionRunResult {
    result: RunResultLine,
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: f32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    runs: Vec<RunResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let base_seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let started_at = now_iso();
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(base_seed, Utc::now().timestamp_millis()));
    let mut has_anomaly = false;
    let mut results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for run in 0..cli.runs {
        let seed = base_seed.wrapping_add(run);
        emit_log(
            "info",
            "run_started",
            &match_id,
            Some(seed),
            None,
            json!({ "run": run, "maxSeconds": cli.max_seconds }),
        );
        let session_run = run_session(run, seed, cli.max_seconds);

        for anomaly in &session_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !session_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += session_run.anomaly_records.len();
        *outcome_counts
            .entry(session_run.result.outcome.key().to_string())
            .or_insert(0) += 1;

        emit_log(
            "info",
            "run_finished",
            &match_id,
            Some(seed),
            Some(session_run.finished_tick),
            json!({
                "outcome": session_run.result.outcome,
                "score": session_run.result.score,
                "finalPhase": session_run.result.final_phase,
                "anomalyCount": session_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&session_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &match_id,
                Some(seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        results.push(session_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at,
        now_iso(),
        results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "simulation_finished",
        &match_id,
        None,
        None,
        json!({
            "runCount": summary.run_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_session(run: u32, seed: u32, max_seconds: u32) -> SessionRunResult {
    let mut session = GameSession::new(SessionOptions {
        seed,
        ..SessionOptions::default()
    });
    session.start_game();

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut treasures_collected = 0u32;
    let mut phases_advanced = 0u32;
    let mut last_tick = 0u64;
    let max_ticks = u64::from(max_seconds) * u64::from(TICK_RATE);

    while session.state() == SessionState::Playing && last_tick < max_ticks {
        autopilot::drive(&mut session);
        session.update(TICK_SECONDS);
        let snapshot = session.build_snapshot(true);
        last_tick = snapshot.tick;

        for event in &snapshot.events {
            match event {
                SessionEvent::TreasureCollected { .. } => treasures_collected += 1,
                SessionEvent::PhaseAdvanced { .. } => phases_advanced += 1,
                _ => {}
            }
        }
        for message in collect_snapshot_anomalies(&snapshot, treasures_collected) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
    }

    let snapshot = session.build_snapshot(false);
    let run_outcome = match outcome(&snapshot) {
        Some(Outcome::Victory) => RunOutcome::Victory,
        Some(Outcome::Defeat) => RunOutcome::Caught,
        None => RunOutcome::Timeout,
    };

    SessionRunResult {
        result: RunResultLine {
            run,
            seed,
            outcome: run_outcome,
            final_phase: snapshot.phase,
            score: snapshot.score(),
            treasures_collected,
            phases_advanced,
            elapsed_seconds: (snapshot.elapsed_seconds * 100.0).round() / 100.0,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, treasures_collected: u32) -> Vec<String> {
    let mut anomalies = Vec::new();

    let walls: HashSet<_> = snapshot.walls.iter().copied().collect();
    for x in 0..snapshot.width {
        for y in [0, snapshot.height - 1] {
            if !walls.contains(&GridPos::new(x, y)) {
                anomalies.push(format!("border gap at ({x}, {y})"));
            }
        }
    }
    for y in 0..snapshot.height {
        for x in [0, snapshot.width - 1] {
            if !walls.contains(&GridPos::new(x, y)) {
                anomalies.push(format!("border gap at ({x}, {y})"));
            }
        }
    }

    for treasure in &snapshot.treasures {
        if walls.contains(treasure) {
            anomalies.push(format!("treasure inside wall at ({}, {})", treasure.x, treasure.y));
        }
    }

    let mut occupied = HashSet::new();
    for enemy in &snapshot.enemies {
        if !occupied.insert(enemy.entity.grid) {
            anomalies.push(format!(
                "enemies share cell ({}, {})",
                enemy.entity.grid.x, enemy.entity.grid.y
            ));
        }
        if walls.contains(&enemy.entity.grid) {
            anomalies.push(format!("enemy {} inside wall", enemy.id));
        }
        if enemy.entity.grid.distance(enemy.territory_center) > TERRITORY_RADIUS {
            anomalies.push(format!("enemy {} left its territory", enemy.id));
        }
    }

    let player = &snapshot.player.entity;
    if walls.contains(&player.grid) {
        anomalies.push("player inside wall".to_string());
    }
    for entity in std::iter::once(player).chain(snapshot.enemies.iter().map(|e| &e.entity)) {
        let at_rest = entity.pixel.x == entity.grid.x as f32 * CELL_SIZE
            && entity.pixel.y == entity.grid.y as f32 * CELL_SIZE;
        if !entity.moving && !at_rest {
            anomalies.push("idle entity off its cell".to_string());
        }
    }

    let expected_score = treasures_collected as i32 * TREASURE_POINTS;
    if snapshot.score() != expected_score {
        anomalies.push(format!(
            "score mismatch: {} != {expected_score}",
            snapshot.score()
        ));
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: i64) -> String {
    format!("dungeon-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    runs: Vec<RunResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let run_count = runs.len();
    let average_score = if run_count == 0 {
        0.0
    } else {
        runs.iter().map(|run| run.score as f32).sum::<f32>() / run_count as f32
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        run_count,
        anomaly_count,
        average_score,
        outcome_counts,
        runs,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: now_iso(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
