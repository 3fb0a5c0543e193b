//! Transcript and outcome printing.

use agent_core::{Memory, RunOutcome};
use serde_json::json;

/// Every turn as `[role] content`
pub fn print_transcript(memory: &Memory) {
    for turn in memory {
        println!("[{}] {}", turn.role, turn.content);
    }
}

/// One-line summary of how the run ended
pub fn print_outcome(outcome: &RunOutcome) {
    println!(
        "\n{} after {} tool call(s), {} model call(s)",
        outcome.state, outcome.iteration_count, outcome.model_calls
    );
}

/// Transcript and outcome as one JSON document
pub fn print_json(memory: &Memory, outcome: Option<&RunOutcome>) -> anyhow::Result<()> {
    let document = json!({
        "state": outcome.map(|o| o.state.to_string()),
        "iteration_count": outcome.map(|o| o.iteration_count),
        "model_calls": outcome.map(|o| o.model_calls),
        "memory": memory,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
