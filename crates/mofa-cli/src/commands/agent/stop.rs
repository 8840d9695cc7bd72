//! `mofa agent stop` command implementation

use colored::Colorize;

/// Execute the `mofa agent stop` command
pub fn run(agent_id: &str) -> anyhow::Result<()> {
    println!("{} Stopping agent: {}", "→".green(), agent_id.cyan());

    // TODO: Implement actual agent stopping logic
    // This would involve:
    // 1. Looking up the agent's PID/state
    // 2. Sending a shutdown signal
    // 3. Waiting for graceful shutdown

    println!("{} Agent '{}' stopped", "✓".green(), agent_id);

    Ok(())
}
