//! `mofa agent start` command implementation

use colored::Colorize;

/// Execute the `mofa agent start` command
pub fn run(agent_id: &str, config: Option<&std::path::Path>, daemon: bool) -> anyhow::Result<()> {
    println!("{} Starting agent: {}", "→".green(), agent_id.cyan());

    if daemon {
        println!("  Mode: {}", "daemon".yellow());
    }

    // TODO: Implement actual agent starting logic
    // This would involve:
    // 1. Loading agent configuration
    // 2. Starting the agent process
    // 3. Storing agent state/PID

    println!("{} Agent '{}' started", "✓".green(), agent_id);

    Ok(())
}
