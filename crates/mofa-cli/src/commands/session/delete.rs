//! `mofa session delete` command implementation

use colored::Colorize;

/// Execute the `mofa session delete` command
pub fn run(session_id: &str, force: bool) -> anyhow::Result<()> {
    if !force {
        println!("{} Delete session: {}?", "→".yellow(), session_id.cyan());
        println!("  This action cannot be undone.");
        println!();
        println!("  Use --force to skip confirmation.");
        // TODO: Add actual confirmation prompt
        return Ok(());
    }

    println!("{} Deleting session: {}", "→".green(), session_id.cyan());

    // TODO: Implement actual session deletion from persistence layer

    println!("{} Session '{}' deleted", "✓".green(), session_id);

    Ok(())
}
