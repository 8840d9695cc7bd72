//! `mofa tool info` command implementation

use colored::Colorize;

/// Execute the `mofa tool info` command
pub fn run(name: &str) -> anyhow::Result<()> {
    println!("{} Tool information: {}", "→".green(), name.cyan());
    println!();

    // TODO: Implement actual tool info lookup

    println!("  Name:           {}", name.cyan());
    println!("  Description:    {}", "A helpful tool".white());
    println!("  Version:        {}", "1.0.0".white());
    println!("  Enabled:        {}", "Yes".green());
    println!("  Parameters:     {}", "query (required), limit (optional)".white());
    println!();

    Ok(())
}
