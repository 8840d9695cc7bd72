//! `mofa plugin info` command implementation

use colored::Colorize;

/// Execute the `mofa plugin info` command
pub fn run(name: &str) -> anyhow::Result<()> {
    println!("{} Plugin information: {}", "→".green(), name.cyan());
    println!();

    // TODO: Implement actual plugin info lookup
    // For now, show example output

    println!("  Name:           {}", name.cyan());
    println!("  Version:        {}", "0.1.0".white());
    println!("  Description:    {}", "A helpful plugin".white());
    println!("  Author:         {}", "MoFA Team".white());
    println!(
        "  Repository:     {}",
        "https://github.com/mofa-org/...".blue()
    );
    println!("  License:        {}", "MIT".white());
    println!("  Installed:      {}", "Yes".green());
    println!();

    Ok(())
}
