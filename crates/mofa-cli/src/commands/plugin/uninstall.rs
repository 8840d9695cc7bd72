//! `mofa plugin uninstall` command implementation

use colored::Colorize;

/// Execute the `mofa plugin uninstall` command
pub fn run(name: &str, force: bool) -> anyhow::Result<()> {
    println!("{} Uninstalling plugin: {}", "→".green(), name.cyan());

    // TODO: Implement actual plugin uninstallation
    // This would involve:
    // 1. Checking if plugin is installed
    // 2. Confirming uninstallation (unless --force)
    // 3. Removing plugin files
    // 4. Updating plugin registry

    println!("{} Plugin '{}' uninstalled", "✓".green(), name);

    Ok(())
}
