//! `mofa session show` command implementation

use colored::Colorize;

/// Execute the `mofa session show` command
pub fn run(session_id: &str, format: Option<&str>) -> anyhow::Result<()> {
    println!("{} Session details: {}", "→".green(), session_id.cyan());
    println!();

    // TODO: Implement actual session retrieval from persistence layer

    let output_format = format.unwrap_or("text");

    match output_format {
        "json" => {
            let json = serde_json::json!({
                "session_id": session_id,
                "agent_id": "agent-001",
                "created_at": "2024-01-15T10:30:00Z",
                "messages": [
                    {"role": "user", "content": "Hello!"},
                    {"role": "assistant", "content": "Hi there! How can I help you?"}
                ],
                "status": "active"
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        "yaml" => {
            println!("session_id: {}", session_id);
            println!("agent_id: agent-001");
            println!("created_at: 2024-01-15T10:30:00Z");
            println!("messages:");
            println!("  - role: user");
            println!("    content: Hello!");
            println!("  - role: assistant");
            println!("    content: Hi there! How can I help you?");
            println!("status: active");
        }
        _ => {
            println!("  Session ID:    {}", session_id.cyan());
            println!("  Agent ID:      {}", "agent-001".white());
            println!("  Created:       {}", "2024-01-15 10:30:00".white());
            println!("  Status:        {}", "active".green());
            println!();
            println!("  Messages:");
            println!("    User:      Hello!");
            println!("    Assistant: Hi there! How can I help you?");
        }
    }

    Ok(())
}
