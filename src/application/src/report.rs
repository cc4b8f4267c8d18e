//! Terminal text for execution results.

use colored::Colorize;
use domain::entities::execution::ExecutionRecord;

/// Multi-line summary: status glyph with exit code, error, output, duration.
pub fn execution_summary(record: &ExecutionRecord) -> String {
    let mut lines = Vec::new();

    if record.success {
        lines.push(
            format!(
                "✅ Script executed successfully (exit code: {})",
                record.exit_code
            )
            .green()
            .to_string(),
        );
    } else {
        lines.push(
            format!("❌ Script execution failed (exit code: {})", record.exit_code)
                .red()
                .to_string(),
        );
        if let Some(error) = record.error.as_deref().filter(|e| !e.is_empty()) {
            lines.push(format!("Error: {}", error));
        }
    }

    if !record.output.is_empty() {
        lines.push(format!("Output:\n{}", record.output.trim_end()));
    }

    lines.push(format!("Duration: {}", record.duration));
    lines.join("\n")
}

/// User payload with the previous execution's output spliced in front.
pub fn with_execution_context(input: &str, last: Option<&ExecutionRecord>) -> String {
    match last {
        Some(record) => format!("Last execution result: {}\n{}", record.output, input),
        None => input.to_string(),
    }
}
