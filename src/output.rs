//! Shared output formatting for todomaster CLI commands.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "todomaster.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();
        let next_steps = human.map(|h| h.next_steps.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

/// Print raw text (markdown, export documents) unless quiet
pub fn emit_raw(options: OutputOptions, text: &str) {
    if !options.quiet {
        println!("{}", text.trim_end());
    }
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    let hint = next_steps.first().map(|step| step.as_str());
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    command_name_from(std::env::args().skip(1))
}

/// Command name as reported in envelopes: `list`, `history clear`, ...
pub fn command_name_from<I>(args: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut skip_value = false;
    let mut command = None;

    for arg in args.by_ref() {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg.starts_with('-') {
            skip_value = takes_value(&arg);
            continue;
        }
        command = Some(arg);
        break;
    }

    let Some(command) = command else {
        return "todomaster".to_string();
    };

    if matches!(command.as_str(), "history" | "settings" | "host") {
        if let Some(sub) = args.find(|arg| !arg.starts_with('-')) {
            return format!("{command} {sub}");
        }
    }
    command
}

fn takes_value(flag: &str) -> bool {
    !flag.contains('=') && matches!(flag, "--data-dir" | "--config")
}

fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::Internal(_) => "internal_error",
        _ if err.exit_code() == 2 => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::TaskNotFound(_) => vec!["todomaster list --filter all".to_string()],
        Error::Parse(_) => vec!["check the file is a todomaster export (JSON)".to_string()],
        Error::InvalidConfig(_) => vec!["fix config.toml then retry".to_string()],
        Error::LockFailed(path) => vec![format!(
            "another todomaster process holds {}; retry shortly",
            path.display()
        )],
        Error::Storage { .. } => vec!["todomaster usage".to_string()],
        _ => Vec::new(),
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn human_output_sections() {
        let mut human = HumanOutput::new("todomaster add: created task");
        human.push_summary("id", "RSTVWXYZ");
        human.push_summary("archived", "");
        human.push_warning("Storage usage is high");
        human.push_next_step("todomaster list");

        let text = format_human(&human);
        assert_eq!(
            text,
            "todomaster add: created task\n\nSummary:\n- id: RSTVWXYZ\n- archived\n\nWarnings:\n- Storage usage is high\n\nNext steps:\n- todomaster list"
        );
    }

    #[test]
    fn command_names_skip_global_flags() {
        assert_eq!(command_name_from(args(&["--json", "list"])), "list");
        assert_eq!(
            command_name_from(args(&["--data-dir", "/tmp/x", "history", "clear"])),
            "history clear"
        );
        assert_eq!(
            command_name_from(args(&["--config=/c.toml", "host", "--json", "backup"])),
            "host backup"
        );
        assert_eq!(command_name_from(args(&["--quiet"])), "todomaster");
    }

    #[test]
    fn internal_errors_carry_no_storage_hint() {
        let err = Error::Internal("unexpected outcome: Saved".to_string());
        assert_eq!(error_kind(&err), "internal_error");
        assert!(error_next_steps(&err).is_empty());

        let storage = Error::storage("write", "disk full");
        assert_eq!(error_kind(&storage), "operation_failed");
        assert_eq!(error_next_steps(&storage), vec!["todomaster usage".to_string()]);
    }
}
