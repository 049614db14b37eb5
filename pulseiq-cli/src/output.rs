use colored::*;
use pulseiq_client::{ActivityRecord, ChatEntry, FeedItem, Severity, VitalField, VitalsSnapshot};

pub fn severity_tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Normal => "NORMAL".bright_green(),
        Severity::Warning => "WARNING".bright_yellow(),
        Severity::Danger => "DANGER".bright_red().bold(),
    }
}

pub fn vitals_lines(snapshot: &VitalsSnapshot) -> Vec<String> {
    snapshot
        .severities()
        .into_iter()
        .map(|(field, value, severity)| format_vital(field, value, severity))
        .collect()
}

fn format_vital(field: VitalField, value: i32, severity: Severity) -> String {
    format!(
        "{:<14} {:>4} {:<6} {}",
        field.label(),
        value,
        field.unit(),
        severity_tag(severity)
    )
}

/// Markup from activity labels is dropped for the terminal
pub fn strip_markup(label: &str) -> String {
    label.replace("<b>", "").replace("</b>", "")
}

pub fn chat_line(entry: &ChatEntry) -> String {
    match entry {
        ChatEntry::User { text } => format!("{} {}", "you>".bright_white().bold(), text),
        ChatEntry::Bot { text } => format!("{} {}", "guardian>".bright_cyan().bold(), text),
        ChatEntry::Appointment(proposal) => format!(
            "{} book at {}{}",
            "appointment>".bright_purple().bold(),
            proposal.hospital,
            proposal
                .doctor_name
                .as_ref()
                .map(|doctor| format!(" with {doctor}"))
                .unwrap_or_default()
        ),
    }
}

pub fn activity_line(record: &ActivityRecord) -> String {
    format!(
        "{}  {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        strip_markup(&record.label)
    )
}

pub fn feed_line(item: &FeedItem) -> String {
    format!("{}  {}", item.time.dimmed(), item.label)
}
