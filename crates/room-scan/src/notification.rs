use chrono::{DateTime, Utc};
use notification_services::EmailMessage;

use crate::config::MonitorConfig;
use crate::diff::SnapshotDiff;

/// Subject line announcing `new_rooms` rooms.
pub fn notification_subject(new_rooms: u64) -> String {
    format!("UR Property Monitor: {} new rooms found!", new_rooms)
}

/// Builds the email sent when rooms became available.
pub fn build_notification(
    config: &MonitorConfig,
    diff: &SnapshotDiff,
    checked_at: DateTime<Utc>,
) -> EmailMessage {
    let summary = format!(
        "There are {} new rooms on UR. Please check them out.",
        diff.new_rooms
    );
    let checked = checked_at.format("%Y-%m-%d %H:%M UTC").to_string();

    let rows: String = diff
        .changes
        .iter()
        .map(|change| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>+{}</td></tr>",
                escape_html(&change.id.to_string()),
                change.previous_rooms,
                change.current_rooms,
                change.new_rooms()
            )
        })
        .collect();

    let html = format!(
        r#"<p>{}</p>
<table>
<tr><th>Property</th><th>Before</th><th>Now</th><th>New</th></tr>
{}
</table>
<p style="color: #6b7280; font-size: 12px;">Checked at {}</p>"#,
        summary, rows, checked
    );

    let mut text = format!("{}\n\n", summary);
    for change in &diff.changes {
        text.push_str(&format!(
            "- {}: {} -> {} (+{})\n",
            change.id,
            change.previous_rooms,
            change.current_rooms,
            change.new_rooms()
        ));
    }
    text.push_str(&format!("\nChecked at {}\n", checked));

    EmailMessage::new(
        config.sender.clone(),
        config.recipients.clone(),
        notification_subject(diff.new_rooms),
        &html,
        text,
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
