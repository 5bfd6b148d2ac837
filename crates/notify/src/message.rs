use chrono::NaiveDate;

use eventia_lifecycle::TimeWindow;

/// Fields of an event that appear in its reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDetails<'a> {
    pub title: &'a str,
    pub date: NaiveDate,
    pub window: TimeWindow,
    pub venue_name: Option<&'a str>,
}

/// Day-before reminder body.
pub fn compose_reminder(details: &ReminderDetails<'_>) -> String {
    let mut body = format!(
        "Rappel : l'événement « {} » a lieu demain, le {}",
        details.title.trim(),
        details.date.format("%d/%m/%Y")
    );

    match (details.window.start, details.window.end) {
        (Some(start), Some(end)) => {
            body.push_str(&format!(", de {} à {}", start.format("%H:%M"), end.format("%H:%M")))
        }
        (Some(start), None) => body.push_str(&format!(", à partir de {}", start.format("%H:%M"))),
        (None, Some(end)) => body.push_str(&format!(", jusqu'à {}", end.format("%H:%M"))),
        (None, None) => {}
    }

    if let Some(venue) = details.venue_name.map(str::trim).filter(|v| !v.is_empty()) {
        body.push_str(&format!(", lieu : {venue}"));
    }

    body.push('.');
    body
}
