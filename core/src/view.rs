//! Plain-text rendering of a controller `Snapshot`.
//!
//! Every function here is pure: it reads the snapshot and returns a
//! `String`. User intents flow back through the host, never through here.

use crate::controller::{Modal, Phase, Snapshot};
use crate::types::{Notification, Record, Role};
use crate::validate::Field;

pub const SPINNER_TEXT: &str = "Loading users...";
pub const EMPTY_TITLE: &str = "No users found";
pub const EMPTY_HINT: &str = "Get started by adding a new user.";

/// Per-role tallies shown in the stats panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCounts {
    pub total: usize,
    pub admins: usize,
    pub editors: usize,
    pub viewers: usize,
}

pub fn count_roles(records: &[Record]) -> RoleCounts {
    let of = |role: Role| records.iter().filter(|r| r.role == role).count();
    RoleCounts {
        total: records.len(),
        admins: of(Role::Admin),
        editors: of(Role::Editor),
        viewers: of(Role::Viewer),
    }
}

/// Full screen: header, stats, body, then the modal and notification when
/// present.
pub fn render(snapshot: &Snapshot<'_>) -> String {
    let mut out = header();
    out.push('\n');
    out.push_str(&stats(snapshot.records));
    out.push('\n');
    out.push_str(&body(snapshot));
    if let Some(modal) = snapshot.modal {
        out.push('\n');
        out.push_str(&render_modal(modal, snapshot.submitting));
    }
    if let Some(notification) = snapshot.notification {
        out.push('\n');
        out.push_str(&render_notification(notification));
    }
    out
}

pub fn header() -> String {
    "User Management\nNiFi Dashboard\n".to_string()
}

pub fn stats(records: &[Record]) -> String {
    let counts = count_roles(records);
    format!(
        "Total Users: {} | Admins: {} | Editors: {} | Viewers: {}\n",
        counts.total, counts.admins, counts.editors, counts.viewers
    )
}

/// Spinner while loading, empty-state message for no records, else table.
pub fn body(snapshot: &Snapshot<'_>) -> String {
    if snapshot.phase == Phase::Loading {
        return format!("{SPINNER_TEXT}\n");
    }
    if snapshot.records.is_empty() {
        return format!("{EMPTY_TITLE}\n{EMPTY_HINT}\n");
    }
    table(snapshot.records)
}

pub fn table(records: &[Record]) -> String {
    let header = ["Name", "Email", "Role", "ID"];
    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|r| {
            [
                format!("({}) {}", initial(&r.name), r.name),
                r.email.clone(),
                r.role.to_string(),
                r.id.clone(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = line(&header.map(str::to_string), &widths);
    out.push_str(&line(&widths.map(|w| "-".repeat(w)), &widths));
    for row in &rows {
        out.push_str(&line(row, &widths));
    }
    out
}

fn line(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Upper-cased first character of a name, or `?` when blank.
pub fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

pub fn render_modal(modal: &Modal, submitting: bool) -> String {
    let edit = modal.is_edit_mode();
    let mut out = String::new();
    out.push_str(if edit { "== Edit User ==\n" } else { "== Add New User ==\n" });

    out.push_str(&format!("Name *: {}\n", modal.draft.name));
    push_error(&mut out, modal, Field::Name);

    let required = if edit { "" } else { " *" };
    out.push_str(&format!("Email{required}: {}\n", modal.draft.email));
    push_error(&mut out, modal, Field::Email);
    if edit {
        out.push_str("  Email cannot be changed after creation\n");
    }

    let role = modal.draft.role.map(Role::as_str).unwrap_or("-");
    out.push_str(&format!("Role *: {role}\n"));
    push_error(&mut out, modal, Field::Role);

    let action = match (submitting, edit) {
        (true, _) => "Saving...",
        (false, true) => "Update User",
        (false, false) => "Create User",
    };
    out.push_str(&format!("[Cancel] [{action}]\n"));
    out
}

fn push_error(out: &mut String, modal: &Modal, field: Field) {
    if let Some(message) = modal.errors.get(&field) {
        out.push_str(&format!("  ! {message}\n"));
    }
}

pub fn render_notification(notification: &Notification) -> String {
    format!("[{}] {}\n", notification.kind.as_str(), notification.message)
}
