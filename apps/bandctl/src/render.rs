//! Plain-text rendering of the client core's view states.

use client_core::{DetailViewState, EditForm, EditViewState, Field, StatusBanner};
use shared::domain::Genre;

pub fn detail(state: &DetailViewState) -> String {
    let detail = match state {
        DetailViewState::Loading => return "Loading...\n".to_string(),
        DetailViewState::Error(message) => return format!("Error: {message}\n"),
        DetailViewState::NotFound => return "Band not found\n".to_string(),
        DetailViewState::Loaded(detail) => detail,
    };

    let mut lines = vec![
        format!("← Back to Shows ({})", detail.back_link),
        String::new(),
        format!("🎸 {}", detail.title),
        detail.subtitle.clone(),
        String::new(),
        detail.description.clone(),
    ];
    if let Some(members) = &detail.members {
        lines.push(String::new());
        lines.push("Band Members".to_string());
        lines.extend(members.iter().map(|member| format!("  🎵 {}", member.label)));
    }
    finish(lines)
}

pub fn edit(state: &EditViewState) -> String {
    match state {
        EditViewState::Loading => "Loading...\n".to_string(),
        EditViewState::NotFound => "Band not found\n".to_string(),
        EditViewState::Ready(form)
        | EditViewState::Submitting(form)
        | EditViewState::Success(form) => edit_form(form),
    }
}

fn edit_form(form: &EditForm) -> String {
    let mut lines = vec![
        format!("← Back to Band Details ({})", form.back_link),
        String::new(),
        "✏️ Edit Band".to_string(),
        form.heading.clone(),
        String::new(),
    ];

    for field in Field::ALL {
        let value = form.values.get(field);
        let shown = match field {
            Field::Genre => genre_label(value),
            _ => value.to_string(),
        };
        lines.push(format!("{} *: {shown}", field.label()));
        if let Some(error) = form.errors.get(field) {
            lines.push(format!("  ! {error}"));
        }
    }

    match &form.status {
        Some(StatusBanner::Error(message)) => {
            lines.push(String::new());
            lines.push(format!("[error] {message}"));
        }
        Some(StatusBanner::Success(message)) => {
            lines.push(String::new());
            lines.push(format!("[ok] {message}"));
        }
        None => {}
    }

    lines.push(String::new());
    let disabled = if form.submit_enabled { "" } else { " (disabled)" };
    lines.push(format!("[ {} ]{disabled}", form.submit_label));
    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn genre_label(value: &str) -> String {
    match value.parse::<Genre>() {
        Ok(genre) => genre.label().to_string(),
        Err(_) if value.is_empty() => "Select a genre".to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
