use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};

use crate::graph::model::ProfileConfig;
use crate::tui::render::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    None,
    Changed,
    Close,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPanelState {
    pub selected_row: usize,
}

const SETTINGS_ROW_COUNT: usize = 4;

/// Edits the active profile's display config in place.
pub fn handle_key(
    key: KeyEvent,
    state: &mut SettingsPanelState,
    config: &mut ProfileConfig,
) -> SettingsEvent {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') | KeyCode::Char('s') => {
            SettingsEvent::Close
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected_row = state.selected_row.saturating_sub(1);
            SettingsEvent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.selected_row = (state.selected_row + 1).min(SETTINGS_ROW_COUNT - 1);
            SettingsEvent::None
        }
        KeyCode::Left
        | KeyCode::Char('h')
        | KeyCode::Right
        | KeyCode::Char('l')
        | KeyCode::Enter
        | KeyCode::Char(' ') => adjust(config, state.selected_row),
        _ => SettingsEvent::None,
    }
}

pub fn draw(frame: &mut Frame, state: &SettingsPanelState, profile_name: &str, config: &ProfileConfig) {
    let area = centered_rect(frame.area(), 56, 44);
    frame.render_widget(Clear, area);

    let title = Line::from(vec![
        Span::styled(
            format!("Profile: {profile_name}"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[Esc] close", Style::default().fg(Color::Gray)),
    ]);

    let selected_row = state.selected_row.min(SETTINGS_ROW_COUNT - 1);
    let mut lines = vec![
        settings_row(selected_row == 0, "layout", Value::Choice(config.layout.label())),
        settings_row(selected_row == 1, "auto arrange", Value::Toggle(config.auto_arrange)),
        settings_row(selected_row == 2, "show labels", Value::Toggle(config.show_labels)),
        settings_row(selected_row == 3, "theme", Value::Choice(config.theme.label())),
        Line::from(""),
        Line::from(Span::styled(
            "About this option",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    for text in selected_row_description(selected_row) {
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Use arrows/hjkl or Enter/Space to change.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Saved with the inventory on quit.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .padding(Padding::new(1, 1, 1, 0)),
    );
    frame.render_widget(panel, area);
}

enum Value {
    Toggle(bool),
    Choice(&'static str),
}

fn settings_row(selected: bool, key: &str, value: Value) -> Line<'static> {
    let indicator = if selected { ">" } else { " " };
    let base_style = if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let (value_text, mut value_style) = match value {
        Value::Toggle(true) => ("[ON]".to_string(), Style::default().fg(Color::Green)),
        Value::Toggle(false) => ("[OFF]".to_string(), Style::default().fg(Color::LightRed)),
        Value::Choice(label) => (format!("<{label}>"), Style::default().fg(Color::Cyan)),
    };
    value_style = value_style.add_modifier(Modifier::BOLD);
    if selected {
        value_style = value_style.bg(Color::DarkGray);
    }

    Line::from(vec![
        Span::styled(format!("{indicator} {key:<24}"), base_style),
        Span::styled(value_text, value_style),
    ])
}

fn selected_row_description(selected_row: usize) -> [&'static str; 2] {
    match selected_row {
        0 => [
            "Arrangement hint kept with the profile.",
            "Stored device positions always win.",
        ],
        1 => [
            "Preference flag kept with the profile; the",
            "map never moves devices on its own.",
        ],
        2 => [
            "Print device names under their icons on",
            "this profile's map.",
        ],
        3 => ["Colour scheme for this profile's map.", ""],
        _ => ["", ""],
    }
}

fn adjust(config: &mut ProfileConfig, selected_row: usize) -> SettingsEvent {
    match selected_row {
        0 => config.layout = config.layout.next(),
        1 => config.auto_arrange = !config.auto_arrange,
        2 => config.show_labels = !config.show_labels,
        3 => config.theme = config.theme.next(),
        _ => return SettingsEvent::None,
    }
    SettingsEvent::Changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{Layout, Theme};
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn rows_cycle_choices_and_flip_toggles() {
        let mut state = SettingsPanelState::default();
        let mut config = ProfileConfig::default();

        assert_eq!(handle_key(press(KeyCode::Enter), &mut state, &mut config), SettingsEvent::Changed);
        assert_eq!(config.layout, Layout::Circular);

        handle_key(press(KeyCode::Down), &mut state, &mut config);
        handle_key(press(KeyCode::Down), &mut state, &mut config);
        handle_key(press(KeyCode::Char(' ')), &mut state, &mut config);
        assert!(!config.show_labels);

        handle_key(press(KeyCode::Down), &mut state, &mut config);
        handle_key(press(KeyCode::Down), &mut state, &mut config);
        assert_eq!(state.selected_row, SETTINGS_ROW_COUNT - 1);
        handle_key(press(KeyCode::Right), &mut state, &mut config);
        assert_eq!(config.theme, Theme::Light);
    }

    #[test]
    fn escape_closes_without_changes() {
        let mut state = SettingsPanelState::default();
        let mut config = ProfileConfig::default();
        assert_eq!(handle_key(press(KeyCode::Esc), &mut state, &mut config), SettingsEvent::Close);
        assert_eq!(config, ProfileConfig::default());
    }
}
