//! Drawing functions for every tab
//!
//! Pure view code: reads App state, writes widgets. No state changes
//! happen here beyond ratatui's own ListState scratch.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};

use crate::chat::{MessageContent, Role};
use crate::input::Tab;
use crate::system::{self, CommandOutcome, SystemFocus, QUICK_ACTIONS};
use crate::vision::VisionFocus;

use super::app::App;

/// Draw the UI
pub fn draw(app: &mut App, frame: &mut ratatui::Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    draw_tab_bar(app, frame, chunks[0]);

    match app.tab {
        Tab::Chat => draw_chat(app, frame, chunks[1]),
        Tab::Vision => draw_vision(app, frame, chunks[1]),
        Tab::System => draw_system(app, frame, chunks[1]),
        Tab::Settings => draw_settings(app, frame, chunks[1]),
    }

    draw_status_bar(app, frame, chunks[2]);

    if app.confirm_reset {
        draw_confirm_dialog(frame, area);
    }
}

fn draw_tab_bar(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|t| Line::from(format!(" {} [F{}] ", t.title(), t.index() + 1)))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .block(Block::default().borders(Borders::ALL).title(" aria "))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

// ==================== Chat ====================

fn draw_chat(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    for (index, message) in app.chat.messages().iter().enumerate() {
        let (name, style) = match message.role {
            Role::User => (
                "You",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Role::Assistant => (
                "Assistant",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        };
        lines.push(Line::from(Span::styled(name, style)));

        match &message.content {
            MessageContent::Text(text) => {
                if text.is_empty() && app.chat.is_stream_target(index) {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", thinking_frame(app.tick_count)),
                        Style::default().fg(Color::Yellow),
                    )));
                } else {
                    for text_line in text.lines() {
                        lines.push(Line::from(format!("  {}", text_line)));
                    }
                }
            }
            MessageContent::Image { label, .. } => {
                lines.push(Line::from(Span::styled(
                    format!("  {}", label),
                    Style::default().fg(Color::Magenta),
                )));
            }
        }
        lines.push(Line::from(""));
    }

    // Stick to the bottom of the conversation
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let messages = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Conversation"))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(messages, chunks[0]);

    let (title, border) = if app.chat.input_enabled() {
        ("Message (Enter to send, ^L to clear)", Color::Cyan)
    } else {
        ("Waiting for reply...", Color::DarkGray)
    };
    let input = Paragraph::new(app.chat.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, chunks[1]);
}

// ==================== Vision ====================

fn draw_vision(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(4),
        ])
        .split(area);

    let focus_style = |focused: bool| {
        if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let path = Paragraph::new(app.vision.path_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Image path (Enter to stage)")
            .border_style(focus_style(app.vision.focus == VisionFocus::Path)),
    );
    frame.render_widget(path, chunks[0]);

    let prompt = Paragraph::new(app.vision.prompt_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Prompt (Enter to analyze)")
            .border_style(focus_style(app.vision.focus == VisionFocus::Prompt)),
    );
    frame.render_widget(prompt, chunks[1]);

    let staged_text = match &app.vision.staged {
        Some(staged) => format!(
            "{}\noriginal {}x{} -> staged {}x{}",
            staged.label(),
            staged.original_width,
            staged.original_height,
            staged.width,
            staged.height
        ),
        None => "No image staged. Enter a file path above (Tab switches fields).".to_string(),
    };
    let staged = Paragraph::new(staged_text)
        .style(Style::default().fg(Color::Magenta))
        .block(Block::default().borders(Borders::ALL).title("Staged image"));
    frame.render_widget(staged, chunks[2]);

    let result_title = if app.vision.busy {
        format!("Analysis {}", thinking_frame(app.tick_count))
    } else {
        "Analysis".to_string()
    };
    let result_text = match &app.vision.result {
        Some(outcome) => {
            let mut lines = vec![Line::from(Span::styled(
                "Analysis",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))];
            lines.extend(outcome.analysis.lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Image information",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.extend(
                outcome
                    .description
                    .lines()
                    .map(|l| Line::from(l.to_string())),
            );
            Text::from(lines)
        }
        None => Text::from("No analysis yet."),
    };
    let result = Paragraph::new(result_text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(result_title));
    frame.render_widget(result, chunks[3]);
}

// ==================== System ====================

fn draw_system(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_system_controls(app, frame, columns[0]);
    draw_system_info(app, frame, columns[1]);
}

fn draw_system_controls(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .split(area);

    let enabled = app.system.control_enabled;
    let gate_style = if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let gate_title = if enabled {
        "Quick actions"
    } else {
        "Quick actions (disabled - F8 to enable)"
    };

    let items: Vec<ListItem> = QUICK_ACTIONS
        .iter()
        .map(|name| ListItem::new(*name))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(gate_title)
                .border_style(gate_style),
        )
        .style(gate_style)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if enabled && app.system.focus == SystemFocus::QuickActions {
        list_state.select(Some(app.system.quick_action_index));
    }
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    let input_focused = enabled && app.system.focus == SystemFocus::CommandInput;
    let input = Paragraph::new(app.system.command_input.as_str())
        .style(gate_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Command (Enter to run)")
                .border_style(if input_focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    gate_style
                }),
        );
    frame.render_widget(input, chunks[1]);

    let result_text = if app.system.command_busy {
        Text::from(Span::styled(
            format!("Executing {}", thinking_frame(app.tick_count)),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        match &app.system.command_result {
            Some(CommandOutcome::Success { message, output }) => {
                let mut lines = vec![Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Green),
                ))];
                if let Some(output) = output {
                    lines.extend(output.lines().map(|l| Line::from(l.to_string())));
                }
                Text::from(lines)
            }
            Some(CommandOutcome::Failure(error)) => Text::from(Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Color::Red),
            )),
            None => Text::from(""),
        }
    };
    let result = Paragraph::new(result_text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Result"));
    frame.render_widget(result, chunks[2]);
}

fn draw_system_info(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(3)])
        .split(area);

    let info_text = match &app.system.info {
        Some(Ok(info)) => {
            let lines: Vec<Line> = system::build_info_lines(info)
                .into_iter()
                .map(Line::from)
                .collect();
            Text::from(lines)
        }
        Some(Err(error)) => Text::from(Span::styled(
            format!("Fetch failed: {}", error),
            Style::default().fg(Color::Red),
        )),
        None if app.system.info_busy => Text::from(Span::styled(
            format!("Loading {}", thinking_frame(app.tick_count)),
            Style::default().fg(Color::Yellow),
        )),
        None => Text::from(""),
    };
    let info = Paragraph::new(info_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("System (F5 to refresh)"),
    );
    frame.render_widget(info, chunks[0]);

    let help = Paragraph::new("Tab: focus | Enter: run | F6: screenshot | F8: toggle control")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(help, chunks[1]);
}

// ==================== Settings ====================

fn draw_settings(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    use crate::settings::SettingsField as F;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(area);

    let checkbox = |on: bool| if on { "[x]" } else { "[ ]" };
    let selected_model = app
        .models
        .selected_id()
        .map(|id| format!("{} ({})", app.models.display_name(id), id))
        .unwrap_or_else(|| "no models loaded".to_string());

    let mut lines: Vec<Line> = Vec::new();
    for field in F::ORDER {
        let focused = app.settings.focus == field;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        match field {
            F::BaseUrl => lines.push(Line::from(Span::styled(
                format!("{}Ollama URL:        {}", marker, app.settings.base_url),
                label_style,
            ))),
            F::DefaultModel => lines.push(Line::from(Span::styled(
                format!("{}Default model:     {}", marker, selected_model),
                label_style,
            ))),
            F::SystemControl => lines.push(Line::from(Span::styled(
                format!(
                    "{}System control:    {}",
                    marker,
                    checkbox(app.settings.allow_system_control)
                ),
                label_style,
            ))),
            F::AgentMode => lines.push(Line::from(Span::styled(
                format!(
                    "{}Agent mode:        {}",
                    marker,
                    checkbox(app.settings.enable_agent_mode)
                ),
                label_style,
            ))),
            F::AllowedCommands => {
                lines.push(Line::from(Span::styled(
                    format!("{}Allowed commands (one per line):", marker),
                    label_style,
                )));
                for command_line in app.settings.allowed_commands_text.lines() {
                    lines.push(Line::from(format!("      {}", command_line)));
                }
            }
            F::ScreenshotQuality => lines.push(Line::from(Span::styled(
                format!(
                    "{}Screenshot quality: {}%",
                    marker, app.settings.screenshot_quality
                ),
                label_style,
            ))),
            F::MaxFileSize => lines.push(Line::from(Span::styled(
                format!(
                    "{}Max upload size:   {} MB",
                    marker, app.settings.max_file_size_mib
                ),
                label_style,
            ))),
        }
    }

    let form = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Settings"));
    frame.render_widget(form, chunks[0]);

    let help = Paragraph::new(
        "Tab: field | Space: toggle | Left/Right: adjust | ^S: save | ^R: reset | F5: models | F6: test connection",
    )
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(help, chunks[1]);
}

// ==================== Chrome ====================

fn draw_status_bar(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let bg = Style::default().bg(Color::DarkGray).fg(Color::White);

    let mut spans: Vec<Span> = vec![
        Span::styled(" aria ", bg.add_modifier(Modifier::BOLD)),
        Span::styled("| ", bg),
        Span::styled(
            app.backend_health.label(),
            bg.patch(Style::default().fg(app.backend_health.color())),
        ),
        Span::styled(" | ", bg),
        Span::styled(
            if app.connection.is_connected() {
                "channel up"
            } else {
                "channel down"
            },
            bg.patch(Style::default().fg(if app.connection.is_connected() {
                Color::Green
            } else {
                Color::Red
            })),
        ),
    ];

    if let Some(model) = app.models.selected_id() {
        spans.push(Span::styled(" | ", bg));
        spans.push(Span::styled(app.models.display_name(model).to_string(), bg));
    }

    if let Some(notice) = app.notices.latest() {
        spans.push(Span::styled("  ", bg));
        spans.push(Span::styled(
            notice.text.clone(),
            bg.patch(
                Style::default()
                    .fg(notice.level.color())
                    .add_modifier(Modifier::BOLD),
            ),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).style(bg);
    frame.render_widget(bar, area);
}

fn draw_confirm_dialog(frame: &mut ratatui::Frame, area: Rect) {
    let dialog = centered_rect(54, 5, area);
    frame.render_widget(Clear, dialog);

    let prompt = Paragraph::new("Reset settings to defaults and reload\nfrom the backend? (y/n)")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm")
                .border_style(Style::default().fg(Color::Yellow)),
        );
    frame.render_widget(prompt, dialog);
}

/// Fixed-size rect centered in `area`, clamped to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Animation frames for in-flight work
fn thinking_frame(tick: u64) -> &'static str {
    const FRAMES: [&str; 6] = ["[.  ]", "[.. ]", "[...]", "[ ..]", "[  .]", "[   ]"];
    FRAMES[(tick / 3) as usize % FRAMES.len()]
}
