use ratatui::{
    layout::Alignment,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::models::PickMode;
use crate::registry::CatalogStatus;

/// Main entry point for drawing the picker. Dispatches to individual pane drawers.
pub fn draw(f: &mut Frame, app: &App) {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Header
                Constraint::Min(10),   // List + Selection
                Constraint::Length(3), // Search
                Constraint::Length(5), // Status/Shortcuts
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = match app.mode {
        PickMode::Multi => format!("gitman: select {} templates", app.kind),
        PickMode::Single => format!("gitman: select a {}", app.kind),
    };
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .alignment(Alignment::Center);
    f.render_widget(header, vertical_chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(vertical_chunks[1]);

    draw_list_pane(f, app, main_chunks[0]);
    draw_selection_pane(f, app, main_chunks[1]);
    draw_search_pane(f, app, vertical_chunks[2]);
    draw_status_pane(f, app, vertical_chunks[3]);
}

/// Renders the left pane containing the filtered template names.
fn draw_list_pane(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.filtered_templates.is_empty() {
        let waiting = app.catalog_status == CatalogStatus::Pending && app.search_query.is_empty();
        if waiting {
            vec![ListItem::new("Fetching templates...")
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))]
        } else {
            vec![ListItem::new("No templates found.").style(Style::default().fg(Color::Yellow))]
        }
    } else {
        app.filtered_templates
            .iter()
            .map(|t| {
                let is_selected = app.is_selected(t);
                let content = match (app.mode, is_selected) {
                    (PickMode::Multi, true) => format!("[X] {}", t),
                    (PickMode::Multi, false) => format!("[ ] {}", t),
                    (PickMode::Single, true) => format!("(*) {}", t),
                    (PickMode::Single, false) => format!("( ) {}", t),
                };

                let style = if is_selected {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(content).style(style)
            })
            .collect()
    };

    let mut state = ListState::default();
    if app.filtered_templates.is_empty() {
        state.select(None);
    } else {
        state.select(Some(app.highlighted_index));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Matching Templates ({}) ", app.filtered_templates.len()))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, &mut state);
}

/// Renders the right pane listing the chosen templates in pick order.
fn draw_selection_pane(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.selected_templates.is_empty() {
        let hint = match app.mode {
            PickMode::Multi => "Nothing selected. Press SPACE to add templates.",
            PickMode::Single => "Nothing selected. ENTER takes the highlighted entry.",
        };
        vec![Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))]
    } else {
        app.selected_templates
            .iter()
            .enumerate()
            .map(|(i, t)| {
                Line::from(vec![
                    Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::styled(t.clone(), Style::default().fg(Color::Green)),
                ])
            })
            .collect()
    };

    let selection = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!(" {} ", app.kind.artifact_name()),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(selection, area);
}

/// Renders the search input field.
fn draw_search_pane(f: &mut Frame, app: &App, area: Rect) {
    let input_style = if let InputMode::Editing = app.input_mode {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = if let InputMode::Editing = app.input_mode {
        Span::styled(" Search (Typing...) ", Style::default().fg(Color::Cyan))
    } else {
        Span::styled(
            " Search (Press '/' or 'i' to search) ",
            Style::default().fg(Color::DarkGray),
        )
    };

    let input = Paragraph::new(app.search_query.as_str())
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(input_style),
        );
    f.render_widget(input, area);

    if let InputMode::Editing = app.input_mode {
        let cursor_x = area.x.saturating_add(1).saturating_add(app.search_query.chars().count() as u16);
        let max_x = area.x.saturating_add(area.width.saturating_sub(1));
        let cursor_x = cursor_x.min(max_x);
        f.set_cursor_position((cursor_x, area.y + 1));
    }
}

/// Renders the bottom status bar: catalog state or error, then key shortcuts.
fn draw_status_pane(f: &mut Frame, app: &App, area: Rect) {
    let mut status_lines = Vec::new();

    if let Some(err) = &app.error {
        status_lines.push(Line::from(vec![
            Span::styled(
                " ERROR ",
                Style::default()
                    .bg(Color::Red)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(err, Style::default().fg(Color::LightRed)),
        ]));
    } else {
        let (label, text, color) = match &app.catalog_status {
            CatalogStatus::NotRequested => (" OFFLINE ", "local and cached templates only".to_string(), Color::DarkGray),
            CatalogStatus::Pending => (" LOADING ", "fetching remote catalog...".to_string(), Color::Cyan),
            CatalogStatus::Merged { fetched } => (" READY ", format!("{} remote templates available", fetched), Color::Green),
            CatalogStatus::Degraded { .. } => (
                " LOCAL ONLY ",
                "remote catalog unavailable".to_string(),
                Color::Yellow,
            ),
        };
        status_lines.push(Line::from(vec![
            Span::styled(
                label,
                Style::default().bg(color).fg(Color::Black).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(text, Style::default().fg(color)),
            Span::raw(format!("   selected: {}", app.selected_templates.len())),
        ]));
    }

    status_lines.push(Line::from(""));

    let toggle = match app.mode {
        PickMode::Multi => "Toggle",
        PickMode::Single => "Choose",
    };
    let shortcuts = vec![
        ("SPACE", toggle),
        ("/", "Search"),
        ("J/K", "Move"),
        ("ENTER", "Confirm"),
        ("Q", "Skip"),
    ];

    let mut shortcut_spans = Vec::new();
    for (i, (key, desc)) in shortcuts.iter().enumerate() {
        if i > 0 {
            shortcut_spans.push(Span::raw("  "));
        }
        shortcut_spans.push(Span::styled(
            format!(" {} ", key),
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
        shortcut_spans.push(Span::raw(format!(" {}", desc)));
    }
    status_lines.push(Line::from(shortcut_spans));

    let status = Paragraph::new(status_lines)
        .block(Block::default().borders(Borders::ALL).title(" Info & Controls "));
    f.render_widget(status, area);
}
