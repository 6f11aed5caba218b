use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::line::NORMAL as LINE;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::{Frame, Terminal};
// Use Popup from tui-widgets to render modals
use tui_widgets::popup::Popup;

use crate::config::RgbColor;
use crate::form::{ContactForm, FormMode};
use crate::model::{or_dash, Contact};
use crate::state::Dialog;

use super::app::App;
use super::edit::FormSlot;
use super::panes::Pane;

const LIST_HELP: &str = "/: search  n: new  Enter: view  e: edit  d: delete  h/l: page  ?: help  q: quit";
const SEARCH_HELP: &str = "Type to search  Enter/Esc: back to list";
const FORM_HELP: &str = "Tab/Shift+Tab: field  Enter: save  Esc: cancel";
const DETAIL_HELP: &str = "e: edit  d: delete  Esc: close";
const CONFIRM_HELP: &str = "Y/Enter: confirm  N/Esc: cancel";
const HELP_MODAL_FOOTER: &str = "j/k: scroll  Esc/q: close";
// Longest form label ("First Name*:") plus one space
const FORM_LABEL_WIDTH: usize = 13;

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let banner_height = u16::from(app.state.error().is_some());
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(banner_height),
            Constraint::Length(1),
        ])
        .split(size);

    draw_search(frame, layout[0], app);
    draw_table(frame, layout[1], app);
    draw_error_banner(frame, layout[2], app);
    draw_footer(frame, layout[3], app);

    match app.state.dialog() {
        Some(Dialog::Form(form)) => draw_form_modal(frame, size, app, form),
        Some(Dialog::Detail(contact)) => draw_detail_modal(frame, size, app, contact),
        Some(Dialog::ConfirmDelete { name, .. }) => {
            let message = format!("Are you sure you want to delete {}?", name);
            draw_confirm_modal(frame, size, app, message);
        }
        Some(Dialog::Help) => draw_help_modal(frame, size, app),
        None => {}
    }
}

fn draw_search(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focused_pane == Pane::Search && app.state.dialog().is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app))
        .title(Span::styled(" CONTACTR ", header_text_style(app)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let label = format!("{}: ", Pane::Search.title());
    let value = app.search_input.value();
    let value_span = if value.is_empty() && !active {
        Span::styled(
            "Search contacts by name or email...",
            Style::default().add_modifier(Modifier::DIM),
        )
    } else if active {
        Span::styled(value.to_string(), selection_style(app))
    } else {
        Span::raw(value.to_string())
    };
    let line = Line::from(vec![
        Span::styled(label.clone(), header_text_style(app)),
        value_span,
    ]);
    frame.render_widget(Paragraph::new(line), inner);

    if active {
        let column = Span::raw(label).width() + app.search_input.visual_cursor();
        frame.set_cursor_position((inner.x.saturating_add(column as u16), inner.y));
    }
}

fn draw_table(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let title = format!(" {} ", Pane::List.title());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app))
        .title(Span::styled(title, header_text_style(app)));

    let contacts = app.state.contacts();
    if contacts.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let message = if app.state.is_loading() {
            "Loading contacts..."
        } else if app.state.search_term().is_empty() {
            "No contacts yet. Press n to add one."
        } else {
            "No contacts match your search."
        };
        render_centered(frame, inner, message);
        return;
    }

    let header = Row::new(["Name", "Email", "Phone", "Company"].map(|title| {
        Cell::from(Span::styled(title, header_text_style(app).add_modifier(Modifier::BOLD)))
    }));
    let rows = contacts.iter().map(contact_row);
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(35),
            Constraint::Percentage(18),
            Constraint::Percentage(22),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(selection_style(app));

    let mut state = TableState::default();
    state.select(Some(app.state.selected()));
    frame.render_stateful_widget(table, area, &mut state);
}

fn contact_row(contact: &Contact) -> Row<'static> {
    Row::new(vec![
        Cell::from(contact.full_name()),
        Cell::from(contact.email.clone()),
        Cell::from(or_dash(&contact.phone)),
        Cell::from(or_dash(&contact.company)),
    ])
}

fn draw_error_banner(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(banner) = app.state.error() else {
        return;
    };
    if area.height == 0 {
        return;
    }
    let style = Style::default()
        .fg(color(app.ui_colors().error_fg))
        .add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(format!(" ! {}", banner.message), style),
        Span::styled("  (Esc: dismiss, r: reload)", Style::default()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut message = format!(
        " {} ({} contacts)",
        app.state.page_label(),
        app.state.total_elements()
    );
    if let Some(in_flight) = app.state.in_flight() {
        message.push_str(&format!("  {}...", in_flight.operation.describe().to_uppercase()));
    }
    message.push_str("  ");
    let hint = match app.state.dialog() {
        Some(Dialog::Form(_)) => FORM_HELP,
        Some(Dialog::Detail(_)) => DETAIL_HELP,
        Some(Dialog::ConfirmDelete { .. }) => CONFIRM_HELP,
        Some(Dialog::Help) => HELP_MODAL_FOOTER,
        None if app.focused_pane == Pane::Search => SEARCH_HELP,
        None => LIST_HELP,
    };
    message.push_str(app.state.status().unwrap_or(hint));

    let colors = app.ui_colors();
    let style = Style::default()
        .fg(color(colors.status_fg))
        .bg(color(colors.status_bg));

    let background = Block::default().style(Style::default().bg(color(colors.status_bg)));
    frame.render_widget(background, area);

    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn draw_form_modal(frame: &mut Frame<'_>, area: Rect, app: &App, form: &ContactForm) {
    let height = (FormSlot::COUNT as u16 + 2).min(area.height);
    let modal_area = centered(area, 70, height);
    frame.render_widget(Clear, modal_area);

    let title = match form.mode() {
        FormMode::Edit { id: Some(id) } => format!(" {} #{} ", form.title(), id),
        _ => format!(" {} ", form.title()),
    };
    let error_style = Style::default().fg(color(app.ui_colors().error_fg));
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app))
        .title(Span::styled(title, header_text_style(app)))
        .title_bottom(Line::from(Span::styled(
            format!(" [ {} ] ", form.submit_label()),
            selection_style(app),
        )))
        .title_alignment(Alignment::Center);
    let invalid = form.errors().len();
    if invalid > 0 {
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {} to fix ", invalid), error_style))
                .alignment(Alignment::Right),
        );
    }
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let mut lines = Vec::with_capacity(FormSlot::COUNT);
    let mut cursor = None;

    for index in 0..FormSlot::COUNT {
        let slot = FormSlot::at(index);
        let focused = index == app.editor.index();
        let marker = if slot.required() { "*" } else { "" };
        let label = format!("{:width$} ", format!("{}{}:", slot.label(), marker), width = FORM_LABEL_WIDTH);
        let (label_style, value_style) = line_styles(app, focused);

        let mut spans = vec![Span::styled(label.clone(), label_style)];
        let value = if focused {
            app.editor.value().to_string()
        } else {
            slot.current(form)
        };
        if focused {
            cursor = Some((index, Span::raw(label).width() + app.editor.visual_cursor()));
        }
        if value.is_empty() && !focused {
            spans.push(Span::styled(
                slot.placeholder().to_string(),
                Style::default().add_modifier(Modifier::DIM),
            ));
        } else {
            spans.push(Span::styled(value, value_style));
        }

        if let FormSlot::Field(field) = slot {
            if let Some(message) = form.error(field) {
                spans.push(Span::styled(format!("  {}", message), error_style));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);

    if let Some((row, column)) = cursor {
        if (row as u16) < inner.height && !form.is_submitting() {
            frame.set_cursor_position((
                inner.x.saturating_add(column as u16),
                inner.y.saturating_add(row as u16),
            ));
        }
    }
}

fn draw_detail_modal(frame: &mut Frame<'_>, area: Rect, app: &App, contact: &Contact) {
    let fields = contact.detail_fields();
    let height = (fields.len() as u16 + 4).min(area.height);
    let modal_area = centered(area, 60, height);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app))
        .title(Span::styled(
            format!(" {} ", contact.full_name()),
            header_text_style(app),
        ))
        .title_bottom(Line::from(Span::styled(format!(" {} ", DETAIL_HELP), header_text_style(app))))
        .title_alignment(Alignment::Center);
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let label_width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    let mut lines = vec![Line::from("")];
    lines.extend(fields.into_iter().map(|(label, value)| {
        Line::from(vec![
            Span::styled(
                format!(" {:width$} ", format!("{}:", label), width = label_width),
                header_text_style(app),
            ),
            Span::raw(value),
        ])
    }));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_confirm_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App, message: String) {
    let body_text = Text::from(vec![
        Line::from(message),
        Line::from(""),
        Line::from(CONFIRM_HELP),
    ]);

    let title_line = Line::from(Span::styled(" DELETE CONTACT ", header_text_style(app)));
    let popup = Popup::new(body_text)
        .title(title_line)
        .border_style(border_style(app));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_help_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    // Calculate modal size: 2/3 width, 80% height
    let width = area.width.saturating_mul(2).saturating_div(3).max(40).min(area.width);
    let height = area.height.saturating_mul(4).saturating_div(5).max(10).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let modal_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, modal_area);

    let header_style = header_text_style(app);
    let content_width = width.saturating_sub(4) as usize;
    let action_width = 20usize;

    let sections = app.help_entries();
    let mut lines: Vec<Line> = Vec::new();
    for (section_idx, section) in sections.iter().enumerate() {
        let header_text = format!(" {} ", section.title);
        let padding_total = content_width.saturating_sub(header_text.len());
        let left_pad = padding_total / 2;
        let right_pad = padding_total - left_pad;
        let header_line = format!(
            "{}{}{}",
            LINE.horizontal.repeat(left_pad),
            header_text,
            LINE.horizontal.repeat(right_pad)
        );
        lines.push(Line::from(Span::styled(header_line, header_style)));

        for entry in &section.entries {
            lines.push(Line::from(vec![
                Span::raw(format!("{:<width$}", entry.action, width = action_width)),
                Span::styled(entry.keys.clone(), header_style),
            ]));
        }

        if section_idx + 1 < sections.len() {
            lines.push(Line::from(""));
        }
    }

    let modal = &mut app.help_modal;
    modal.total_lines = lines.len();
    // borders (2) + footer line (1)
    modal.viewport_height = height.saturating_sub(3) as usize;
    let max_scroll = modal.total_lines.saturating_sub(modal.viewport_height);
    modal.scroll = modal.scroll.min(max_scroll);

    let scroll_indicator = match (modal.can_scroll_up(), modal.can_scroll_down()) {
        (true, true) => "▲▼",
        (true, false) => "▲ ",
        (false, true) => " ▼",
        (false, false) => "  ",
    };
    let visible_lines: Vec<Line> = lines
        .into_iter()
        .skip(modal.scroll)
        .take(modal.viewport_height)
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app))
        .title(Line::from(vec![
            Span::styled(" HELP ", header_style),
            Span::styled(scroll_indicator, header_style),
        ]))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", HELP_MODAL_FOOTER),
            header_style,
        )))
        .title_alignment(Alignment::Center);

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);
    frame.render_widget(Paragraph::new(visible_lines), inner);
}

/// Rect of `percent_x` of the width and a fixed height, centered in `area`.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (area.width.saturating_mul(percent_x) / 100)
        .max(area.width.min(40))
        .min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn render_centered(frame: &mut Frame<'_>, area: Rect, text: &str) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let target = Rect {
        y: area.y + area.height.saturating_sub(1) / 2,
        height: 1,
        ..area
    };
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), target);
}

fn line_styles(app: &App, highlight: bool) -> (Style, Style) {
    if highlight {
        let style = selection_style(app);
        (style, style)
    } else {
        (header_text_style(app), Style::default())
    }
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn border_style(app: &App) -> Style {
    Style::default().fg(color(app.ui_colors().border))
}

fn header_text_style(app: &App) -> Style {
    Style::default().fg(color(app.ui_colors().header))
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 30);
        let rect = centered(area, 60, 10);
        assert_eq!(rect, Rect::new(20, 10, 60, 10));

        let tiny = Rect::new(0, 0, 20, 5);
        let rect = centered(tiny, 60, 10);
        assert_eq!(rect, Rect::new(0, 0, 20, 5));
    }
}
