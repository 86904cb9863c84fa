use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::canvas::{Canvas, Node, NodeKind};
use crate::tui::app::App;

const NODE_WIDTH: u16 = 30;
const NODE_HEIGHT: u16 = 7;
/// Canvas units per terminal cell.
const UNITS_PER_COL: f64 = 10.0;
const UNITS_PER_ROW: f64 = 25.0;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Toolbar
        Constraint::Length(1), // Status line
        Constraint::Min(10),   // Canvas
        Constraint::Length(1), // Help bar
    ])
    .split(frame.area());

    render_toolbar(frame, chunks[0], app);
    render_status(frame, chunks[1], app);
    render_canvas(frame, chunks[2], app.controller.canvas());
    render_help(frame, chunks[3]);
}

fn render_toolbar(frame: &mut Frame, area: Rect, app: &App) {
    let loading = app.controller.loading();
    let button = if loading {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    };
    let run_label = if loading { " ⟳ Run Flow " } else { " ▶ Run Flow " };

    let toolbar = Paragraph::new(Line::from(vec![
        Span::styled(run_label, button.add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(" Save ", button),
        Span::raw("   "),
        Span::styled(app.server_url.as_str(), Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(toolbar, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let status = app.controller.status();
    let style = if status.is_error() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    frame.render_widget(Paragraph::new(status.to_string()).style(style), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "type: edit prompt  Ctrl+R: run  Ctrl+S: save  Tab: select  Alt+←↑↓→: move  Esc: deselect  Ctrl+Q: quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    frame.render_widget(help, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, canvas: &Canvas) {
    let prompt_rect = node_rect(area, &canvas.prompt);
    let response_rect = node_rect(area, &canvas.response);

    draw_edge(
        frame.buffer_mut(),
        area,
        prompt_rect,
        response_rect,
        canvas.edge.selected,
    );

    for node in canvas.nodes() {
        render_node(frame, area, node);
    }
}

/// Unclipped cell rectangle for a node; may extend past `area`.
fn node_rect(area: Rect, node: &Node) -> Rect {
    let col = (node.position.x / UNITS_PER_COL).round().max(0.0) as u16;
    let row = (node.position.y / UNITS_PER_ROW).round().max(0.0) as u16;
    Rect {
        x: area.x.saturating_add(col),
        y: area.y.saturating_add(row),
        width: NODE_WIDTH,
        height: NODE_HEIGHT,
    }
}

fn render_node(frame: &mut Frame, area: Rect, node: &Node) {
    let visible = node_rect(area, node).intersection(area);
    if visible.is_empty() {
        return;
    }

    let border = if node.selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text_style = if node.value.is_empty() {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
    } else {
        Style::default()
    };

    let mut text = node.display_text().to_string();
    if node.kind == NodeKind::Prompt && !node.value.is_empty() {
        text.push('▏');
    }

    let widget = Paragraph::new(text)
        .style(text_style)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!(" {} ", node.kind.label()))
                .borders(Borders::ALL)
                .border_style(border),
        );
    frame.render_widget(widget, visible);
}

/// Route from the prompt's right edge to the response's left edge:
/// horizontal, vertical at the midpoint, horizontal, then an arrowhead.
fn draw_edge(buf: &mut Buffer, area: Rect, from: Rect, to: Rect, selected: bool) {
    let style = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let start = (from.right(), from.y.saturating_add(from.height / 2));
    let end = (to.x.saturating_sub(1), to.y.saturating_add(to.height / 2));
    let mid_x = start.0 + end.0.saturating_sub(start.0) / 2;

    for x in span(start.0, mid_x) {
        put(buf, area, x, start.1, "─", style);
    }
    for y in span(start.1, end.1) {
        put(buf, area, mid_x, y, "│", style);
    }
    for x in span(mid_x, end.0) {
        put(buf, area, x, end.1, "─", style);
    }
    put(buf, area, end.0, end.1, "▶", style);
}

fn span(a: u16, b: u16) -> std::ops::RangeInclusive<u16> {
    a.min(b)..=a.max(b)
}

fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, symbol: &str, style: Style) {
    if x >= area.left() && x < area.right() && y >= area.top() && y < area.bottom() {
        buf.set_string(x, y, symbol, style);
    }
}
