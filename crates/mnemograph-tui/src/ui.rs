//! Frame layout and drawing

use chrono::{DateTime, Local, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::App;
use crate::views::{CurveView, DetailView, GraphView};

/// Screen regions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub graph: Rect,
    pub curve: Option<Rect>,
    pub detail: Option<Rect>,
    pub status: Rect,
}

/// Split the terminal; the side panel only appears with a selection
pub fn areas(area: Rect, with_side: bool) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let (main, status) = (rows[0], rows[1]);

    if !with_side {
        return Areas {
            graph: main,
            curve: None,
            detail: None,
            status,
        };
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);

    Areas {
        graph: columns[0],
        curve: Some(side[0]),
        detail: Some(side[1]),
        status,
    }
}

pub fn draw(frame: &mut Frame, app: &App, areas: &Areas) {
    let view = &app.view;
    let scene = view.scene();
    let selection = view.selection();

    GraphView {
        scene: &scene,
        layer_titles: view.layer_titles(),
        node_size: view.node_size(),
        selected: selection.map(|s| &s.key),
    }
    .render(frame, areas.graph);

    if let Some(area) = areas.curve {
        CurveView::render(frame, area, view.curve().as_ref());
    }
    if let Some(area) = areas.detail {
        DetailView::render(
            frame,
            area,
            selection,
            view.summary().as_ref(),
            &view.layer_titles(),
            view.now(),
        );
    }

    frame.render_widget(status_line(app), areas.status);
}

fn status_line(app: &App) -> Paragraph<'static> {
    let view = &app.view;
    let clock = DateTime::<Utc>::from_timestamp(view.now() as i64, 0)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(" q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  "),
        Span::styled("+/-", Style::default().fg(Color::Yellow)),
        Span::raw(" zoom  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" reset  "),
        Span::styled("f", Style::default().fg(Color::Yellow)),
        Span::raw(" refresh  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" deselect │ "),
        Span::raw(format!(
            "{} nodes │ {}% │ {clock}",
            view.graph().node_count(),
            view.transform().zoom_percent()
        )),
    ];

    if let Some(status) = &app.status {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Red)));
    }

    Paragraph::new(Line::from(spans))
}
