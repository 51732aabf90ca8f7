use crate::app::{App, Phase, CITIES};
use crate::map::{render_regions, RegionLayers};
use crate::stats::METRICS;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    if app.phase == Phase::Intro {
        render_intro(frame, app);
        return;
    }

    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
    render_overlay_box(frame, app, chunks[0]);
    if app.selected_province.is_some() {
        render_stats_panel(frame, app, chunks[0]);
    }
}

/// Intro screen: pick an origin city, then start the journey.
fn render_intro(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let width = 40.min(area.width);
    let height = (CITIES.len() as u16 + 8).min(area.height);
    let panel = centered(area, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(Span::styled(
            " GLOBE HOPPER ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(panel);
    frame.render_widget(Clear, panel);
    frame.render_widget(block, panel);

    let mut lines = vec![
        Line::from(Span::styled(
            "Choose your origin city",
            Style::default().fg(Color::White),
        )),
        Line::default(),
    ];
    for (i, city) in CITIES.iter().enumerate() {
        let style = if app.city_cursor == Some(i) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!("  {city}  "), style)));
    }
    lines.push(Line::default());
    let start_style = if app.city_cursor.is_some() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(Span::styled(
        "↑/↓ choose · Enter start · q quit",
        start_style,
    )));

    frame.render_widget(Paragraph::new(lines).centered(), inner);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Globe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut globe = app.globe.clone();
    globe.set_size(inner.width as usize * 2, inner.height as usize * 4);

    let selected = if app.phase == Phase::Provinces {
        app.selected_province
    } else {
        None
    };
    let layers = render_regions(
        app.current_regions(),
        app.hovered,
        selected,
        &globe,
        inner.width as usize,
        inner.height as usize,
    );

    // Mouse cursor marker position in character cells
    let cursor_pos = app.mouse_pos.and_then(|(col, row)| {
        let cx = col.saturating_sub(1);
        let cy = row.saturating_sub(1);
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    let widget = GlobeWidget {
        layers,
        cursor_pos,
        veil: app.phase == Phase::Clouds,
    };
    frame.render_widget(widget, inner);
}

/// Braille globe layers plus the cloud veil and cursor marker.
struct GlobeWidget {
    layers: RegionLayers,
    cursor_pos: Option<(u16, u16)>,
    veil: bool,
}

impl GlobeWidget {
    fn render_layer(
        canvas: &crate::braille::BrailleCanvas,
        color: Color,
        area: Rect,
        buf: &mut Buffer,
    ) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: plain outlines, hovered fill, selected fill
        Self::render_layer(&self.layers.outlines, Color::Green, area, buf);
        Self::render_layer(&self.layers.hovered, Color::LightGreen, area, buf);
        Self::render_layer(&self.layers.selected, Color::Yellow, area, buf);

        // Cloud veil during the camera flight: wash out every other cell
        if self.veil {
            for y in area.y..area.y + area.height {
                for x in area.x..area.x + area.width {
                    if (x + y) % 2 == 0 {
                        buf[(x, y)].set_char('░').set_fg(Color::White);
                    } else {
                        buf[(x, y)].set_fg(Color::DarkGray);
                    }
                }
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

/// Phase-specific heading box in the top-left corner of the map.
fn render_overlay_box(frame: &mut Frame, app: &App, map_area: Rect) {
    let (title, hint): (String, &str) = match app.phase {
        Phase::Globe => (
            "Explore Countries".to_string(),
            "Hover to highlight a country, click to select",
        ),
        Phase::Clouds => (
            format!("Entering {}", app.selected_country.as_deref().unwrap_or("…")),
            "Descending through the clouds...",
        ),
        Phase::Provinces => (
            format!("Provinces of {}", app.selected_country.as_deref().unwrap_or("…")),
            "Hover to highlight a province, click to select",
        ),
        Phase::Intro => return,
    };

    // Clip to the map area so a long country name on a narrow terminal
    // never produces a Rect outside the frame buffer.
    let rect = Rect {
        x: map_area.x + 2,
        y: map_area.y + 1,
        width: title.len().max(hint.len()) as u16 + 4,
        height: 4,
    }
    .intersection(map_area);
    if rect.width == 0 || rect.height == 0 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                title,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        ]),
        inner,
    );
}

/// Where the stats card sits within the map area. Shared with click
/// routing so pointer events over the card never fall through to the
/// globe underneath.
pub fn stats_panel_rect(map_area: Rect, flipped: bool) -> Rect {
    let height = (METRICS.len() as u16 + 3).min(map_area.height);
    let width = (if flipped { 56 } else { 40 }).min(map_area.width);
    Rect {
        x: map_area.x + (map_area.width.saturating_sub(width)) / 2,
        y: map_area.y + map_area.height.saturating_sub(height),
        width,
        height,
    }
}

/// Bottom-center stats card for the selected province; flips between a
/// flat list and a side-by-side comparison with the origin city.
fn render_stats_panel(frame: &mut Frame, app: &App, map_area: Rect) {
    let Some(province) = app.selected_province_name() else {
        return;
    };

    let rect = stats_panel_rect(map_area, app.flipped);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(Span::styled(
            format!(" {province} "),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Span::styled(
            " f flip · x close ",
            Style::default().fg(Color::DarkGray),
        ));
    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);

    if app.flipped {
        let origin = app.origin_city().unwrap_or("Origin");
        let header = Row::new(vec!["Indicator", province, origin])
            .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD));
        let rows = METRICS
            .iter()
            .map(|(label, here, there)| Row::new(vec![*label, *here, *there]));
        let table = Table::new(
            rows,
            [
                Constraint::Length(20),
                Constraint::Percentage(50),
                Constraint::Percentage(50),
            ],
        )
        .header(header)
        .column_spacing(1);
        frame.render_widget(table, inner);
    } else {
        let lines: Vec<Line> = METRICS
            .iter()
            .map(|(label, here, _)| {
                Line::from(vec![
                    Span::styled(format!("{label:<20}"), Style::default().fg(Color::Gray)),
                    Span::styled(*here, Style::default().fg(Color::White)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let phase = match app.phase {
        Phase::Intro => "intro",
        Phase::Globe => "countries",
        Phase::Clouds => "clouds",
        Phase::Provinces => "provinces",
    };

    let mut spans = vec![
        Span::styled(" View: ", Style::default().fg(Color::DarkGray)),
        Span::styled(phase, Style::default().fg(Color::Yellow)),
        Span::styled(" | From: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.origin_city().unwrap_or("—"),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(" | Zoom: {:.1}x", app.globe.effective_zoom()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(name) = app.hovered_name() {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            name.to_string(),
            Style::default().fg(Color::LightGreen),
        ));
    }
    let help = match app.phase {
        Phase::Provinces => " | click:select f:flip x:close Esc:back q:quit",
        _ => " | drag:rotate +/-:zoom q:quit",
    };
    spans.push(Span::styled(help, Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RegionSource;
    use ratatui::{backend::TestBackend, Terminal};

    fn app(width: usize, height: usize) -> App {
        App::new(width, height, RegionSource::new("testdata-missing"))
    }

    fn draw(app: &App, width: u16, height: u16) {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
    }

    #[test]
    fn long_country_title_fits_a_narrow_terminal() {
        // The overlay heading is wider than the terminal; it must clip
        // instead of indexing outside the frame buffer
        let mut app = app(30, 10);
        app.city_cursor = Some(0);
        app.phase = Phase::Provinces;
        app.selected_country = Some("Bosnia and Herzegovina".to_string());
        draw(&app, 30, 10);
    }

    #[test]
    fn tiny_terminal_renders_every_phase() {
        for phase in [Phase::Intro, Phase::Globe, Phase::Clouds, Phase::Provinces] {
            let mut app = app(8, 3);
            app.phase = phase;
            draw(&app, 8, 3);
        }
    }

    #[test]
    fn stats_panel_rect_stays_inside_the_map_area() {
        let map_area = Rect::new(0, 0, 120, 39);
        for flipped in [false, true] {
            let rect = stats_panel_rect(map_area, flipped);
            assert_eq!(rect.intersection(map_area), rect);
        }
        // Narrower than the card itself
        let tight = Rect::new(0, 0, 24, 6);
        let rect = stats_panel_rect(tight, true);
        assert_eq!(rect.intersection(tight), rect);
    }
}
