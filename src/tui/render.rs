use std::collections::BTreeSet;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Painter, Shape};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use crate::graph::model::{Device, DeviceType, Position, Profile, Status, Theme};
use crate::topology::scene::{ConnectionCurve, Emphasis, NodePlacement, Scene};

const SIDEBAR_WIDTH: u16 = 36;

/// Everything the map view needs for one frame.
pub struct MapRenderData<'a> {
    pub scene: &'a Scene,
    pub profiles: &'a [Profile],
    /// Member count per entry of `profiles`.
    pub profile_sizes: Vec<usize>,
    pub active_profile: &'a Profile,
    pub zoom: f64,
    pub hidden_types: &'a BTreeSet<DeviceType>,
    pub details: Option<DeviceDetails<'a>>,
    /// Shown while a pointer gesture is under way.
    pub mode: Option<&'static str>,
    pub status_message: Option<&'a str>,
    pub show_help: bool,
    pub demo: bool,
}

/// The selected device plus the names it is related to.
pub struct DeviceDetails<'a> {
    pub device: &'a Device,
    /// Anchor on the active profile, when the device is on screen.
    pub position: Option<Position>,
    pub profile_names: Vec<&'a str>,
    pub links: Vec<&'a Device>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapAreas {
    pub frame: Rect,
    /// Inside the border; one cell here is one canvas unit.
    pub canvas: Rect,
    pub sidebar: Rect,
    pub status: Rect,
}

pub fn map_areas(area: Rect) -> MapAreas {
    let [main, status] = Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).areas(area);
    let [frame, sidebar] =
        Layout::horizontal([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)]).areas(main);
    let canvas = map_block(Line::default()).inner(frame);
    MapAreas {
        frame,
        canvas,
        sidebar,
        status,
    }
}

pub fn draw(frame: &mut Frame, data: &MapRenderData<'_>) {
    let areas = map_areas(frame.area());
    let palette = Palette::for_theme(data.active_profile.config.theme);

    let mut title = vec![
        Span::styled("netmap", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            data.active_profile.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(mode) = data.mode {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            format!("[{mode}]"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if data.demo {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            "[DEMO]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let mut block = map_block(Line::from(title));
    if let Some(background) = &data.scene.background {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" map: {background} "),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(block, areas.frame);
    draw_scene(frame, areas.canvas, data.scene, &palette);

    draw_sidebar(frame, areas.sidebar, data);
    draw_status(frame, areas.status, data);

    if data.show_help {
        render_help_overlay(frame);
    }
}

fn map_block(title: Line<'_>) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
}

struct Palette {
    edge: Color,
    label: Color,
    dimmed: Color,
    highlight: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                edge: Color::Black,
                label: Color::Black,
                dimmed: Color::Gray,
                highlight: Color::Blue,
            },
            Theme::Dark | Theme::System => Self {
                edge: Color::Gray,
                label: Color::White,
                dimmed: Color::DarkGray,
                highlight: Color::Cyan,
            },
        }
    }
}

/// A connection curve drawn by sampling the quadratic Bézier.
struct CurveShape<'a> {
    curve: &'a ConnectionCurve,
    height: f64,
    color: Color,
}

impl Shape for CurveShape<'_> {
    fn draw(&self, painter: &mut Painter) {
        for point in self.curve.sample(curve_steps(self.curve)) {
            if let Some((x, y)) = painter.get_point(point.x, self.height - point.y) {
                painter.paint(x, y, self.color);
            }
        }
    }
}

/// Enough samples to leave no gaps at braille resolution.
fn curve_steps(curve: &ConnectionCurve) -> usize {
    let span = (curve.control.x - curve.start.x).abs()
        + (curve.control.y - curve.start.y).abs()
        + (curve.end.x - curve.control.x).abs()
        + (curve.end.y - curve.control.y).abs();
    ((span * 4.0).ceil() as usize).clamp(8, 4000)
}

fn draw_scene(frame: &mut Frame, area: Rect, scene: &Scene, palette: &Palette) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    let width = f64::from(area.width);
    let height = f64::from(area.height);
    let selected = scene.nodes.iter().find(|n| n.selected).map(|n| n.device_id.as_str());

    // Bounds are offset by half a cell so that a screen point at a cell
    // centre prints into exactly that cell.
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.5, width - 0.5])
        .y_bounds([0.5, height - 0.5])
        .paint(|ctx| {
            for curve in &scene.curves {
                let color = if curve.opacity() < 1.0 {
                    palette.dimmed
                } else if selected.is_some_and(|id| curve.touches(id)) {
                    palette.highlight
                } else {
                    palette.edge
                };
                ctx.draw(&CurveShape {
                    curve,
                    height,
                    color,
                });
            }
            ctx.layer();
            for node in &scene.nodes {
                let y = height - node.screen.y;
                ctx.print(node.screen.x, y, Line::from(node_glyph(node, palette)));
                if scene.show_labels {
                    let half = node.name.chars().count() as f64 / 2.0;
                    ctx.print(
                        (node.screen.x - half).floor() + 0.5,
                        y - 1.0,
                        Line::from(Span::styled(node.name.clone(), label_style(node, palette))),
                    );
                }
            }
        });
    frame.render_widget(canvas, area);
}

pub fn type_glyph(device_type: DeviceType) -> &'static str {
    match device_type {
        DeviceType::Wap => "◉",
        DeviceType::Server => "■",
        DeviceType::Laptop => "▭",
        DeviceType::Dpo => "◆",
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Online => Color::Green,
        Status::Offline => Color::LightRed,
    }
}

fn node_glyph(node: &NodePlacement, palette: &Palette) -> Span<'static> {
    let style = if node.selected {
        Style::default()
            .fg(palette.highlight)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else if node.opacity() < 1.0 {
        Style::default().fg(palette.dimmed)
    } else {
        Style::default()
            .fg(status_color(node.status))
            .add_modifier(Modifier::BOLD)
    };
    Span::styled(type_glyph(node.device_type), style)
}

fn label_style(node: &NodePlacement, palette: &Palette) -> Style {
    if node.selected {
        Style::default()
            .fg(palette.highlight)
            .add_modifier(Modifier::BOLD)
    } else if node.emphasis == Emphasis::Dimmed {
        Style::default().fg(palette.dimmed)
    } else {
        Style::default().fg(palette.label)
    }
}

fn draw_sidebar(frame: &mut Frame, area: Rect, data: &MapRenderData<'_>) {
    let [profiles_area, filters_area, details_area] = Layout::vertical([
        Constraint::Length(data.profiles.len() as u16 + 4),
        Constraint::Length(DeviceType::ALL.len() as u16 + 2),
        Constraint::Min(4),
    ])
    .areas(area);

    let mut profile_lines: Vec<Line> = data
        .profiles
        .iter()
        .zip(&data.profile_sizes)
        .map(|(profile, size)| {
            let active = profile.id == data.active_profile.id;
            let marker = if active { "▶" } else { " " };
            let style = if active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!("{marker} {}", profile.name), style),
                Span::styled(format!(" ({size})"), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    profile_lines.push(Line::from(Span::styled(
        data.active_profile
            .description
            .clone()
            .unwrap_or_default(),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(
        Paragraph::new(profile_lines)
            .wrap(Wrap { trim: true })
            .block(sidebar_block("Profiles  [Tab]")),
        profiles_area,
    );

    let filter_lines: Vec<Line> = DeviceType::ALL
        .iter()
        .enumerate()
        .map(|(idx, device_type)| {
            let shown = !data.hidden_types.contains(device_type);
            let (check, style) = if shown {
                ("[x]", Style::default().fg(Color::Gray))
            } else {
                ("[ ]", Style::default().fg(Color::DarkGray))
            };
            Line::from(Span::styled(
                format!(
                    "{} {check} {} {}",
                    idx + 1,
                    type_glyph(*device_type),
                    device_type.label()
                ),
                style,
            ))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(filter_lines).block(sidebar_block("Device types")),
        filters_area,
    );

    let details = match &data.details {
        Some(details) => details_lines(details),
        None => vec![Line::from(Span::styled(
            "Click a device to inspect it.",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    frame.render_widget(
        Paragraph::new(details)
            .wrap(Wrap { trim: false })
            .block(sidebar_block("Details")),
        details_area,
    );
}

fn sidebar_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .padding(Padding::horizontal(1))
        .title(title)
}

fn last_seen_label(device: &Device) -> String {
    match device.last_seen.trim() {
        "" => "never".to_string(),
        seen => seen.to_string(),
    }
}

fn details_lines(details: &DeviceDetails<'_>) -> Vec<Line<'static>> {
    let device = details.device;
    let key = Style::default().fg(Color::DarkGray);
    let field = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{name:<10}"), key),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            device.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        field("type", device.device_type.to_string()),
        Line::from(vec![
            Span::styled(format!("{:<10}", "status"), key),
            Span::styled(
                device.status.to_string(),
                Style::default().fg(status_color(device.status)),
            ),
        ]),
        field("ip", device.ip.clone()),
    ];
    if let Some(mac) = &device.mac {
        lines.push(field("mac", mac.clone()));
    }
    if let Some(location) = &device.location {
        lines.push(field("location", location.clone()));
    }
    lines.push(field("last seen", last_seen_label(device)));
    if let Some(at) = details.position {
        lines.push(field("position", format!("{:.1}, {:.1}", at.x, at.y)));
    }
    lines.push(field("profiles", details.profile_names.join(", ")));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Connected", key)));
    if details.links.is_empty() {
        lines.push(Line::from(Span::styled("  none", key)));
    }
    for link in &details.links {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                type_glyph(link.device_type),
                Style::default().fg(status_color(link.status)),
            ),
            Span::raw(format!(" {}", link.name)),
        ]));
    }
    lines
}

fn draw_status(frame: &mut Frame, area: Rect, data: &MapRenderData<'_>) {
    let hint = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled(
            format!("zoom {:.0}%", data.zoom * 100.0),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
    ];
    if let Some(message) = data.status_message {
        spans.push(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        ));
    } else {
        spans.push(Span::styled(
            "[+/-] zoom  [0] reset  [1-4] types  [s] settings  [?] help  [q] quit",
            hint,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 64, 60);
    frame.render_widget(Clear, area);
    let help = Paragraph::new(vec![
        Line::from("MOUSE"),
        Line::from("  Drag a device to move it on the active profile"),
        Line::from("  Drag empty canvas to pan"),
        Line::from("  Click a device to select it, click again to deselect"),
        Line::from(""),
        Line::from("KEYS"),
        Line::from("  +/-  zoom       0  reset view    arrows/hjkl  pan"),
        Line::from("  Tab/Shift-Tab  switch profile   [ ]  previous/next device"),
        Line::from("  1-4  show/hide WAP, Server, Laptop, DPO"),
        Line::from("  s  profile settings   Esc  clear selection"),
        Line::from(""),
        Line::from("Positions are saved when you quit."),
    ])
    .block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, area);
}

pub fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::viewport::Point;

    fn curve(end: Point) -> ConnectionCurve {
        let start = Point::new(0.0, 0.0);
        ConnectionCurve {
            source: "a".to_string(),
            target: "b".to_string(),
            start,
            control: start.midpoint(end),
            end,
            emphasis: Emphasis::Full,
        }
    }

    #[test]
    fn canvas_sits_inside_the_map_border() {
        let areas = map_areas(Rect::new(0, 0, 100, 30));
        assert_eq!(areas.frame, Rect::new(0, 0, 64, 29));
        assert_eq!(areas.canvas, Rect::new(1, 1, 62, 27));
        assert_eq!(areas.sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(areas.status, Rect::new(0, 29, 100, 1));
    }

    #[test]
    fn longer_curves_get_more_samples() {
        assert_eq!(curve_steps(&curve(Point::new(0.5, 0.0))), 8);
        assert_eq!(curve_steps(&curve(Point::new(40.0, 10.0))), 200);
    }

    #[test]
    fn every_device_type_has_its_own_glyph() {
        let glyphs: BTreeSet<&str> = DeviceType::ALL.iter().map(|t| type_glyph(*t)).collect();
        assert_eq!(glyphs.len(), DeviceType::ALL.len());
    }

    #[test]
    fn blank_last_seen_reads_as_never() {
        let mut device = Device::new("d", "Device", DeviceType::Laptop, "10.0.0.9");
        assert_eq!(last_seen_label(&device), "never");
        device.last_seen = "2 mins ago".to_string();
        assert_eq!(last_seen_label(&device), "2 mins ago");
    }
}
