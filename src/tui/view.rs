use crate::pipeline::config::Config;
use crate::shared::{CompositionSnapshot, StepRecord};
use super::grid::SequenceGrid;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};
use ratatui::Frame;

const PART_COLORS: [Color; 3] = [Color::Magenta, Color::Yellow, Color::Cyan];
const BLOCK_COLORS: [Color; 4] = [Color::Magenta, Color::Cyan, Color::Yellow, Color::White];
const NUM_BLOCKS: usize = 5;
/// Cutoff that fills the filter gauge.
const FILTER_GAUGE_MAX: f64 = 10_000.0;

/// What the screen needs from the config: the mode label and which part
/// goes in which column. Columns run left to right by pan position.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayLayout {
    pub mode_label: String,
    pub columns: Vec<(usize, String)>, // (part index, name)
}

impl DisplayLayout {
    pub fn from_config(config: &Config) -> Self {
        let mut columns: Vec<(usize, String, f64)> = config
            .parts
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.name.clone(), p.pan))
            .collect();
        columns.sort_by(|a, b| a.2.total_cmp(&b.2));
        Self {
            mode_label: config.mode_label.clone(),
            columns: columns.into_iter().map(|(i, name, _)| (i, name)).collect(),
        }
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &CompositionSnapshot, layout: &DisplayLayout) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // key + toggles
            Constraint::Min(0),    // part columns
        ])
        .split(area);

    draw_header(frame, sections[0], state, layout);
    draw_parts(frame, sections[1], state, layout);

    if state.visual_effect_enabled {
        draw_random_blocks(frame, area, state.tick);
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}

fn draw_header(frame: &mut Frame, area: Rect, state: &CompositionSnapshot, layout: &DisplayLayout) {
    let line = Line::from(vec![
        Span::styled(format!("Key: {} {}", state.key_name, layout.mode_label), Style::default().fg(Color::White).bold()),
        Span::raw("   "),
        Span::styled(format!("[k] kick {}", on_off(state.percussion_enabled)), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(format!("[m] blocks {}", on_off(state.visual_effect_enabled)), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled("[q] quit", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_parts(frame: &mut Frame, area: Rect, state: &CompositionSnapshot, layout: &DisplayLayout) {
    if layout.columns.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, layout.columns.len() as u32); layout.columns.len()];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (col, (part_idx, name)) in layout.columns.iter().enumerate() {
        let color = PART_COLORS[col % PART_COLORS.len()];
        // nothing to show before the first tick
        let Some(record) = state.parts.get(*part_idx) else { continue };
        draw_part(frame, cols[col], name, record, color);
    }
}

// Same shape as a pretty-printed record, with the sequence kept on one line.
fn record_lines(record: &StepRecord) -> Vec<String> {
    let seq: Vec<String> = record.sequence.iter().map(u8::to_string).collect();
    vec![
        "{".to_string(),
        format!(" \"step\": {},", record.step_index),
        format!(" \"filter\": {},", record.filter_value),
        format!(" \"delayFb\": {},", record.feedback_percent),
        format!(" \"seq\": [{}]", seq.join(",")),
        "}".to_string(),
    ]
}

fn draw_part(frame: &mut Frame, area: Rect, name: &str, record: &StepRecord, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(name.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),  // record dump
            Constraint::Length(1),  // filter gauge
            Constraint::Length(1),  // feedback gauge
            Constraint::Min(0),     // sequence grid
        ])
        .split(inner);

    let text: Vec<Line> = record_lines(record).into_iter().map(Line::from).collect();
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(color).dim()), rows[0]);

    let filter_ratio = (record.filter_value as f64 / FILTER_GAUGE_MAX).clamp(0.0, 1.0);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color))
            .label(format!("cutoff {} Hz", record.filter_value))
            .ratio(filter_ratio),
        rows[1],
    );
    let fb_ratio = (record.feedback_percent as f64 / 100.0).clamp(0.0, 1.0);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color))
            .label(format!("feedback {}%", record.feedback_percent))
            .ratio(fb_ratio),
        rows[2],
    );

    frame.render_widget(SequenceGrid { record, color }, rows[3]);
}

// floor(u * max), like the engine's index draw
fn rnd(rng: &mut Pcg32, max: u16) -> u16 {
    (rng.gen_range(0.0..1.0) * max as f64) as u16
}

/// Rectangles for the colour-block effect. Seeded by tick so the picture
/// holds still between steps.
pub fn random_blocks(area: Rect, tick: u64) -> Vec<(Rect, Color)> {
    let mut rng = Pcg32::seed_from_u64(tick);
    (0..NUM_BLOCKS)
        .map(|_| {
            let color = BLOCK_COLORS[rnd(&mut rng, BLOCK_COLORS.len() as u16) as usize];
            let x = rnd(&mut rng, area.width);
            let y = rnd(&mut rng, area.height);
            let w = rnd(&mut rng, area.width - x);
            let h = rnd(&mut rng, area.height - y);
            (Rect::new(area.x + x, area.y + y, w, h), color)
        })
        .collect()
}

fn draw_random_blocks(frame: &mut Frame, area: Rect, tick: u64) {
    for (rect, color) in random_blocks(area, tick) {
        frame.render_widget(Clear, rect);
        frame.render_widget(Block::default().style(Style::default().bg(color)), rect);
    }
}
