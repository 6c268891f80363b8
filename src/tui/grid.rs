use crate::shared::StepRecord;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

/// Semitone range drawn across the grid: two octaves.
pub const GRID_COLUMNS: u16 = 24;

// One row per sequence slot, with a block at the column of its semitone
// offset. The slot that just played is drawn white, with a marker at the left edge.
pub struct SequenceGrid<'a> {
    pub record: &'a StepRecord,
    pub color: Color,
}

impl Widget for SequenceGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height == 0 {
            return;
        }
        // first column is the step marker
        let cell_w = ((area.width - 1) / GRID_COLUMNS).max(1);

        for (i, &note) in self.record.sequence.iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.bottom() {
                break;
            }
            let current = i == self.record.step_index;
            let style = if current {
                Style::default().bg(Color::White)
            } else {
                Style::default().bg(self.color)
            };
            if current {
                buf.set_string(area.x, y, "▸", Style::default().fg(Color::White));
            }
            let x0 = area.x + 1 + note.min(GRID_COLUMNS as u8 - 1) as u16 * cell_w;
            for x in x0..(x0 + cell_w).min(area.right()) {
                buf.set_string(x, y, " ", style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_block_at_note_column_and_marks_current_step() {
        let record = StepRecord {
            step_index: 1,
            filter_value: 800,
            feedback_percent: 40,
            sequence: vec![0, 3, 12],
        };
        let area = Rect::new(0, 0, 25, 4);
        let mut buf = Buffer::empty(area);
        SequenceGrid { record: &record, color: Color::Magenta }.render(area, &mut buf);

        assert_eq!(buf[(1u16, 0u16)].bg, Color::Magenta);
        assert_eq!(buf[(4u16, 1u16)].bg, Color::White);
        assert_eq!(buf[(0u16, 1u16)].symbol(), "▸");
        assert_eq!(buf[(13u16, 2u16)].bg, Color::Magenta);
        assert_eq!(buf[(2u16, 0u16)].bg, Color::Reset);
    }
}
