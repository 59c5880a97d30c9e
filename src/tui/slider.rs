//! Multi-handle slider track.
//!
//! Three rows inside the block:
//! - labels for even-indexed handles (`F: 0.00`, `D: 25.00`, ...)
//! - the track, with a tick under every score and a marker per handle
//! - labels for odd-indexed handles
//!
//! A cap-only handle (the nine-band A) is drawn dimmed and is never picked
//! up by a click; it moves only from the keyboard.
//!
//! Column/value mapping lives in free functions so mouse hit-testing and
//! rendering agree on where each handle sits.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::domain::ScoreRange;
use crate::grading::BoundarySet;

const TRACK: &str = "─";
const TICK: &str = "┴";
const HANDLE: &str = "█";

/// Column (0-based, within `width`) of `value` on the track.
pub fn value_to_column(range: ScoreRange, width: u16, value: f64) -> u16 {
    if width <= 1 {
        return 0;
    }
    let u = ((value - range.min) / range.span()).clamp(0.0, 1.0);
    (u * f64::from(width - 1)).round() as u16
}

/// Track value under `column`, rounded to two decimals.
pub fn column_to_value(range: ScoreRange, width: u16, column: u16) -> f64 {
    if width <= 1 {
        return range.min;
    }
    let u = f64::from(column.min(width - 1)) / f64::from(width - 1);
    let raw = range.min + u * range.span();
    range.clamp((raw * 100.0).round() / 100.0)
}

/// Grading handle closest to `column`. Cap-only handles are skipped.
///
/// Stacked handles tie; a click at or right of the stack takes the highest
/// index (which can still move up), a click left of it the lowest.
pub fn nearest_handle(boundaries: &BoundarySet, width: u16, column: u16) -> Option<usize> {
    let range = boundaries.range();
    let mut best: Option<(usize, u16)> = None;
    for (idx, &value) in boundaries.values().iter().enumerate() {
        if boundaries.is_cap_only(idx) {
            continue;
        }
        let col = value_to_column(range, width, value);
        let dist = col.abs_diff(column);
        best = match best {
            None => Some((idx, dist)),
            Some((_, d)) if dist < d => Some((idx, dist)),
            Some((_, d)) if dist == d && column >= col => Some((idx, dist)),
            keep => keep,
        };
    }
    best.map(|(idx, _)| idx)
}

pub struct SliderTrack<'a> {
    pub boundaries: &'a BoundarySet,
    pub scores: &'a [f64],
    pub selected: usize,
    pub dragging: bool,
}

impl<'a> Widget for SliderTrack<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 10 || area.height < 3 {
            buf.set_string(area.x, area.y, "Track too small.", Style::default().fg(Color::Yellow));
            return;
        }

        let range = self.boundaries.range();
        let track_y = area.y + 1;

        for x in area.x..area.x + area.width {
            buf.set_string(x, track_y, TRACK, Style::default().fg(Color::DarkGray));
        }
        for &score in self.scores {
            let x = area.x + value_to_column(range, area.width, score);
            buf.set_string(x, track_y, TICK, Style::default().fg(Color::Gray));
        }

        let mut occupied = [vec![false; area.width as usize], vec![false; area.width as usize]];

        // Selected handle drawn last so it stays visible in a stack.
        let mut order: Vec<usize> = (0..self.boundaries.len()).filter(|&i| i != self.selected).collect();
        order.push(self.selected);

        for idx in order {
            let (Some(value), Some(label)) = (self.boundaries.get(idx), self.boundaries.handle_label(idx)) else {
                continue;
            };
            let col = value_to_column(range, area.width, value);
            let cap_only = self.boundaries.is_cap_only(idx);
            let style = handle_style(idx == self.selected, self.dragging, cap_only);
            buf.set_string(area.x + col, track_y, HANDLE, style);

            let text = if cap_only {
                format!("{label}: {value:.2} (cap)")
            } else {
                format!("{label}: {value:.2}")
            };
            let row = idx % 2;
            let len = text.chars().count() as u16;
            if len > area.width {
                continue;
            }
            let start = col.saturating_sub(len / 2).min(area.width - len);
            let cells = &mut occupied[row][start as usize..(start + len) as usize];
            if idx != self.selected && cells.iter().any(|&o| o) {
                continue;
            }
            cells.iter_mut().for_each(|o| *o = true);
            let y = if row == 0 { area.y } else { area.y + 2 };
            buf.set_string(area.x + start, y, &text, style);
        }
    }
}

fn handle_style(selected: bool, dragging: bool, cap_only: bool) -> Style {
    match (selected, dragging, cap_only) {
        (true, true, _) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        (true, false, _) => Style::default().fg(Color::Yellow),
        (false, _, true) => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(Color::Cyan),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Variant;

    fn four() -> BoundarySet {
        BoundarySet::with_defaults(Variant::Four, ScoreRange::default())
    }

    #[test]
    fn column_mapping_hits_both_ends() {
        let range = ScoreRange::default();
        assert_eq!(value_to_column(range, 101, 0.0), 0);
        assert_eq!(value_to_column(range, 101, 100.0), 100);
        assert_eq!(value_to_column(range, 101, 46.0), 46);
        assert_eq!(column_to_value(range, 101, 46), 46.0);
        assert_eq!(column_to_value(range, 101, 500), 100.0);
    }

    #[test]
    fn drag_values_round_to_two_decimals() {
        let range = ScoreRange::default();
        // 1/7 of the span is 14.2857...
        assert_eq!(column_to_value(range, 8, 1), 14.29);
    }

    #[test]
    fn nearest_handle_prefers_closest_column() {
        let set = four();
        assert_eq!(nearest_handle(&set, 101, 52), Some(0));
        assert_eq!(nearest_handle(&set, 101, 58), Some(1));
        assert_eq!(nearest_handle(&set, 101, 99), Some(3));
    }

    #[test]
    fn cap_only_handle_is_never_picked_by_mouse() {
        let set = BoundarySet::with_defaults(Variant::Nine, ScoreRange::default());
        // A sits at 95; the nearest grading handle is A- at 85.
        assert_eq!(nearest_handle(&set, 101, 95), Some(7));
        assert_eq!(nearest_handle(&set, 101, 99), Some(7));
    }

    #[test]
    fn stacked_handles_resolve_by_side() {
        let range = ScoreRange::default();
        let set = BoundarySet::new(Variant::Four, range, &[50.0, 50.0, 75.0, 85.0]).unwrap();
        assert_eq!(nearest_handle(&set, 101, 51), Some(1));
        assert_eq!(nearest_handle(&set, 101, 49), Some(0));
    }

    #[test]
    fn render_draws_ticks_handles_and_labels() {
        let set = four();
        let area = Rect::new(0, 0, 101, 3);
        let mut buf = Buffer::empty(area);
        SliderTrack {
            boundaries: &set,
            scores: &[10.0],
            selected: 0,
            dragging: false,
        }
        .render(area, &mut buf);

        assert_eq!(buf[(10, 1)].symbol(), TICK);
        assert_eq!(buf[(50, 1)].symbol(), HANDLE);
        let top: String = (0..101).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        let bottom: String = (0..101).map(|x| buf[(x, 2)].symbol().to_string()).collect();
        assert!(top.contains("D: 50.00"));
        assert!(top.contains("B: 75.00"));
        assert!(bottom.contains("C: 60.00"));
        assert!(bottom.contains("A: 85.00"));
    }

    #[test]
    fn cap_only_handle_renders_dimmed() {
        let set = BoundarySet::with_defaults(Variant::Nine, ScoreRange::default());
        let area = Rect::new(0, 0, 101, 3);
        let mut buf = Buffer::empty(area);
        SliderTrack {
            boundaries: &set,
            scores: &[],
            selected: 0,
            dragging: false,
        }
        .render(area, &mut buf);

        assert_eq!(buf[(95, 1)].symbol(), HANDLE);
        assert_eq!(buf[(95, 1)].fg, Color::DarkGray);
        assert_eq!(buf[(85, 1)].fg, Color::Cyan);
        let top: String = (0..101).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(top.contains("A: 95.00 (cap)"));
    }
}
