use crate::overlay::canvas::{OverlayCanvas, Rect};
use crate::overlay::text::{Anchor, TextStyle};
use crate::overlay::traits::{FrameContext, Layer};
use crate::timing::Segment;

const LINE_HEIGHT: f32 = 78.0;
const PANEL_PADDING: f32 = 28.0;
const PANEL_MARGIN: f32 = 40.0;
const PANEL_RADIUS: f32 = 28.0;
const PANEL_FILL: [u8; 4] = [10, 10, 30, 195];
const PANEL_OUTLINE: [u8; 4] = [255, 255, 255, 55];
const LABEL_OFFSET: f32 = 64.0;
const LABEL_COLOR: [u8; 4] = [255, 220, 0, 255];
const MIN_SPACE: f32 = 12.0;

/// Display state of one caption word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordState {
    Past,
    Current,
    Future,
}

impl WordState {
    pub fn of(index: usize, current: usize) -> Self {
        match index.cmp(&current) {
            std::cmp::Ordering::Less => WordState::Past,
            std::cmp::Ordering::Equal => WordState::Current,
            std::cmp::Ordering::Greater => WordState::Future,
        }
    }

    pub fn color(self) -> [u8; 4] {
        match self {
            WordState::Past => [160, 160, 160, 255],
            WordState::Current => [255, 220, 0, 255],
            WordState::Future => [255, 255, 255, 255],
        }
    }
}

/// Greedy wrap of whole words into lines of at most `width` characters
///
/// Returns word indices per line. A word longer than `width` gets a line of
/// its own rather than being split, so indices stay aligned with the word
/// intervals.
pub fn wrap_words<S: AsRef<str>>(words: &[S], width: usize) -> Vec<Vec<usize>> {
    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut used = 0;

    for (index, word) in words.iter().enumerate() {
        let len = word.as_ref().chars().count();
        let needed = if current.is_empty() { len } else { used + 1 + len };
        if !current.is_empty() && needed > width {
            lines.push(std::mem::take(&mut current));
            used = len;
        } else {
            used = needed;
        }
        current.push(index);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Caption panel for the active segment with per-word highlighting
pub struct KaraokeLayer;

impl KaraokeLayer {
    fn draw_segment(canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>, index: usize, segment: &Segment) {
        let sizes = &ctx.overlay.font_sizes;
        let current = segment.current_word(ctx.t - segment.start_offset);
        let lines = wrap_words(&segment.words, ctx.overlay.caption_wrap);

        let (w, h) = (ctx.width(), ctx.height());
        let panel_h = lines.len().max(1) as f32 * LINE_HEIGHT + PANEL_PADDING * 2.0;
        let panel_x = PANEL_MARGIN;
        let panel_y = (h / 2.0 - panel_h / 2.0).floor();
        let panel = Rect::new(panel_x, panel_y, w - PANEL_MARGIN, panel_y + panel_h);

        canvas.fill_rounded_rect(panel, PANEL_RADIUS, PANEL_FILL);
        canvas.stroke_rounded_rect(panel, PANEL_RADIUS, 2.0, PANEL_OUTLINE);

        let label = ctx.overlay.fact_label.replace("{n}", &(index + 1).to_string());
        let label_style = TextStyle::new(sizes.label, LABEL_COLOR).stroke(2, [0, 0, 0, 200]);
        ctx.text.draw(canvas, &label, w / 2.0, panel_y - LABEL_OFFSET, &label_style);

        let space = ctx.text.measure(" ", sizes.caption).max(MIN_SPACE);
        let mut y = panel_y + PANEL_PADDING + LINE_HEIGHT / 2.0;

        for line in &lines {
            let widths: Vec<f32> = line
                .iter()
                .map(|&i| ctx.text.measure(&segment.words[i], sizes.caption))
                .collect();
            let line_width = widths.iter().sum::<f32>() + space * (line.len() as f32 - 1.0);
            let mut x = (w / 2.0 - line_width / 2.0).floor();

            for (&word_index, word_width) in line.iter().zip(&widths) {
                let style = TextStyle::new(sizes.caption, WordState::of(word_index, current).color())
                    .anchor(Anchor::LeftMiddle)
                    .stroke(2, [0, 0, 0, 180]);
                ctx.text.draw(canvas, &segment.words[word_index], x, y, &style);
                x += word_width + space;
            }
            y += LINE_HEIGHT;
        }
    }
}

impl Layer for KaraokeLayer {
    fn name(&self) -> &str {
        "karaoke"
    }

    fn draw(&self, canvas: &mut OverlayCanvas, ctx: &FrameContext<'_>) {
        if let Some((index, segment)) = ctx.timeline.active_segment(ctx.t) {
            Self::draw_segment(canvas, ctx, index, segment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CanvasConfig, OverlayConfig};
    use crate::overlay::text::TextRenderer;
    use crate::timing::{Timeline, WordTimingEstimator};

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_wrap_words_greedy() {
        let w = words("Honey never spoils and archaeologists found edible honey");
        let lines = wrap_words(&w, 25);
        assert_eq!(lines, vec![vec![0, 1, 2, 3], vec![4, 5], vec![6, 7]]);
    }

    #[test]
    fn test_wrap_keeps_long_words_whole() {
        let w = words("a supercalifragilisticexpialidocious b");
        assert_eq!(wrap_words(&w, 10), vec![vec![0], vec![1], vec![2]]);
        assert!(wrap_words::<String>(&[], 25).is_empty());
    }

    #[test]
    fn test_word_states() {
        assert_eq!(WordState::of(0, 2), WordState::Past);
        assert_eq!(WordState::of(2, 2), WordState::Current);
        assert_eq!(WordState::of(3, 2), WordState::Future);
    }

    #[test]
    fn test_panel_drawn_only_while_segment_active() {
        let timeline = Timeline::build(&[("Hi wonderful", 2.0)], &WordTimingEstimator::default(), 1.0);
        let canvas_config = CanvasConfig { width: 216, height: 384, fps: 30 };
        let overlay = OverlayConfig::default();
        let text = TextRenderer::without_font();

        let draw_at = |t: f64| {
            let ctx = FrameContext { t, timeline: &timeline, canvas: &canvas_config, overlay: &overlay, text: &text };
            let mut canvas = OverlayCanvas::new(216, 384).unwrap();
            KaraokeLayer.draw(&mut canvas, &ctx);
            canvas
        };

        assert_eq!(draw_at(1.0).pixel(108, 192), PANEL_FILL);
        assert_eq!(draw_at(2.5).pixel(108, 192)[3], 0);
    }
}
