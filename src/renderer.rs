//! Renderer for widget documents
//!
//! Paints the flattened tree in document order onto a `DrawSurface`, then
//! compares the result with the previous frame to find the region that
//! actually needs presenting.

use crate::canvas::{Canvas, DrawSurface, BACKGROUND};
use crate::dom::{Document, Node, NodeId, NodeKind};
use crate::fonts::{FontCache, FontProvider};
use crate::geometry::Rect;
use crate::input::InputState;

/// Horizontal padding of text inside an input
pub const INPUT_PADDING: f32 = 6.0;
/// Average glyph width as a fraction of the font size
pub const AVG_CHAR_WIDTH: f32 = 0.55;
/// Distance of the caret ends from the input's top and bottom
const CARET_MARGIN: f32 = 5.0;

pub struct Renderer<F: FontProvider = FontCache> {
    fonts: F,
    previous: Option<Canvas>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_fonts(FontCache::default())
    }
}

impl<F: FontProvider> Renderer<F> {
    pub fn with_fonts(fonts: F) -> Self {
        Self { fonts, previous: None }
    }

    /// Draws a full frame and returns the region that changed since the
    /// last call, or `None` when nothing did.
    pub fn render(&mut self, canvas: &mut Canvas, doc: &Document, input: &InputState) -> Option<Rect> {
        canvas.clear(BACKGROUND);
        paint(canvas, &mut self.fonts, doc, input);

        let dirty = match &self.previous {
            Some(prev) => canvas.diff_bounds(prev),
            None => Some(canvas.bounds()).filter(|r| !r.is_empty()),
        };
        let same_size = |p: &&mut Canvas| p.width == canvas.width && p.height == canvas.height;
        if let Some(prev) = self.previous.as_mut().filter(same_size) {
            prev.pixels.copy_from_slice(&canvas.pixels);
        } else {
            self.previous = Some(canvas.clone());
        }
        dirty
    }
}

/// Paints every node of `doc` in document order.
pub fn paint<S: DrawSurface, F: FontProvider>(surface: &mut S, fonts: &mut F, doc: &Document, input: &InputState) {
    for id in doc.flatten() {
        let node = doc.node(id);
        match node.kind {
            NodeKind::Element if node.tag == "input" => draw_input(surface, fonts, doc, id, input),
            NodeKind::Element => draw_box(surface, node, input),
            NodeKind::Text | NodeKind::CData => {
                if let Some(parent) = node.parent {
                    draw_label(surface, fonts, doc.node(parent), &node.tag);
                }
            }
            NodeKind::Document | NodeKind::Declaration | NodeKind::Comment => {}
        }
    }
}

fn draw_box<S: DrawSurface>(surface: &mut S, node: &Node, input: &InputState) {
    let (px, py) = input.pointer;
    let color = if node.frame.contains(px, py) {
        node.style.hover_color
    } else {
        node.style.background_color
    };
    surface.fill_rect(node.frame.bounds(), color);
}

/// Text vertically centered in the box of the element that holds it, placed
/// horizontally by that element's `text-align` and drawn in its font.
fn draw_label<S: DrawSurface, F: FontProvider>(surface: &mut S, fonts: &mut F, parent: &Node, text: &str) {
    let style = &parent.style;
    let Some(font) = fonts.font(&style.font_family, style.font_size) else {
        return;
    };
    let f = parent.frame;
    let h = style.text_align.anchor();
    let at = (f.rel_x + f.width * h, f.rel_y + f.height / 2.0);
    surface.draw_text_anchored(font, text, style.font_size, at, (h, 0.5), style.font_color);
}

fn draw_input<S: DrawSurface, F: FontProvider>(
    surface: &mut S,
    fonts: &mut F,
    doc: &Document,
    id: NodeId,
    input: &InputState,
) {
    let node = doc.node(id);
    let style = &node.style;
    let f = node.frame;
    let (x, y) = (f.rel_x + 0.5, f.rel_y + 0.5);
    let (w, h) = (f.width, f.height);

    // border
    let bw = style.border_width;
    let bc = style.border_color;
    surface.stroke_line((x, y), (x + w, y), bw, bc);
    surface.stroke_line((x, y), (x, y + h), bw, bc);
    surface.stroke_line((x + w, y), (x + w, y + h), bw, bc);
    surface.stroke_line((x, y + h), (x + w, y + h), bw, bc);

    let (shown, text_width) = visible_tail(&node.value, w - INPUT_PADDING * 2.0, style.font_size);

    if input.is_active(id) && input.pointer_inside(doc, id) {
        let cx = f.rel_x + INPUT_PADDING + text_width;
        surface.stroke_line((cx, y + CARET_MARGIN), (cx, y + h - CARET_MARGIN), 1.0, style.font_color);
    }

    if shown.is_empty() {
        return;
    }
    let Some(font) = fonts.font(&style.font_family, style.font_size) else {
        return;
    };
    let text: String = shown.iter().collect();
    surface.draw_text_anchored(
        font,
        &text,
        style.font_size,
        (f.rel_x + INPUT_PADDING, f.rel_y + h / 2.0),
        (0.0, 0.4),
        style.font_color,
    );
}

/// The longest tail of `value` whose estimated width fits in `available`,
/// and that estimated width.
pub fn visible_tail(value: &[char], available: f32, font_size: f32) -> (&[char], f32) {
    let avg = font_size * AVG_CHAR_WIDTH;
    if avg <= 0.0 {
        return (value, 0.0);
    }
    let full = value.len() as f32 * avg;
    if full <= available {
        return (value, full);
    }
    let fit = (available.max(0.0) / avg).floor() as usize;
    let tail = &value[value.len() - fit.min(value.len())..];
    (tail, tail.len() as f32 * avg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, MouseButton};
    use crate::parser::parse;
    use crate::style::Color;
    use fontdue::Font;

    const DOC: &str = r##"<window width="200" height="120" style="background-color: #101010">
        <button id="btn" height="30" style="background-color: #0000ff; hover-color: #00ff00"/>
        <input id="field" height="30" value="hi" style="border-color: #ff0000; font-family: /missing.ttf"/>
    </window>"##;

    /// Records draw calls instead of rasterizing them.
    #[derive(Default)]
    struct Recorder {
        fills: Vec<(Rect, Color)>,
        lines: Vec<((f32, f32), (f32, f32), Color)>,
        texts: Vec<String>,
    }

    impl DrawSurface for Recorder {
        fn size(&self) -> (u32, u32) {
            (200, 120)
        }
        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.fills.push((rect, color));
        }
        fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), _width: f32, color: Color) {
            self.lines.push((from, to, color));
        }
        fn draw_text_anchored(
            &mut self,
            _font: &Font,
            text: &str,
            _size: f32,
            _at: (f32, f32),
            _anchor: (f32, f32),
            _color: Color,
        ) {
            self.texts.push(text.to_string());
        }
    }

    #[test]
    fn unchanged_frame_is_clean() {
        let doc = parse(DOC).expect("parse");
        let input = InputState::new();
        let mut renderer = Renderer::new();
        let mut canvas = Canvas::new(200, 120);

        assert_eq!(renderer.render(&mut canvas, &doc, &input), Some(Rect::new(0, 0, 200, 120)));
        assert_eq!(renderer.render(&mut canvas, &doc, &input), None);
    }

    #[test]
    fn hover_dirties_exactly_the_hovered_box() {
        let mut doc = parse(DOC).expect("parse");
        let btn = doc.find_by_id("btn").expect("btn");
        let mut input = InputState::new();
        let mut renderer = Renderer::new();
        let mut canvas = Canvas::new(200, 120);
        renderer.render(&mut canvas, &doc, &input);

        input.apply(&mut doc, &Event::MouseMove { x: 50.0, y: 20.0 });
        let dirty = renderer.render(&mut canvas, &doc, &input);
        assert_eq!(dirty, Some(doc.node(btn).frame.bounds()));
        assert_eq!(canvas.pixel(50, 20), Some(0x00FF00));

        input.apply(&mut doc, &Event::MouseMove { x: 5.0, y: 5.0 });
        let dirty = renderer.render(&mut canvas, &doc, &input);
        assert_eq!(dirty, Some(doc.node(btn).frame.bounds()));
        assert_eq!(canvas.pixel(50, 20), Some(0x0000FF));
    }

    #[test]
    fn input_gets_border_and_caret_only_when_focused_and_hovered() {
        let mut doc = parse(DOC).expect("parse");
        let field = doc.find_by_id("field").expect("field");
        let f = doc.node(field).frame;
        let mut input = InputState::new();
        let mut fonts = FontCache::default();

        let mut rec = Recorder::default();
        paint(&mut rec, &mut fonts, &doc, &input);
        let red = Color::from_rgb(255, 0, 0);
        assert_eq!(rec.lines.iter().filter(|l| l.2 == red).count(), 4);
        assert_eq!(rec.lines.len(), 4);
        // inputs have no background fill
        assert!(rec.fills.iter().all(|(r, _)| *r != f.bounds()));
        // font is missing, so no text
        assert!(rec.texts.is_empty());

        let (cx, cy) = (f.rel_x + 5.0, f.rel_y + 5.0);
        input.apply(&mut doc, &Event::MouseMove { x: cx, y: cy });
        input.apply(&mut doc, &Event::MouseUp { x: cx, y: cy, button: MouseButton::Left });
        assert_eq!(input.active, Some(field));

        let mut rec = Recorder::default();
        paint(&mut rec, &mut fonts, &doc, &input);
        assert_eq!(rec.lines.len(), 5);
        let caret_x = f.rel_x + INPUT_PADDING + 2.0 * (14.0 * AVG_CHAR_WIDTH);
        assert_eq!(rec.lines[4].0 .0, caret_x);

        input.apply(&mut doc, &Event::MouseMove { x: 1.0, y: 1.0 });
        let mut rec = Recorder::default();
        paint(&mut rec, &mut fonts, &doc, &input);
        assert_eq!(rec.lines.len(), 4);
    }

    fn label_doc(align: &str) -> Document {
        let white = "background-color: #ffffff; hover-color: #ffffff";
        parse(&format!(
            r##"<window width="200" height="100" style="{white}">
                <label id="lbl" height="40" style="{white}; font-color: #000000; font-size: 20; text-align: {align}">Hi</label>
            </window>"##
        ))
        .expect("parse")
    }

    /// Renders `doc` and returns the frame of `lbl` plus every non-white pixel.
    fn ink(doc: &Document) -> (crate::geometry::NodeBox, Vec<(f32, f32)>) {
        let f = doc.node(doc.find_by_id("lbl").expect("label")).frame;
        let mut canvas = Canvas::new(200, 100);
        Renderer::new().render(&mut canvas, doc, &InputState::new());
        let ink = (0..100usize)
            .flat_map(|y| (0..200usize).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) != Some(0xFFFFFF))
            .map(|(x, y)| (x as f32, y as f32))
            .collect();
        (f, ink)
    }

    #[test]
    fn label_text_is_centered_in_its_parent() {
        let (f, ink) = ink(&label_doc("center"));
        assert!(!ink.is_empty());
        assert!(ink.iter().all(|&(x, y)| f.contains(x, y)));

        let n = ink.len() as f32;
        let cx = ink.iter().map(|p| p.0).sum::<f32>() / n;
        let cy = ink.iter().map(|p| p.1).sum::<f32>() / n;
        assert!((cx - (f.rel_x + f.width / 2.0)).abs() < 4.0, "cx {}", cx);
        assert!((cy - (f.rel_y + f.height / 2.0)).abs() < 5.0, "cy {}", cy);
    }

    #[test]
    fn text_align_moves_label_to_the_edges() {
        let (f, ink) = ink(&label_doc("left"));
        let left = ink.iter().map(|p| p.0).fold(f32::MAX, f32::min);
        assert!(left >= f.rel_x && left < f.rel_x + 5.0, "left {}", left);

        let (f, ink) = self::ink(&label_doc("right"));
        let right = ink.iter().map(|p| p.0).fold(f32::MIN, f32::max);
        let edge = f.rel_x + f.width;
        assert!(right < edge && right > edge - 6.0, "right {}", right);
    }

    #[test]
    fn long_values_keep_their_tail() {
        let value: Vec<char> = "abcdefghij".chars().collect();
        // 11 px per char at size 20
        let (tail, width) = visible_tail(&value, 33.0, 20.0);
        assert_eq!(tail.iter().collect::<String>(), "hij");
        assert_eq!(width, 33.0);

        let (all, _) = visible_tail(&value, 1000.0, 20.0);
        assert_eq!(all.len(), 10);
        let (none, w) = visible_tail(&value, -5.0, 20.0);
        assert!(none.is_empty());
        assert_eq!(w, 0.0);
    }
}
