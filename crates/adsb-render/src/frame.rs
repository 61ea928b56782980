use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::cadence::RefreshMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    /// 12pt monospace bold, headers
    Title,
    /// 9pt monospace bold, everything else
    Body,
}

impl Font {
    /// Horizontal advance per glyph in pixels.
    pub fn advance(self) -> i32 {
        match self {
            Font::Title => 14,
            Font::Body => 11,
        }
    }

    pub fn text_width(self, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance()
    }
}

/// One drawing primitive. Text `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text { x: i32, y: i32, font: Font, text: String },
    Line { x0: i32, y0: i32, x1: i32, y1: i32 },
    FillTriangle { points: [(i32, i32); 3] },
    Pixel { x: i32, y: i32 },
}

/// A complete screen, ready to hand to a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub refresh: RefreshMode,
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

impl Frame {
    pub fn new(refresh: RefreshMode, width: u32, height: u32) -> Self {
        Self { refresh, width, height, ops: Vec::new() }
    }

    pub fn text(&mut self, x: i32, y: i32, font: Font, text: impl Into<String>) {
        self.ops.push(DrawOp::Text { x, y, font, text: text.into() });
    }

    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.ops.push(DrawOp::Line { x0, y0, x1, y1 });
    }

    pub fn fill_triangle(&mut self, points: [(i32, i32); 3]) {
        self.ops.push(DrawOp::FillTriangle { points });
    }

    pub fn pixel(&mut self, x: i32, y: i32) {
        self.ops.push(DrawOp::Pixel { x, y });
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }

    /// Two-phase commit: issue every primitive, then present once.
    pub fn paint<S: DrawSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.set_window(self.refresh, self.width, self.height);
        sink.clear();
        for op in &self.ops {
            match op {
                DrawOp::Text { x, y, font, text } => sink.text(*x, *y, *font, text),
                DrawOp::Line { x0, y0, x1, y1 } => sink.line(*x0, *y0, *x1, *y1),
                DrawOp::FillTriangle { points } => sink.fill_triangle(*points),
                DrawOp::Pixel { x, y } => sink.pixel(*x, *y),
            }
        }
        sink.present()
    }
}

/// A bi-stable panel (or anything standing in for one).
///
/// Calls between `set_window` and `present` describe one frame; nothing is
/// expected to be visible before `present` returns.
pub trait DrawSink {
    fn set_window(&mut self, mode: RefreshMode, width: u32, height: u32);
    fn clear(&mut self);
    fn text(&mut self, x: i32, y: i32, font: Font, text: &str);
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
    fn fill_triangle(&mut self, points: [(i32, i32); 3]);
    fn pixel(&mut self, x: i32, y: i32);
    fn present(&mut self) -> Result<()>;
}

/// Rebuilds every presented frame from the sink calls.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pending: Option<Frame>,
    pub presented: Vec<Frame>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.presented.last()
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(f) = self.pending.as_mut() {
            f.ops.push(op);
        }
    }
}

impl DrawSink for RecordingSink {
    fn set_window(&mut self, mode: RefreshMode, width: u32, height: u32) {
        self.pending = Some(Frame::new(mode, width, height));
    }

    fn clear(&mut self) {
        if let Some(f) = self.pending.as_mut() {
            f.ops.clear();
        }
    }

    fn text(&mut self, x: i32, y: i32, font: Font, text: &str) {
        self.push(DrawOp::Text { x, y, font, text: text.to_string() });
    }

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.push(DrawOp::Line { x0, y0, x1, y1 });
    }

    fn fill_triangle(&mut self, points: [(i32, i32); 3]) {
        self.push(DrawOp::FillTriangle { points });
    }

    fn pixel(&mut self, x: i32, y: i32) {
        self.push(DrawOp::Pixel { x, y });
    }

    fn present(&mut self) -> Result<()> {
        let f = self.pending.take().ok_or_else(|| anyhow::anyhow!("present without set_window"))?;
        self.presented.push(f);
        Ok(())
    }
}
