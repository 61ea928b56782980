use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use adsb_render::{DrawOp, DrawSink, Font, Frame, RecordingSink, RefreshMode};

/// Logs every draw call; stands in for a panel on a dev box.
#[derive(Debug, Default)]
pub struct LogSink {
    ops: usize,
    mode: Option<RefreshMode>,
}

impl DrawSink for LogSink {
    fn set_window(&mut self, mode: RefreshMode, width: u32, height: u32) {
        debug!("sink: window {:?} {}x{}", mode, width, height);
        self.mode = Some(mode);
        self.ops = 0;
    }

    fn clear(&mut self) {
        debug!("sink: clear");
    }

    fn text(&mut self, x: i32, y: i32, font: Font, text: &str) {
        self.ops += 1;
        debug!("sink: text ({}, {}) {:?} {:?}", x, y, font, text);
    }

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.ops += 1;
        debug!("sink: line ({}, {}) -> ({}, {})", x0, y0, x1, y1);
    }

    fn fill_triangle(&mut self, points: [(i32, i32); 3]) {
        self.ops += 1;
        debug!("sink: triangle {:?}", points);
    }

    fn pixel(&mut self, _x: i32, _y: i32) {
        self.ops += 1;
    }

    fn present(&mut self) -> Result<()> {
        let mode = self.mode.take().context("present without window")?;
        info!("sink: presented {:?} refresh, {} ops", mode, self.ops);
        Ok(())
    }
}

/// Writes each presented frame as JSON for an external panel driver.
///
/// The file is replaced atomically (write to `.tmp`, then rename) so a
/// reader never sees half a frame.
#[derive(Debug)]
pub struct JsonFrameSink {
    path: PathBuf,
    rec: RecordingSink,
}

impl JsonFrameSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), rec: RecordingSink::new() }
    }

    fn write(&self, frame: &Frame) -> Result<()> {
        let json = serde_json::to_vec(frame).context("encode frame")?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| format!("rename to {}", self.path.display()))?;
        Ok(())
    }
}

impl DrawSink for JsonFrameSink {
    fn set_window(&mut self, mode: RefreshMode, width: u32, height: u32) {
        self.rec.set_window(mode, width, height);
    }

    fn clear(&mut self) {
        self.rec.clear();
    }

    fn text(&mut self, x: i32, y: i32, font: Font, text: &str) {
        self.rec.text(x, y, font, text);
    }

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.rec.line(x0, y0, x1, y1);
    }

    fn fill_triangle(&mut self, points: [(i32, i32); 3]) {
        self.rec.fill_triangle(points);
    }

    fn pixel(&mut self, x: i32, y: i32) {
        self.rec.pixel(x, y);
    }

    fn present(&mut self) -> Result<()> {
        self.rec.present()?;
        // only the latest frame matters to the driver
        let frame = self.rec.presented.pop().context("no frame recorded")?;
        self.write(&frame)?;
        let texts = frame.ops.iter().filter(|op| matches!(op, DrawOp::Text { .. })).count();
        info!("sink: wrote {:?} frame ({} texts) to {}", frame.refresh, texts, self.path.display());
        Ok(())
    }
}

/// The sink selected in config.
pub enum AnySink {
    Log(LogSink),
    Json(JsonFrameSink),
}

impl DrawSink for AnySink {
    fn set_window(&mut self, mode: RefreshMode, width: u32, height: u32) {
        match self {
            AnySink::Log(s) => s.set_window(mode, width, height),
            AnySink::Json(s) => s.set_window(mode, width, height),
        }
    }

    fn clear(&mut self) {
        match self {
            AnySink::Log(s) => s.clear(),
            AnySink::Json(s) => s.clear(),
        }
    }

    fn text(&mut self, x: i32, y: i32, font: Font, text: &str) {
        match self {
            AnySink::Log(s) => s.text(x, y, font, text),
            AnySink::Json(s) => s.text(x, y, font, text),
        }
    }

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        match self {
            AnySink::Log(s) => s.line(x0, y0, x1, y1),
            AnySink::Json(s) => s.line(x0, y0, x1, y1),
        }
    }

    fn fill_triangle(&mut self, points: [(i32, i32); 3]) {
        match self {
            AnySink::Log(s) => s.fill_triangle(points),
            AnySink::Json(s) => s.fill_triangle(points),
        }
    }

    fn pixel(&mut self, x: i32, y: i32) {
        match self {
            AnySink::Log(s) => s.pixel(x, y),
            AnySink::Json(s) => s.pixel(x, y),
        }
    }

    fn present(&mut self) -> Result<()> {
        match self {
            AnySink::Log(s) => s.present(),
            AnySink::Json(s) => s.present(),
        }
    }
}
