use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutKind {
    /// 4.2" 400x300 panel
    #[serde(rename = "panel-420")]
    Panel420,
    /// 7.5" 800x480 panel
    #[serde(rename = "panel-750")]
    Panel750,
}

/// Pixel geometry and text budgets for one panel size.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,

    pub header_baseline: i32,
    pub header_rule_y: i32,

    pub first_line_y: i32,
    pub card_pitch: i32,
    pub line_gap: i32,
    pub max_cards: usize,
    pub separator_step: usize,

    // card columns
    pub col_ident: i32,
    pub col_position: i32,
    pub col_detail: i32,
    pub col_heading: i32,

    /// Characters available for the airline/type description.
    pub desc_chars: usize,
    /// Shown when neither airline nor type is known.
    pub unknown_label: &'static str,
    pub heading_degrees: bool,

    pub footer_rule_y: i32,
    pub footer_baseline: i32,
    pub weather_x: i32,

    pub placeholder: (i32, i32),
    pub error_chars: usize,
}

impl Layout {
    pub fn for_kind(kind: LayoutKind) -> Self {
        match kind {
            LayoutKind::Panel420 => Self::panel_420(),
            LayoutKind::Panel750 => Self::panel_750(),
        }
    }

    pub fn panel_420() -> Self {
        Self {
            width: 400,
            height: 300,
            header_baseline: 25,
            header_rule_y: 35,
            first_line_y: 57,
            card_pitch: 58,
            line_gap: 20,
            max_cards: 4,
            separator_step: 6,
            col_ident: 5,
            col_position: 105,
            col_detail: 210,
            col_heading: 330,
            desc_chars: 17,
            unknown_label: "",
            heading_degrees: false,
            footer_rule_y: 275,
            footer_baseline: 293,
            weather_x: 175,
            placeholder: (100, 150),
            error_chars: 34,
        }
    }

    pub fn panel_750() -> Self {
        Self {
            width: 800,
            height: 480,
            header_baseline: 25,
            header_rule_y: 35,
            first_line_y: 57,
            card_pitch: 56,
            line_gap: 20,
            max_cards: 7,
            separator_step: 6,
            col_ident: 5,
            col_position: 150,
            col_detail: 300,
            col_heading: 640,
            desc_chars: 34,
            unknown_label: "unknown",
            heading_degrees: true,
            footer_rule_y: 455,
            footer_baseline: 473,
            weather_x: 520,
            placeholder: (300, 240),
            error_chars: 70,
        }
    }

    /// Baselines of the two text lines of card `i`.
    pub fn card_lines(&self, i: usize) -> (i32, i32) {
        let y1 = self.first_line_y + i as i32 * self.card_pitch;
        (y1, y1 + self.line_gap)
    }
}
