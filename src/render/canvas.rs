use crossterm::style::Color;

use crate::sim::Rgb;

/// How canvas pixels become terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Half-block characters ▀ with separate fg/bg (1x2 pixels per cell)
    HalfBlock,
    /// Plain ASCII characters with density mapping (1x1)
    Ascii,
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// 24-bit true color (RGB)
    TrueColor,
    /// 256-color palette
    Ansi256,
    /// ANSI 16 colors
    Ansi16,
}

/// An RGB pixel buffer in sub-cell coordinates.
///
/// The scene is fully painted every frame (sky, pond, entities), so unlike a
/// sparse particle canvas every pixel carries its own color.
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgb>,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
}

impl Canvas {
    pub fn new(term_cols: usize, term_rows: usize, render_mode: RenderMode, color_mode: ColorMode) -> Self {
        let (width, height) = match render_mode {
            RenderMode::HalfBlock => (term_cols, term_rows * 2),
            RenderMode::Ascii => (term_cols, term_rows),
        };
        Canvas {
            width,
            height,
            pixels: vec![(0, 0, 0); width * height],
            render_mode,
            color_mode,
        }
    }

    #[allow(dead_code)]
    pub fn fill(&mut self, rgb: Rgb) {
        self.pixels.fill(rgb);
    }

    #[inline]
    #[allow(dead_code)]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Set a pixel. Out-of-range coordinates (including negative) are ignored.
    #[inline]
    pub fn set(&mut self, x: i64, y: i64, rgb: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = rgb;
        }
    }

    /// Alpha-blend `rgb` over the existing pixel.
    #[inline]
    pub fn blend(&mut self, x: i64, y: i64, rgb: Rgb, alpha: f64) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx] = mix(self.pixels[idx], rgb, alpha);
    }

    /// Terminal dimensions needed for this canvas
    pub fn term_size(&self) -> (usize, usize) {
        match self.render_mode {
            RenderMode::HalfBlock => (self.width, self.height / 2),
            RenderMode::Ascii => (self.width, self.height),
        }
    }

    /// Render the canvas to an escape-sequence string, one row per terminal line.
    pub fn render(&self) -> String {
        match self.render_mode {
            RenderMode::HalfBlock => super::halfblock::render(self),
            RenderMode::Ascii => super::ascii::render(self),
        }
    }

    pub fn map_color(&self, (r, g, b): Rgb) -> Color {
        match self.color_mode {
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                let idx = 16 + 36 * (r as u16 / 51) + 6 * (g as u16 / 51) + b as u16 / 51;
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => {
                let brightness = (r as u16 + g as u16 + b as u16) / 3;
                let bright = brightness > 150;
                if brightness < 24 {
                    Color::Black
                } else if r > g && r > b {
                    if bright { Color::Red } else { Color::DarkRed }
                } else if g > r && g > b {
                    if bright { Color::Green } else { Color::DarkGreen }
                } else if b > r && b > g {
                    if bright { Color::Blue } else { Color::DarkBlue }
                } else if bright {
                    Color::White
                } else {
                    Color::DarkGrey
                }
            }
        }
    }
}

/// Linear blend from `base` towards `over`.
pub fn mix(base: Rgb, over: Rgb, alpha: f64) -> Rgb {
    let a = alpha.clamp(0.0, 1.0);
    let ch = |b: u8, o: u8| (b as f64 + (o as f64 - b as f64) * a).round() as u8;
    (ch(base.0, over.0), ch(base.1, over.1), ch(base.2, over.2))
}

/// Perceived brightness 0.0..=1.0.
pub fn luminance((r, g, b): Rgb) -> f64 {
    (0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64) / 255.0
}

pub fn color_to_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("38;2;{};{};{}", r, g, b),
        Color::AnsiValue(v) => format!("38;5;{}", v),
        Color::Black => "30".into(),
        Color::DarkRed => "31".into(),
        Color::DarkGreen => "32".into(),
        Color::DarkBlue => "34".into(),
        Color::DarkGrey => "90".into(),
        Color::Red => "91".into(),
        Color::Green => "92".into(),
        Color::Blue => "94".into(),
        Color::White => "97".into(),
        _ => "37".into(),
    }
}

pub fn color_to_bg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("48;2;{};{};{}", r, g, b),
        Color::AnsiValue(v) => format!("48;5;{}", v),
        Color::Black => "40".into(),
        Color::DarkRed => "41".into(),
        Color::DarkGreen => "42".into(),
        Color::DarkBlue => "44".into(),
        Color::DarkGrey => "100".into(),
        Color::Red => "101".into(),
        Color::Green => "102".into(),
        Color::Blue => "104".into(),
        Color::White => "107".into(),
        _ => "40".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_block_doubles_vertical_resolution() {
        let canvas = Canvas::new(80, 24, RenderMode::HalfBlock, ColorMode::TrueColor);
        assert_eq!((canvas.width, canvas.height), (80, 48));
        assert_eq!(canvas.term_size(), (80, 24));

        let ascii = Canvas::new(80, 24, RenderMode::Ascii, ColorMode::TrueColor);
        assert_eq!((ascii.width, ascii.height), (80, 24));
    }

    #[test]
    fn writes_outside_the_canvas_are_ignored() {
        let mut canvas = Canvas::new(4, 2, RenderMode::HalfBlock, ColorMode::TrueColor);
        canvas.set(-1, 0, (255, 0, 0));
        canvas.set(0, -1, (255, 0, 0));
        canvas.set(4, 0, (255, 0, 0));
        canvas.blend(0, 4, (255, 0, 0), 1.0);
        assert!(canvas.pixels.iter().all(|&p| p == (0, 0, 0)));

        canvas.set(3, 3, (1, 2, 3));
        assert_eq!(canvas.get(3, 3), Some((1, 2, 3)));
        assert_eq!(canvas.get(4, 3), None);
    }

    #[test]
    fn blend_interpolates() {
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
        assert_eq!(mix((10, 10, 10), (200, 200, 200), 0.0), (10, 10, 10));
        assert_eq!(mix((10, 10, 10), (200, 200, 200), 3.0), (200, 200, 200));
    }

    #[test]
    fn ansi256_uses_the_color_cube() {
        let canvas = Canvas::new(1, 1, RenderMode::Ascii, ColorMode::Ansi256);
        assert_eq!(canvas.map_color((255, 0, 0)), Color::AnsiValue(196));
        assert_eq!(canvas.map_color((0, 0, 0)), Color::AnsiValue(16));
    }

    #[test]
    fn ansi16_picks_the_dominant_channel() {
        let canvas = Canvas::new(1, 1, RenderMode::Ascii, ColorMode::Ansi16);
        assert_eq!(canvas.map_color((5, 5, 5)), Color::Black);
        assert_eq!(canvas.map_color((20, 40, 100)), Color::DarkBlue);
        assert_eq!(canvas.map_color((255, 150, 50)), Color::Red);
    }
}
