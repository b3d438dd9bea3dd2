use super::canvas::{Canvas, color_to_fg, luminance};

/// Density ramp, darkest first.
const CHARS: &[u8] = b" .:-=+*#%@";

/// One pixel per cell, glyph picked by brightness and tinted with the pixel color.
pub fn render(canvas: &Canvas) -> String {
    let (cols, rows) = canvas.term_size();
    let mut out = String::with_capacity(cols * rows * 12);

    for row in 0..rows {
        let mut last_fg = String::new();
        for col in 0..cols {
            let rgb = canvas.pixels[row * canvas.width + col];
            // Night scenes are dark; stretch so the sky isn't all blanks.
            let v = (luminance(rgb) * 2.5).clamp(0.0, 1.0);
            let ch = CHARS[(v * (CHARS.len() - 1) as f64) as usize] as char;

            let fg = color_to_fg(canvas.map_color(rgb));
            if fg != last_fg {
                out.push_str("\x1b[");
                out.push_str(&fg);
                out.push('m');
                last_fg = fg;
            }
            out.push(ch);
        }
        out.push_str("\x1b[0m\x1b[");
        out.push_str(&(row + 2).to_string());
        out.push_str(";1H");
    }
    out
}
