use super::canvas::{Canvas, color_to_bg, color_to_fg};

/// Each cell is '▀': the top pixel as foreground, the bottom as background.
/// SGR codes are only emitted when they differ from the previous cell.
pub fn render(canvas: &Canvas) -> String {
    let (cols, rows) = canvas.term_size();
    let mut out = String::with_capacity(cols * rows * 24);

    for row in 0..rows {
        let mut last_fg = String::new();
        let mut last_bg = String::new();

        for col in 0..cols {
            let top = canvas.pixels[row * 2 * canvas.width + col];
            let bottom = canvas.pixels[(row * 2 + 1) * canvas.width + col];
            let fg = color_to_fg(canvas.map_color(top));
            let bg = color_to_bg(canvas.map_color(bottom));

            match (fg != last_fg, bg != last_bg) {
                (true, true) => {
                    out.push_str("\x1b[");
                    out.push_str(&fg);
                    out.push(';');
                    out.push_str(&bg);
                    out.push('m');
                }
                (true, false) => {
                    out.push_str("\x1b[");
                    out.push_str(&fg);
                    out.push('m');
                }
                (false, true) => {
                    out.push_str("\x1b[");
                    out.push_str(&bg);
                    out.push('m');
                }
                (false, false) => {}
            }
            last_fg = fg;
            last_bg = bg;
            out.push('▀');
        }

        out.push_str("\x1b[0m\x1b[");
        out.push_str(&(row + 2).to_string());
        out.push_str(";1H");
    }
    out
}
