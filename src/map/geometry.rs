use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Scanline-fill a polygon given its projected screen vertices.
/// Used to paint the hovered/selected region solid so it reads as lifted
/// above the outline layer.
pub fn fill_polygon(canvas: &mut BrailleCanvas, pts: &[(i32, i32)]) {
    if pts.len() < 3 {
        return;
    }

    let min_y = pts.iter().map(|p| p.1).min().unwrap_or(0).max(0);
    let max_y = pts
        .iter()
        .map(|p| p.1)
        .max()
        .unwrap_or(0)
        .min(canvas.pixel_height() as i32 - 1);

    let mut crossings: Vec<i32> = Vec::with_capacity(8);

    for y in min_y..=max_y {
        crossings.clear();

        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            let (xi, yi) = pts[i];
            let (xj, yj) = pts[j];
            if (yi > y) != (yj > y) {
                let x = xi + (xj - xi) * (y - yi) / (yj - yi);
                crossings.push(x);
            }
            j = i;
        }

        crossings.sort_unstable();
        let max_x = canvas.pixel_width() as i32 - 1;
        for pair in crossings.chunks_exact(2) {
            canvas.fill_run(pair[0], pair[1].min(max_x), y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        let s = canvas.to_string();
        assert!(s.starts_with('⠉'));
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn fill_square_covers_interior() {
        let mut canvas = BrailleCanvas::new(4, 2);
        // 8x8 pixel square
        fill_polygon(&mut canvas, &[(0, 0), (7, 0), (7, 7), (0, 7)]);
        let s = canvas.to_string();
        // Interior rows fully set in the covered cells
        assert!(s.contains('⣿'));
    }

    #[test]
    fn fill_degenerate_polygon_is_noop() {
        let mut canvas = BrailleCanvas::new(2, 1);
        fill_polygon(&mut canvas, &[(0, 0), (3, 3)]);
        assert_eq!(canvas.to_string(), "\u{2800}\u{2800}");
    }
}
