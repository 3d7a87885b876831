use image::{Rgba, RgbaImage};

use crate::frame::frame_model::FrameCapture;
use crate::node::node_model::Rect;

/// Width of the coloured band in a visible outline.
pub const DEFAULT_BORDER_WIDTH: u32 = 3;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Convert `0xAARRGGBB` to an RGBA pixel.
pub fn argb_to_rgba(argb: u32) -> Rgba<u8> {
    let [a, r, g, b] = argb.to_be_bytes();
    Rgba([r, g, b, a])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineStyle {
    /// Single-pixel hollow rectangle
    Plain,
    /// Contrast / colour band / contrast, readable on any background
    Visible { border_width: u32 },
}

/// A rectangle to mark on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub rect: Rect,
    pub color: Rgba<u8>,
    pub style: OutlineStyle,
}

impl Annotation {
    pub fn plain(rect: Rect, color: Rgba<u8>) -> Self {
        Self {
            rect,
            color,
            style: OutlineStyle::Plain,
        }
    }

    pub fn visible(rect: Rect, color: Rgba<u8>) -> Self {
        Self {
            rect,
            color,
            style: OutlineStyle::Visible {
                border_width: DEFAULT_BORDER_WIDTH,
            },
        }
    }
}

/// Decode a raw capture into an RGBA image. Pixels missing from a short
/// buffer stay transparent black.
pub fn frame_to_image(frame: &FrameCapture) -> RgbaImage {
    RgbaImage::from_fn(frame.width, frame.height, |x, y| {
        frame
            .argb_at_pixel(x, y)
            .map(argb_to_rgba)
            .unwrap_or(Rgba([0, 0, 0, 0]))
    })
}

/// Copy of `base` with every annotation drawn on top.
pub fn render_annotations(base: &FrameCapture, annotations: &[Annotation]) -> RgbaImage {
    let mut img = frame_to_image(base);
    for annotation in annotations {
        match annotation.style {
            OutlineStyle::Plain => {
                draw_rect_outline(&mut img, annotation.rect, annotation.color);
            }
            OutlineStyle::Visible { border_width } => {
                paint_visible_outline(&mut img, annotation.rect, annotation.color, border_width);
            }
        }
    }
    img
}

/// Black for light colours, white for dark ones.
pub fn contrast_color(color: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, _] = color.0;
    let luma = (0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)) / 255.0;
    if luma > 0.6 { BLACK } else { WHITE }
}

/// Hollow one-pixel rectangle along the edges of `rect`. Returns the number
/// of pixels written; coordinates outside the image are skipped.
pub fn draw_rect_outline(img: &mut RgbaImage, rect: Rect, color: Rgba<u8>) -> usize {
    if rect.is_empty() {
        return 0;
    }
    let (x0, y0) = (rect.left, rect.top);
    let (x1, y1) = (rect.right - 1, rect.bottom - 1);

    // Iterate only over the part of each edge that can land on the image.
    let max_x = i32::try_from(img.width()).unwrap_or(i32::MAX) - 1;
    let max_y = i32::try_from(img.height()).unwrap_or(i32::MAX) - 1;

    let mut written = 0;
    for x in x0.max(0)..=x1.min(max_x) {
        written += put_pixel_checked(img, x, y0, color) as usize;
        if y1 != y0 {
            written += put_pixel_checked(img, x, y1, color) as usize;
        }
    }
    for y in (y0 + 1).max(0)..y1.min(max_y + 1) {
        written += put_pixel_checked(img, x0, y, color) as usize;
        if x1 != x0 {
            written += put_pixel_checked(img, x1, y, color) as usize;
        }
    }
    written
}

/// Double high-contrast border around `rect`: one pixel of the contrast
/// colour on the rectangle's edge, `border_width` pixels of `color` outside
/// it, then one more pixel of contrast colour.
pub fn paint_visible_outline(
    img: &mut RgbaImage,
    rect: Rect,
    color: Rgba<u8>,
    border_width: u32,
) -> usize {
    let contrast = contrast_color(color);
    let width = i32::try_from(border_width).unwrap_or(i32::MAX - 1);

    let mut written = draw_rect_outline(img, rect, contrast);
    for k in 1..=width {
        written += draw_rect_outline(img, grow(rect, k), color);
    }
    written + draw_rect_outline(img, grow(rect, width + 1), contrast)
}

fn grow(rect: Rect, by: i32) -> Rect {
    Rect::new(
        rect.left.saturating_sub(by),
        rect.top.saturating_sub(by),
        rect.right.saturating_add(by),
        rect.bottom.saturating_add(by),
    )
}

/// Write one pixel if `(x, y)` lies inside the image.
fn put_pixel_checked(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) -> bool {
    let (Ok(ux), Ok(uy)) = (u32::try_from(x), u32::try_from(y)) else {
        return false;
    };
    if ux >= img.width() || uy >= img.height() {
        return false;
    }
    img.put_pixel(ux, uy, color);
    true
}
