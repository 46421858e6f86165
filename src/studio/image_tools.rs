// SYNOID Reel Image Tools
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Every visual in a reel is a still frame of exactly the output resolution.
// User images are letterboxed (never cropped) onto a fill-colored canvas;
// placeholders are solid canvases stamped with a label, drawn with the
// configured TrueType font or with built-in block glyphs when none is set.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::VideoSettings;
use crate::error::ImageError;

/// Pastel palette cycled by question index.
pub const PLACEHOLDER_PALETTE: [[u8; 3]; 5] = [
    [210, 230, 255],
    [200, 210, 240],
    [230, 220, 255],
    [220, 255, 230],
    [255, 230, 220],
];

/// Target canvas for every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSpec {
    pub width: u32,
    pub height: u32,
    pub fill: Rgb<u8>,
}

impl FrameSpec {
    pub fn from_settings(video: &VideoSettings) -> Self {
        Self {
            width: video.width,
            height: video.height,
            fill: video.fill_color,
        }
    }
}

/// A normalized frame written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Where a scaled image lands inside the target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Total (horizontal, vertical) padding left around the image.
    pub fn padding(&self, target_w: u32, target_h: u32) -> (u32, u32) {
        (target_w - self.width, target_h - self.height)
    }
}

/// Scale `src` to fit entirely inside `dst` without cropping and center it.
///
/// Callers guarantee non-zero source dimensions.
pub fn fit_within(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Placement {
    let scale = f64::min(dst_w as f64 / src_w as f64, dst_h as f64 / src_h as f64);
    let width = ((src_w as f64 * scale).round() as u32).clamp(1, dst_w);
    let height = ((src_h as f64 * scale).round() as u32).clamp(1, dst_h);
    Placement {
        x: (dst_w - width) / 2,
        y: (dst_h - height) / 2,
        width,
        height,
    }
}

/// Letterbox a decoded image onto a canvas of exactly `spec` size.
pub fn normalize(image: &DynamicImage, spec: &FrameSpec) -> RgbImage {
    let rgb = image.to_rgb8();
    let placement = fit_within(rgb.width(), rgb.height(), spec.width, spec.height);

    let scaled = if (placement.width, placement.height) == rgb.dimensions() {
        rgb
    } else {
        imageops::resize(&rgb, placement.width, placement.height, FilterType::Lanczos3)
    };

    let mut canvas = RgbImage::from_pixel(spec.width, spec.height, spec.fill);
    imageops::overlay(&mut canvas, &scaled, placement.x as i64, placement.y as i64);
    canvas
}

/// Decode an image from disk, rejecting unreadable or zero-sized input.
pub fn open_image(path: &Path) -> Result<DynamicImage, ImageError> {
    let img = image::open(path).map_err(|source| ImageError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::Empty(path.to_path_buf()));
    }
    Ok(img)
}

pub fn normalize_file(path: &Path, spec: &FrameSpec) -> Result<RgbImage, ImageError> {
    let img = open_image(path)?;
    debug!(
        "[IMAGE] {:?}: {}x{} -> {}x{}",
        path,
        img.width(),
        img.height(),
        spec.width,
        spec.height
    );
    Ok(normalize(&img, spec))
}

pub fn solid(color: Rgb<u8>, width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Solid canvas with a centered label such as `Q3` or `Q3 B`.
pub fn placeholder(
    label: &str,
    color: Rgb<u8>,
    ink: Rgb<u8>,
    font: Option<&FontVec>,
    width: u32,
    height: u32,
) -> RgbImage {
    let mut canvas = solid(color, width, height);
    match font {
        Some(font) => draw_font_label(&mut canvas, label, ink, font),
        None => draw_label(&mut canvas, label, ink),
    }
    canvas
}

fn draw_font_label(canvas: &mut RgbImage, label: &str, ink: Rgb<u8>, font: &FontVec) {
    let (w, h) = canvas.dimensions();
    let scale = PxScale::from((w.min(h) as f32 / 6.0).max(8.0));
    let (text_w, text_h) = text_size(scale, font, label);
    let x = w.saturating_sub(text_w) / 2;
    let y = h.saturating_sub(text_h) / 2;
    draw_text_mut(canvas, ink, x as i32, y as i32, scale, font, label);
}

/// Load a TrueType/OpenType font for placeholder labels. Labels are
/// cosmetic, so an unusable font degrades to block glyphs.
pub fn load_label_font(path: &Path) -> Option<FontVec> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("[IMAGE] Font {:?} unreadable ({}); using block glyphs", path, e);
            return None;
        }
    };
    match FontVec::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("[IMAGE] Font {:?} invalid ({}); using block glyphs", path, e);
            None
        }
    }
}

pub fn placeholder_color(index: usize, variant: Option<char>) -> Rgb<u8> {
    let offset = if variant == Some('B') { 2 } else { 0 };
    Rgb(PLACEHOLDER_PALETTE[(index + offset) % PLACEHOLDER_PALETTE.len()])
}

pub fn placeholder_label(index: usize, variant: Option<char>) -> String {
    match variant {
        Some(v) => format!("Q{} {}", index + 1, v),
        None => format!("Q{}", index + 1),
    }
}

/// Center-crop to the largest square.
pub fn square_crop(img: &RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let side = w.min(h);
    imageops::crop_imm(img, (w - side) / 2, (h - side) / 2, side, side).to_image()
}

// ─────────────────────────────────────────────────────────────────────────────
// Block glyphs (5x7)
// ─────────────────────────────────────────────────────────────────────────────

fn glyph(c: char) -> Option<[u8; 7]> {
    Some(match c.to_ascii_uppercase() {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        ' ' => [0; 7],
        _ => return None,
    })
}

fn draw_label(canvas: &mut RgbImage, label: &str, ink: Rgb<u8>) {
    let chars: Vec<char> = label.chars().collect();
    if chars.is_empty() {
        return;
    }
    let (w, h) = canvas.dimensions();
    // Each glyph occupies 6 columns (5 + 1 spacing); the last spacing is dropped.
    let columns = chars.len() as u32 * 6 - 1;
    let dot = (w.min(h) / 60).min(w / (columns + 2)).max(1);
    let text_w = columns * dot;
    let text_h = 7 * dot;
    let origin_x = w.saturating_sub(text_w) / 2;
    let origin_y = h.saturating_sub(text_h) / 2;

    for (i, c) in chars.iter().enumerate() {
        let Some(rows) = glyph(*c) else {
            debug!("[IMAGE] No glyph for {:?}, leaving blank", c);
            continue;
        };
        let cell_x = origin_x + i as u32 * 6 * dot;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..5u32 {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let x0 = cell_x + col * dot;
                let y0 = origin_y + row as u32 * dot;
                for y in y0..(y0 + dot).min(h) {
                    for x in x0..(x0 + dot).min(w) {
                        canvas.put_pixel(x, y, ink);
                    }
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pair layout ("this or that": two stacked squares)
// ─────────────────────────────────────────────────────────────────────────────

/// Geometry shared between the pair frame and its captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairLayout {
    pub side: u32,
    pub x: u32,
    pub caption_y: u32,
    pub top_y: u32,
    pub or_y: u32,
    pub bottom_y: u32,
    pub question_font_size: u32,
    pub or_font_size: u32,
}

impl PairLayout {
    pub fn compute(width: u32, height: u32, font_size: u32) -> Self {
        let question_font_size = font_size * 11 / 10;
        let or_font_size = font_size * 9 / 10;
        let caption_y = height / 19;
        let top_y = caption_y + question_font_size * 22 / 10;
        let gap = 30;
        let or_block = or_font_size * 16 / 10;
        let bottom_margin = height / 48;

        let vertical_budget = height
            .saturating_sub(top_y + gap + or_block + bottom_margin)
            / 2;
        let side = (width * 5 / 6).min(vertical_budget).max(1);
        let or_y = top_y + side + gap;

        Self {
            side,
            x: (width - side) / 2,
            caption_y,
            top_y,
            or_y,
            bottom_y: or_y + or_block,
            question_font_size,
            or_font_size,
        }
    }
}

pub fn pair_frame(
    top: &RgbImage,
    bottom: &RgbImage,
    layout: &PairLayout,
    background: Rgb<u8>,
    width: u32,
    height: u32,
) -> RgbImage {
    let mut canvas = solid(background, width, height);
    for (img, y) in [(top, layout.top_y), (bottom, layout.bottom_y)] {
        let square = square_crop(img);
        let tile = imageops::resize(&square, layout.side, layout.side, FilterType::Lanczos3);
        imageops::overlay(&mut canvas, &tile, layout.x as i64, y as i64);
    }
    canvas
}

pub fn save_frame(img: &RgbImage, path: &Path) -> Result<FrameAsset, ImageError> {
    img.save(path).map_err(|source| ImageError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FrameAsset {
        path: path.to_path_buf(),
        width: img.width(),
        height: img.height(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Batch rendering
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum FrameSource {
    File(PathBuf),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameSources {
    Single(FrameSource),
    Pair(FrameSource, FrameSource),
}

/// One question's frame: where its pixels come from and where it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameJob {
    pub index: usize,
    pub sources: FrameSources,
    pub output: PathBuf,
}

/// Renders question, background and card frames for one run.
#[derive(Clone)]
pub struct FrameRenderer {
    pub spec: FrameSpec,
    pub background: Rgb<u8>,
    pub ink: Rgb<u8>,
    pub pair: PairLayout,
    /// Substitute a placeholder (with a warning) when a user image fails.
    pub placeholder_fallback: bool,
    font: Option<Arc<FontVec>>,
}

impl fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("spec", &self.spec)
            .field("pair", &self.pair)
            .field("placeholder_fallback", &self.placeholder_fallback)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl FrameRenderer {
    pub fn new(video: &VideoSettings, placeholder_fallback: bool) -> Self {
        Self {
            spec: FrameSpec::from_settings(video),
            background: video.background_color,
            ink: video.label_color,
            pair: PairLayout::compute(video.width, video.height, video.text_font_size),
            placeholder_fallback,
            font: video
                .font_path
                .as_deref()
                .and_then(load_label_font)
                .map(Arc::new),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render every job on the rayon pool; output order matches input order
    /// and the first failure wins.
    pub fn render_all(&self, jobs: &[FrameJob]) -> Result<Vec<FrameAsset>, ImageError> {
        info!("[IMAGE] Rendering {} question frames", jobs.len());
        jobs.par_iter().map(|job| self.render(job)).collect()
    }

    pub fn render(&self, job: &FrameJob) -> Result<FrameAsset, ImageError> {
        let FrameSpec { width, height, .. } = self.spec;
        let frame = match &job.sources {
            FrameSources::Single(source) => match self.load(source, job.index, None)? {
                Some(img) => normalize(&img, &self.spec),
                None => placeholder(
                    &placeholder_label(job.index, None),
                    placeholder_color(job.index, None),
                    self.ink,
                    self.font.as_deref(),
                    width,
                    height,
                ),
            },
            FrameSources::Pair(top, bottom) => {
                let side = self.pair.side;
                let tile = |source: &FrameSource, variant: char| -> Result<RgbImage, ImageError> {
                    Ok(match self.load(source, job.index, Some(variant))? {
                        Some(img) => img.to_rgb8(),
                        None => placeholder(
                            &placeholder_label(job.index, Some(variant)),
                            placeholder_color(job.index, Some(variant)),
                            self.ink,
                            self.font.as_deref(),
                            side,
                            side,
                        ),
                    })
                };
                let top = tile(top, 'A')?;
                let bottom = tile(bottom, 'B')?;
                pair_frame(&top, &bottom, &self.pair, self.background, width, height)
            }
        };
        let asset = save_frame(&frame, &job.output)?;
        debug!("[IMAGE] Frame {} written to {:?}", job.index + 1, asset.path);
        Ok(asset)
    }

    /// `Ok(None)` means "draw a placeholder".
    fn load(
        &self,
        source: &FrameSource,
        index: usize,
        variant: Option<char>,
    ) -> Result<Option<DynamicImage>, ImageError> {
        match source {
            FrameSource::Placeholder => Ok(None),
            FrameSource::File(path) => match open_image(path) {
                Ok(img) => Ok(Some(img)),
                Err(e) if self.placeholder_fallback => {
                    warn!(
                        "[IMAGE] {} unusable ({}); substituting placeholder {}",
                        path.display(),
                        e,
                        placeholder_label(index, variant)
                    );
                    Ok(None)
                }
                Err(e) => Err(e),
            },
        }
    }

    /// Plain brand-colored frame for hook, pause and card segments.
    pub fn background_frame(&self, output: &Path) -> Result<FrameAsset, ImageError> {
        save_frame(&solid(self.background, self.spec.width, self.spec.height), output)
    }
}
