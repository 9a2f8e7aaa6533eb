//! Utility functions

use crate::constants::{APP_NAME, PNG_DATA_URI_PREFIX};
use base64::Engine;
use std::path::{Path, PathBuf};

// Wide mark for the header
pub const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 240 120"><path d="M10 60 C50 8 190 8 230 60 C190 112 50 112 10 60 Z" fill="none" stroke="#fff" stroke-width="9" stroke-linejoin="round"/><circle cx="120" cy="60" r="32" fill="#2dd4bf"/><circle cx="120" cy="60" r="13" fill="#09090b"/><circle cx="132" cy="48" r="6" fill="#fff"/></svg>"##;

// Square variant for window/taskbar icons
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 240 240"><g transform="translate(0,60)"><path d="M10 60 C50 8 190 8 230 60 C190 112 50 112 10 60 Z" fill="none" stroke="#fff" stroke-width="12" stroke-linejoin="round"/><circle cx="120" cy="60" r="34" fill="#2dd4bf"/><circle cx="120" cy="60" r="14" fill="#09090b"/></g></svg>"##;

/// Rasterize the logo SVG at the given width, preserving aspect ratio.
pub fn rasterize_logo(width: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(LOGO_SVG, &resvg::usvg::Options::default()).ok()?;
    let svg_size = tree.size();
    let scale = width as f32 / svg_size.width();
    let height = (svg_size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), width, height))
}

/// Rasterize the icon SVG to a square image (for window/taskbar icons).
pub fn rasterize_logo_square(size: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).ok()?;
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Get the app data directory (settings + logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Wrap a base64 PNG payload as an image source URI
pub fn png_data_uri(base64_payload: &str) -> String {
    format!("{}{}", PNG_DATA_URI_PREFIX, base64_payload)
}

/// Decode the bytes behind a `data:image/png;base64,` URI
pub fn decode_png_data_uri(uri: &str) -> Option<Vec<u8>> {
    let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX)?;
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()
}

/// URI for previewing a local file through the egui_extras file loader
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            crate::constants::IMAGE_EXTENSIONS
                .iter()
                .any(|ext| e.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Default file name for a saved generation, e.g. `vision-studio-20240131-142501.png`
pub fn default_image_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("vision-studio-{}.png", now.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_data_uri_round_trip_of_known_bytes() {
        let uri = png_data_uri("iVBORw0KGgo=");
        assert_eq!(uri, "data:image/png;base64,iVBORw0KGgo=");
        let bytes = decode_png_data_uri(&uri).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_decode_rejects_other_uris() {
        assert!(decode_png_data_uri("data:image/jpeg;base64,AAAA").is_none());
        assert!(decode_png_data_uri("data:image/png;base64,!!!").is_none());
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("/tmp/cat.JPG")));
        assert!(is_image_path(Path::new("dog.webp")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("README")));
    }

    #[test]
    fn test_default_image_name() {
        let now = chrono::Local.with_ymd_and_hms(2024, 1, 31, 14, 25, 1).unwrap();
        assert_eq!(default_image_name(now), "vision-studio-20240131-142501.png");
    }

    #[test]
    fn test_rasterize_logo() {
        let (pixels, w, h) = rasterize_logo(240).unwrap();
        assert_eq!(w, 240);
        assert_eq!(h, 120);
        assert_eq!(pixels.len(), (w * h * 4) as usize);

        let (_, w, h) = rasterize_logo_square(64).unwrap();
        assert_eq!((w, h), (64, 64));
    }
}
