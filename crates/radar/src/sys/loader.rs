use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gdk_pixbuf::prelude::*;
use gdk_pixbuf::{Colorspace, Pixbuf, PixbufLoader};
use radarctl::target::LoadError;
use resvg::usvg;
use std::path::Path;

/// Red concentric-circle glyph shown when the target image can't be loaded.
const FALLBACK_ICON_SVG: &str = "PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHdpZHRoPSI2NCIgaGVpZ2h0PSI2NCIgdmlld0JveD0iMCAwIDY0IDY0Ij48Y2lyY2xlIGN4PSIzMiIgY3k9IjMyIiByPSIyOCIgZmlsbD0ibm9uZSIgc3Ryb2tlPSIjZmYzMjMyIiBzdHJva2Utd2lkdGg9IjQiLz48Y2lyY2xlIGN4PSIzMiIgY3k9IjMyIiByPSIxOCIgZmlsbD0ibm9uZSIgc3Ryb2tlPSIjZmYzMjMyIiBzdHJva2Utd2lkdGg9IjMiLz48Y2lyY2xlIGN4PSIzMiIgY3k9IjMyIiByPSI4IiBmaWxsPSIjZmYzMjMyIi8+PC9zdmc+Cg==";

pub async fn fetch(path: &Path) -> Result<Vec<u8>, LoadError> {
    Ok(tokio::fs::read(path).await?)
}

/// Decodes any format gdk-pixbuf has a loader for. Runs on the GUI thread.
pub fn decode(bytes: Vec<u8>) -> Result<Pixbuf, LoadError> {
    let loader = PixbufLoader::new();
    let decode_err = |e: glib::Error| LoadError::Decode(e.to_string());

    loader.write(&bytes).map_err(decode_err)?;
    loader.close().map_err(decode_err)?;
    loader
        .pixbuf()
        .ok_or_else(|| LoadError::Decode("no image data".to_string()))
}

pub fn fallback_icon() -> Result<Pixbuf, LoadError> {
    let svg = STANDARD
        .decode(FALLBACK_ICON_SVG)
        .map_err(|e| LoadError::Decode(e.to_string()))?;
    rasterize_svg(&svg)
}

fn rasterize_svg(svg: &[u8]) -> Result<Pixbuf, LoadError> {
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default())
        .map_err(|e| LoadError::Decode(e.to_string()))?;

    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| LoadError::Decode("SVG has empty dimensions".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied pixels, gdk-pixbuf expects straight alpha
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    Ok(Pixbuf::from_bytes(
        &glib::Bytes::from_owned(rgba),
        Colorspace::Rgb,
        true,
        8,
        width as i32,
        height as i32,
        width as i32 * 4,
    ))
}
