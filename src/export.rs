//! Export: composed document to SVG or flattened PNG
//!
//! PNG export rasterizes the composed document at a fixed pixel width;
//! the height follows the document's own aspect ratio. The SVG path is a
//! plain write of the composed text, which is already standalone (the
//! palette travels as an embedded style block).

use std::path::Path;

use log::info;

use crate::error::VisageError;

/// Write the composed SVG document as-is
pub fn export_svg(document: &str, path: &Path) -> Result<(), VisageError> {
    std::fs::write(path, document)
        .map_err(|e| VisageError::Export(format!("{}: {}", path.display(), e)))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Rasterize the composed document to a PNG of the given pixel width
pub fn export_png(document: &str, path: &Path, width: u32) -> Result<(), VisageError> {
    let (pixels, width, height) = rasterize(document, width)?;

    let img = image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| VisageError::Export("pixel buffer size mismatch".into()))?;
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| VisageError::Export(format!("{}: {}", path.display(), e)))?;

    info!("wrote {} ({}x{})", path.display(), width, height);
    Ok(())
}

/// Render to straight-alpha RGBA at the given width
fn rasterize(document: &str, width: u32) -> Result<(Vec<u8>, u32, u32), VisageError> {
    if width == 0 {
        return Err(VisageError::Export("png width must be positive".into()));
    }

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(document, &options)
        .map_err(|e| VisageError::Export(format!("svg parse: {}", e)))?;

    let size = tree.size();
    let scale = width as f32 / size.width();
    let height = ((width as f32) * size.height() / size.width()).round().max(1.0) as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| VisageError::Export(format!("bad raster size {}x{}", width, height)))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // Pixmap data is premultiplied; PNG wants straight alpha
    let mut rgba = Vec::with_capacity(pixmap.pixels().len() * 4);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    Ok((rgba, width, height))
}
