//! grim + slurp capture pipeline for wlroots compositors.
//!
//! slurp picks a point, grim captures the 1x1 region under it and ImageMagick
//! reads the pixel back. Some compositors reject 1x1 geometries; in that case
//! the whole screen is captured once and the pixel is read at the selected
//! coordinates instead.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::color::{parse_rgb_function, ColorSample};
use crate::command::CommandRunner;
use crate::config::ToolNames;
use crate::error::{BackendError, CommandError};
use crate::picker::Backend;

const BACKEND: &str = "grim+slurp";

pub struct CaptureBackend {
    runner: Arc<dyn CommandRunner>,
    tools: ToolNames,
}

impl CaptureBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: ToolNames) -> Self {
        Self { runner, tools }
    }
}

impl Backend for CaptureBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn attempt(&self) -> Result<ColorSample, BackendError> {
        pick_via_generic_capture(self.runner.as_ref(), &self.tools)
    }
}

/// A screen coordinate as reported by `slurp -p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    /// grim geometry for the single pixel at this point.
    pub fn pixel_geometry(&self) -> String {
        format!("{},{} 1x1", self.x, self.y)
    }

    /// ImageMagick `-format` expression reading the pixel at this point.
    pub fn pixel_format(&self) -> String {
        format!("%[pixel:p{{{},{}}}]", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Parses slurp output such as `"640,360 1x1\n"`; only the first token is used.
pub fn parse_point(selection: &str) -> Option<Point> {
    let position = selection.split_whitespace().next()?;
    let (x, y) = position.split_once(',')?;
    Some(Point {
        x: x.trim().parse().ok()?,
        y: y.trim().parse().ok()?,
    })
}

pub fn pick_via_generic_capture(
    runner: &dyn CommandRunner,
    tools: &ToolNames,
) -> Result<ColorSample, BackendError> {
    for program in [&tools.grim, &tools.slurp] {
        if runner.locate(program).is_none() {
            return Err(BackendError::unavailable(
                BACKEND,
                format!("{program} not found in PATH"),
            ));
        }
    }

    let region = scoped_temp_file("colorpick-")?;

    let selection = runner
        .output(&tools.slurp, &[OsStr::new("-p")])
        .map_err(|err| selection_error(&tools.slurp, err))?;
    if selection.trim().is_empty() {
        tracing::info!("{} returned no coordinates", tools.slurp);
        return Err(BackendError::UserCancelled { backend: BACKEND });
    }
    tracing::debug!(selection = selection.trim(), "point selected");

    let point = parse_point(&selection).ok_or_else(|| {
        BackendError::malformed(BACKEND, format!("bad coordinates {:?}", selection.trim()))
    })?;

    let geometry = point.pixel_geometry();
    let captured = runner.output(
        &tools.grim,
        &[
            OsStr::new("-g"),
            OsStr::new(&geometry),
            region.path().as_os_str(),
        ],
    );

    let pixel = match captured {
        Ok(_) => {
            tracing::debug!(path = %region.path().display(), "region captured");
            inspect_pixel(runner, tools, region.path(), Point::ORIGIN)?
        }
        Err(err) => {
            tracing::warn!(%err, geometry, "1x1 capture failed, trying a full screen capture");
            drop(region);
            full_screen_pixel(runner, tools, point)?
        }
    };

    parse_rgb_function(&pixel).map_err(|err| BackendError::malformed(BACKEND, err))
}

fn full_screen_pixel(
    runner: &dyn CommandRunner,
    tools: &ToolNames,
    point: Point,
) -> Result<String, BackendError> {
    let screen = scoped_temp_file("colorpick-full-")?;

    runner
        .output(&tools.grim, &[screen.path().as_os_str()])
        .map_err(|err| BackendError::from_command(BACKEND, err))?;

    inspect_pixel(runner, tools, screen.path(), point)
}

/// Reads one pixel of `image` as `srgb(r,g,b)` text. ImageMagick 6 ships
/// `convert`, ImageMagick 7 `magick`; if neither works the PNG is decoded
/// in-process.
fn inspect_pixel(
    runner: &dyn CommandRunner,
    tools: &ToolNames,
    image: &Path,
    point: Point,
) -> Result<String, BackendError> {
    let format = point.pixel_format();
    let args = [
        image.as_os_str(),
        OsStr::new("-format"),
        OsStr::new(&format),
        OsStr::new("info:"),
    ];

    let mut last_error = None;
    for program in [&tools.convert, &tools.magick] {
        match runner.output(program, &args) {
            Ok(out) if !out.trim().is_empty() => return Ok(out.trim().to_string()),
            Ok(_) => tracing::warn!("{program} printed no pixel value"),
            Err(err) => {
                tracing::warn!(%err, "pixel inspection failed");
                last_error = Some(err);
            }
        }
    }

    match decode_pixel(image, point) {
        Ok(color) => Ok(format!("srgb({},{},{})", color.red, color.green, color.blue)),
        Err(decode_err) => {
            tracing::warn!(%decode_err, path = %image.display(), "in-process decode failed");
            Err(match last_error {
                Some(err) => BackendError::from_command(BACKEND, err),
                None => BackendError::malformed(BACKEND, decode_err),
            })
        }
    }
}

fn decode_pixel(path: &Path, point: Point) -> Result<ColorSample, String> {
    let x = u32::try_from(point.x).map_err(|_| format!("x out of range: {}", point.x))?;
    let y = u32::try_from(point.y).map_err(|_| format!("y out of range: {}", point.y))?;
    let image = image::open(path).map_err(|err| err.to_string())?.to_rgb8();
    let pixel = image
        .get_pixel_checked(x, y)
        .ok_or_else(|| format!("{point} outside {}x{} image", image.width(), image.height()))?;
    Ok(ColorSample::new(pixel[0], pixel[1], pixel[2]))
}

fn scoped_temp_file(prefix: &str) -> Result<NamedTempFile, BackendError> {
    tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".png")
        .tempfile()
        .map_err(|err| BackendError::unavailable(BACKEND, format!("temp file: {err}")))
}

fn selection_error(program: &str, err: CommandError) -> BackendError {
    match err {
        CommandError::Failed { .. } => {
            tracing::info!(%err, "{program} cancelled");
            BackendError::UserCancelled { backend: BACKEND }
        }
        other => BackendError::from_command(BACKEND, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slurp_output() {
        assert_eq!(parse_point("640,360 1x1\n"), Some(Point { x: 640, y: 360 }));
        assert_eq!(parse_point("12,7"), Some(Point { x: 12, y: 7 }));
        assert_eq!(parse_point("-1920,0 1x1"), Some(Point { x: -1920, y: 0 }));
    }

    #[test]
    fn rejects_bad_coordinates() {
        for bad in ["", "   ", "640x360", "a,b 1x1", "1,2,3 1x1", "1, 1x1"] {
            assert_eq!(parse_point(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn tool_arguments() {
        let point = Point { x: 640, y: 360 };
        assert_eq!(point.pixel_geometry(), "640,360 1x1");
        assert_eq!(point.pixel_format(), "%[pixel:p{640,360}]");
        assert_eq!(Point::ORIGIN.pixel_format(), "%[pixel:p{0,0}]");
    }

    #[test]
    fn decodes_png_in_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let mut img = image::RgbImage::from_pixel(4, 3, image::Rgb([0, 0, 0]));
        img.put_pixel(2, 1, image::Rgb([12, 34, 56]));
        img.save(&path).unwrap();

        assert_eq!(
            decode_pixel(&path, Point { x: 2, y: 1 }),
            Ok(ColorSample::new(12, 34, 56))
        );
        assert!(decode_pixel(&path, Point { x: 4, y: 0 }).is_err());
        assert!(decode_pixel(&path, Point { x: -1, y: 0 }).is_err());
    }
}
