//! Annotated heatmap rendering of a correlation matrix.
//!
//! The color scale is fixed and keyed to correlation sign and magnitude:
//! positive values shade white to red, negative values white to blue,
//! undefined cells gray. Cell values are drawn as text labels when a
//! usable system font is found; the grid itself renders either way.

use crate::error::{PipelineError, Result};
use crate::summarizer::CorrelationMatrix;
use plotters::prelude::*;
use plotters::style::{FontStyle, FontTransform, register_font};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

const CELL: i32 = 48;
const MARGIN_LEFT: i32 = 170;
const MARGIN_TOP: i32 = 48;
const MARGIN_RIGHT: i32 = 20;
const MARGIN_BOTTOM: i32 = 170;

const POSITIVE_END: (u8, u8, u8) = (178, 24, 43);
const NEGATIVE_END: (u8, u8, u8) = (33, 102, 172);
const UNDEFINED: RGBColor = RGBColor(200, 200, 200);

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Render the matrix as an annotated heatmap PNG at `path`.
pub fn render_heatmap(matrix: &CorrelationMatrix, path: &Path) -> Result<()> {
    let n = matrix.size() as i32;
    let width = (MARGIN_LEFT + n * CELL + MARGIN_RIGHT) as u32;
    let height = (MARGIN_TOP + n * CELL + MARGIN_BOTTOM) as u32;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let annotate = font_available();
    let label_style = ("sans-serif", 13).into_font().color(&BLACK);

    if annotate {
        let title_style = ("sans-serif", 18).into_font().color(&BLACK);
        root.draw(&Text::new(
            "Correlation Matrix Heatmap",
            (MARGIN_LEFT, 14),
            title_style,
        ))
        .map_err(render_err)?;
    }

    for i in 0..n {
        for j in 0..n {
            let value = matrix.get(i as usize, j as usize);
            let x0 = MARGIN_LEFT + j * CELL;
            let y0 = MARGIN_TOP + i * CELL;

            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + CELL - 1, y0 + CELL - 1)],
                cell_color(value).filled(),
            ))
            .map_err(render_err)?;

            if annotate {
                if let Some(v) = value {
                    let text_color = if v.abs() > 0.6 { &WHITE } else { &BLACK };
                    let style = ("sans-serif", 12).into_font().color(text_color);
                    root.draw(&Text::new(
                        format!("{:.2}", v),
                        (x0 + 8, y0 + CELL / 2 - 6),
                        style,
                    ))
                    .map_err(render_err)?;
                }
            }
        }
    }

    if annotate {
        for (i, name) in matrix.columns().iter().enumerate() {
            let y0 = MARGIN_TOP + i as i32 * CELL;
            root.draw(&Text::new(
                name.clone(),
                (6, y0 + CELL / 2 - 6),
                label_style.clone(),
            ))
            .map_err(render_err)?;

            let x0 = MARGIN_LEFT + i as i32 * CELL;
            let rotated = label_style.clone().transform(FontTransform::Rotate90);
            root.draw(&Text::new(
                name.clone(),
                (x0 + CELL / 2 + 6, MARGIN_TOP + n * CELL + 6),
                rotated,
            ))
            .map_err(render_err)?;
        }
    }

    root.present().map_err(render_err)?;
    debug!("Heatmap written to {:?}", path);
    Ok(())
}

/// Fixed diverging color scale keyed to correlation sign and magnitude.
fn cell_color(value: Option<f64>) -> RGBColor {
    let Some(v) = value else {
        return UNDEFINED;
    };
    let v = v.clamp(-1.0, 1.0);
    if v >= 0.0 {
        lerp_from_white(POSITIVE_END, v)
    } else {
        lerp_from_white(NEGATIVE_END, -v)
    }
}

fn lerp_from_white(end: (u8, u8, u8), t: f64) -> RGBColor {
    let channel = |to: u8| (255.0 + (to as f64 - 255.0) * t).round() as u8;
    RGBColor(channel(end.0), channel(end.1), channel(end.2))
}

/// Register a system font for the pure-Rust text backend, once per process.
///
/// Returns false when no usable font exists; callers then skip the text
/// labels and still render the colored grid.
fn font_available() -> bool {
    *FONT_READY.get_or_init(|| {
        const CANDIDATES: [&str; 4] = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        ];
        for candidate in CANDIDATES {
            if let Ok(bytes) = std::fs::read(candidate) {
                // The font backend wants 'static bytes; leaking once per
                // process is fine for a one-shot batch job.
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                if register_font("sans-serif", FontStyle::Normal, bytes).is_ok() {
                    debug!("Registered heatmap font from {}", candidate);
                    return true;
                }
            }
        }
        warn!("No usable system font found; heatmap cell labels will be omitted");
        false
    })
}

fn render_err(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::Summarizer;

    #[test]
    fn test_cell_color_endpoints() {
        assert_eq!(cell_color(Some(0.0)), RGBColor(255, 255, 255));
        assert_eq!(cell_color(Some(1.0)), RGBColor(178, 24, 43));
        assert_eq!(cell_color(Some(-1.0)), RGBColor(33, 102, 172));
        assert_eq!(cell_color(None), UNDEFINED);
    }

    #[test]
    fn test_cell_color_sign_selects_palette() {
        let warm = cell_color(Some(0.5));
        let cool = cell_color(Some(-0.5));
        // Warm cells keep red dominant, cool cells keep blue dominant
        assert!(warm.0 > warm.2);
        assert!(cool.2 > cool.0);
    }

    #[test]
    fn test_cell_color_clamps_out_of_range() {
        assert_eq!(cell_color(Some(2.0)), cell_color(Some(1.0)));
        assert_eq!(cell_color(Some(-3.0)), cell_color(Some(-1.0)));
    }

    #[test]
    fn test_render_writes_png() {
        let df = polars::df!(
            "fare_amount" => [10.0f64, 20.0, 30.0],
            "tip_amount" => [1.0f64, 2.0, 3.5],
            "tolls_amount" => [3.0f64, 1.0, 2.0],
        )
        .unwrap();
        let matrix = Summarizer::correlation_matrix(&df).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        render_heatmap(&matrix, &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0, "heatmap file should not be empty");
    }
}
