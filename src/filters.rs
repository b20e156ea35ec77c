/// Filter pipeline module
///
/// Six stateless operations, each reading fixed filenames from a working
/// directory and writing exactly one fixed output filename:
/// - capture: persist the current live frame
/// - grayscale: luminance reduction to a single channel
/// - erode / dilate: 5x5 all-ones morphology, one iteration
/// - hstack: horizontal concatenation of capture + grayscale
/// - blur: Gaussian smoothing with a sigma derived from the kernel size
///
/// Every operation checks its input files up front and fails with
/// `SourceFileMissing` before anything is written; a failed operation never
/// produces an output file.

use std::path::{Path, PathBuf};

use image::{imageops, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology;
use log::debug;
use thiserror::Error;

/// Output of the capture operation; input to every other operation
pub const CAPTURED_FILE: &str = "captured_image.jpg";
/// Output of the grayscale conversion; second input to hstack
pub const GRAYSCALE_FILE: &str = "bw_image.jpg";
/// Output of the erosion operation
pub const ERODED_FILE: &str = "eroded_image.jpg";
/// Output of the dilation operation
pub const DILATED_FILE: &str = "dilated_image.jpg";
/// Output of the horizontal stacking operation
pub const STACKED_FILE: &str = "hstacked_image.jpg";
/// Output of the blur operation
pub const BLURRED_FILE: &str = "blur_image.jpg";

/// Structuring element radius; L-inf norm with radius 2 is a 5x5 square
const MORPH_RADIUS: u8 = 2;

/// Gaussian sigma for a 5x5 kernel, per the OpenCV auto-sigma formula
/// 0.3 * ((ksize - 1) * 0.5 - 1) + 0.8
const BLUR_SIGMA: f32 = 1.1;

/// Errors produced by filter operations.
///
/// All of these are recovered at the operation boundary: the caller shows a
/// modal notification and the application state is unchanged.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A required input file has not been produced yet
    #[error("{} not found. Capture an image first.", path.display())]
    SourceFileMissing { path: PathBuf },

    /// An input file exists but could not be decoded, or encoding failed
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error while reading or writing an image file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that an operation's input file exists before doing any work.
///
/// This is the precondition shared by every file-consuming operation; it is
/// what turns "user ran the steps out of order" into a reported error
/// instead of a decode failure halfway through.
pub fn require_input(path: &Path) -> Result<(), FilterError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(FilterError::SourceFileMissing {
            path: path.to_path_buf(),
        })
    }
}

/// Persist the current live frame verbatim as `captured_image.jpg`.
pub fn capture(frame: &RgbImage, dir: &Path) -> Result<PathBuf, FilterError> {
    let output = dir.join(CAPTURED_FILE);
    frame.save(&output)?;
    debug!("Captured {}x{} frame to {}", frame.width(), frame.height(), output.display());
    Ok(output)
}

/// Convert the captured image to a single-channel grayscale `bw_image.jpg`.
pub fn grayscale(dir: &Path) -> Result<PathBuf, FilterError> {
    let input = dir.join(CAPTURED_FILE);
    require_input(&input)?;

    let bw = image::open(&input)?.to_luma8();

    let output = dir.join(GRAYSCALE_FILE);
    bw.save(&output)?;
    Ok(output)
}

/// Erode the captured image (read as single-channel) into `eroded_image.jpg`.
///
/// One iteration of minimum filtering over a 5x5 all-ones structuring
/// element; bright regions shrink.
pub fn erode(dir: &Path) -> Result<PathBuf, FilterError> {
    let input = dir.join(CAPTURED_FILE);
    require_input(&input)?;

    let gray = image::open(&input)?.to_luma8();
    let eroded = morphology::erode(&gray, Norm::LInf, MORPH_RADIUS);

    let output = dir.join(ERODED_FILE);
    eroded.save(&output)?;
    Ok(output)
}

/// Dilate the captured image (read as single-channel) into `dilated_image.jpg`.
///
/// One iteration of maximum filtering over a 5x5 all-ones structuring
/// element; bright regions grow.
pub fn dilate(dir: &Path) -> Result<PathBuf, FilterError> {
    let input = dir.join(CAPTURED_FILE);
    require_input(&input)?;

    let gray = image::open(&input)?.to_luma8();
    let dilated = morphology::dilate(&gray, Norm::LInf, MORPH_RADIUS);

    let output = dir.join(DILATED_FILE);
    dilated.save(&output)?;
    Ok(output)
}

/// Concatenate the captured image and the grayscale image side by side into
/// `hstacked_image.jpg`.
///
/// Both inputs are decoded to RGB8 (the grayscale JPEG re-expands to three
/// equal channels) and cropped, top-aligned, to the shorter of the two
/// heights. Widths are never checked; a width mismatch just yields a wider
/// output.
pub fn hstack(dir: &Path) -> Result<PathBuf, FilterError> {
    let color_path = dir.join(CAPTURED_FILE);
    let gray_path = dir.join(GRAYSCALE_FILE);
    require_input(&color_path)?;
    require_input(&gray_path)?;

    let left = image::open(&color_path)?.to_rgb8();
    let right = image::open(&gray_path)?.to_rgb8();

    let height = left.height().min(right.height());
    let left = imageops::crop_imm(&left, 0, 0, left.width(), height).to_image();
    let right = imageops::crop_imm(&right, 0, 0, right.width(), height).to_image();

    let mut stacked = RgbImage::new(left.width() + right.width(), height);
    imageops::replace(&mut stacked, &left, 0, 0);
    imageops::replace(&mut stacked, &right, i64::from(left.width()), 0);

    let output = dir.join(STACKED_FILE);
    stacked.save(&output)?;
    Ok(output)
}

/// Blur the captured image into `blur_image.jpg`.
pub fn blur(dir: &Path) -> Result<PathBuf, FilterError> {
    let input = dir.join(CAPTURED_FILE);
    require_input(&input)?;

    let color = image::open(&input)?.to_rgb8();
    let blurred = gaussian_blur_f32(&color, BLUR_SIGMA);

    let output = dir.join(BLURRED_FILE);
    blurred.save(&output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs;
    use tempfile::TempDir;

    /// Smooth gradient frame; survives JPEG round-trips with small error
    fn gradient_frame() -> RgbImage {
        RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 128]))
    }

    /// High-contrast 8x8 checkerboard; erosion/dilation move its mean a lot
    fn checkerboard_frame() -> RgbImage {
        RgbImage::from_fn(64, 48, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    fn mean_luma(path: &Path) -> f64 {
        let gray = image::open(path).unwrap().to_luma8();
        let sum: u64 = gray.pixels().map(|p| u64::from(p[0])).sum();
        sum as f64 / (gray.width() * gray.height()) as f64
    }

    fn mean_abs_diff(a: &RgbImage, b: &RgbImage) -> f64 {
        assert_eq!(a.dimensions(), b.dimensions());
        let total: u64 = a
            .pixels()
            .zip(b.pixels())
            .flat_map(|(pa, pb)| (0..3).map(move |c| u64::from(pa[c].abs_diff(pb[c]))))
            .sum();
        total as f64 / (a.width() * a.height() * 3) as f64
    }

    #[test]
    fn test_require_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CAPTURED_FILE);

        assert!(matches!(
            require_input(&path),
            Err(FilterError::SourceFileMissing { .. })
        ));

        fs::write(&path, b"anything").unwrap();
        assert!(require_input(&path).is_ok());
    }

    #[test]
    fn test_missing_input_writes_no_output() {
        type Op = fn(&Path) -> Result<PathBuf, FilterError>;
        let ops: [(Op, &str); 5] = [
            (grayscale, GRAYSCALE_FILE),
            (erode, ERODED_FILE),
            (dilate, DILATED_FILE),
            (hstack, STACKED_FILE),
            (blur, BLURRED_FILE),
        ];

        for (op, output) in ops {
            let dir = TempDir::new().unwrap();
            let result = op(dir.path());
            assert!(
                matches!(result, Err(FilterError::SourceFileMissing { .. })),
                "expected SourceFileMissing for {output}"
            );
            assert!(
                !dir.path().join(output).exists(),
                "{output} must not be written on failure"
            );
        }
    }

    #[test]
    fn test_hstack_requires_both_inputs() {
        let dir = TempDir::new().unwrap();
        capture(&gradient_frame(), dir.path()).unwrap();

        // Captured image alone is not enough; grayscale has not run yet
        let result = hstack(dir.path());
        assert!(matches!(
            result,
            Err(FilterError::SourceFileMissing { path }) if path.ends_with(GRAYSCALE_FILE)
        ));
        assert!(!dir.path().join(STACKED_FILE).exists());
    }

    #[test]
    fn test_capture_persists_frame() {
        let dir = TempDir::new().unwrap();
        let frame = gradient_frame();

        let output = capture(&frame, dir.path()).unwrap();
        assert!(output.ends_with(CAPTURED_FILE));

        let decoded = image::open(&output).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), frame.dimensions());
        // JPEG is lossy; the round-trip should still be close
        assert!(mean_abs_diff(&decoded, &frame) < 10.0);
    }

    #[test]
    fn test_grayscale_is_idempotent() {
        let dir = TempDir::new().unwrap();
        capture(&gradient_frame(), dir.path()).unwrap();

        let output = grayscale(dir.path()).unwrap();
        let first = fs::read(&output).unwrap();

        grayscale(dir.path()).unwrap();
        let second = fs::read(&output).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_erode_shrinks_bright_regions() {
        let dir = TempDir::new().unwrap();
        capture(&checkerboard_frame(), dir.path()).unwrap();

        let output = erode(dir.path()).unwrap();

        let before = mean_luma(&dir.path().join(CAPTURED_FILE));
        let after = mean_luma(&output);
        assert!(
            after + 10.0 < before,
            "erosion should darken the checkerboard: {before} -> {after}"
        );
    }

    #[test]
    fn test_dilate_grows_bright_regions() {
        let dir = TempDir::new().unwrap();
        capture(&checkerboard_frame(), dir.path()).unwrap();

        let output = dilate(dir.path()).unwrap();

        let before = mean_luma(&dir.path().join(CAPTURED_FILE));
        let after = mean_luma(&output);
        assert!(
            after > before + 10.0,
            "dilation should brighten the checkerboard: {before} -> {after}"
        );
    }

    #[test]
    fn test_hstack_dimensions_and_content() {
        let dir = TempDir::new().unwrap();
        let frame = gradient_frame();
        capture(&frame, dir.path()).unwrap();
        grayscale(dir.path()).unwrap();

        let output = hstack(dir.path()).unwrap();
        let stacked = image::open(&output).unwrap().to_rgb8();

        assert_eq!(stacked.width(), frame.width() * 2);
        assert_eq!(stacked.height(), frame.height());

        let captured = image::open(dir.path().join(CAPTURED_FILE)).unwrap().to_rgb8();
        let bw = image::open(dir.path().join(GRAYSCALE_FILE)).unwrap().to_rgb8();

        let left =
            imageops::crop_imm(&stacked, 0, 0, frame.width(), frame.height()).to_image();
        let right =
            imageops::crop_imm(&stacked, frame.width(), 0, frame.width(), frame.height())
                .to_image();

        assert!(mean_abs_diff(&left, &captured) < 10.0);
        assert!(mean_abs_diff(&right, &bw) < 10.0);
    }

    #[test]
    fn test_hstack_crops_to_shorter_height() {
        let dir = TempDir::new().unwrap();

        // Write mismatched-height inputs directly
        RgbImage::from_pixel(64, 48, Rgb([200, 60, 60]))
            .save(dir.path().join(CAPTURED_FILE))
            .unwrap();
        RgbImage::from_pixel(64, 32, Rgb([90, 90, 90]))
            .save(dir.path().join(GRAYSCALE_FILE))
            .unwrap();

        let output = hstack(dir.path()).unwrap();
        let stacked = image::open(&output).unwrap().to_rgb8();

        assert_eq!(stacked.width(), 128);
        assert_eq!(stacked.height(), 32);
    }

    #[test]
    fn test_blur_smooths_without_resizing() {
        let dir = TempDir::new().unwrap();
        let frame = checkerboard_frame();
        capture(&frame, dir.path()).unwrap();

        let output = blur(dir.path()).unwrap();
        let blurred = image::open(&output).unwrap().to_rgb8();

        assert_eq!(blurred.dimensions(), frame.dimensions());

        // Blur must actually change a high-contrast image...
        let captured = image::open(dir.path().join(CAPTURED_FILE)).unwrap().to_rgb8();
        assert!(mean_abs_diff(&blurred, &captured) > 1.0);

        // ...while roughly preserving the overall brightness
        let before = mean_luma(&dir.path().join(CAPTURED_FILE));
        let after = mean_luma(&output);
        assert!((before - after).abs() < 5.0);
    }

    #[test]
    fn test_operations_overwrite_previous_output() {
        let dir = TempDir::new().unwrap();

        capture(&checkerboard_frame(), dir.path()).unwrap();
        grayscale(dir.path()).unwrap();
        let first = fs::read(dir.path().join(GRAYSCALE_FILE)).unwrap();

        // Re-capture a different frame; re-running grayscale must replace
        // the old output, last writer wins
        capture(&gradient_frame(), dir.path()).unwrap();
        grayscale(dir.path()).unwrap();
        let second = fs::read(dir.path().join(GRAYSCALE_FILE)).unwrap();

        assert_ne!(first, second);
    }
}
