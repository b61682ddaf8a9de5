use std::path::PathBuf;

use image::{imageops, DynamicImage, RgbImage};
use ndarray::Array3;

use crate::preprocess::Tensor;
use crate::shared::error::VisionError;
use crate::shared::geometry::ImageGeometry;

/// Input accepted by the normalizer, resolved once at the pipeline
/// boundary instead of re-checked ad hoc in every handler.
pub enum ImageInput {
    /// Filesystem path to an encoded image; decoded on use.
    Path(PathBuf),
    /// Already-decoded bitmap.
    Bitmap(DynamicImage),
    /// Preloaded CHW float tensor, already normalized.
    Tensor(Tensor),
}

/// Converts an arbitrary image into a fixed-size, channel-first,
/// `[0, 1]`-normalized tensor plus the image's original dimensions.
///
/// `target` is the engine's `(width, height)` input shape. The returned
/// geometry is the one value later needed to rescale detection boxes
/// back to source coordinates.
pub fn normalize(
    input: ImageInput,
    target: (u32, u32),
) -> Result<(Tensor, ImageGeometry), VisionError> {
    match input {
        ImageInput::Path(path) => normalize_bitmap(image::open(&path)?, target),
        ImageInput::Bitmap(image) => normalize_bitmap(image, target),
        ImageInput::Tensor(tensor) => {
            let (tw, th) = target;
            let expected = [3, th as usize, tw as usize];
            if tensor.shape() != expected {
                return Err(VisionError::ShapeMismatch {
                    expected,
                    actual: tensor.shape().to_vec(),
                });
            }
            // A preloaded tensor carries no pre-resize dimensions; its
            // geometry is taken to be the target shape.
            Ok((tensor, ImageGeometry::new(tw, th)))
        }
    }
}

fn normalize_bitmap(
    image: DynamicImage,
    target: (u32, u32),
) -> Result<(Tensor, ImageGeometry), VisionError> {
    let geometry = ImageGeometry::new(image.width(), image.height());
    let letterboxed = scale_and_pad(image, target);
    Ok((to_tensor(&letterboxed), geometry))
}

/// Letterbox to exactly `target`: 3-channel conversion, aspect-preserving
/// resize to fit entirely within the target, centered black padding for
/// the remainder. No-op when the dimensions already match.
pub fn scale_and_pad(image: DynamicImage, target: (u32, u32)) -> RgbImage {
    let (tw, th) = target;
    let rgb = image.into_rgb8();
    if rgb.dimensions() == (tw, th) {
        return rgb;
    }

    let resized = DynamicImage::ImageRgb8(rgb)
        .resize(tw, th, imageops::FilterType::Triangle)
        .into_rgb8();
    let mut canvas = RgbImage::new(tw, th);
    let x_offset = (tw - resized.width()) / 2;
    let y_offset = (th - resized.height()) / 2;
    imageops::replace(&mut canvas, &resized, x_offset as i64, y_offset as i64);
    canvas
}

/// HWC u8 → CHW f32 in `[0, 1]`.
fn to_tensor(rgb: &RgbImage) -> Tensor {
    let (width, height) = rgb.dimensions();
    Array3::from_shape_fn((3, height as usize, width as usize), |(c, y, x)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
}
