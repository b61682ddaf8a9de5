use ndarray::Array3;

use crate::preprocess::Tensor;
use crate::shared::error::VisionError;
use crate::shared::frame::Frame;
use crate::shared::geometry::ImageGeometry;

/// Converts one stream-native frame into the normalized tensor
/// representation: channel-first, f32, `[0, 1]`. RGBA input drops its
/// alpha channel; anything else is rejected.
///
/// No letterbox here — the decoding layer scales stream frames to the
/// engine input size natively, so a dimension mismatch is an error, not
/// something to repair per frame.
pub fn reformat(frame: &Frame, target: (u32, u32)) -> Result<Tensor, VisionError> {
    let channels = frame.channels();
    if channels != 3 && channels != 4 {
        return Err(VisionError::UnsupportedInput(format!(
            "expected an RGB or RGBA frame, got {channels} channels"
        )));
    }

    let (tw, th) = target;
    if (frame.width(), frame.height()) != (tw, th) {
        return Err(VisionError::ShapeMismatch {
            expected: [3, th as usize, tw as usize],
            actual: vec![
                channels as usize,
                frame.height() as usize,
                frame.width() as usize,
            ],
        });
    }

    let src = frame.as_ndarray();
    let tensor = Array3::from_shape_fn((3, th as usize, tw as usize), |(c, y, x)| {
        src[[y, x, c]] as f32 / 255.0
    });
    Ok(tensor)
}

/// Order-preserving 1:1 map from a frame stream to a tensor stream.
///
/// Records the first frame's geometry as it flows through — a
/// non-destructive peek: the frame itself is neither dropped nor
/// reordered. Geometry is assumed uniform across the stream.
pub struct FrameReformatter<I> {
    frames: I,
    target: (u32, u32),
    geometry: Option<ImageGeometry>,
}

impl<I> FrameReformatter<I> {
    pub fn new(frames: I, target: (u32, u32)) -> Self {
        Self {
            frames,
            target,
            geometry: None,
        }
    }

    /// Geometry of the first frame seen, once any frame has been pulled.
    pub fn geometry(&self) -> Option<ImageGeometry> {
        self.geometry
    }
}

impl<I> Iterator for FrameReformatter<I>
where
    I: Iterator<Item = Frame>,
{
    type Item = Result<Tensor, VisionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frames.next()?;
        if self.geometry.is_none() {
            self.geometry = Some(frame.geometry());
        }
        Some(reformat(&frame, self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solid_frame(width: u32, height: u32, value: u8, index: usize) -> Frame {
        let data = vec![value; (width * height * 3) as usize];
        Frame::new(data, width, height, 3, index)
    }

    #[test]
    fn test_reformat_scales_and_transposes() {
        let frame = solid_frame(2, 2, 51, 0);
        let tensor = reformat(&frame, (2, 2)).unwrap();
        assert_eq!(tensor.shape(), &[3, 2, 2]);
        for &v in tensor.iter() {
            assert_relative_eq!(v, 0.2);
        }
    }

    #[test]
    fn test_reformat_channel_first() {
        // Single green pixel at (0, 0)
        let frame = Frame::new(vec![0, 255, 0], 1, 1, 3, 0);
        let tensor = reformat(&frame, (1, 1)).unwrap();
        assert_relative_eq!(tensor[[0, 0, 0]], 0.0);
        assert_relative_eq!(tensor[[1, 0, 0]], 1.0);
        assert_relative_eq!(tensor[[2, 0, 0]], 0.0);
    }

    #[test]
    fn test_reformat_rgba_drops_alpha() {
        let frame = Frame::new(vec![255, 0, 0, 9], 1, 1, 4, 0);
        let tensor = reformat(&frame, (1, 1)).unwrap();
        assert_eq!(tensor.shape(), &[3, 1, 1]);
        assert_relative_eq!(tensor[[0, 0, 0]], 1.0);
    }

    #[test]
    fn test_reformat_wrong_dimensions_is_fatal() {
        let frame = solid_frame(2, 2, 0, 0);
        let err = reformat(&frame, (4, 4)).unwrap_err();
        assert!(matches!(err, VisionError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_reformat_rejects_single_channel() {
        let frame = Frame::new(vec![7, 7, 7, 7], 2, 2, 1, 0);
        let err = reformat(&frame, (2, 2)).unwrap_err();
        assert!(matches!(err, VisionError::UnsupportedInput(_)));
    }

    #[test]
    fn test_iterator_is_one_to_one_and_ordered() {
        let frames: Vec<Frame> = (0..5).map(|i| solid_frame(2, 2, i as u8 * 10, i)).collect();
        let tensors: Vec<_> = FrameReformatter::new(frames.into_iter(), (2, 2))
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(tensors.len(), 5);
        for (i, tensor) in tensors.iter().enumerate() {
            assert_relative_eq!(tensor[[0, 0, 0]], (i as f32 * 10.0) / 255.0);
        }
    }

    #[test]
    fn test_geometry_recorded_from_first_frame() {
        let frames = vec![solid_frame(2, 2, 0, 0), solid_frame(2, 2, 0, 1)];
        let mut reformatter = FrameReformatter::new(frames.into_iter(), (2, 2));
        assert_eq!(reformatter.geometry(), None);
        reformatter.next().unwrap().unwrap();
        assert_eq!(reformatter.geometry(), Some(ImageGeometry::new(2, 2)));
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        let mut reformatter = FrameReformatter::new(std::iter::empty::<Frame>(), (2, 2));
        assert!(reformatter.next().is_none());
        assert_eq!(reformatter.geometry(), None);
    }
}
