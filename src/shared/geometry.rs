use serde::Serialize;

/// Original (pre-resize) dimensions of a source image or frame.
///
/// Computed once per image, consumed by the single corresponding detect
/// call so the engine can rescale bounding boxes back to source
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
}

impl ImageGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Bounding box in center form: `(center_x, center_y, width, height)` in
/// source-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CenterBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Converts to edge form.
    ///
    /// Top is `y + height/2` — the convention the downstream response
    /// schema consumers rely on, not the usual y-down image convention.
    pub fn to_edge(self) -> EdgeBox {
        EdgeBox {
            left: self.x - self.width / 2.0,
            top: self.y + self.height / 2.0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Bounding box in edge form: `(left, top, width, height)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EdgeBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}
