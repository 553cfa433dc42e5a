use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A sampled pointer location plus its capture timestamp (milliseconds,
/// monotonic within a trace).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub t: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, t: f32) -> Self {
        Self { x, y, t }
    }

    /// Spatial part of the point.
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// One continuous drag from touch-down to touch-up.
pub type Stroke = Vec<Point>;

/// One complete multi-stroke drawing, strokes in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gesture {
    pub strokes: Vec<Stroke>,
}

impl Gesture {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    /// Iterate over every point of every stroke, in draw order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.strokes.iter().flatten()
    }

    /// All positions flattened into a single polyline.
    pub fn positions(&self) -> Vec<Vec2> {
        self.points().map(Point::pos).collect()
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Vec::len).sum()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

/// Result of feeding one capture call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A new stroke was opened.
    StrokeBegan,
    /// Point appended to the open stroke.
    PointAdded,
    /// The open stroke was closed and kept as part of the gesture.
    StrokeEnded,
    /// The stroke was short enough to count as a tap; it is not kept.
    Tap,
    /// Second tap inside the double-tap window: the caller should submit.
    DoubleTap,
    /// Nothing to do (e.g., extend without begin).
    Ignored,
}

/// Collects strokes for the gesture in progress.
/// The presentation layer pushes pointer samples; the session drains the
/// finished gesture on submission.
pub struct GestureCapture {
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
    /// Max travel (world units) for a stroke to count as a tap.
    tap_radius: f32,
    /// Max gap between two taps (milliseconds) for a double tap.
    double_tap_window_ms: f32,
    last_tap_t: Option<f32>,
}

impl GestureCapture {
    pub fn new(tap_radius: f32, double_tap_window_ms: f32) -> Self {
        Self {
            strokes: Vec::with_capacity(4),
            current: None,
            tap_radius,
            double_tap_window_ms,
            last_tap_t: None,
        }
    }

    /// Open a new stroke. An unfinished stroke is closed first.
    pub fn begin_stroke(&mut self) -> CaptureEvent {
        if self.current.is_some() {
            self.end_stroke();
        }
        self.current = Some(Vec::with_capacity(64));
        CaptureEvent::StrokeBegan
    }

    /// Append a sample to the open stroke.
    pub fn extend_stroke(&mut self, point: Point) -> CaptureEvent {
        match self.current.as_mut() {
            Some(stroke) => {
                stroke.push(point);
                CaptureEvent::PointAdded
            }
            None => CaptureEvent::Ignored,
        }
    }

    /// Close the open stroke. Short strokes are classified as taps.
    pub fn end_stroke(&mut self) -> CaptureEvent {
        let Some(stroke) = self.current.take() else {
            return CaptureEvent::Ignored;
        };
        let Some(last) = stroke.last().copied() else {
            return CaptureEvent::Ignored;
        };

        if self.is_tap(&stroke) {
            return match self.last_tap_t {
                Some(prev) if last.t - prev <= self.double_tap_window_ms => {
                    self.last_tap_t = None;
                    CaptureEvent::DoubleTap
                }
                _ => {
                    self.last_tap_t = Some(last.t);
                    CaptureEvent::Tap
                }
            };
        }

        self.last_tap_t = None;
        self.strokes.push(stroke);
        CaptureEvent::StrokeEnded
    }

    /// Take the finished strokes as a gesture, leaving the capture empty.
    pub fn take_gesture(&mut self) -> Gesture {
        self.current = None;
        self.last_tap_t = None;
        Gesture::new(std::mem::take(&mut self.strokes))
    }

    /// Discard everything captured so far.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
        self.last_tap_t = None;
    }

    /// Number of finished strokes.
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.current.as_ref().map_or(true, Vec::is_empty)
    }

    fn is_tap(&self, stroke: &[Point]) -> bool {
        let Some(first) = stroke.first() else {
            return false;
        };
        stroke
            .iter()
            .all(|p| p.pos().distance(first.pos()) <= self.tap_radius)
    }
}
