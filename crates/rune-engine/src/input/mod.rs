pub mod gesture;

pub use gesture::{CaptureEvent, Gesture, GestureCapture, Point, Stroke};
