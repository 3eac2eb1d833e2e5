//! Mock implementations of core port traits.
//!
//! Counters and captures live behind `Arc<Mutex<_>>` so a clone kept by the
//! test observes calls made through the boxed copy handed to a session.

use std::sync::{Arc, Mutex, PoisonError};

use gaze_track_core::domain::{FaceRegion, Frame, FrameResult, LandmarkSet};
use gaze_track_core::ports::{
    FaceDetector, FrameSource, LandmarkPredictor, ProgressEvent, ProgressSink, ResultOutput,
};

fn bump(counter: &Mutex<usize>) {
    *counter.lock().unwrap_or_else(PoisonError::into_inner) += 1;
}

fn read(counter: &Mutex<usize>) -> usize {
    *counter.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock implementation of `FrameSource` for testing.
///
/// Yields pre-built frames and tracks iteration for assertions.
#[derive(Clone)]
pub struct MockFrameSource {
    frames: Vec<Frame>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockFrameSource {
    /// Creates a new mock source with the given frames.
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        read(&self.iteration_count)
    }
}

impl FrameSource for MockFrameSource {
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<Frame>> + Send + '_> {
        bump(&self.iteration_count);
        Box::new(self.frames.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}

/// Mock implementation of `FaceDetector` for testing.
///
/// Reports the same faces for every frame.
#[derive(Clone)]
pub struct MockFaceDetector {
    faces: Vec<FaceRegion>,
    failure: Option<String>,
    calls: Arc<Mutex<usize>>,
}

impl MockFaceDetector {
    /// Creates a detector that finds `faces` in every frame.
    #[must_use]
    pub fn new(faces: Vec<FaceRegion>) -> Self {
        Self {
            faces,
            failure: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a detector that never finds a face.
    #[must_use]
    pub fn none() -> Self {
        Self::new(vec![])
    }

    /// Creates a detector whose every call fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::none()
        }
    }

    /// Returns the number of `detect` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        read(&self.calls)
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&self, _frame: &Frame) -> anyhow::Result<Vec<FaceRegion>> {
        bump(&self.calls);
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        Ok(self.faces.clone())
    }
}

/// Mock implementation of `LandmarkPredictor` for testing.
///
/// Returns the same landmarks for every face and records the faces it was asked about.
#[derive(Clone)]
pub struct MockLandmarkPredictor {
    landmarks: LandmarkSet,
    faces: Arc<Mutex<Vec<FaceRegion>>>,
}

impl MockLandmarkPredictor {
    /// Creates a predictor that always returns `landmarks`.
    #[must_use]
    pub fn new(landmarks: LandmarkSet) -> Self {
        Self {
            landmarks,
            faces: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns every face passed to `predict`, in call order.
    #[must_use]
    pub fn faces(&self) -> Vec<FaceRegion> {
        self.faces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `predict` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.faces().len()
    }
}

impl LandmarkPredictor for MockLandmarkPredictor {
    fn predict(&self, _frame: &Frame, face: &FaceRegion) -> anyhow::Result<LandmarkSet> {
        self.faces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*face);
        Ok(self.landmarks.clone())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures results for later assertions.
#[derive(Clone)]
pub struct MockResultOutput {
    results: Arc<Mutex<Vec<FrameResult>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured results.
    #[must_use]
    pub fn results(&self) -> Vec<FrameResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        read(&self.flush_count)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, result: &FrameResult) -> anyhow::Result<()> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        bump(&self.flush_count);
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
#[derive(Clone)]
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gaze_track_core::domain::{FrameDimensions, GazeReading, Point};
    use image::GrayImage;

    fn frame() -> Frame {
        Frame::from_gray("frame.png", GrayImage::new(8, 8))
    }

    #[test]
    fn test_mock_frame_source_empty() {
        let source = MockFrameSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.frames().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_frame_source_with_frames() {
        let source = MockFrameSource::new(vec![frame(), frame()]);
        assert_eq!(source.count_hint(), Some(2));
        assert_eq!(source.frames().filter(Result::is_ok).count(), 2);
    }

    #[test]
    fn test_mock_face_detector_counts_calls_across_clones() {
        let region = FaceRegion::new(1, 2, 3, 4);
        let detector = MockFaceDetector::new(vec![region]);
        let handle = detector.clone();

        assert_eq!(detector.detect(&frame()).unwrap(), vec![region]);
        assert_eq!(detector.detect(&frame()).unwrap(), vec![region]);
        assert_eq!(handle.call_count(), 2);

        assert!(MockFaceDetector::none().detect(&frame()).unwrap().is_empty());
    }

    #[test]
    fn test_mock_face_detector_failing() {
        let detector = MockFaceDetector::failing("sensor offline");
        let err = detector.detect(&frame()).unwrap_err();
        assert_eq!(err.to_string(), "sensor offline");
        assert_eq!(detector.call_count(), 1);
    }

    #[test]
    fn test_mock_landmark_predictor_records_faces() {
        let landmarks = LandmarkSet::new(vec![Point::new(3, 4); LandmarkSet::LEN]).unwrap();
        let predictor = MockLandmarkPredictor::new(landmarks.clone());
        let face = FaceRegion::new(0, 0, 10, 10);

        assert_eq!(predictor.predict(&frame(), &face).unwrap(), landmarks);
        assert_eq!(predictor.faces(), vec![face]);
        assert_eq!(predictor.call_count(), 1);
    }

    #[test]
    fn test_mock_result_output() {
        let output = MockResultOutput::new();

        let result = FrameResult {
            path: "frame.png".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            dimensions: FrameDimensions::new(8, 8),
            gaze: GazeReading::default(),
        };

        output.write(&result).unwrap();
        output.flush().unwrap();

        assert_eq!(output.results().len(), 1);
        assert_eq!(output.results()[0].path, "frame.png");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "frame.png".into(),
            index: 0,
            total: Some(1),
        });
        sink.on_event(ProgressEvent::Skipped {
            path: "frame.png".into(),
            reason: "unreadable".into(),
        });
        sink.on_event(ProgressEvent::Finished {
            processed: 0,
            skipped: 1,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.skipped_count(), 1);
        assert_eq!(sink.completed_count(), 0);
        assert_eq!(sink.finished_counts(), Some((0, 1)));
    }
}
