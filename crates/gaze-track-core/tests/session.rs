//! End-to-end tracking over synthetic faces through the session API.

#![allow(clippy::unwrap_used)]

use gaze_track_core::{
    EyeSide, GazeSession, GazeStatus, Point, CALIBRATION_FRAMES,
};
use gaze_track_test_support::{MockFaceDetector, MockLandmarkPredictor, SyntheticFace, SyntheticFaceBuilder};

fn session_for(face: &SyntheticFace) -> (GazeSession, MockFaceDetector, MockLandmarkPredictor) {
    let detector = MockFaceDetector::new(vec![face.region]);
    let predictor = MockLandmarkPredictor::new(face.landmarks.clone());
    let session = GazeSession::new(Box::new(detector.clone()), Box::new(predictor.clone()));
    (session, detector, predictor)
}

fn assert_near(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() <= 1 && (actual.y - expected.y).abs() <= 1,
        "{actual:?} is not within a pixel of {expected:?}"
    );
}

#[test]
fn test_centered_gaze() {
    let face = SyntheticFaceBuilder::new().build();
    let (mut session, detector, predictor) = session_for(&face);

    session.refresh(face.frame.clone()).unwrap();

    assert_eq!(detector.call_count(), 1);
    assert_eq!(predictor.faces(), vec![face.region]);
    assert!(session.pupils_located());
    assert_near(session.left_pupil_coords().unwrap(), face.irises[0]);
    assert_near(session.right_pupil_coords().unwrap(), face.irises[1]);

    let ratio = session.horizontal_ratio().unwrap();
    assert!((ratio - 0.6).abs() < 0.03, "{ratio}");
    assert_eq!(session.is_looking_center(), Some(true));
    assert_eq!(session.is_blinking(), Some(false));
    assert_eq!(session.status(), Some(GazeStatus::Center));
}

#[test]
fn test_looking_right() {
    let face = SyntheticFaceBuilder::new()
        .eye_opening(16)
        .iris_radius(5)
        .looking(-16, 0)
        .build();
    let (mut session, _, _) = session_for(&face);

    session.refresh(face.frame.clone()).unwrap();

    assert!(session.pupils_located());
    assert!(session.horizontal_ratio().unwrap() <= 0.35);
    assert_eq!(session.is_looking_right(), Some(true));
    assert_eq!(session.is_looking_center(), Some(false));
    assert_eq!(session.status(), Some(GazeStatus::Right));
}

#[test]
fn test_looking_left() {
    let face = SyntheticFaceBuilder::new()
        .eye_opening(16)
        .iris_radius(5)
        .looking(16, 0)
        .build();
    let (mut session, _, _) = session_for(&face);

    session.refresh(face.frame.clone()).unwrap();

    assert!(session.horizontal_ratio().unwrap() >= 0.65);
    assert_eq!(session.status(), Some(GazeStatus::Left));
}

#[test]
fn test_closed_eyes_blink() {
    let face = SyntheticFaceBuilder::new().closed().build();
    let (mut session, _, _) = session_for(&face);

    session.refresh(face.frame.clone()).unwrap();

    assert!(session.pupils_located());
    assert_eq!(session.is_blinking(), Some(true));
    assert_eq!(session.status(), Some(GazeStatus::Blinking));
    assert!(session.eyes().unwrap().blinking_ratio() > 10.0);
}

#[test]
fn test_calibration_completes_and_freezes() {
    let face = SyntheticFaceBuilder::new().build();
    let (mut session, _, _) = session_for(&face);

    for i in 0..CALIBRATION_FRAMES {
        assert!(!session.calibration().is_complete(), "complete after {i} frames");
        session.refresh(face.frame.clone()).unwrap();
    }
    assert!(session.calibration().is_complete());
    assert!(session.reading().calibrated);

    let threshold = session.calibration().threshold(EyeSide::Left).unwrap();
    for _ in 0..5 {
        session.refresh(face.frame.clone()).unwrap();
        assert_eq!(session.left_eye().unwrap().threshold, Some(threshold));
    }
    assert!(session.calibration().is_complete());
    assert_eq!(
        session.calibration().samples(EyeSide::Right).len(),
        CALIBRATION_FRAMES
    );
}

#[test]
fn test_no_face_clears_previous_eyes() {
    let face = SyntheticFaceBuilder::new().build();
    let mut session = GazeSession::new(
        Box::new(MockFaceDetector::none()),
        Box::new(MockLandmarkPredictor::new(face.landmarks.clone())),
    );

    for _ in 0..3 {
        session
            .refresh(SyntheticFaceBuilder::blank("empty.png"))
            .unwrap();
        assert!(!session.pupils_located());
        assert!(session.eyes().is_none());
        assert!(!session.reading().face_detected);
    }
}

#[test]
fn test_detector_error_propagates() {
    let face = SyntheticFaceBuilder::new().build();
    let mut session = GazeSession::new(
        Box::new(MockFaceDetector::failing("model not loaded")),
        Box::new(MockLandmarkPredictor::new(face.landmarks.clone())),
    );

    let err = session.refresh(face.frame.clone()).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("face detection failed"), "{chain}");
    assert!(chain.contains("model not loaded"), "{chain}");
    assert!(!session.pupils_located());
}

#[test]
fn test_annotated_frame_marks_pupils() {
    let face = SyntheticFaceBuilder::new().build();
    let (mut session, _, _) = session_for(&face);
    session.refresh(face.frame.clone()).unwrap();

    let annotated = session.annotated_frame().unwrap();
    assert_eq!(annotated.dimensions(), face.frame.image.dimensions());

    let pupil = session.left_pupil_coords().unwrap();
    #[allow(clippy::cast_sign_loss)]
    let marker = annotated.get_pixel((pupil.x + 4) as u32, pupil.y as u32);
    assert_eq!(marker.0, [0, 255, 0]);

    // Untouched pixels keep their gray value.
    assert_eq!(annotated.get_pixel(2, 2).0, [180, 180, 180]);
}

#[test]
fn test_reading_reflects_session() {
    let face = SyntheticFaceBuilder::new().build();
    let (mut session, _, _) = session_for(&face);
    session.refresh(face.frame.clone()).unwrap();

    let reading = session.reading();
    assert!(reading.face_detected);
    assert!(reading.pupils_located);
    assert!(!reading.calibrated);
    assert_eq!(reading.left_pupil, session.left_pupil_coords());
    assert_eq!(reading.horizontal_ratio, session.horizontal_ratio());
    assert_eq!(reading.status, Some(GazeStatus::Center));
}
