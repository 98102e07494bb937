mod common;

use image::DynamicImage;
use ndarray::{Array3, ArrayD};
use yolodet::{BoundingBox, DetectError, Detector, DetectorConfig, YoloDetector};

use common::{ScriptedEngine, anchor, yolo_output};

fn three_class_config() -> DetectorConfig {
    DetectorConfig::default()
        .with_input_size(64, 64)
        .with_confidence_threshold(0.3)
        .with_nms_threshold(0.5)
        .with_labels(["person", "car", "dog"])
}

#[test]
fn empty_result_when_nothing_clears_threshold() {
    let output = yolo_output(&[
        anchor(32.0, 32.0, 10.0, 10.0, 0.2, &[1.0, 0.0, 0.0]),
        anchor(16.0, 16.0, 8.0, 8.0, 0.5, &[0.5, 0.1, 0.1]),
    ]);
    let mut detector =
        YoloDetector::with_engine(ScriptedEngine::returning(output), three_class_config()).unwrap();

    let detections = detector.detect(&DynamicImage::new_rgb8(128, 96)).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn detects_rescales_and_suppresses_per_class() {
    let output = yolo_output(&[
        // 覆盖整个模型输入的框
        anchor(32.0, 32.0, 64.0, 64.0, 0.9, &[0.9, 0.0, 0.0]),
        // 与上一行同类且高度重叠，置信度更低
        anchor(32.0, 30.0, 64.0, 60.0, 0.8, &[0.9, 0.0, 0.0]),
        // 同一位置的另一类别
        anchor(32.0, 30.0, 64.0, 60.0, 0.8, &[0.0, 0.9, 0.0]),
        // 低于物体置信度阈值
        anchor(10.0, 10.0, 4.0, 4.0, 0.1, &[0.0, 0.0, 1.0]),
    ]);
    let mut detector =
        YoloDetector::with_engine(ScriptedEngine::returning(output), three_class_config()).unwrap();

    let frame = DynamicImage::new_rgb8(128, 128);
    let detections = detector.detect(&frame).unwrap();

    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].class_id(), 0);
    assert_eq!(detections[0].bbox(), BoundingBox::new(0, 0, 128, 128));
    assert!((detections[0].confidence() - 0.81).abs() < 1e-6);
    assert_eq!(detections[1].class_id(), 1);
    assert_eq!(detections[1].bbox(), BoundingBox::new(0, 0, 128, 120));
    assert!((detections[1].confidence() - 0.72).abs() < 1e-6);
}

#[test]
fn engine_receives_normalized_nchw_tensor() {
    let output = yolo_output(&[anchor(0.0, 0.0, 0.0, 0.0, 0.0, &[0.0, 0.0, 0.0])]);
    let mut detector = YoloDetector::with_engine(
        ScriptedEngine::returning(output),
        three_class_config().with_input_size(48, 32),
    )
    .unwrap();

    detector.detect(&DynamicImage::new_rgb8(300, 200)).unwrap();
    detector.detect(&DynamicImage::new_rgb8(10, 10)).unwrap();

    let engine = detector.engine();
    assert_eq!(engine.calls, 2);
    assert!(engine.input_shapes.iter().all(|shape| shape == &[1, 3, 32, 48]));
}

#[test]
fn inference_error_leaves_detector_usable() {
    let output = yolo_output(&[anchor(32.0, 32.0, 16.0, 16.0, 0.9, &[0.0, 0.0, 0.9])]);
    let mut detector = YoloDetector::with_engine(
        ScriptedEngine::failing_once(output),
        three_class_config(),
    )
    .unwrap();
    let before = detector.config().clone();
    let frame = DynamicImage::new_rgb8(64, 64);

    let err = detector.detect(&frame).unwrap_err();
    assert!(matches!(err, DetectError::InferenceError(_)));
    assert!(err.is_per_frame());
    assert_eq!(detector.config(), &before);

    let detections = detector.detect(&frame).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id(), 2);
}

#[test]
fn invalid_frames_are_rejected_before_inference() {
    let output = yolo_output(&[anchor(0.0, 0.0, 0.0, 0.0, 0.0, &[0.0, 0.0, 0.0])]);
    let mut detector =
        YoloDetector::with_engine(ScriptedEngine::returning(output), three_class_config()).unwrap();

    for frame in [
        DynamicImage::new_luma8(32, 32),
        DynamicImage::new_rgba8(32, 32),
        DynamicImage::new_rgb8(0, 0),
    ] {
        let err = detector.detect(&frame).unwrap_err();
        assert!(matches!(err, DetectError::InvalidFrame(_)));
    }
    assert!(detector.detect(&DynamicImage::new_rgb8(32, 32)).is_ok());
}

#[test]
fn class_count_mismatch_is_malformed_output() {
    let output: ArrayD<f32> = Array3::<f32>::zeros((1, 10, 85)).into_dyn();
    let mut detector =
        YoloDetector::with_engine(ScriptedEngine::returning(output), three_class_config()).unwrap();

    let err = detector.detect(&DynamicImage::new_rgb8(64, 64)).unwrap_err();
    assert!(matches!(err, DetectError::MalformedOutput { .. }));
    assert!(!err.is_per_frame());
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let output = yolo_output(&[anchor(0.0, 0.0, 0.0, 0.0, 0.0, &[0.0])]);
    let result = YoloDetector::with_engine(
        ScriptedEngine::returning(output),
        three_class_config().with_confidence_threshold(2.0),
    );
    assert!(matches!(result, Err(DetectError::InvalidConfig(_))));
}

#[test]
fn usable_through_detector_trait_object() {
    let output = yolo_output(&[anchor(8.0, 8.0, 4.0, 4.0, 1.0, &[0.0, 1.0, 0.0])]);
    let mut detector =
        YoloDetector::with_engine(ScriptedEngine::returning(output), three_class_config()).unwrap();
    let detector: &mut dyn Detector = &mut detector;

    let detections = detector.detect(&DynamicImage::new_rgb8(64, 64)).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].bbox(), BoundingBox::new(6, 6, 4, 4));
}

#[test]
fn missing_model_fails_at_construction() {
    let result = YoloDetector::new("no/such/model.onnx", DetectorConfig::default());
    assert!(matches!(result, Err(DetectError::ModelLoadError { .. })));
}

#[test]
fn corrupt_model_fails_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.onnx");
    std::fs::write(&path, b"definitely not an onnx graph").unwrap();

    let result = YoloDetector::new(&path, DetectorConfig::default());
    match result {
        Err(DetectError::ModelLoadError { path: failed, .. }) => assert_eq!(failed, path),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("corrupt model must not load"),
    }
}
