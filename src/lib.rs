pub mod config;
pub mod error;
pub mod source;
pub mod utils;
pub mod yolo;

// 重新导出常用类型和函数
pub use config::{DetectorConfig, load_labels};
pub use error::DetectError;
pub use source::{FrameSource, ImageFileSource, Limited, SourceError, load_image};
pub use yolo::{BoundingBox, Detection, Detector, InferenceEngine, OrtEngine, YoloDetector};
pub use yolo::draw_detections;
