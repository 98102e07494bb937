//! YOLO模块 - 实现基于YOLO的目标检测流程
//!
//! 该模块把一帧图像转换为去重后的带标签检测框，包括：
//! - 帧预处理（拉伸缩放、归一化）
//! - 模型推理（ONNX Runtime）
//! - 输出解码（双重置信度过滤、坐标还原）
//! - 按类别的非极大值抑制
//! - 可视化绘制
//!
//! # 工作流程
//!
//! 1. 构造 [`DetectorConfig`](crate::DetectorConfig)
//! 2. 用 [`YoloDetector::new`] 加载模型，失败立即返回
//! 3. 对每一帧调用 [`YoloDetector::detect`]
//! 4. 使用 [`draw_detections`] 绘制检测结果
//!
//! # 示例
//!
//! ```no_run
//! use yolodet::{DetectorConfig, YoloDetector, draw_detections, load_image};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut detector = YoloDetector::new("assets/models/yolov5n.onnx", DetectorConfig::default())?;
//! let image = load_image("data/test/street.jpg")?;
//!
//! let detections = detector.detect(&image)?;
//! let result_image = draw_detections(&image, &detections, &detector.config().class_labels)?;
//! # Ok(())
//! # }
//! ```

pub mod bounds;
pub mod detect;
pub mod draw;
pub mod infer;
pub mod model;
pub mod nms;
pub mod posts;
pub mod prevs;

pub use bounds::{BoundingBox, Detection};
pub use detect::{Detector, YoloDetector};
pub use draw::draw_detections;
pub use infer::{InferenceEngine, OrtEngine};
pub use model::load_model;
pub use nms::suppress;
pub use posts::decode;
pub use prevs::{PreprocessResult, preprocess};
