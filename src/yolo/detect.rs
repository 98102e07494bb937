use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::error::DetectError;
use crate::yolo::bounds::Detection;
use crate::yolo::infer::{InferenceEngine, OrtEngine};
use crate::yolo::nms::suppress;
use crate::yolo::posts::decode;
use crate::yolo::prevs::preprocess;

/// 目标检测能力
///
/// 每种模型族一个实现，输入一帧图像，返回检测到的所有目标。
pub trait Detector {
    fn detect(&mut self, frame: &DynamicImage) -> Result<Vec<Detection>, DetectError>;
}

/// YOLO目标检测器
///
/// 封装了完整的检测流程：预处理、模型推理、输出解码和按类别NMS。
/// 配置在构造时校验并固定，之后只读。
///
/// 同一实例不支持并发调用；需要更高吞吐时为每个工作线程各构造一个实例。
///
/// # 示例
///
/// ```no_run
/// use yolodet::{DetectorConfig, YoloDetector, load_image};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DetectorConfig::default()
///     .with_confidence_threshold(0.45)
///     .with_nms_threshold(0.5);
/// let mut detector = YoloDetector::new("assets/models/yolov5n.onnx", config)?;
/// let image = load_image("data/test/street.jpg")?;
/// let detections = detector.detect(&image)?;
/// # Ok(())
/// # }
/// ```
pub struct YoloDetector<E = OrtEngine> {
    engine: E,
    config: DetectorConfig,
}

impl YoloDetector<OrtEngine> {
    /// 从ONNX模型文件创建检测器
    ///
    /// 模型在此处立即加载，加载失败返回 [`DetectError::ModelLoadError`]，
    /// 不会产生半初始化的检测器。
    pub fn new(model_path: impl AsRef<Path>, config: DetectorConfig) -> Result<Self, DetectError> {
        config.validate()?;
        let engine = OrtEngine::load(model_path)?;
        Self::with_engine(engine, config)
    }
}

impl<E: InferenceEngine> YoloDetector<E> {
    /// 使用已构造好的推理引擎创建检测器
    pub fn with_engine(engine: E, config: DetectorConfig) -> Result<Self, DetectError> {
        config.validate()?;
        info!(
            "检测器就绪: 输入 {}x{}, {} 个类别, 置信度阈值 {}, NMS 阈值 {}",
            config.input_width,
            config.input_height,
            config.num_classes(),
            config.confidence_threshold,
            config.nms_iou_threshold
        );
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// 完整的检测流程：从图像到检测结果
    ///
    /// # 错误处理
    /// * [`DetectError::InvalidFrame`] - 图像为空或通道数不受支持
    /// * [`DetectError::InferenceError`] - 推理引擎调用失败
    /// * [`DetectError::MalformedOutput`] - 模型输出与配置的类别数不符
    ///
    /// 任何错误都不会修改配置，检测器可继续用于下一帧。
    pub fn detect(&mut self, frame: &DynamicImage) -> Result<Vec<Detection>, DetectError> {
        let config = &self.config;

        let start_time = Instant::now();
        let prepared = preprocess(frame, config.input_width, config.input_height)?;
        let preprocess_time = start_time.elapsed();

        let start_time = Instant::now();
        let output = self.engine.run(&prepared.tensor)?;
        let inference_time = start_time.elapsed();

        let start_time = Instant::now();
        let candidates = decode(
            output.view(),
            prepared.scale_x,
            prepared.scale_y,
            config.confidence_threshold,
            config.num_classes(),
        )?;
        let detections = suppress(
            &candidates,
            config.confidence_threshold,
            config.nms_iou_threshold,
        );
        let postprocess_time = start_time.elapsed();

        let (width, height) = frame.dimensions();
        debug!(
            "帧 {}x{}: 预处理 {:?}, 推理 {:?}, 后处理 {:?}, 候选 {} 个, 输出 {} 个",
            width,
            height,
            preprocess_time,
            inference_time,
            postprocess_time,
            candidates.len(),
            detections.len()
        );

        Ok(detections)
    }
}

impl<E: InferenceEngine> Detector for YoloDetector<E> {
    fn detect(&mut self, frame: &DynamicImage) -> Result<Vec<Detection>, DetectError> {
        YoloDetector::detect(self, frame)
    }
}
