//! 检测器配置
//!
//! 默认超参数与 COCO 类别表。配置在构造检测器时校验一次，此后只读。

use std::path::Path;

use crate::error::DetectError;

// 目标检测超参数默认值
pub const DEFAULT_INPUT_WIDTH: u32 = 640;
pub const DEFAULT_INPUT_HEIGHT: u32 = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.45;
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.5;

/// COCO 数据集类别名称
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// 模型配置
///
/// 包含模型输入尺寸、两个阈值以及类别标签表。类别数由标签表长度决定。
///
/// # 示例
///
/// ```
/// use yolodet::DetectorConfig;
///
/// let config = DetectorConfig::default()
///     .with_confidence_threshold(0.5)
///     .with_nms_threshold(0.6);
/// assert_eq!(config.num_classes(), 80);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// 模型输入宽度
    pub input_width: u32,
    /// 模型输入高度
    pub input_height: u32,
    /// 置信度阈值，同时用于物体置信度与综合置信度两道过滤
    pub confidence_threshold: f32,
    /// NMS IoU 阈值
    pub nms_iou_threshold: f32,
    /// 类别标签，下标即类别ID
    pub class_labels: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_iou_threshold: DEFAULT_NMS_THRESHOLD,
            class_labels: COCO_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DetectorConfig {
    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.input_width = width;
        self.input_height = height;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_nms_threshold(mut self, threshold: f32) -> Self {
        self.nms_iou_threshold = threshold;
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    /// 根据类别ID查找标签名称
    pub fn label(&self, class_id: usize) -> Option<&str> {
        self.class_labels.get(class_id).map(String::as_str)
    }

    /// 校验配置
    ///
    /// 输入尺寸必须为正，阈值必须位于 [0, 1]，标签表不能为空。
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(DetectError::InvalidConfig(format!(
                "模型输入尺寸必须为正: {}x{}",
                self.input_width, self.input_height
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(DetectError::InvalidConfig(format!(
                "置信度阈值超出 [0, 1]: {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.nms_iou_threshold) {
            return Err(DetectError::InvalidConfig(format!(
                "NMS 阈值超出 [0, 1]: {}",
                self.nms_iou_threshold
            )));
        }
        if self.class_labels.is_empty() {
            return Err(DetectError::InvalidConfig("类别标签表为空".to_string()));
        }
        Ok(())
    }
}

/// 从文本文件加载类别标签，每行一个，忽略空行
pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>, DetectError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        DetectError::InvalidConfig(format!("无法读取标签文件 {}: {}", path.display(), e))
    })?;
    let labels: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return Err(DetectError::InvalidConfig(format!(
            "标签文件为空: {}",
            path.display()
        )));
    }
    Ok(labels)
}
