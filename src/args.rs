use std::path::PathBuf;

use clap::Parser;

use yolodet::config::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH, DEFAULT_NMS_THRESHOLD,
};

/// YOLO 视频帧目标检测
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// ONNX 模型文件路径
    #[arg(long, value_name = "FILE")]
    pub model: PathBuf,

    /// 输入来源：图像文件或图像目录
    #[arg(long, value_name = "SOURCE", required_unless_present = "camera")]
    pub input: Option<PathBuf>,

    /// 使用 V4L2 摄像头（设备序号），需要 camera 特性
    #[arg(long, value_name = "INDEX", conflicts_with = "input")]
    pub camera: Option<usize>,

    /// 绘制结果的输出目录，不指定则只记录日志
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// 置信度阈值 (0.0 - 1.0)
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_name = "THRESHOLD")]
    pub confidence: f32,

    /// NMS IOU 阈值 (0.0 - 1.0)
    #[arg(long, default_value_t = DEFAULT_NMS_THRESHOLD, value_name = "THRESHOLD")]
    pub nms_threshold: f32,

    /// 模型输入宽度
    #[arg(long, default_value_t = DEFAULT_INPUT_WIDTH)]
    pub input_width: u32,

    /// 模型输入高度
    #[arg(long, default_value_t = DEFAULT_INPUT_HEIGHT)]
    pub input_height: u32,

    /// 类别标签文件（每行一个），默认使用 COCO 80 类
    #[arg(long, value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// 最大处理帧数（0 表示无限制）
    #[arg(long, default_value = "0", value_name = "COUNT")]
    pub max_frames: u64,
}
