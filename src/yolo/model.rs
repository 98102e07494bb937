use std::path::Path;

use ort::session::{Session, builder::GraphOptimizationLevel};
use tracing::{debug, info};

use crate::error::DetectError;

/// 加载YOLO模型
///
/// 加载ONNX格式的YOLO模型，并应用优化配置。文件不存在、格式损坏或含有不支持的算子时
/// 返回 [`DetectError::ModelLoadError`]。
///
/// # 示例
///
/// ```no_run
/// use yolodet::yolo::model::load_model;
///
/// # fn main() -> Result<(), yolodet::DetectError> {
/// let model = load_model("assets/models/yolov5n.onnx")?;
/// # Ok(())
/// # }
/// ```
pub fn load_model(model_path: impl AsRef<Path>) -> Result<Session, DetectError> {
    let model_path = model_path.as_ref();
    if !model_path.is_file() {
        return Err(DetectError::model_load(model_path, "模型文件不存在"));
    }

    info!("加载模型文件: {}", model_path.display());
    if let Ok(meta) = std::fs::metadata(model_path) {
        debug!(
            "模型文件大小: {:.2} MB",
            meta.len() as f64 / (1024.0 * 1024.0)
        );
    }

    let model = build_session(model_path).map_err(|e| DetectError::model_load(model_path, e))?;

    if model.inputs.len() != 1 {
        return Err(DetectError::model_load(
            model_path,
            format!("预期模型输入数量为 1, 实际为 {}", model.inputs.len()),
        ));
    }
    if model.outputs.is_empty() {
        return Err(DetectError::model_load(model_path, "模型没有输出"));
    }

    debug!("模型输入: {}", model.inputs[0].name);
    debug!("模型输出数量: {}", model.outputs.len());
    info!("模型加载完成");
    Ok(model)
}

fn build_session(model_path: &Path) -> ort::Result<Session> {
    let model = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(model_path)?;
    Ok(model)
}
