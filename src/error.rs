//! 错误类型
//!
//! 检测流程中的所有失败都归入 [`DetectError`]，调用方据此决定跳过当前帧还是终止程序。

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    /// 输入帧为空或通道数不受支持
    #[error("无效的输入帧: {0}")]
    InvalidFrame(String),

    /// 模型输出形状与配置的类别数不符
    #[error("模型输出形状不符合预期: 期望 {expected}, 实际 {actual}")]
    MalformedOutput { expected: String, actual: String },

    /// 构造阶段无法初始化推理引擎
    #[error("模型加载失败 {}: {reason}", .path.display())]
    ModelLoadError { path: PathBuf, reason: String },

    /// 单次推理调用失败，检测器仍可继续使用
    #[error("推理失败: {0}")]
    InferenceError(String),

    #[error("配置无效: {0}")]
    InvalidConfig(String),

    #[error("绘制检测结果失败: {0}")]
    Render(String),
}

impl From<ort::Error> for DetectError {
    fn from(err: ort::Error) -> Self {
        DetectError::InferenceError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DetectError {
    fn from(err: ndarray::ShapeError) -> Self {
        DetectError::InferenceError(err.to_string())
    }
}

impl DetectError {
    pub fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DetectError::ModelLoadError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(expected: impl ToString, actual: impl ToString) -> Self {
        DetectError::MalformedOutput {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// 是否为可跳过的逐帧错误
    ///
    /// 输出形状不符说明模型与配置不匹配，每一帧都会失败，因此不算在内。
    pub fn is_per_frame(&self) -> bool {
        matches!(
            self,
            DetectError::InvalidFrame(_) | DetectError::InferenceError(_)
        )
    }
}
