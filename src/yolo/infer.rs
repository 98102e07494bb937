use std::path::Path;

use ndarray::{Array4, ArrayD, IxDyn};
use ort::{inputs, session::Session, value::Tensor};
use tracing::debug;

use crate::error::DetectError;
use crate::yolo::model::load_model;

/// 推理引擎
///
/// 接收预处理后的 `(1, 3, H, W)` 张量，返回模型的原始输出。实现不要求可重入，
/// 因此 `run` 需要 `&mut self`。
pub trait InferenceEngine {
    fn run(&mut self, input: &Array4<f32>) -> Result<ArrayD<f32>, DetectError>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn run(&mut self, input: &Array4<f32>) -> Result<ArrayD<f32>, DetectError> {
        (**self).run(input)
    }
}

/// 基于 ONNX Runtime 的推理引擎
pub struct OrtEngine {
    session: Session,
    input_name: String,
}

impl OrtEngine {
    /// 从ONNX模型文件创建推理引擎，失败时返回 [`DetectError::ModelLoadError`]
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, DetectError> {
        let session = load_model(model_path)?;
        let input_name = session.inputs[0].name.clone();
        Ok(Self {
            session,
            input_name,
        })
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }
}

impl InferenceEngine for OrtEngine {
    fn run(&mut self, input: &Array4<f32>) -> Result<ArrayD<f32>, DetectError> {
        run_inference(&mut self.session, &self.input_name, input)
    }
}

/// 运行模型推理
///
/// # 参数
/// * `model` - ONNX模型Session
/// * `input_name` - 模型输入名称，YOLOv5 导出的模型为 `images`
/// * `input` - 输入张量，形状应为(1, 3, height, width)
///
/// # 返回值
/// 第一个输出张量，YOLOv5 为 `[1, num_anchors, 5 + num_classes]`
///
/// # 错误处理
/// 推理过程中发生错误（如输入形状与模型不兼容）会返回 [`DetectError::InferenceError`]
pub fn run_inference(
    model: &mut Session,
    input_name: &str,
    input: &Array4<f32>,
) -> Result<ArrayD<f32>, DetectError> {
    let shape = input.shape();
    let data: Vec<f32> = input.iter().copied().collect();
    let input_tensor = Tensor::from_array(([shape[0], shape[1], shape[2], shape[3]], data))?;

    let outputs = model.run(inputs![input_name => input_tensor])?;

    let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
    let dims: Vec<usize> = output_shape.iter().map(|&d| d.max(0) as usize).collect();
    debug!("模型输出形状: {:?}", dims);

    let output = ArrayD::from_shape_vec(IxDyn(&dims), output_data.to_vec())?;
    Ok(output)
}
