#![allow(dead_code)]

use std::collections::VecDeque;

use ndarray::{Array2, Array4, ArrayD, arr1};
use yolodet::{DetectError, InferenceEngine};

/// 按预设脚本返回输出的推理引擎
pub struct ScriptedEngine {
    script: VecDeque<Result<ArrayD<f32>, String>>,
    fallback: ArrayD<f32>,
    pub calls: usize,
    pub input_shapes: Vec<Vec<usize>>,
}

impl ScriptedEngine {
    /// 每次调用都返回同一个输出
    pub fn returning(output: ArrayD<f32>) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: output,
            calls: 0,
            input_shapes: Vec::new(),
        }
    }

    /// 先失败一次，之后返回 `output`
    pub fn failing_once(output: ArrayD<f32>) -> Self {
        let mut engine = Self::returning(output);
        engine
            .script
            .push_back(Err("incompatible tensor shape".to_string()));
        engine
    }
}

impl InferenceEngine for ScriptedEngine {
    fn run(&mut self, input: &Array4<f32>) -> Result<ArrayD<f32>, DetectError> {
        self.calls += 1;
        self.input_shapes.push(input.shape().to_vec());
        match self.script.pop_front() {
            Some(Ok(output)) => Ok(output),
            Some(Err(msg)) => Err(DetectError::InferenceError(msg)),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// 构造 `[1, rows, cols]` 的模型输出
pub fn yolo_output(rows: &[Vec<f32>]) -> ArrayD<f32> {
    let cols = rows[0].len();
    let mut output = Array2::<f32>::zeros((rows.len(), cols));
    for (i, row) in rows.iter().enumerate() {
        output.row_mut(i).assign(&arr1(row));
    }
    output.insert_axis(ndarray::Axis(0)).into_dyn()
}

/// 一行锚框：中心点、宽高、物体置信度和各类别分数
pub fn anchor(cx: f32, cy: f32, w: f32, h: f32, objectness: f32, class_scores: &[f32]) -> Vec<f32> {
    let mut row = vec![cx, cy, w, h, objectness];
    row.extend_from_slice(class_scores);
    row
}
