//! 模型输出解码
//!
//! 把 YOLOv5 风格的扁平输出 `[num_anchors, 5 + num_classes]` 逐行解析为候选检测框。
//! 每行布局为 `[cx, cy, w, h, objectness, class_score_0 ..]`，坐标位于模型输入像素空间。

use ndarray::{ArrayView1, ArrayView2, ArrayViewD, Axis, Ix2, s};

use crate::error::DetectError;
use crate::yolo::bounds::{BoundingBox, Detection};

/// 每行前5列：cx, cy, w, h, objectness
pub const ROW_HEADER_LEN: usize = 5;

/// 单个锚框行的原始候选，仅在解码过程中存在
#[derive(Debug)]
struct RawCandidate<'a> {
    cx: f32,
    cy: f32,
    w: f32,
    h: f32,
    objectness: f32,
    class_scores: ArrayView1<'a, f32>,
}

impl<'a> RawCandidate<'a> {
    fn from_row(row: ArrayView1<'a, f32>) -> Self {
        Self {
            cx: row[0],
            cy: row[1],
            w: row[2],
            h: row[3],
            objectness: row[4],
            class_scores: row.slice_move(s![ROW_HEADER_LEN..]),
        }
    }

    /// 最高类别分数及其下标，分数相同时取第一个
    fn best_class(&self) -> (usize, f32) {
        let mut best = (0usize, f32::NEG_INFINITY);
        for (idx, &score) in self.class_scores.iter().enumerate() {
            if score > best.1 {
                best = (idx, score);
            }
        }
        best
    }

    /// 中心点形式转换为左上角形式并缩放回原图，结果向零截断
    fn to_box(&self, scale_x: f32, scale_y: f32) -> BoundingBox {
        let left = (self.cx - self.w / 2.0) * scale_x;
        let top = (self.cy - self.h / 2.0) * scale_y;
        BoundingBox::new(
            left as i32,
            top as i32,
            (self.w * scale_x) as i32,
            (self.h * scale_y) as i32,
        )
    }
}

/// 将模型输出视为二维锚框行
///
/// 接受 `[num_anchors, 5 + num_classes]`，或带有大小为1的批次维度的
/// `[1, num_anchors, 5 + num_classes]`。
pub fn anchor_rows<'a>(
    raw_output: ArrayViewD<'a, f32>,
    num_classes: usize,
) -> Result<ArrayView2<'a, f32>, DetectError> {
    let expected = format!("[num_anchors, {}]", ROW_HEADER_LEN + num_classes);
    let actual = format!("{:?}", raw_output.shape());

    let rows = match raw_output.ndim() {
        2 => raw_output.into_dimensionality::<Ix2>(),
        3 if raw_output.shape()[0] == 1 => raw_output
            .index_axis_move(Axis(0), 0)
            .into_dimensionality::<Ix2>(),
        _ => return Err(DetectError::malformed(expected, actual)),
    }
    .map_err(|_| DetectError::malformed(&expected, &actual))?;

    if rows.ncols() != ROW_HEADER_LEN + num_classes {
        return Err(DetectError::malformed(expected, actual));
    }
    Ok(rows)
}

/// 解码模型输出
///
/// 对每个锚框行依次：
/// 1. 物体置信度低于阈值则丢弃
/// 2. 取最高类别分数
/// 3. 综合置信度 = 物体置信度 × 最高类别分数，必须严格大于同一阈值
/// 4. 坐标换算到原图
///
/// 输出顺序与输入行顺序一致，不做排序。
///
/// # 参数
/// * `raw_output` - 模型输出
/// * `scale_x` / `scale_y` - 原图尺寸与模型输入尺寸之比
/// * `confidence_threshold` - 置信度阈值
/// * `num_classes` - 类别数
///
/// # 错误处理
/// 输出形状与类别数不符时返回 [`DetectError::MalformedOutput`]
///
/// # 示例
///
/// ```
/// use ndarray::Array2;
/// use yolodet::yolo::posts::decode;
///
/// # fn main() -> Result<(), yolodet::DetectError> {
/// let mut output = Array2::<f32>::zeros((2, 7));
/// output.row_mut(1).assign(&ndarray::arr1(&[50.0, 50.0, 20.0, 10.0, 0.9, 0.1, 0.8]));
/// let detections = decode(output.view().into_dyn(), 1.0, 1.0, 0.5, 2)?;
/// assert_eq!(detections.len(), 1);
/// assert_eq!(detections[0].class_id(), 1);
/// # Ok(())
/// # }
/// ```
pub fn decode(
    raw_output: ArrayViewD<'_, f32>,
    scale_x: f32,
    scale_y: f32,
    confidence_threshold: f32,
    num_classes: usize,
) -> Result<Vec<Detection>, DetectError> {
    if num_classes == 0 {
        return Err(DetectError::malformed(
            "至少一个类别",
            "num_classes = 0",
        ));
    }
    let rows = anchor_rows(raw_output, num_classes)?;

    let mut detections = Vec::new();
    for row in rows.axis_iter(Axis(0)) {
        let candidate = RawCandidate::from_row(row);
        if candidate.objectness < confidence_threshold {
            continue;
        }

        let (class_id, max_class_score) = candidate.best_class();
        let confidence = candidate.objectness * max_class_score;
        if confidence > confidence_threshold {
            detections.push(Detection::new(
                candidate.to_box(scale_x, scale_y),
                confidence,
                class_id,
            ));
        }
    }

    Ok(detections)
}
