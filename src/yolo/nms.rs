//! 非极大值抑制
//!
//! 按类别独立进行，不同类别的检测框互不抑制。

use std::collections::BTreeMap;

use crate::yolo::bounds::Detection;

/// 应用按类别的非极大值抑制
///
/// 置信度不高于 `confidence_threshold` 的候选直接忽略。每个类别内按置信度降序
/// （同分保持原始顺序）依次选出最高者，并去掉与其 IoU 大于 `iou_threshold` 的其余候选。
///
/// 输出按类别ID升序拼接，类别内部为选择顺序。
///
/// # 示例
///
/// ```
/// use yolodet::{BoundingBox, Detection};
/// use yolodet::yolo::nms::suppress;
///
/// let candidates = vec![
///     Detection::new(BoundingBox::new(0, 0, 100, 100), 0.8, 0),
///     Detection::new(BoundingBox::new(2, 2, 100, 100), 0.9, 0),
/// ];
/// let kept = suppress(&candidates, 0.5, 0.5);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].confidence(), 0.9);
/// ```
pub fn suppress(
    candidates: &[Detection],
    confidence_threshold: f32,
    iou_threshold: f32,
) -> Vec<Detection> {
    let mut groups: BTreeMap<usize, Vec<Detection>> = BTreeMap::new();
    for detection in candidates
        .iter()
        .filter(|d| d.confidence() > confidence_threshold)
    {
        groups
            .entry(detection.class_id())
            .or_default()
            .push(*detection);
    }

    let mut result = Vec::new();
    for (_, group) in groups {
        result.extend(apply_nms(group, iou_threshold));
    }
    result
}

/// 单一类别内的贪心抑制
fn apply_nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    // sort_by 是稳定排序，同分保持原始顺序
    detections.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));

    let mut result = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }

        let selected = detections[i];
        result.push(selected);

        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if selected.bbox().iou(&detections[j].bbox()) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    result
}
