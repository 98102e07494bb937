/// 边界框结构
///
/// 原始图像像素坐标下的轴对齐矩形，以左上角和宽高表示。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// 左上角x坐标
    pub x: i32,
    /// 左上角y坐标
    pub y: i32,
    /// 宽度
    pub width: i32,
    /// 高度
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// 右边界（不含）
    ///
    /// 以 i64 计算，解码时饱和到 `i32::MAX` 的坐标相加不会溢出。
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// 下边界（不含）
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// 面积，宽或高非正时为0
    pub fn area(&self) -> i64 {
        if self.is_valid() {
            self.width as i64 * self.height as i64
        } else {
            0
        }
    }

    /// 检查边界框是否有效（宽度和高度都大于0）
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// 与另一个边界框的交集面积
    pub fn intersection(&self, other: &BoundingBox) -> i64 {
        let x1 = self.x.max(other.x) as i64;
        let y1 = self.y.max(other.y) as i64;
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 <= x1 || y2 <= y1 {
            0
        } else {
            (x2 - x1) * (y2 - y1)
        }
    }

    /// 交并比 (IoU)
    ///
    /// 任一边界框面积为0时返回0。
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let (area_a, area_b) = (self.area(), other.area());
        if area_a == 0 || area_b == 0 {
            return 0.0;
        }
        let inter = self.intersection(other);
        let union = area_a + area_b - inter;
        if union <= 0 {
            0.0
        } else {
            (inter as f64 / union as f64) as f32
        }
    }
}

/// 检测结果结构
///
/// 由检测流程产生后不可修改。类别名称通过 [`crate::DetectorConfig::label`] 查询。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    bbox: BoundingBox,
    confidence: f32,
    class_id: usize,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f32, class_id: usize) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn class_id(&self) -> usize {
        self.class_id
    }
}
