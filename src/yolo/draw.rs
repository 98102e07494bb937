use ab_glyph::{FontRef, PxScale};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use raqote::{DrawOptions, DrawTarget, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle};

use crate::error::DetectError;
use crate::yolo::bounds::Detection;

/// 检测框调色板，按类别ID循环取色
const PALETTE: [(u8, u8, u8); 8] = [
    (0x00, 0xFF, 0x00),
    (0x00, 0xFF, 0xFF),
    (0xFF, 0x00, 0x00),
    (0xFF, 0xA5, 0x00),
    (0xFF, 0x00, 0xFF),
    (0x00, 0x80, 0xFF),
    (0xFF, 0xFF, 0x00),
    (0x80, 0x00, 0xFF),
];

const STROKE_WIDTH: f32 = 2.0;

// 标签文本
const FONT_DATA: &[u8] = include_bytes!("../../assets/font.ttf");
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_PADDING: i32 = 5;
const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 0xFF]);
const UNKNOWN_LABEL: &str = "Unknown";

/// 类别ID对应的检测框颜色
pub fn class_color(class_id: usize) -> (u8, u8, u8) {
    PALETTE[class_id % PALETTE.len()]
}

/// 在图像上绘制检测结果
///
/// 每个检测框按类别取色描边，并在框上方绘制同色背景的 `"<类别>: <置信度>"` 标签。
/// `labels` 按类别ID索引，越界的类别显示为 `Unknown`。返回绘制后的 RGBA 图像，原图不变。
///
/// # 示例
///
/// ```
/// use image::DynamicImage;
/// use yolodet::{BoundingBox, Detection, DetectorConfig, draw_detections};
///
/// # fn main() -> Result<(), yolodet::DetectError> {
/// let config = DetectorConfig::default();
/// let image = DynamicImage::new_rgb8(64, 64);
/// let detections = [Detection::new(BoundingBox::new(8, 8, 32, 32), 0.9, 0)];
/// let annotated = draw_detections(&image, &detections, &config.class_labels)?;
/// assert_eq!(annotated.width(), 64);
/// # Ok(())
/// # }
/// ```
pub fn draw_detections(
    image: &DynamicImage,
    detections: &[Detection],
    labels: &[String],
) -> Result<DynamicImage, DetectError> {
    let (img_width, img_height) = image.dimensions();
    let mut dt = DrawTarget::new(img_width as i32, img_height as i32);

    // raqote 使用预乘 ARGB，按小端存放为 BGRA
    let rgba_image = image.to_rgba8();
    let image_data: Vec<u32> = rgba_image
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            u32::from_le_bytes([b, g, r, a])
        })
        .collect();

    let img = raqote::Image {
        width: img_width as i32,
        height: img_height as i32,
        data: &image_data,
    };
    dt.draw_image_at(0.0, 0.0, &img, &DrawOptions::new());

    for detection in detections {
        let bbox = detection.bbox();
        if !bbox.is_valid() {
            continue;
        }

        // 裁剪到图像外一圈，越界的边落在画布之外
        let margin = STROKE_WIDTH as i64;
        let left = (bbox.x as i64).clamp(-margin, img_width as i64 + margin);
        let top = (bbox.y as i64).clamp(-margin, img_height as i64 + margin);
        let right = bbox.right().clamp(-margin, img_width as i64 + margin);
        let bottom = bbox.bottom().clamp(-margin, img_height as i64 + margin);
        if right <= left || bottom <= top {
            continue;
        }

        let mut pb = PathBuilder::new();
        pb.rect(
            left as f32,
            top as f32,
            (right - left) as f32,
            (bottom - top) as f32,
        );
        let path = pb.finish();

        let (r, g, b) = class_color(detection.class_id());
        dt.stroke(
            &path,
            &Source::Solid(SolidSource { r, g, b, a: 0xFF }),
            &StrokeStyle {
                join: LineJoin::Round,
                width: STROKE_WIDTH,
                ..StrokeStyle::default()
            },
            &DrawOptions::default(),
        );
    }

    let pixels: Vec<u8> = dt
        .get_data()
        .iter()
        .flat_map(|&pixel| {
            let [b, g, r, a] = pixel.to_le_bytes();
            [r, g, b, a]
        })
        .collect();

    let mut buffer = RgbaImage::from_raw(img_width, img_height, pixels)
        .ok_or_else(|| DetectError::Render("绘制结果尺寸与原图不符".to_string()))?;

    let font = FontRef::try_from_slice(FONT_DATA)
        .map_err(|e| DetectError::Render(format!("字体加载失败: {}", e)))?;
    for detection in detections.iter().filter(|d| d.bbox().is_valid()) {
        draw_label(&mut buffer, detection, labels, &font);
    }

    Ok(DynamicImage::ImageRgba8(buffer))
}

/// 标签文本，例如 `person: 0.87`
fn label_text(detection: &Detection, labels: &[String]) -> String {
    let name = labels
        .get(detection.class_id())
        .map(String::as_str)
        .unwrap_or(UNKNOWN_LABEL);
    format!("{}: {:.2}", name, detection.confidence())
}

/// 在检测框上方绘制标签背景和文本，框贴近图像顶部时标签下移到图像内
fn draw_label(image: &mut RgbaImage, detection: &Detection, labels: &[String], font: &FontRef) {
    let bbox = detection.bbox();
    let text = label_text(detection, labels);
    let scale = PxScale::from(LABEL_FONT_SIZE);
    let (text_width, text_height) = text_size(scale, font, &text);

    let band_height = text_height as i32 + LABEL_PADDING;
    let label_x = bbox.x.max(0);
    let label_y = bbox.y.saturating_sub(band_height).max(0);
    // 标签起点落在图像之外时不绘制
    if text_width == 0
        || band_height <= 0
        || label_x as u32 >= image.width()
        || label_y as u32 >= image.height()
    {
        return;
    }

    let (r, g, b) = class_color(detection.class_id());
    let rect = Rect::at(label_x, label_y).of_size(text_width, band_height as u32);
    draw_filled_rect_mut(image, rect, Rgba([r, g, b, 0xFF]));
    draw_text_mut(
        image,
        LABEL_TEXT_COLOR,
        label_x,
        label_y + LABEL_PADDING / 2,
        scale,
        font,
        &text,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yolo::bounds::BoundingBox;
    use image::{Rgb, RgbImage};

    fn labels() -> Vec<String> {
        vec!["person".to_string(), "car".to_string()]
    }

    fn black(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 0, 0])))
    }

    /// 标签背景所占区域 (x, y, 宽, 高)
    fn label_band(detection: &Detection, labels: &[String]) -> (u32, u32, u32, u32) {
        let font = FontRef::try_from_slice(FONT_DATA).unwrap();
        let text = label_text(detection, labels);
        let (w, h) = text_size(PxScale::from(LABEL_FONT_SIZE), &font, &text);
        let band_height = h as i32 + LABEL_PADDING;
        let y = (detection.bbox().y - band_height).max(0);
        (detection.bbox().x as u32, y as u32, w, band_height as u32)
    }

    #[test]
    fn draws_box_outline_in_class_color() {
        let detections = [Detection::new(BoundingBox::new(10, 40, 20, 20), 0.9, 0)];
        let annotated = draw_detections(&black(100, 100), &detections, &labels())
            .unwrap()
            .to_rgba8();

        let edge = annotated.get_pixel(20, 40).0;
        assert_eq!(&edge[..3], &[0x00, 0xFF, 0x00]);
        // 框内部不填充
        let inside = annotated.get_pixel(20, 50).0;
        assert_eq!(&inside[..3], &[0, 0, 0]);
    }

    #[test]
    fn draws_label_band_with_text_above_box() {
        let detection = Detection::new(BoundingBox::new(10, 50, 60, 30), 0.9, 0);
        let annotated = draw_detections(&black(100, 100), &[detection], &labels())
            .unwrap()
            .to_rgba8();

        assert_eq!(label_text(&detection, &labels()), "person: 0.90");
        let (x, y, w, h) = label_band(&detection, &labels());
        assert!(w > 0 && y + h == 50);

        let band: Vec<[u8; 4]> = (y..y + h)
            .flat_map(|py| (x..x + w).map(move |px| (px, py)))
            .map(|(px, py)| annotated.get_pixel(px, py).0)
            .collect();
        // 背景为类别颜色，文本为深色
        assert!(band.iter().any(|p| p[..3] == [0x00, 0xFF, 0x00]));
        assert!(band.iter().any(|p| p[1] < 0x80));
        // 标签底部一行只有背景
        assert_eq!(&annotated.get_pixel(x + w / 2, 49).0[..3], &[0x00, 0xFF, 0x00]);
    }

    #[test]
    fn unknown_class_gets_fallback_label() {
        let detection = Detection::new(BoundingBox::new(10, 50, 30, 30), 0.5, 7);
        assert_eq!(label_text(&detection, &labels()), "Unknown: 0.50");

        let annotated = draw_detections(&black(100, 100), &[detection], &labels())
            .unwrap()
            .to_rgba8();
        let (r, g, b) = class_color(7);
        assert_eq!(&annotated.get_pixel(12, 49).0[..3], &[r, g, b]);
    }

    #[test]
    fn label_at_top_edge_stays_inside_image() {
        let detection = Detection::new(BoundingBox::new(0, 0, 30, 30), 0.9, 1);
        let annotated = draw_detections(&black(40, 40), &[detection], &labels())
            .unwrap()
            .to_rgba8();
        assert_eq!(annotated.dimensions(), (40, 40));
        let (r, g, b) = class_color(1);
        assert!(annotated.pixels().any(|p| p.0[..3] == [r, g, b]));
    }

    #[test]
    fn label_outside_image_is_skipped() {
        let far = BoundingBox::new(2_000_000_000, 2_000_000_000, i32::MAX, i32::MAX);
        let detections = [Detection::new(far, 0.9, 0)];
        let annotated = draw_detections(&black(20, 20), &detections, &labels())
            .unwrap()
            .to_rgba8();
        assert!(annotated.pixels().all(|p| p.0[..3] == [0, 0, 0]));
    }

    #[test]
    fn keeps_image_when_nothing_detected() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([12, 34, 56])));
        let annotated = draw_detections(&image, &[], &labels()).unwrap().to_rgba8();
        assert_eq!(annotated.dimensions(), (8, 6));
        assert_eq!(annotated.get_pixel(3, 3).0, [12, 34, 56, 255]);
    }

    #[test]
    fn palette_cycles_by_class() {
        assert_eq!(class_color(0), class_color(PALETTE.len()));
        assert_ne!(class_color(0), class_color(1));
    }
}
