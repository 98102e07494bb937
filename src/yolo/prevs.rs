use image::{DynamicImage, GenericImageView, imageops::FilterType};
use ndarray::{Array, Array4};

use crate::error::DetectError;

/// 预处理结果
///
/// 包含模型输入张量和将检测框映射回原图所需的缩放系数。
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// 形状为(1, 3, height, width)的张量，通道顺序为RGB，像素值范围[0, 1]
    pub tensor: Array4<f32>,
    /// 原图宽度 / 模型输入宽度
    pub scale_x: f32,
    /// 原图高度 / 模型输入高度
    pub scale_y: f32,
}

/// 调整图像大小以适应模型输入
///
/// 直接拉伸到目标尺寸（不保持宽高比，不做 letterbox），使用双线性插值。
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    img.resize_exact(width, height, FilterType::Triangle)
}

/// 将图像转换为模型输入张量
///
/// 将图像转换为模型所需的四维张量格式，包括：
/// 1. 归一化像素值到[0, 1]范围
/// 2. 通道顺序为RGB
/// 3. 维度顺序为NCHW格式
///
/// # 参数
/// * `img` - 已缩放到模型输入尺寸的图像
/// * `input_height` - 输入图像高度
/// * `input_width` - 输入图像宽度
///
/// # 示例
///
/// ```
/// use image::DynamicImage;
/// use yolodet::yolo::prevs::image_to_tensor;
///
/// let img = DynamicImage::new_rgb8(64, 48);
/// let tensor = image_to_tensor(&img, 48, 64);
/// assert_eq!(tensor.shape(), &[1, 3, 48, 64]);
/// ```
pub fn image_to_tensor(img: &DynamicImage, input_height: usize, input_width: usize) -> Array4<f32> {
    let mut tensor = Array::zeros((1, 3, input_height, input_width));

    let rgb = img.to_rgb8();
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        if x >= input_width || y >= input_height {
            continue;
        }
        let [r, g, b] = pixel.0;
        tensor[[0, 0, y, x]] = (r as f32) / 255.0;
        tensor[[0, 1, y, x]] = (g as f32) / 255.0;
        tensor[[0, 2, y, x]] = (b as f32) / 255.0;
    }

    tensor
}

/// 帧预处理：拉伸缩放、归一化并记录缩放系数
///
/// # 错误处理
/// 图像为空或不是3通道彩色图像时返回 [`DetectError::InvalidFrame`]
///
/// # 示例
///
/// ```
/// use image::DynamicImage;
/// use yolodet::yolo::prevs::preprocess;
///
/// # fn main() -> Result<(), yolodet::DetectError> {
/// let frame = DynamicImage::new_rgb8(1280, 720);
/// let result = preprocess(&frame, 640, 640)?;
/// assert_eq!(result.scale_x, 2.0);
/// assert_eq!(result.scale_y, 1.125);
/// # Ok(())
/// # }
/// ```
pub fn preprocess(
    frame: &DynamicImage,
    target_width: u32,
    target_height: u32,
) -> Result<PreprocessResult, DetectError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidFrame(format!(
            "图像为空: {}x{}",
            width, height
        )));
    }
    let channels = frame.color().channel_count();
    if channels != 3 {
        return Err(DetectError::InvalidFrame(format!(
            "不支持的通道数: {}，需要3通道彩色图像",
            channels
        )));
    }
    if target_width == 0 || target_height == 0 {
        return Err(DetectError::InvalidConfig(format!(
            "模型输入尺寸必须为正: {}x{}",
            target_width, target_height
        )));
    }

    let resized = resize_image(frame, target_width, target_height);
    let tensor = image_to_tensor(&resized, target_height as usize, target_width as usize);

    Ok(PreprocessResult {
        tensor,
        scale_x: width as f32 / target_width as f32,
        scale_y: height as f32 / target_height as f32,
    })
}
