//! 帧来源
//!
//! 检测流程之外的采集端。文件序列与实时摄像头各自实现 [`FrameSource`]。

use std::path::PathBuf;

use image::DynamicImage;
use thiserror::Error;

mod image_file;
pub use image_file::{ImageFileSource, load_image};

#[cfg(feature = "camera")]
mod camera;
#[cfg(feature = "camera")]
pub use camera::CameraSource;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("输入源不存在: {}", .0.display())]
    NotFound(PathBuf),
    #[error("输入源中没有可用图像: {}", .0.display())]
    Empty(PathBuf),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("图像解码失败 {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("摄像头错误: {0}")]
    Device(String),
}

impl SourceError {
    /// 是否只影响当前帧
    ///
    /// 单个文件解码失败时来源已前进到下一帧，可以跳过继续读取。
    pub fn is_per_frame(&self) -> bool {
        matches!(self, SourceError::Decode { .. })
    }
}

/// 帧来源能力
pub trait FrameSource {
    /// 打开来源，失败时返回错误
    fn open(&mut self) -> Result<(), SourceError>;

    fn is_open(&self) -> bool;

    /// 读取下一帧
    ///
    /// 来源结束或尚未打开时返回 `Ok(None)`。
    fn get_frame(&mut self) -> Result<Option<DynamicImage>, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self) -> Result<(), SourceError> {
        (**self).open()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn get_frame(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        (**self).get_frame()
    }
}

/// 限制读取帧数的来源
///
/// 达到上限后直接返回 `Ok(None)`，不再访问内部来源。上限为0表示不限制。
/// 解码失败被跳过的帧同样计数。
pub struct Limited<S> {
    inner: S,
    max_frames: u64,
    read: u64,
}

impl<S: FrameSource> Limited<S> {
    pub fn new(inner: S, max_frames: u64) -> Self {
        Self {
            inner,
            max_frames,
            read: 0,
        }
    }

    /// 是否已达到帧数上限
    pub fn exhausted(&self) -> bool {
        self.max_frames > 0 && self.read >= self.max_frames
    }
}

impl<S: FrameSource> FrameSource for Limited<S> {
    fn open(&mut self) -> Result<(), SourceError> {
        self.inner.open()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn get_frame(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        if self.exhausted() {
            return Ok(None);
        }
        self.read += 1;
        self.inner.get_frame()
    }
}
