use std::pin::Pin;

use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::{debug, error, info};
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC, Format, buffer::Type};

use super::{FrameSource, SourceError};

const CAPTURE_BUFFERS: u32 = 4;

/// V4L2 实时摄像头
///
/// 优先请求 RGB24，设备不支持时接受 MJPEG 并解码。
/// 捕获流在 [`FrameSource::open`] 中创建一次，之后每帧只出队一个缓冲区。
pub struct CameraSource {
    index: usize,
    width: u32,
    height: u32,
    fourcc: Option<FourCC>,
    /// 捕获流，引用下方的 device，必须先于 device 释放（字段按声明顺序释放）
    stream: Option<Stream<'static>>,
    /// 固定在堆上，保证 stream 持有的引用始终有效
    device: Option<Pin<Box<Device>>>,
}

impl CameraSource {
    pub fn new(index: usize, width: u32, height: u32) -> Self {
        Self {
            index,
            width,
            height,
            fourcc: None,
            stream: None,
            device: None,
        }
    }

    fn close(&mut self) {
        self.stream.take();
        self.device.take();
        self.fourcc = None;
    }

    fn device_error(&self, e: impl std::fmt::Display) -> SourceError {
        SourceError::Device(format!("/dev/video{}: {}", self.index, e))
    }
}

impl FrameSource for CameraSource {
    fn open(&mut self) -> Result<(), SourceError> {
        self.close();
        let device = Box::pin(Device::new(self.index).map_err(|e| self.device_error(e))?);

        let requested = Format::new(self.width, self.height, FourCC::new(b"RGB3"));
        let format = device
            .set_format(&requested)
            .map_err(|e| self.device_error(e))?;

        if format.fourcc != FourCC::new(b"RGB3") && format.fourcc != FourCC::new(b"MJPG") {
            error!("不支持的像素格式: {}", format.fourcc);
            return Err(self.device_error(format!("不支持的像素格式 {}", format.fourcc)));
        }

        info!(
            "摄像头已打开: /dev/video{} {}x{} {}",
            self.index, format.width, format.height, format.fourcc
        );

        // SAFETY: device 被 Pin<Box> 固定在堆上，移入 self 不改变其地址；
        // stream 与 device 同属本结构体，且总是先于 device 释放
        let device_ref: &'static Device = unsafe { &*(&*device as *const Device) };
        let stream = Stream::with_buffers(device_ref, Type::VideoCapture, CAPTURE_BUFFERS)
            .map_err(|e| self.device_error(e))?;

        self.width = format.width;
        self.height = format.height;
        self.fourcc = Some(format.fourcc);
        self.stream = Some(stream);
        self.device = Some(device);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn get_frame(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        let (Some(stream), Some(fourcc)) = (self.stream.as_mut(), self.fourcc) else {
            return Ok(None);
        };

        let (buf, meta) = stream
            .next()
            .map_err(|e| SourceError::Device(e.to_string()))?;
        debug!("采集帧 #{}, {} 字节", meta.sequence, meta.bytesused);

        let used = (meta.bytesused as usize).min(buf.len());
        let data = &buf[..used];

        if fourcc == FourCC::new(b"MJPG") {
            let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
                .map_err(|e| SourceError::Device(format!("MJPEG 解码失败: {}", e)))?;
            return Ok(Some(image));
        }

        let expected = (self.width * self.height * 3) as usize;
        if data.len() < expected {
            return Err(SourceError::Device(format!(
                "采集缓冲区大小不符: 期望 {}, 实际 {}",
                expected,
                data.len()
            )));
        }
        let image = RgbImage::from_raw(self.width, self.height, data[..expected].to_vec())
            .ok_or_else(|| SourceError::Device("无法构造 RGB 图像".to_string()))?;
        Ok(Some(DynamicImage::ImageRgb8(image)))
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.close();
    }
}
