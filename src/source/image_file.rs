use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, info};

use super::{FrameSource, SourceError};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// 加载图像文件
///
/// # 错误处理
/// 文件不存在或无法解码时返回 Err
///
/// # 示例
///
/// ```no_run
/// use yolodet::load_image;
///
/// # fn main() -> Result<(), yolodet::SourceError> {
/// let image = load_image("data/test/street.jpg")?;
/// # Ok(())
/// # }
/// ```
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage, SourceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }

    image::open(path).map_err(|source| SourceError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                IMAGE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
}

/// 基于图像文件的帧来源
///
/// 路径可以是单个图像文件，也可以是图像目录（按文件名排序依次读取）。
/// 序列读完后不会循环。
pub struct ImageFileSource {
    path: PathBuf,
    files: Vec<PathBuf>,
    cursor: usize,
    opened: bool,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            files: Vec::new(),
            cursor: 0,
            opened: false,
        }
    }

    /// 序列中的图像数量，打开前为0
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// 最近一次返回的帧所对应的文件
    pub fn current_path(&self) -> Option<&Path> {
        self.cursor
            .checked_sub(1)
            .and_then(|idx| self.files.get(idx))
            .map(PathBuf::as_path)
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self) -> Result<(), SourceError> {
        if !self.path.exists() {
            return Err(SourceError::NotFound(self.path.clone()));
        }

        let mut files = if self.path.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(&self.path)? {
                let entry_path = entry?.path();
                if is_image_file(&entry_path) {
                    files.push(entry_path);
                }
            }
            files
        } else if is_image_file(&self.path) {
            vec![self.path.clone()]
        } else {
            Vec::new()
        };
        files.sort();

        if files.is_empty() {
            return Err(SourceError::Empty(self.path.clone()));
        }

        info!(
            "图像来源已打开: {} ({} 张图像)",
            self.path.display(),
            files.len()
        );
        self.files = files;
        self.cursor = 0;
        self.opened = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.opened
    }

    fn get_frame(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        if !self.opened {
            return Ok(None);
        }
        let Some(path) = self.files.get(self.cursor) else {
            debug!("图像序列结束");
            return Ok(None);
        };
        self.cursor += 1;

        debug!("读取图像: {}", path.display());
        load_image(path).map(Some)
    }
}
