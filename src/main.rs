mod args;

use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use yolodet::utils::stats::RunStats;
use yolodet::{
    DetectError, DetectorConfig, FrameSource, ImageFileSource, Limited, YoloDetector,
    draw_detections, load_labels,
};

fn open_source(args: &args::Args) -> Result<Box<dyn FrameSource>> {
    if let Some(index) = args.camera {
        #[cfg(feature = "camera")]
        {
            return Ok(Box::new(yolodet::source::CameraSource::new(
                index,
                args.input_width,
                args.input_height,
            )));
        }
        #[cfg(not(feature = "camera"))]
        bail!("摄像头 {} 不可用: 编译时未启用 camera 特性", index);
    }

    match &args.input {
        Some(path) => Ok(Box::new(ImageFileSource::new(path))),
        None => bail!("需要指定 --input 或 --camera"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = args::Args::parse();

    let mut config = DetectorConfig::default()
        .with_input_size(args.input_width, args.input_height)
        .with_confidence_threshold(args.confidence)
        .with_nms_threshold(args.nms_threshold);
    if let Some(path) = &args.labels {
        config = config.with_labels(load_labels(path)?);
    }

    info!("模型文件路径: {}", args.model.display());
    let mut detector = YoloDetector::new(&args.model, config)
        .with_context(|| format!("无法创建检测器: {}", args.model.display()))?;

    let mut source = Limited::new(open_source(&args)?, args.max_frames);
    source.open().context("无法打开输入源")?;

    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("无法创建输出目录: {}", dir.display()))?;
    }

    let mut stats = RunStats::new();
    let mut frame_index = 0u64;
    let mut skipped = 0u64;
    let mut total_detections = 0usize;

    loop {
        let index = frame_index;
        let frame = match source.get_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                if source.exhausted() {
                    info!("已达到最大帧数限制: {}", args.max_frames);
                }
                break;
            }
            Err(e) if e.is_per_frame() => {
                warn!("跳过帧 {}: {}", index, e);
                frame_index += 1;
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e).context("读取帧失败"),
        };
        frame_index += 1;

        let start_time = Instant::now();
        let detections = match detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) if e.is_per_frame() => {
                warn!("跳过帧 {}: {}", index, e);
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        stats.record(start_time.elapsed());
        total_detections += detections.len();

        info!("帧 {}: 检测到 {} 个目标", index, detections.len());
        for det in &detections {
            let bbox = det.bbox();
            info!(
                "  - {}: {:.2}% at ({}, {}, {}x{})",
                detector.config().label(det.class_id()).unwrap_or("unknown"),
                det.confidence() * 100.0,
                bbox.x,
                bbox.y,
                bbox.width,
                bbox.height
            );
        }

        if let Some(dir) = &args.output {
            let output_path = dir.join(format!("frame_{:06}.png", index));
            match draw_detections(&frame, &detections, &detector.config().class_labels) {
                Ok(annotated) => {
                    if let Err(e) = annotated.save(&output_path) {
                        error!("保存图像失败 {}: {}", output_path.display(), e);
                    }
                }
                Err(DetectError::Render(msg)) => error!("绘制帧 {} 失败: {}", index, msg),
                Err(e) => return Err(e.into()),
            }
        }
    }

    info!("处理完成: {} 帧, 跳过 {} 帧, 共 {} 个检测结果", frame_index, skipped, total_detections);
    if let (Some(mean), Some(fps)) = (stats.mean(), stats.fps()) {
        info!("平均检测耗时: {:?}, 平均 FPS: {:.2}", mean, fps);
    }

    Ok(())
}
