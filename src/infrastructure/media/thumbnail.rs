use std::io;
use std::path::Path;
use std::process::Stdio;

use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

use crate::common::error::AppError;

const THUMBNAIL_ERROR: &str = "Error generating thumbnail";

pub type FrameStream = BoxStream<'static, io::Result<Bytes>>;

/// Pulls the first decodable frame out of a video as JPEG by piping ffmpeg's
/// stdout straight to the caller.
#[derive(Debug, Clone)]
pub struct ThumbnailExtractor {
    ffmpeg: String,
}

impl ThumbnailExtractor {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    fn command(&self, video: &Path) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-loglevel", "error", "-i"])
            .arg(video)
            .args(["-frames:v", "1", "-f", "image2", "-q:v", "2", "-update", "1"])
            .arg("pipe:1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Errors are only possible up to the first chunk of output. Once bytes are
    /// flowing, a later ffmpeg failure is logged and the stream just ends.
    pub async fn first_frame(&self, video: &Path) -> Result<FrameStream, AppError> {
        let mut child = self.command(video).spawn().map_err(|e| {
            error!(ffmpeg = %self.ffmpeg, error = %e, "Failed to start ffmpeg");
            AppError::ExternalProcess(THUMBNAIL_ERROR.to_string())
        })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("ffmpeg stderr: {}", line);
                }
            });
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::ExternalProcess(THUMBNAIL_ERROR.to_string()))?;
        let mut frames = ReaderStream::new(stdout);

        match frames.next().await {
            Some(Ok(first)) => {
                let video = video.display().to_string();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            error!(%video, %status, "ffmpeg failed after streaming started")
                        }
                        Err(e) => error!(%video, error = %e, "Unable to wait for ffmpeg"),
                        Ok(_) => {}
                    }
                });
                Ok(stream::once(async move { Ok(first) }).chain(frames).boxed())
            }
            Some(Err(e)) => {
                error!(video = %video.display(), error = %e, "Failed reading ffmpeg output");
                let _ = child.kill().await;
                Err(AppError::ExternalProcess(THUMBNAIL_ERROR.to_string()))
            }
            None => {
                match child.wait().await {
                    Ok(status) => {
                        error!(video = %video.display(), %status, "ffmpeg produced no frame")
                    }
                    Err(e) => error!(video = %video.display(), error = %e, "Unable to wait for ffmpeg"),
                }
                Err(AppError::ExternalProcess(THUMBNAIL_ERROR.to_string()))
            }
        }
    }
}
