use std::path::{Component, Path, PathBuf};

use tracing::{debug, error};

use crate::common::error::AppError;
use crate::infrastructure::media::thumbnail::FrameStream;
use crate::state::AppState;

const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

pub struct VideoService;

impl VideoService {
    pub fn is_video_file(name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                VIDEO_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }

    /// Joins `filename` onto the video directory. Anything but a single plain
    /// path component is rejected so requests stay inside the directory.
    pub fn resolve(video_dir: &Path, filename: &str) -> Result<PathBuf, AppError> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(video_dir.join(name)),
            _ => Err(AppError::Validation("Invalid filename".to_string())),
        }
    }

    pub async fn list(state: AppState) -> Result<Vec<String>, AppError> {
        let video_dir = &state.config.video_dir;
        let mut entries = tokio::fs::read_dir(video_dir).await.map_err(|e| {
            error!(dir = %video_dir.display(), error = %e, "Error reading video directory");
            AppError::Configuration("Error reading video directory".to_string())
        })?;

        let mut videos = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|e| {
                error!(dir = %video_dir.display(), error = %e, "Error reading video directory");
                AppError::Configuration("Error reading video directory".to_string())
            })?;
            let Some(entry) = entry else { break };

            if let Some(name) = entry.file_name().to_str() {
                if Self::is_video_file(name) {
                    videos.push(name.to_string());
                }
            }
        }
        videos.sort();

        debug!(count = videos.len(), "Listed videos");
        Ok(videos)
    }

    pub async fn thumbnail(state: AppState, filename: &str) -> Result<FrameStream, AppError> {
        if filename.trim().is_empty() {
            return Err(AppError::Validation("Filename is required".to_string()));
        }

        let video_path = Self::resolve(&state.config.video_dir, filename)?;
        if !tokio::fs::try_exists(&video_path).await.unwrap_or(false) {
            return Err(AppError::NotFound("Video not found".to_string()));
        }

        state.thumbnails.first_frame(&video_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_video_extensions_case_insensitively() {
        assert!(VideoService::is_video_file("clip.mp4"));
        assert!(VideoService::is_video_file("CLIP.MOV"));
        assert!(VideoService::is_video_file("a.b.webm"));
        assert!(!VideoService::is_video_file("notes.txt"));
        assert!(!VideoService::is_video_file("mp4"));
        assert!(!VideoService::is_video_file(".hidden"));
    }

    #[test]
    fn resolve_accepts_plain_names_only() {
        let dir = Path::new("/videos");

        assert_eq!(
            VideoService::resolve(dir, "clip.mp4").unwrap(),
            PathBuf::from("/videos/clip.mp4")
        );
        for bad in ["../secret.mp4", "sub/clip.mp4", "/etc/passwd", "..", "", "."] {
            assert!(
                matches!(VideoService::resolve(dir, bad), Err(AppError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }
}
