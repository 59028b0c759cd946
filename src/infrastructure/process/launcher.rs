use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{error, info};

use crate::common::error::AppError;
use crate::config::settings::AppConfig;

/// One invocation of the color-tracking analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub video_path: PathBuf,
    pub output_path: PathBuf,
    /// RRGGBB, no leading `#`.
    pub target_color: String,
    pub threshold: String,
}

pub trait ProcessLauncher: Send + Sync {
    /// Starts the analysis and returns as soon as the process exists. Errors
    /// only cover failing to start it; what the process does afterwards is
    /// visible solely through its output file.
    fn launch(&self, request: &AnalysisRequest) -> Result<(), AppError>;
}

/// Runs the configured analysis program as a detached child. A `.jar` program
/// goes through `<java> -jar`, anything else is executed directly.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: PathBuf,
    java_bin: String,
}

impl CommandLauncher {
    pub fn new(program: impl Into<PathBuf>, java_bin: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            java_bin: java_bin.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jar_path, &config.java_bin)
    }

    fn is_jar(program: &Path) -> bool {
        program
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
    }

    pub fn command(&self, request: &AnalysisRequest) -> Command {
        let mut cmd = if Self::is_jar(&self.program) {
            let mut cmd = std::process::Command::new(&self.java_bin);
            cmd.arg("-jar").arg(&self.program);
            cmd
        } else {
            std::process::Command::new(&self.program)
        };

        cmd.arg(&request.video_path)
            .arg(&request.output_path)
            .arg(&request.target_color)
            .arg(&request.threshold)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group: a Ctrl-C aimed at the server does not reach the analysis.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        Command::from(cmd)
    }
}

impl ProcessLauncher for CommandLauncher {
    fn launch(&self, request: &AnalysisRequest) -> Result<(), AppError> {
        let child = self.command(request).spawn().map_err(|e| {
            error!(program = %self.program.display(), error = %e, "Failed to start analysis process");
            AppError::ExternalProcess("Failed to start analysis process".to_string())
        })?;

        info!(
            pid = child.id(),
            video = %request.video_path.display(),
            output = %request.output_path.display(),
            "Analysis process started"
        );

        // Dropping the handle detaches it; tokio still reaps the exit status.
        drop(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            video_path: PathBuf::from("/videos/clip.mp4"),
            output_path: PathBuf::from("/results/job.csv"),
            target_color: "FF0000".to_string(),
            threshold: "50".to_string(),
        }
    }

    fn args(cmd: &Command) -> Vec<&OsStr> {
        cmd.as_std().get_args().collect()
    }

    #[test]
    fn jar_programs_run_through_java() {
        let launcher = CommandLauncher::new("/opt/processor.JAR", "/usr/bin/java");
        let cmd = launcher.command(&request());

        assert_eq!(cmd.as_std().get_program(), "/usr/bin/java");
        assert_eq!(
            args(&cmd),
            [
                "-jar",
                "/opt/processor.JAR",
                "/videos/clip.mp4",
                "/results/job.csv",
                "FF0000",
                "50"
            ]
        );
    }

    #[test]
    fn other_programs_receive_positional_arguments() {
        let launcher = CommandLauncher::new("/opt/analyze", "java");
        let cmd = launcher.command(&request());

        assert_eq!(cmd.as_std().get_program(), "/opt/analyze");
        assert_eq!(
            args(&cmd),
            ["/videos/clip.mp4", "/results/job.csv", "FF0000", "50"]
        );
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = CommandLauncher::new(dir.path().join("does-not-exist"), "java");

        let err = launcher.launch(&request()).unwrap_err();
        assert!(matches!(err, AppError::ExternalProcess(_)));
    }
}
