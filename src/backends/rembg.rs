//! Matte provider backed by the `rembg` command line tool
//!
//! The PNG is piped through `rembg i ... - -`; stdout carries the cutout
//! with its alpha matte.

use crate::{
    error::{RecolorError, Result},
    inference::{ForegroundMatteProvider, MattingOptions},
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Model passed to `rembg -m` unless overridden
pub const DEFAULT_REMBG_MODEL: &str = "u2net";

/// Invokes an external `rembg` executable
#[derive(Debug, Clone)]
pub struct RembgCommandProvider {
    program: PathBuf,
    model: String,
}

impl RembgCommandProvider {
    /// Locate `rembg` on `PATH`
    ///
    /// # Errors
    /// - `Matting` when no executable is found
    pub fn new() -> Result<Self> {
        let program = which::which("rembg").map_err(|e| {
            RecolorError::matting(format!("rembg executable not found on PATH: {e}"))
        })?;
        Ok(Self::with_program(program))
    }

    /// Use an explicit executable path
    #[must_use]
    pub fn with_program<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            model: DEFAULT_REMBG_MODEL.to_string(),
        }
    }

    /// Select the rembg model (`u2net`, `silueta`, `isnet-general-use`, ...)
    #[must_use]
    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for one `rembg i` invocation reading stdin and writing stdout
    #[must_use]
    pub fn command_args(&self, options: &MattingOptions) -> Vec<String> {
        let mut args = vec!["i".to_string(), "-m".to_string(), self.model.clone()];
        if options.alpha_matting {
            args.extend([
                "-a".to_string(),
                "-af".to_string(),
                options.foreground_threshold.to_string(),
                "-ab".to_string(),
                options.background_threshold.to_string(),
                "-ae".to_string(),
                options.erode_size.to_string(),
            ]);
        }
        args.extend(["-".to_string(), "-".to_string()]);
        args
    }
}

impl ForegroundMatteProvider for RembgCommandProvider {
    fn name(&self) -> &str {
        "rembg"
    }

    fn matte(&self, png_bytes: &[u8], options: &MattingOptions) -> Result<Vec<u8>> {
        let name = self.program.display().to_string();
        let args = self.command_args(options);
        log::debug!("Running `{} {}`", name, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                RecolorError::matting_error_with_provider("rembg", "Spawn", &e.to_string())
            })?;

        // Feed stdin from a separate thread so a full stdout pipe cannot deadlock us
        let stdin = child.stdin.take();
        let input = png_bytes.to_vec();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input)?;
            }
            Ok(())
        });

        let output = child.wait_with_output().map_err(|e| {
            RecolorError::matting_error_with_provider("rembg", "Wait", &e.to_string())
        })?;

        let write_result = writer
            .join()
            .map_err(|_| RecolorError::internal("rembg stdin writer panicked"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecolorError::matting_error_with_provider(
                "rembg",
                "Matte",
                &format!("{} ({})", output.status, stderr.trim()),
            ));
        }
        write_result.map_err(|e| {
            RecolorError::matting_error_with_provider("rembg", "Write stdin", &e.to_string())
        })?;

        if output.stdout.is_empty() {
            return Err(RecolorError::matting("rembg produced no output"));
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_with_alpha_matting() {
        let provider = RembgCommandProvider::with_program("rembg");
        let args = provider.command_args(&MattingOptions::default());
        assert_eq!(
            args,
            vec!["i", "-m", "u2net", "-a", "-af", "240", "-ab", "10", "-ae", "10", "-", "-"]
        );
    }

    #[test]
    fn test_command_args_without_alpha_matting() {
        let provider = RembgCommandProvider::with_program("rembg").model("silueta");
        let options = MattingOptions {
            alpha_matting: false,
            ..MattingOptions::default()
        };
        assert_eq!(
            provider.command_args(&options),
            vec!["i", "-m", "silueta", "-", "-"]
        );
    }

    #[test]
    fn test_missing_program_is_matting_error() {
        let provider = RembgCommandProvider::with_program("/nonexistent/bin/rembg");
        let err = provider
            .matte(b"png", &MattingOptions::default())
            .unwrap_err();
        assert!(matches!(err, RecolorError::Matting(_)));
    }
}
