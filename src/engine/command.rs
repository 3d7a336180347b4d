use super::{BuildEngine, EngineOutput};
use crate::config::BuildConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Prefix marking a stdout line as an advisory rather than an output path
const WARNING_PREFIX: &str = "warning:";

/// Runs an external program as the build engine
///
/// The program runs in the project root with the resolved config as JSON on
/// stdin. Each non-empty stdout line names an output file; lines starting with
/// `warning:` are collected as warnings. A non-zero exit is a failure carrying
/// stderr.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

fn parse_stdout(stdout: &str) -> EngineOutput {
    let mut output = EngineOutput::default();
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.strip_prefix(WARNING_PREFIX) {
            Some(warning) => output.warnings.push(warning.trim().to_string()),
            None => output.outputs.push(line.to_string()),
        }
    }
    output
}

#[async_trait]
impl BuildEngine for CommandEngine {
    fn identifier(&self) -> String {
        if self.args.is_empty() {
            format!("command:{}", self.program)
        } else {
            format!("command:{} {}", self.program, self.args.join(" "))
        }
    }

    async fn build(&self, config: &BuildConfig) -> Result<EngineOutput> {
        let cwd = config.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
        let payload = serde_json::to_vec(config).context("Failed to serialize build config")?;

        info!("Running {} in {}", self.program, cwd.display());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start '{}'", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            // Engines that ignore stdin may close it early
            if let Err(e) = stdin.write_all(&payload).await {
                debug!("Engine closed stdin early: {}", e);
            }
        }

        let result = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for '{}'", self.program))?;

        let stderr = String::from_utf8_lossy(&result.stderr);
        if !result.status.success() {
            bail!(
                "'{}' exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            );
        }

        let output = parse_stdout(&String::from_utf8_lossy(&result.stdout));
        debug!(
            "{} reported {} outputs, {} warnings",
            self.program,
            output.outputs.len(),
            output.warnings.len()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_includes_args() {
        assert_eq!(CommandEngine::new("rollup").identifier(), "command:rollup");
        assert_eq!(
            CommandEngine::new("node")
                .with_args(["build.js", "--ci"])
                .identifier(),
            "command:node build.js --ci"
        );
    }

    #[test]
    fn test_parse_stdout() {
        let output = parse_stdout("dist/index.js\n\n  dist/index.cjs  \nwarning: no sourcemap\n");
        assert_eq!(output.outputs, vec!["dist/index.js", "dist/index.cjs"]);
        assert_eq!(output.warnings, vec!["no sourcemap"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_project_root_with_config_on_stdin() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = BuildConfig {
            cwd: Some(dir.path().to_path_buf()),
            input: "src/entry.ts".to_string(),
            ..Default::default()
        };

        let engine = CommandEngine::new("sh").with_args([
            "-c",
            "cat > received.json && echo \"$(pwd)/out.js\"",
        ]);
        let output = engine.build(&config).await.unwrap();

        let received = std::fs::read_to_string(dir.path().join("received.json")).unwrap();
        let decoded: BuildConfig = serde_json::from_str(&received).unwrap();
        assert_eq!(decoded.input, "src/entry.ts");
        assert_eq!(output.outputs.len(), 1);
        assert!(output.outputs[0].ends_with("out.js"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let engine = CommandEngine::new("sh").with_args(["-c", "echo boom >&2; exit 3"]);
        let config = BuildConfig {
            cwd: Some(std::env::temp_dir()),
            ..Default::default()
        };
        let err = engine.build(&config).await.unwrap_err();
        assert!(format!("{:#}", err).contains("boom"));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let engine = CommandEngine::new("buildsense-no-such-engine");
        let config = BuildConfig {
            cwd: Some(std::env::temp_dir()),
            ..Default::default()
        };
        assert!(engine.build(&config).await.is_err());
    }
}
