use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::GenerationError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Text produced by a successful compiler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Downstream tool that turns a schema file into bindings.
///
/// Its only channel back is pass/fail plus text output.
pub trait SchemaCompiler {
    fn compile(&self, schema: &Path) -> Result<CompilerOutput, GenerationError>;
}

/// Settings for [`ProtocCompiler`], as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Program to run (default `protoc`)
    pub program: String,
    /// Arguments placed before the include path and schema file,
    /// e.g. `--go_out=gen`
    pub args: Vec<String>,
    /// Kill the compiler after this many seconds; no limit when unset
    pub timeout_secs: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "protoc".to_string(),
            args: Vec::new(),
            timeout_secs: None,
        }
    }
}

/// Runs `protoc` (or a compatible tool) out of process:
/// `<program> <args..> -I <schema dir> <schema>`.
#[derive(Debug, Clone)]
pub struct ProtocCompiler {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl Default for ProtocCompiler {
    fn default() -> Self {
        Self::from_config(&CompilerConfig::default())
    }
}

impl ProtocCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, schema: &Path) -> Command {
        let include_dir = schema
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-I")
            .arg(include_dir)
            .arg(schema)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> GenerationError {
        GenerationError::CompilerSpawn {
            program: self.program.clone(),
            source,
        }
    }

    /// Wait for `child`, killing it once `timeout` elapses.
    fn wait_with_timeout(
        &self,
        child: &mut Child,
        timeout: Duration,
    ) -> Result<std::process::ExitStatus, GenerationError> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(|e| self.spawn_error(e))? {
                return Ok(status);
            }
            if started.elapsed() >= timeout {
                // The process may exit between try_wait and kill.
                let _ = child.kill();
                let _ = child.wait();
                return Err(GenerationError::CompilerTimeout {
                    program: self.program.clone(),
                    timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl SchemaCompiler for ProtocCompiler {
    fn compile(&self, schema: &Path) -> Result<CompilerOutput, GenerationError> {
        debug!(program = %self.program, schema = ?schema, "Invoking schema compiler");
        let mut child = self
            .command(schema)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Both pipes are drained while the child runs so a chatty compiler
        // never blocks on a full pipe.
        let stdout = read_in_background(child.stdout.take());
        let stderr = read_in_background(child.stderr.take());

        let status = match self.timeout {
            None => child.wait().map_err(|e| self.spawn_error(e))?,
            Some(timeout) => self.wait_with_timeout(&mut child, timeout)?,
        };
        let stdout = collect(stdout);
        let stderr = collect(stderr);

        if !status.success() {
            let diagnostics = [stderr.trim(), stdout.trim()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(GenerationError::Compiler {
                program: self.program.clone(),
                status: status.to_string(),
                diagnostics,
            });
        }
        info!(program = %self.program, schema = ?schema, "Schema compiled");
        Ok(CompilerOutput { stdout, stderr })
    }
}

fn read_in_background<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            // Partial output is still useful as diagnostics.
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(reader: JoinHandle<String>) -> String {
    reader.join().unwrap_or_default()
}
