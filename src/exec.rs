//! Subprocess execution.
//!
//! Every external program (the Detect script, mvn, npm, mbt, docker) is
//! started through a [`CommandRunner`] so the orchestration can be exercised
//! without spawning processes.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::debug;

const MASK: &str = "****";

/// Argument keys whose values never reach the logs.
const SECRET_KEYS: &[&str] = &["api.token", "password"];

/// A fully described process invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// `KEY=VALUE` entries applied in order, later entries win.
    pub env: Vec<String>,
    pub dir: PathBuf,
    /// Written to the process's stdin, which is then closed. Never logged.
    pub stdin: Option<String>,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env)
            .field("dir", &self.dir)
            .field("stdin", &self.stdin.as_ref().map(|_| MASK))
            .finish()
    }
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, dir: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            dir: dir.to_path_buf(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, entries: Vec<String>) -> Self {
        self.env = entries;
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Program and arguments as one line for logs, with secrets masked.
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if let Some((key, _)) = arg.split_once('=')
                && SECRET_KEYS.iter().any(|secret| key.ends_with(secret))
            {
                line.push_str(key);
                line.push('=');
                line.push_str(MASK);
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Exit status and combined stdout/stderr of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Raw status text, e.g. `exit status 3`.
    pub fn status_text(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs processes to completion.
pub trait CommandRunner {
    /// Run `invocation`, blocking until it exits. `Err` means the process
    /// could not be started at all.
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

/// Runner backed by `std::process::Command`.
///
/// Output is echoed to this process's stdout/stderr while it is captured.
#[derive(Debug, Default)]
pub struct SystemRunner {
    quiet: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Capture output without echoing it.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        let input = match invocation.stdin {
            Some(_) => Stdio::piped(),
            None => Stdio::null(),
        };
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.dir)
            .stdin(input)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        for entry in &invocation.env {
            if let Some((key, value)) = entry.split_once('=') {
                cmd.env(key, value);
            }
        }

        debug!(
            program = %invocation.program.display(),
            args = invocation.args.len(),
            "Spawning process"
        );
        let mut child = cmd.spawn()?;

        let collected = Mutex::new(String::new());
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        std::thread::scope(|scope| {
            if let (Some(mut pipe), Some(input)) = (stdin, invocation.stdin.as_deref()) {
                scope.spawn(move || {
                    if let Err(e) = pipe.write_all(input.as_bytes()) {
                        debug!(error = %e, "Failed to write process stdin");
                    }
                });
            }
            if let Some(out) = stdout {
                let collected = &collected;
                let quiet = self.quiet;
                scope.spawn(move || tee(out, collected, quiet, io::stdout()));
            }
            if let Some(err) = stderr {
                let collected = &collected;
                let quiet = self.quiet;
                scope.spawn(move || tee(err, collected, quiet, io::stderr()));
            }
        });

        let status = child.wait()?;
        let output = collected
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        Ok(ProcessOutput {
            exit_code: status.code(),
            output,
        })
    }
}

/// Copy `source` line by line into `collected`, echoing unless `quiet`.
///
/// Reads raw bytes so invalid UTF-8 is replaced instead of ending the copy.
/// The pipe is always drained to EOF.
fn tee<R: Read, W: Write>(source: R, collected: &Mutex<String>, quiet: bool, mut sink: W) {
    let mut reader = BufReader::new(source);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "Stopped reading process output");
                let _ = io::copy(&mut reader, &mut io::sink());
                break;
            }
        }
        if !quiet {
            let _ = sink.write_all(&raw);
        }
        let text = String::from_utf8_lossy(&raw);
        let mut buf = collected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        buf.push_str(text.trim_end_matches(['\r', '\n']));
        buf.push('\n');
    }
}
