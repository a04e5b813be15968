/*! External tool invocation

External tools are described by [Invocation]s (program and arguments) and chained
into a [CommandPipeline], the equivalent of `prog1 < in | prog2 | prog3 > out`.

Exit statuses are verified unless [ExitPolicy::Ignore] is used, in which case failures
are only logged and a failing tool leaves an empty or partial output behind.
!*/
use std::{
    ffi::{OsStr, OsString},
    fmt,
    fs::File,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

use itertools::Itertools;
use log::{debug, error, warn};

use crate::error::Error;

/// What to do when an external tool fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Turn non-zero exits and spawn failures into errors.
    #[default]
    Check,
    /// Log failures and carry on.
    Ignore,
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Append `arg` only if `condition` holds.
    pub fn arg_if<S: AsRef<OsStr>>(self, condition: bool, arg: S) -> Self {
        if condition {
            self.arg(arg)
        } else {
            self
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            std::iter::once(&self.program)
                .chain(self.args.iter())
                .map(|a| a.to_string_lossy())
                .join(" ")
        )
    }
}

/// Chain of invocations, each one's stdout feeding the next one's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPipeline {
    steps: Vec<Invocation>,
    stdin: Option<PathBuf>,
    stdout: Option<PathBuf>,
}

impl From<Invocation> for CommandPipeline {
    fn from(invocation: Invocation) -> Self {
        Self {
            steps: vec![invocation],
            stdin: None,
            stdout: None,
        }
    }
}

impl CommandPipeline {
    pub fn new(steps: Vec<Invocation>) -> Self {
        Self {
            steps,
            stdin: None,
            stdout: None,
        }
    }

    /// Feed the first step with the content of `path`.
    pub fn stdin(mut self, path: &Path) -> Self {
        self.stdin = Some(path.to_path_buf());
        self
    }

    /// Write the last step's output to `path` (truncating it).
    pub fn stdout(mut self, path: &Path) -> Self {
        self.stdout = Some(path.to_path_buf());
        self
    }

    pub fn steps(&self) -> &[Invocation] {
        &self.steps
    }

    pub fn input(&self) -> Option<&Path> {
        self.stdin.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.stdout.as_deref()
    }

    /// Spawn every step and wait for all of them.
    pub fn run(&self, policy: ExitPolicy) -> Result<(), Error> {
        debug!("running {}", self);
        match (self.execute(), policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), ExitPolicy::Ignore) => {
                warn!("ignoring failure of `{}`: {}", self, e);
                Ok(())
            }
            (Err(e), ExitPolicy::Check) => {
                error!("`{}` failed: {}", self, e);
                Err(e)
            }
        }
    }

    fn execute(&self) -> Result<(), Error> {
        // output file is created first so that it exists even if a tool cannot be run.
        let mut last_stdout: Option<Stdio> = match &self.stdout {
            Some(path) => Some(Stdio::from(File::create(path)?)),
            None => None,
        };
        let mut next_stdin: Option<Stdio> = match &self.stdin {
            Some(path) => Some(Stdio::from(File::open(path)?)),
            None => None,
        };

        let mut children: Vec<(&Invocation, Child)> = Vec::with_capacity(self.steps.len());
        let mut spawn_error = None;
        let nb_steps = self.steps.len();

        for (idx, step) in self.steps.iter().enumerate() {
            let mut command = step.command();
            if let Some(stdin) = next_stdin.take() {
                command.stdin(stdin);
            }
            if idx + 1 == nb_steps {
                if let Some(stdout) = last_stdout.take() {
                    command.stdout(stdout);
                }
            } else {
                command.stdout(Stdio::piped());
            }

            match command.spawn() {
                Ok(mut child) => {
                    next_stdin = child.stdout.take().map(Stdio::from);
                    children.push((step, child));
                }
                Err(source) => {
                    spawn_error = Some(Error::Spawn {
                        program: step.program_name(),
                        source,
                    });
                    break;
                }
            }
        }

        // drop any dangling pipe end so that already spawned steps can terminate.
        drop(next_stdin);

        let mut failure = spawn_error;
        for (step, mut child) in children {
            let status = child.wait()?;
            if !status.success() && failure.is_none() {
                failure = Some(Error::StageExecution {
                    program: step.program_name(),
                    status: status.code(),
                });
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Display for CommandPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.steps.iter().join(" | "))?;
        if let Some(stdin) = &self.stdin {
            write!(f, " < {}", stdin.display())?;
        }
        if let Some(stdout) = &self.stdout {
            write!(f, " > {}", stdout.display())?;
        }
        Ok(())
    }
}
