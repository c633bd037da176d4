use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::scanner::{OtoolScanner, ReadelfScanner, SegmentScanner};
use crate::source::ToolProcess;

/// The introspection tools whose output can be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// `otool -l`, for Mach-O files.
    Otool,
    /// `readelf --segments`, for ELF files.
    Readelf,
}

impl ToolKind {
    /// The tool native to the platform this was built for.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            ToolKind::Otool
        } else {
            ToolKind::Readelf
        }
    }

    pub fn default_program(self) -> &'static str {
        match self {
            ToolKind::Otool => "otool",
            ToolKind::Readelf => "readelf",
        }
    }

    /// Environment variable that overrides the program name.
    pub fn program_env(self) -> &'static str {
        match self {
            ToolKind::Otool => "CORESEG_OTOOL",
            ToolKind::Readelf => "CORESEG_READELF",
        }
    }

    fn default_args(self) -> &'static [&'static str] {
        match self {
            ToolKind::Otool => &["-l"],
            ToolKind::Readelf => &["--segments"],
        }
    }

    /// A fresh scanner for this tool's output.
    pub fn scanner(self) -> Box<dyn SegmentScanner> {
        match self {
            ToolKind::Otool => Box::new(OtoolScanner::new()),
            ToolKind::Readelf => Box::new(ReadelfScanner::new()),
        }
    }
}

/// How to launch an introspection tool against a file.
#[derive(Debug, Clone)]
pub struct Tool {
    kind: ToolKind,
    program: OsString,
    args: Vec<OsString>,
}

impl Tool {
    pub fn new(kind: ToolKind) -> Self {
        Self {
            kind,
            program: kind.default_program().into(),
            args: kind.default_args().iter().map(OsString::from).collect(),
        }
    }

    /// Replaces the program, keeping the arguments.
    pub fn program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Replaces the arguments placed before the target path.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        self
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    /// The program that will be run, as printable text.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    pub fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Starts the tool with `path` as its operand.
    pub fn spawn(&self, path: &Path) -> Result<ToolProcess> {
        let program = self.program_name();
        log::info!("Running `{program}` on {}", path.display());

        let mut child = self.command(path).spawn().map_err(|source| Error::Spawn {
            program: program.clone(),
            source,
        })?;
        let stdout = child.stdout.take().ok_or_else(|| Error::Spawn {
            program: program.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;
        Ok(ToolProcess::new(program, child, stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_commands() {
        let cmd = Tool::new(ToolKind::Otool).command(Path::new("core.1"));
        assert_eq!(cmd.get_program(), "otool");
        assert_eq!(cmd.get_args().collect::<Vec<_>>(), ["-l", "core.1"]);

        let cmd = Tool::new(ToolKind::Readelf).command(Path::new("core.1"));
        assert_eq!(cmd.get_program(), "readelf");
        assert_eq!(cmd.get_args().collect::<Vec<_>>(), ["--segments", "core.1"]);
    }

    #[test]
    fn program_override_keeps_args() {
        let tool = Tool::new(ToolKind::Readelf).program("llvm-readelf");
        let cmd = tool.command(Path::new("core"));
        assert_eq!(cmd.get_program(), "llvm-readelf");
        assert_eq!(cmd.get_args().collect::<Vec<_>>(), ["--segments", "core"]);
    }

    #[test]
    fn args_override_replaces_default_args() {
        let tool = Tool::new(ToolKind::Readelf)
            .program("llvm-readelf")
            .args(["--program-headers"]);
        assert_eq!(tool.program_name(), "llvm-readelf");
        let cmd = tool.command(Path::new("core"));
        assert_eq!(
            cmd.get_args().collect::<Vec<_>>(),
            ["--program-headers", "core"]
        );
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let tool = Tool::new(ToolKind::Otool).program("coreseg-no-such-tool");
        let err = tool.spawn(Path::new("core")).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(err.is_recoverable());
    }
}
