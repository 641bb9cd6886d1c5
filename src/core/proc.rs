//! The fex processes module.
//!
//! Everything that leaves the process goes through here: the [Shell] trait
//! runs a command line synchronously in a subprocess, and the [Launcher] builds
//! those command lines for activating entries (editor, executables, the system
//! opener) and for the move/trash file operations.
//!
//! [SystemShell] hands the terminal back to the child for the duration of the
//! call, the same way the editor integration of the terminal loop does.

use crate::config::Programs;
use crate::core::classify::Classifier;
use crate::core::error::{Error, ShellError};
use crate::core::fm::{FileEntry, FileKind, resolve_symlink};
use crate::utils::{escape_path, expand_home_path};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Exit status `sh` uses when the command could not be found.
const SHELL_NOT_FOUND: i32 = 127;

/// Synchronous command execution.
pub trait Shell {
    /// Runs `command` through the shell with `cwd` as working directory and
    /// waits for it to exit.
    fn run(&mut self, command: &str, cwd: &Path) -> Result<(), ShellError>;

    /// The working directory of the process fex was started from.
    fn working_dir(&self) -> io::Result<PathBuf>;
}

/// [Shell] backed by `sh -c`.
pub struct SystemShell {
    restore_terminal: bool,
}

impl SystemShell {
    /// With `restore_terminal` the raw mode and alternate screen are dropped
    /// while the child runs and restored afterwards.
    pub fn new(restore_terminal: bool) -> Self {
        Self { restore_terminal }
    }

    fn suspend(&self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen, Show)
    }

    fn resume(&self) -> io::Result<()> {
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        enable_raw_mode()
    }
}

impl Shell for SystemShell {
    fn run(&mut self, command: &str, cwd: &Path) -> Result<(), ShellError> {
        let spawn_err = |source: io::Error| ShellError::Spawn {
            cmd: command.to_string(),
            source,
        };

        if self.restore_terminal {
            self.suspend().map_err(spawn_err)?;
        }

        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .status();

        if self.restore_terminal {
            self.resume().map_err(spawn_err)?;
        }

        match status {
            Ok(status) => check_status(command, status),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ShellError::NotFound("sh".into())),
            Err(e) => Err(spawn_err(e)),
        }
    }

    fn working_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
}

fn check_status(command: &str, status: ExitStatus) -> Result<(), ShellError> {
    match status.code() {
        Some(0) => Ok(()),
        Some(SHELL_NOT_FOUND) => Err(ShellError::NotFound(command.to_string())),
        Some(code) => Err(ShellError::Exit {
            cmd: command.to_string(),
            code,
        }),
        None => Err(ShellError::Signal(command.to_string())),
    }
}

/// Where removed entries go.
#[derive(Debug, Clone, PartialEq)]
pub enum TrashTarget {
    /// Moved into this directory with `mv`.
    Dir(PathBuf),
    /// Handed to the platform trash.
    System,
}

/// Builds and runs the command lines for activations and file operations.
pub struct Launcher {
    shell: Box<dyn Shell>,
    editor: String,
    terminal: String,
    opener: String,
    trash: TrashTarget,
    repaint: bool,
}

impl Launcher {
    pub fn new(shell: Box<dyn Shell>, programs: &Programs, trash: TrashTarget) -> Self {
        Self {
            shell,
            editor: programs.editor().to_string(),
            terminal: programs.terminal().to_string(),
            opener: programs.opener().to_string(),
            trash,
            repaint: false,
        }
    }

    /// Returns whether a subprocess ran since the last call, so the screen
    /// needs a full repaint.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint)
    }

    pub fn working_dir(&self) -> io::Result<PathBuf> {
        self.shell.working_dir()
    }

    fn run(&mut self, command: &str, cwd: &Path) -> Result<(), ShellError> {
        self.repaint = true;
        self.shell.run(command, cwd)
    }

    /// Prefixes `command` with the configured terminal wrapper, if any.
    fn in_terminal(&self, command: String) -> String {
        if self.terminal.is_empty() {
            command
        } else {
            format!("{} {}", self.terminal, command)
        }
    }

    /// Activates an entry.
    ///
    /// Directories are not opened here: their path is returned so the caller
    /// can navigate into them. Symlinks are resolved (bounded) and the final
    /// target is opened as if it had been listed.
    pub fn open(
        &mut self,
        entry: &FileEntry,
        classifier: Option<&dyn Classifier>,
    ) -> Result<Option<PathBuf>, Error> {
        let path = entry.full_path();
        let cwd = path.parent().unwrap_or(path);
        let escaped = escape_path(&path.to_string_lossy());

        match entry.kind() {
            FileKind::Directory => Ok(Some(path.to_path_buf())),
            FileKind::Executable => {
                let cmd = self.in_terminal(escaped);
                self.run(&cmd, cwd)?;
                Ok(None)
            }
            FileKind::Regular => {
                let cmd = self.in_terminal(format!("{} {}", self.editor, escaped));
                self.run(&cmd, cwd)?;
                Ok(None)
            }
            FileKind::Symlink => {
                let target = resolve_symlink(path)?;
                let name = target.to_string_lossy().into_owned();
                let resolved = FileEntry::probe(target.clone(), name, classifier)
                    .map_err(|e| crate::core::error::PathError::new(&target, e))?;
                self.open(&resolved, classifier)
            }
            FileKind::Unknown => {
                let cmd = format!("{} {}", self.opener, escaped);
                self.run(&cmd, cwd)?;
                Ok(None)
            }
        }
    }

    /// Moves `paths` to `dest`. A leading `~` in `dest` is the home directory,
    /// any other relative destination is taken from `cwd`.
    pub fn move_paths(&mut self, paths: &[PathBuf], dest: &str, cwd: &Path) -> Result<(), ShellError> {
        let cmd = mv_command(paths, dest);
        self.run(&cmd, cwd)
    }

    /// Sends `paths` to the configured trash.
    pub fn trash(&mut self, paths: &[PathBuf], cwd: &Path) -> Result<(), ShellError> {
        match self.trash.clone() {
            TrashTarget::Dir(dir) => self.move_paths(paths, &dir.to_string_lossy(), cwd),
            TrashTarget::System => {
                self.repaint = true;
                trash::delete_all(paths).map_err(|e| ShellError::Trash(e.to_string()))
            }
        }
    }

    /// Opens `dir` in the system file manager.
    pub fn open_dir(&mut self, dir: &Path) -> Result<(), ShellError> {
        let cmd = format!("{} {}", self.opener, escape_path(&dir.to_string_lossy()));
        self.run(&cmd, dir)
    }
}

fn mv_command(paths: &[PathBuf], dest: &str) -> String {
    let mut cmd = String::from("mv");
    for p in paths {
        cmd.push(' ');
        cmd.push_str(&escape_path(&p.to_string_lossy()));
    }
    cmd.push(' ');
    cmd.push_str(&escape_path(&expand_home_path(dest).to_string_lossy()));
    cmd
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::fs::File;
    use std::rc::Rc;
    use tempfile::tempdir;

    /// Records every command line instead of running it.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingShell {
        pub(crate) calls: Rc<RefCell<Vec<(String, PathBuf)>>>,
        pub(crate) fail_with: Option<i32>,
        pub(crate) cwd: PathBuf,
    }

    impl Shell for RecordingShell {
        fn run(&mut self, command: &str, cwd: &Path) -> Result<(), ShellError> {
            self.calls
                .borrow_mut()
                .push((command.to_string(), cwd.to_path_buf()));
            match self.fail_with {
                Some(code) => Err(ShellError::Exit {
                    cmd: command.to_string(),
                    code,
                }),
                None => Ok(()),
            }
        }

        fn working_dir(&self) -> io::Result<PathBuf> {
            Ok(self.cwd.clone())
        }
    }

    pub(crate) fn launcher(shell: RecordingShell) -> Launcher {
        Launcher::new(
            Box::new(shell),
            &Programs::default(),
            TrashTarget::Dir(PathBuf::from("/trash")),
        )
    }

    #[test]
    fn mv_escapes_every_path() {
        let cmd = mv_command(
            &[PathBuf::from("/a b/c"), PathBuf::from("/d'e")],
            "dest dir",
        );
        assert_eq!(cmd, r"mv /a\ b/c /d\'e dest\ dir");
    }

    #[test]
    fn mv_expands_home_in_destination() -> Result<(), Box<dyn std::error::Error>> {
        let home = crate::utils::get_home().ok_or("no home directory")?;
        let cmd = mv_command(&[PathBuf::from("/x")], "~/dest dir");
        let expected = format!("mv /x {}", escape_path(&home.join("dest dir").to_string_lossy()));
        assert_eq!(cmd, expected);
        assert!(!cmd.contains(r"\~"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn system_shell_moves_into_home() -> Result<(), Box<dyn std::error::Error>> {
        let Some(home) = crate::utils::get_home() else {
            return Ok(());
        };
        // an unwritable home leaves nothing to check
        let Ok(target) = tempfile::tempdir_in(&home) else {
            return Ok(());
        };
        let work = tempdir()?;
        let file = work.path().join("f");
        File::create(&file)?;
        let dir_name = target
            .path()
            .file_name()
            .ok_or("temp dir has no name")?
            .to_string_lossy()
            .into_owned();

        let mut launcher = Launcher::new(
            Box::new(SystemShell::new(false)),
            &Programs::default(),
            TrashTarget::System,
        );
        launcher.move_paths(&[file.clone()], &format!("~/{dir_name}"), work.path())?;
        assert!(target.path().join("f").exists());
        assert!(!file.exists());
        assert!(!work.path().join("~").exists());
        Ok(())
    }

    #[test]
    fn open_by_kind() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let shell = RecordingShell::default();
        let calls = shell.calls.clone();
        let mut launcher = launcher(shell);

        let sub = FileEntry::new(dir.path().join("sub"), "sub".into(), FileKind::Directory, 0);
        assert_eq!(launcher.open(&sub, None)?, Some(dir.path().join("sub")));
        assert!(calls.borrow().is_empty());
        assert!(!launcher.take_repaint());

        let text = FileEntry::new(dir.path().join("a.txt"), "a.txt".into(), FileKind::Regular, 0);
        launcher.open(&text, None)?;
        let bin = FileEntry::new(dir.path().join("img"), "img".into(), FileKind::Unknown, 0);
        launcher.open(&bin, None)?;

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].0.starts_with("nvim "));
        assert!(calls[0].0.ends_with("a.txt"));
        assert_eq!(calls[0].1, dir.path());
        assert!(calls[1].0.ends_with("img"));
        assert!(launcher.take_repaint());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn open_symlink_follows_target() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let target = dir.path().join("real");
        std::fs::create_dir(&target)?;
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link)?;
        File::create(target.join("inside"))?;

        let entry = FileEntry::probe(link, "link".into(), None)?;
        let mut launcher = launcher(RecordingShell::default());
        assert_eq!(launcher.open(&entry, None)?, Some(target));
        Ok(())
    }

    #[test]
    fn shell_failure_is_reported() {
        let shell = RecordingShell {
            fail_with: Some(1),
            ..RecordingShell::default()
        };
        let mut launcher = launcher(shell);
        let err = launcher.move_paths(&[PathBuf::from("/x")], "/y", Path::new("/"));
        assert!(matches!(err, Err(ShellError::Exit { code: 1, .. })));
    }

    #[cfg(unix)]
    #[test]
    fn system_shell_maps_exit_codes() {
        let mut shell = SystemShell::new(false);
        let cwd = std::env::temp_dir();
        assert!(shell.run("true", &cwd).is_ok());
        assert!(matches!(
            shell.run("exit 3", &cwd),
            Err(ShellError::Exit { code: 3, .. })
        ));
        assert!(matches!(
            shell.run("definitely-not-a-command-fex", &cwd),
            Err(ShellError::NotFound(_))
        ));
    }
}
