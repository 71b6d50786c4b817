// process.rs

use std::ffi::CString;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::debug;
use nix::errno::Errno;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execvp, fork, ForkResult, Pid};

use crate::dispatcher::Launcher;
use crate::error::ShellError;
use crate::parser::Command;
use crate::util::writeln_ignore_broken_pipe;

static REAPER_INSTALLED: AtomicBool = AtomicBool::new(false);
static REAPED: AtomicUsize = AtomicUsize::new(0);

/// Runs external programs with fork/execvp.
///
/// Background children are collected by a SIGCHLD handler that is installed
/// once per process, the first time a runner is created.
pub struct ProcessRunner {
    _private: (),
}

impl ProcessRunner {
    pub fn new() -> Result<Self, ShellError> {
        install_reaper()?;
        Ok(Self { _private: () })
    }
}

impl Launcher for ProcessRunner {
    fn foreground(&mut self, command: &Command, line: &str) -> Result<(), ShellError> {
        let Some(argv) = c_argv(command) else {
            return report_not_found(line);
        };

        // The reaper must not collect the child we are about to wait on.
        let mut blocked = SigSet::empty();
        blocked.add(Signal::SIGCHLD);
        let mut previous = SigSet::empty();
        signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&blocked), Some(&mut previous))
            .map_err(ShellError::Signal)?;

        let result = spawn(&argv, line, Some(&previous)).and_then(wait_for);

        // Unblocking delivers any SIGCHLD that arrived meanwhile.
        signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(&previous), None)
            .map_err(ShellError::Signal)?;
        result
    }

    fn background(&mut self, command: &Command, line: &str) -> Result<(), ShellError> {
        let Some(argv) = c_argv(command) else {
            return report_not_found(line);
        };
        let child = spawn(&argv, line, None)?;
        debug!("started background pid {child}");
        Ok(())
    }
}

/// Number of background children reaped since the last call.
pub fn take_reaped() -> usize {
    REAPED.swap(0, Ordering::Relaxed)
}

fn install_reaper() -> Result<(), ShellError> {
    if REAPER_INSTALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    let action = SigAction::new(
        SigHandler::Handler(reap_children),
        SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
        SigSet::empty(),
    );
    // SAFETY: the handler only calls waitpid and touches an atomic.
    if let Err(e) = unsafe { signal::sigaction(Signal::SIGCHLD, &action) } {
        REAPER_INSTALLED.store(false, Ordering::SeqCst);
        return Err(ShellError::Signal(e));
    }
    Ok(())
}

// Several children may exit before the handler runs, and signals coalesce,
// so drain everything that is ready. errno belongs to whatever the main
// thread was doing when the signal landed and is put back on the way out.
extern "C" fn reap_children(_signal: libc::c_int) {
    let saved = Errno::last();
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(_) => {
                REAPED.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
    set_errno(saved);
}

fn set_errno(errno: Errno) {
    // SAFETY: errno_location points at this thread's errno.
    unsafe { *errno_location() = errno as libc::c_int };
}

#[cfg(any(target_os = "linux", target_os = "android"))]
unsafe fn errno_location() -> *mut libc::c_int {
    libc::__errno_location()
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
unsafe fn errno_location() -> *mut libc::c_int {
    libc::__error()
}

fn c_argv(command: &Command) -> Option<Vec<CString>> {
    command
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()).ok())
        .collect()
}

fn report_not_found(line: &str) -> Result<(), ShellError> {
    writeln_ignore_broken_pipe(io::stdout(), format!("{line}: command not found"))?;
    Ok(())
}

fn spawn(argv: &[CString], line: &str, child_mask: Option<&SigSet>) -> Result<Pid, ShellError> {
    // Anything still buffered would otherwise be written twice.
    io::stdout().flush()?;
    // SAFETY: the interpreter is single-threaded, and the child only execs or exits.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => Ok(child),
        Ok(ForkResult::Child) => exec(argv, line, child_mask),
        Err(e) => Err(ShellError::Fork(e)),
    }
}

fn exec(argv: &[CString], line: &str, mask: Option<&SigSet>) -> ! {
    if let Some(mask) = mask {
        let _ = signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(mask), None);
    }
    let _ = execvp(&argv[0], argv);
    let _ = writeln_ignore_broken_pipe(io::stdout(), format!("{line}: command not found"));
    let _ = io::stdout().flush();
    unsafe { libc::_exit(127) }
}

fn wait_for(child: Pid) -> Result<(), ShellError> {
    loop {
        match waitpid(child, None) {
            Ok(status) => {
                debug!("foreground pid {child} finished: {status:?}");
                return Ok(());
            }
            Err(Errno::EINTR) => continue,
            // Already collected elsewhere; it has terminated either way.
            Err(Errno::ECHILD) => return Ok(()),
            Err(e) => return Err(ShellError::Wait(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(argv: &[&str]) -> Command {
        Command {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            background: false,
        }
    }

    #[test]
    fn argv_converts_to_c_strings() {
        let argv = c_argv(&command(&["echo", "hi"])).unwrap();
        assert_eq!(argv, vec![CString::new("echo").unwrap(), CString::new("hi").unwrap()]);
    }

    #[test]
    fn interior_nul_cannot_be_executed() {
        assert!(c_argv(&command(&["ec\0ho"])).is_none());
    }

    #[test]
    fn reaping_leaves_errno_alone() {
        set_errno(Errno::EAGAIN);
        // No children here, so waitpid fails with ECHILD inside the handler.
        reap_children(libc::SIGCHLD);
        assert_eq!(Errno::last(), Errno::EAGAIN);
    }

    #[test]
    fn reaper_installs_once() {
        install_reaper().unwrap();
        install_reaper().unwrap();
        assert!(REAPER_INSTALLED.load(Ordering::SeqCst));
        assert!(ProcessRunner::new().is_ok());
    }
}
