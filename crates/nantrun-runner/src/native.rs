use crate::error::RunnerError;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{AbortHandle, CommandSpec, ProcessExit, ProcessRunner};

/// How often the runner checks for exit and abort requests while idle
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time between the polite termination signal and the forced kill
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

// ============================================================================
// NativeRunner - Local Process Execution
// ============================================================================

/// Native process runner using `std::process::Command`.
///
/// `NativeRunner` spawns the child with piped stdout/stderr and forwards every
/// line to the sink as soon as it is read, so long NAnt builds show progress
/// in the build log. The call blocks until the child exits.
///
/// On Unix the child is placed in its own process group so an abort can take
/// down the tools NAnt itself spawned (compilers, test runners).
///
/// # Example
///
/// ```rust,no_run
/// use nantrun_runner::{AbortHandle, CommandSpec, NativeRunner, ProcessRunner};
///
/// let runner = NativeRunner::new();
/// let cmd = CommandSpec::new("nant").arg("-buildfile:default.build");
///
/// let mut log = std::io::stdout();
/// let exit = runner.run(&cmd, &mut log, &AbortHandle::new()).unwrap();
/// assert!(exit.success());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRunner;

impl NativeRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Abort progress for a running child
enum Termination {
    NotRequested,
    Signalled(Instant),
    Killed,
}

impl ProcessRunner for NativeRunner {
    fn run(
        &self,
        cmd: &CommandSpec,
        sink: &mut dyn Write,
        abort: &AbortHandle,
    ) -> Result<ProcessExit, RunnerError> {
        let program = cmd.program_display();

        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group on Unix for killpg support
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command
            .spawn()
            .map_err(|source| RunnerError::LaunchFailed {
                program: program.clone(),
                source,
            })?;
        debug!(pid = child.id(), program = %program, "Process started");

        let (tx, rx) = mpsc::channel();
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(spawn_pump(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(spawn_pump(stderr, tx.clone()));
        }
        drop(tx);

        let mut log = LogForwarder::new(sink);
        let mut termination = Termination::NotRequested;

        let status = loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(chunk) => log.forward(&chunk),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(POLL_INTERVAL),
            }

            if abort.is_aborted() {
                termination = match termination {
                    Termination::NotRequested => {
                        debug!(pid = child.id(), "Abort requested, terminating process");
                        terminate(&mut child, false);
                        Termination::Signalled(Instant::now())
                    }
                    Termination::Signalled(at) if at.elapsed() >= TERMINATE_GRACE => {
                        warn!(pid = child.id(), "Process ignored termination, killing");
                        terminate(&mut child, true);
                        Termination::Killed
                    }
                    other => other,
                };
            }

            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    warn!(pid = child.id(), error = %source, "Lost track of process, killing");
                    kill_and_reap(&mut child);
                    for chunk in rx.try_iter() {
                        log.forward(&chunk);
                    }
                    log.flush();
                    return Err(RunnerError::WaitFailed { program, source });
                }
            }
        };

        let aborted = !matches!(termination, Termination::NotRequested);
        if aborted {
            // Grandchildren may still hold the pipes open; take what is buffered
            for chunk in rx.try_iter() {
                log.forward(&chunk);
            }
        } else {
            for chunk in rx.iter() {
                log.forward(&chunk);
            }
            for pump in pumps {
                let _ = pump.join();
            }
        }
        log.flush();

        debug!(program = %program, exit_code = ?status.code(), aborted, "Process finished");
        Ok(ProcessExit::new(status.code(), aborted))
    }
}

/// Read `stream` line by line and hand each line to the forwarding loop.
fn spawn_pump<R>(stream: R, tx: Sender<Vec<u8>>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        loop {
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Output pipe read failed");
                    break;
                }
            }
        }
    })
}

/// Writes child output to the build log; a broken log never fails the build.
struct LogForwarder<'a> {
    sink: &'a mut dyn Write,
    broken: bool,
}

impl<'a> LogForwarder<'a> {
    fn new(sink: &'a mut dyn Write) -> Self {
        Self { sink, broken: false }
    }

    fn forward(&mut self, chunk: &[u8]) {
        if self.broken {
            return;
        }
        if let Err(e) = self.sink.write_all(chunk).and_then(|()| self.sink.flush()) {
            warn!(error = %e, "Build log write failed, discarding further output");
            self.broken = true;
        }
    }

    fn flush(&mut self) {
        if !self.broken {
            let _ = self.sink.flush();
        }
    }
}

/// Terminate the child and, on Unix, its process group.
///
/// `force` selects SIGKILL over SIGTERM. Elsewhere the child is killed outright.
fn terminate(child: &mut Child, force: bool) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let pgid = Pid::from_raw(child.id() as i32);
        let signal = if force { Signal::SIGKILL } else { Signal::SIGTERM };
        if killpg(pgid, signal).is_ok() {
            return;
        }
    }

    #[cfg(not(unix))]
    let _ = force;

    let _ = child.kill();
}

/// Force-kill the child's process group and collect its exit status.
fn kill_and_reap(child: &mut Child) {
    terminate(child, true);
    if let Err(e) = child.wait() {
        debug!(error = %e, "Failed to reap killed process");
    }
}
