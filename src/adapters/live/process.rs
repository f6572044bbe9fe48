//! Live process runner using `std::process::Command` and reader threads.

use std::io::Read;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::ports::process::{OutputStream, ProcessEvent, ProcessHandle, ProcessRunner, StopSignal};
use crate::ports::PortError;

const READ_CHUNK: usize = 8192;

/// Runs commands through `/bin/sh -c` in their own process group.
pub struct ShellProcessRunner;

impl ProcessRunner for ShellProcessRunner {
    fn start(&self, command: &str, work_dir: &Path) -> Result<Box<dyn ProcessHandle>, PortError> {
        let mut child = Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .spawn()?;

        let pid = i32::try_from(child.id())?;
        debug!(pid, cwd = %work_dir.display(), "spawned shell");

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, OutputStream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, OutputStream::Stderr, tx.clone()));
        }

        let exited = Arc::new(AtomicBool::new(false));
        let waiter_exited = Arc::clone(&exited);
        thread::spawn(move || {
            let status = child.wait();
            waiter_exited.store(true, Ordering::SeqCst);
            for reader in readers {
                let _ = reader.join();
            }
            let exit_code = match status {
                Ok(status) => exit_code(status),
                Err(e) => {
                    warn!(pid, "failed to wait for child: {e}");
                    -1
                }
            };
            let _ = tx.send(ProcessEvent::Terminated { exit_code });
        });

        Ok(Box::new(ShellProcess { events: rx, pid, exited, finished: false }))
    }
}

struct ShellProcess {
    events: Receiver<ProcessEvent>,
    pid: i32,
    exited: Arc<AtomicBool>,
    finished: bool,
}

impl ProcessHandle for ShellProcess {
    fn next_event(&mut self) -> Option<ProcessEvent> {
        if self.finished {
            return None;
        }
        match self.events.recv() {
            Ok(event) => {
                if matches!(event, ProcessEvent::Terminated { .. }) {
                    self.finished = true;
                }
                Some(event)
            }
            Err(_) => {
                self.finished = true;
                None
            }
        }
    }

    fn stop_signal(&self) -> StopSignal {
        let pid = self.pid;
        let exited = Arc::clone(&self.exited);
        StopSignal::new(move || {
            // The pid may be reused once the child has been reaped.
            if exited.load(Ordering::SeqCst) {
                return;
            }
            debug!(pid, "sending SIGTERM to process group");
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGTERM) {
                if e != nix::errno::Errno::ESRCH {
                    warn!(pid, "failed to signal process group: {e}");
                }
            }
        })
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().or_else(|| status.signal().map(|signal| 128 + signal)).unwrap_or(-1)
}

fn spawn_reader(
    mut pipe: impl Read + Send + 'static,
    stream: OutputStream,
    tx: Sender<ProcessEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK];
        let mut decoder = Utf8Chunks::default();
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let text = decoder.push(&buf[..n]);
                    if !text.is_empty() && tx.send(ProcessEvent::Output { stream, text }).is_err() {
                        return;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(?stream, "read failed: {e}");
                    break;
                }
            }
        }
        let rest = decoder.finish();
        if !rest.is_empty() {
            let _ = tx.send(ProcessEvent::Output { stream, text: rest });
        }
    })
}

/// Decodes UTF-8 across read boundaries, holding back an incomplete trailing
/// sequence until the next chunk arrives.
#[derive(Default)]
struct Utf8Chunks {
    pending: Vec<u8>,
}

impl Utf8Chunks {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let keep = match std::str::from_utf8(&self.pending) {
            Ok(_) => 0,
            Err(e) if e.error_len().is_none() => self.pending.len() - e.valid_up_to(),
            Err(_) => 0,
        };
        let split = self.pending.len() - keep;
        let text = String::from_utf8_lossy(&self.pending[..split]).into_owned();
        self.pending.drain(..split);
        text
    }

    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}
