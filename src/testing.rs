//! In-memory port fakes shared by unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::config::{Settings, DEFAULT_REPORT_DIR, DEFAULT_REPORT_PORT};
use crate::context::ServiceContext;
use crate::ports::process::{OutputStream, ProcessEvent, ProcessHandle, StopSignal};
use crate::ports::{Clock, FileSystem, IdGenerator, PortError, PortManager, ProcessRunner};

/// In-memory filesystem.
#[derive(Default)]
pub struct MemFs {
    files: Mutex<HashMap<PathBuf, String>>,
    dirs: Mutex<HashSet<PathBuf>>,
}

impl MemFs {
    pub fn insert(&self, path: impl Into<PathBuf>, contents: &str) {
        self.files.lock().unwrap().insert(path.into(), contents.to_string());
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.dirs.lock().unwrap().insert(path.into());
    }
}

impl FileSystem for MemFs {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        self.insert(path, contents);
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), PortError> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }
}

/// Clock that advances by a fixed step on every reading.
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(step: Duration) -> Self {
        let start = Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).unwrap();
        Self { next: Mutex::new(start), step }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + self.step;
        now
    }
}

/// Always hands out the same identifier.
pub struct FixedIds(pub &'static str);

impl IdGenerator for FixedIds {
    fn generate_id(&self) -> String {
        self.0.to_string()
    }
}

/// Shorthand for a stdout chunk.
pub fn out(text: &str) -> ProcessEvent {
    ProcessEvent::Output { stream: OutputStream::Stdout, text: text.to_string() }
}

/// Shorthand for a terminal event.
pub fn exited(exit_code: i32) -> ProcessEvent {
    ProcessEvent::Terminated { exit_code }
}

/// Commands a [`ScriptedRunner`] was asked to start.
pub type StartLog = Arc<Mutex<Vec<(String, PathBuf)>>>;

/// Process runner that replays one scripted event list per start.
#[derive(Default)]
pub struct ScriptedRunner {
    scripts: Mutex<VecDeque<Vec<ProcessEvent>>>,
    started: StartLog,
    stops: Arc<AtomicUsize>,
}

impl ScriptedRunner {
    pub fn new(scripts: Vec<Vec<ProcessEvent>>) -> Self {
        Self { scripts: Mutex::new(scripts.into()), ..Self::default() }
    }

    pub fn started(&self) -> StartLog {
        Arc::clone(&self.started)
    }

    pub fn stops(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stops)
    }
}

impl ProcessRunner for ScriptedRunner {
    fn start(&self, command: &str, work_dir: &Path) -> Result<Box<dyn ProcessHandle>, PortError> {
        let script =
            self.scripts.lock().unwrap().pop_front().ok_or("no scripted process left")?;
        self.started.lock().unwrap().push((command.to_string(), work_dir.to_path_buf()));
        Ok(Box::new(ScriptedProcess { events: script.into(), stops: Arc::clone(&self.stops) }))
    }
}

struct ScriptedProcess {
    events: VecDeque<ProcessEvent>,
    stops: Arc<AtomicUsize>,
}

impl ProcessHandle for ScriptedProcess {
    fn next_event(&mut self) -> Option<ProcessEvent> {
        self.events.pop_front()
    }

    fn stop_signal(&self) -> StopSignal {
        let stops = Arc::clone(&self.stops);
        StopSignal::new(move || {
            stops.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// Port manager with a single simulated occupied/free state.
pub struct FakePorts {
    in_use: Mutex<bool>,
    kill_frees: bool,
    kills: Arc<AtomicUsize>,
}

impl FakePorts {
    pub fn new(in_use: bool, kill_frees: bool) -> Self {
        Self { in_use: Mutex::new(in_use), kill_frees, kills: Arc::default() }
    }

    pub fn kills(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.kills)
    }
}

impl PortManager for FakePorts {
    fn is_in_use(&self, _port: u16) -> bool {
        *self.in_use.lock().unwrap()
    }

    fn kill_owner(&self, _port: u16, _work_dir: &Path) -> bool {
        self.kills.fetch_add(1, Ordering::SeqCst);
        let mut in_use = self.in_use.lock().unwrap();
        if self.kill_frees {
            *in_use = false;
        }
        !*in_use
    }
}

/// A context made entirely of fakes: empty filesystem, one-second clock
/// steps, a fixed run id, no scripted processes and a free port.
pub fn test_context() -> ServiceContext {
    ServiceContext {
        clock: Box::new(SteppingClock::new(Duration::seconds(1))),
        fs: Box::new(MemFs::default()),
        id_gen: Box::new(FixedIds("test-run-id")),
        processes: Box::new(ScriptedRunner::default()),
        ports: Box::new(FakePorts::new(false, true)),
    }
}

/// Settings rooted at `root` with no configuration overrides.
pub fn test_settings(root: &str) -> Settings {
    Settings {
        project_root: PathBuf::from(root),
        state_file: Path::new(root).join(".envrunner/state.json"),
        work_dir: None,
        report_port: DEFAULT_REPORT_PORT,
        report_dir: DEFAULT_REPORT_DIR.to_string(),
        bs_username: None,
        bs_access_key: None,
    }
}
