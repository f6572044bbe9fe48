//! Live port manager probing localhost and killing owners via `lsof`.

use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::ports::network::PortManager;

/// Port manager for the local machine.
#[derive(Debug, Clone)]
pub struct LocalPortManager {
    connect_timeout: Duration,
    lookup_timeout: Duration,
}

impl Default for LocalPortManager {
    fn default() -> Self {
        Self { connect_timeout: Duration::from_millis(150), lookup_timeout: Duration::from_secs(2) }
    }
}

impl PortManager for LocalPortManager {
    fn is_in_use(&self, port: u16) -> bool {
        let loopbacks = [IpAddr::V4(Ipv4Addr::LOCALHOST), IpAddr::V6(Ipv6Addr::LOCALHOST)];
        let accepts = loopbacks.iter().any(|host| {
            TcpStream::connect_timeout(&SocketAddr::new(*host, port), self.connect_timeout).is_ok()
        });
        if accepts {
            return true;
        }
        // Nothing answered; a failed bind still means the port is taken.
        TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).is_err()
    }

    fn kill_owner(&self, port: u16, work_dir: &Path) -> bool {
        match self.owner_pids(port, work_dir) {
            Ok(pids) => {
                for pid in pids {
                    debug!(pid, port, "killing port owner");
                    if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGKILL) {
                        warn!(pid, "failed to kill port owner: {e}");
                    }
                }
            }
            Err(e) => warn!(port, "could not look up port owners: {e}"),
        }
        !self.is_in_use(port)
    }
}

impl LocalPortManager {
    fn owner_pids(&self, port: u16, work_dir: &Path) -> Result<Vec<i32>, std::io::Error> {
        let mut child = Command::new("lsof")
            .arg("-ti")
            .arg(format!("tcp:{port}"))
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        if !wait_with_deadline(&mut child, self.lookup_timeout)? {
            warn!(port, "lsof timed out");
            let _ = child.kill();
            let _ = child.wait();
            return Ok(Vec::new());
        }

        let mut output = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_string(&mut output)?;
        }
        Ok(parse_pids(&output))
    }
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<bool, std::io::Error> {
    let deadline = Instant::now() + timeout;
    loop {
        if child.try_wait()?.is_some() {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn parse_pids(output: &str) -> Vec<i32> {
    output.split_whitespace().filter_map(|token| token.parse().ok()).filter(|pid| *pid > 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listening_port_is_in_use() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(LocalPortManager::default().is_in_use(port));
    }

    #[test]
    fn released_port_is_free() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        assert!(!LocalPortManager::default().is_in_use(port));
    }

    #[test]
    fn kill_owner_on_free_port_reports_free() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let dir = tempfile::tempdir().unwrap();

        assert!(LocalPortManager::default().kill_owner(port, dir.path()));
    }

    #[test]
    fn parses_lsof_pid_lines() {
        assert_eq!(parse_pids("123\n456\n\n"), vec![123, 456]);
        assert_eq!(parse_pids("garbage 0 -5 77"), vec![77]);
        assert!(parse_pids("").is_empty());
    }
}
