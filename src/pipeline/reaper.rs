//! Process-group termination.

use log::debug;
use tokio::process::Child;

/// Sends SIGTERM to the whole process group led by `child`.
///
/// The pipeline shell is started as a group leader, so its group id equals
/// its pid and `kill(-pid)` also reaches the dump tool and the compressor.
/// A child that has already been reaped is left alone, and signal failures
/// are ignored: termination races natural exit and is best-effort.
///
/// On platforms without process groups only the leader is killed; processes
/// it spawned may be orphaned.
pub fn terminate(child: &mut Child) {
    #[cfg(unix)]
    signal_group(child, libc::SIGTERM, "SIGTERM");
    #[cfg(not(unix))]
    kill_leader(child);
}

/// Sends SIGKILL to the whole process group led by `child`.
///
/// Used once a group has outlived its SIGTERM grace period.
pub fn kill(child: &mut Child) {
    #[cfg(unix)]
    signal_group(child, libc::SIGKILL, "SIGKILL");
    #[cfg(not(unix))]
    kill_leader(child);
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: libc::c_int, name: &str) {
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) only takes integers; a negative pid addresses the group.
    let rc = unsafe { libc::kill(-pgid, signal) };
    if rc != 0 {
        debug!(
            "{} to process group {} failed: {}",
            name,
            pgid,
            std::io::Error::last_os_error()
        );
    } else {
        debug!("Sent {} to process group {}", name, pgid);
    }
}

#[cfg(not(unix))]
fn kill_leader(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!("Failed to kill pipeline leader: {}", e);
    }
}
