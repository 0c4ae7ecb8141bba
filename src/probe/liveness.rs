//! Process-liveness probe.
//!
//! An entry whose owning pid is no longer live is stale regardless of its
//! age; this is the cheaper of the two staleness conditions to check, so
//! the engine evaluates it first.

/// Reports whether process `pid` is still reachable for signaling.
///
/// On Unix this sends signal `0`, which performs permission and existence
/// checks without actually delivering anything. `ESRCH` means the process
/// is gone; any other outcome (success, or a permission error on a process
/// owned by someone else) means it still exists.
///
/// On non-Unix targets this probe fails open and always reports `true`,
/// since there is no portable equivalent available to this crate's
/// dependency set; entries are then only reclaimed via `staleTimeout`.
///
/// # Examples
///
/// ```
/// use portreg::probe::alive;
///
/// let pid = std::process::id();
/// assert!(alive(pid));
/// ```
#[must_use]
pub fn alive(pid: u32) -> bool {
    imp::alive(pid)
}

#[cfg(unix)]
mod imp {
    #[allow(unsafe_code)]
    pub(super) fn alive(pid: u32) -> bool {
        // SAFETY: kill(pid, 0) performs no action beyond existence/permission
        // checks; it never sends a signal that could affect the target.
        let result = unsafe { libc::kill(pid as libc::pid_t, 0) };
        if result == 0 {
            return true;
        }
        std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
    }
}

#[cfg(not(unix))]
mod imp {
    pub(super) fn alive(_pid: u32) -> bool {
        true
    }
}
