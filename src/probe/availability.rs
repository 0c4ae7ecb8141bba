//! Port availability probe.
//!
//! Tests a single port against the loopback interface only, per the
//! external contract in spec.md §6. This is strictly narrower than a
//! general occupancy checker that inspects every interface and both TCP
//! and UDP: the registry only ever needs to know whether *this* process
//! could bind the port on `127.0.0.1` right now.

use std::net::TcpListener;

/// Attempts to bind a listening socket on `127.0.0.1:port`.
///
/// Returns `true` and releases the socket immediately if the bind
/// succeeds; returns `false` on any bind error (port already bound,
/// permission denied, etc). There is no explicit deadline: the bind
/// syscall either completes promptly or fails, so none is imposed here.
///
/// This is a best-effort guarantee. Nothing prevents another process
/// from binding the same port in the interval between this probe
/// returning `true` and the caller's own eventual bind.
///
/// # Examples
///
/// ```
/// use portreg::probe::try_bind;
///
/// // An ephemeral port picked by the OS is available by construction.
/// let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
/// let port = listener.local_addr().unwrap().port();
/// drop(listener);
///
/// assert!(try_bind(port));
/// ```
#[must_use]
pub fn try_bind(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}
