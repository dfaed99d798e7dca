use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use may::coroutine::JoinHandle;
use may_minihttp::{HttpServer, HttpService};
use tracing::info;

use super::request::parse_request;
use super::response::RecordedResponse;
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;

/// `may_minihttp` service that feeds every connection through a shared
/// [`Router`]. The router must be fully registered before the service is
/// started; dispatch only needs `&Router`.
#[derive(Clone)]
pub struct RouterService(pub Arc<Router>);

impl HttpService for RouterService {
    fn call(&mut self, req: may_minihttp::Request, res: &mut may_minihttp::Response) -> io::Result<()> {
        let request = parse_request(req);
        let mut recorded = RecordedResponse::new();
        self.0.serve(&request, &mut recorded);
        recorded.flush(res);
        Ok(())
    }
}

/// Handle to a running server: readiness probing, cancellation, joining.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

/// Pause between readiness probes in [`ServerHandle::wait_ready_for`].
const READY_PROBE_INTERVAL: Duration = Duration::from_millis(5);

impl ServerHandle {
    /// Block until the listening socket accepts connections, for at most
    /// a quarter of a second. See [`wait_ready_for`] for a custom budget.
    ///
    /// [`wait_ready_for`]: ServerHandle::wait_ready_for
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_for(Duration::from_millis(250))
    }

    /// Probe the listening socket until it accepts a connection or
    /// `timeout` elapses. The timeout error carries the address and the
    /// last connect failure, which is what you want in CI logs.
    pub fn wait_ready_for(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let err = match TcpStream::connect(self.addr) {
                Ok(_) => return Ok(()),
                Err(err) => err,
            };
            if Instant::now() >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!(
                        "server at {} not ready after {:?}: {}",
                        self.addr, timeout, err
                    ),
                ));
            }
            thread::sleep(READY_PROBE_INTERVAL);
        }
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Cancel the accept coroutine and wait for it to exit. In-flight
    /// dispatches finish on their own coroutines; only the accept loop
    /// is torn down.
    pub fn stop(self) {
        unsafe {
            self.handle.coroutine().cancel();
        }
        let addr = self.addr;
        let _ = self.handle.join();
        info!(%addr, "server stopped");
    }

    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

/// Starts a [`RouterService`] on the `may` coroutine runtime.
pub struct RouterServer(pub Arc<Router>);

impl RouterServer {
    /// Bind `addr` and serve. Applies the coroutine stack size from
    /// [`RuntimeConfig`] before spawning the accept loop.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let config = RuntimeConfig::from_env();
        may::config().set_stack_size(config.stack_size);

        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;

        let handle = HttpServer(RouterService(self.0)).start(addr)?;
        info!(%addr, stack_size = config.stack_size, "server started");
        Ok(ServerHandle { addr, handle })
    }
}
