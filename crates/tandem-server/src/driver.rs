//! Server driver.
//!
//! Sans-IO front of the [`World`]: the runtime feeds it [`ServerEvent`]s and
//! executes the [`ServerAction`]s it returns. Nothing in here touches a
//! socket or a clock, so tests drive it directly.

use bytes::Bytes;
use rand::{SeedableRng, rngs::StdRng};
use tandem_core::Viewport;

use crate::{
    hub::{PumpReport, SessionId},
    session_error::SessionError,
    world::World,
};

/// Written to a client refused for capacity before its connection closes.
const SERVER_FULL_NOTICE: &[u8] = b"tandem: server full, try again later\r\n";

/// Driver configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Viewport for sessions that did not report a size
    pub default_viewport: Viewport,
    /// Maximum concurrent sessions
    pub max_sessions: usize,
    /// Text every session starts from
    pub initial_text: String,
    /// Seed for marker colours. `None` seeds from entropy.
    pub color_seed: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            default_viewport: Viewport::default(),
            max_sessions: 64,
            initial_text: String::new(),
            color_seed: None,
        }
    }
}

/// Events that the server driver processes.
///
/// These are produced by the runtime (TCP server or a test).
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// A client connected
    SessionOpened {
        /// Unique session ID assigned by the runtime
        session_id: SessionId,
        /// Display name shown next to the session's marker
        identity: String,
        /// Terminal size, if already known
        viewport: Option<Viewport>,
    },

    /// Raw input bytes arrived
    DataReceived {
        /// Sending session
        session_id: SessionId,
        /// One input chunk (one keystroke or one paste)
        data: Bytes,
    },

    /// The client's terminal changed size
    Resized {
        /// Resized session
        session_id: SessionId,
        /// New size
        viewport: Viewport,
    },

    /// The transport closed (by peer or error)
    SessionClosed {
        /// Closed session
        session_id: SessionId,
        /// Reason for closure
        reason: String,
    },

    /// The server is going down
    Shutdown,
}

/// Actions that the server driver produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAction {
    /// Write terminal bytes to a session
    SendToSession {
        /// Target session ID
        session_id: SessionId,
        /// Bytes to write, in order
        bytes: Bytes,
    },

    /// Close a session's transport once pending bytes are written
    CloseSession {
        /// Session to close
        session_id: SessionId,
        /// Reason for closure
        reason: String,
    },

    /// Log a message
    Log {
        /// Log level
        level: LogLevel,
        /// Message to log
        message: String,
    },
}

/// Log levels for server actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational message
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

/// Action-based server driver.
#[derive(Debug)]
pub struct ServerDriver {
    world: World,
    config: DriverConfig,
}

impl ServerDriver {
    /// Create a new server driver.
    pub fn new(config: DriverConfig) -> Self {
        let rng = match config.color_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = World::new(config.initial_text.clone(), config.max_sessions, rng);
        Self { world, config }
    }

    /// The shared world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the shared world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Driver configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Process a server event and return actions to execute.
    ///
    /// Errors are scoped to the event's session. Whatever output the event
    /// produced for other sessions is still returned by the next call.
    pub fn process_event(&mut self, event: ServerEvent) -> Result<Vec<ServerAction>, SessionError> {
        let mut actions = match event {
            ServerEvent::SessionOpened { session_id, identity, viewport } => {
                self.handle_session_opened(session_id, &identity, viewport)?
            },
            ServerEvent::DataReceived { session_id, data } => {
                let report = self.world.key_input(session_id, &data)?;
                report_failures(report)
            },
            ServerEvent::Resized { session_id, viewport } => {
                self.world.resize(session_id, viewport)?;
                Vec::new()
            },
            ServerEvent::SessionClosed { session_id, reason } => {
                let report = self.world.close(session_id)?;
                let mut actions = vec![ServerAction::Log {
                    level: LogLevel::Debug,
                    message: format!("session {session_id} closed: {reason}"),
                }];
                actions.extend(report_failures(report));
                actions
            },
            ServerEvent::Shutdown => {
                let report = self.world.disconnect_all();
                let mut actions = vec![ServerAction::Log {
                    level: LogLevel::Info,
                    message: format!("disconnecting {} sessions", self.world.session_count()),
                }];
                actions.extend(report_failures(report));
                actions
            },
        };

        self.collect_output(&mut actions);
        Ok(actions)
    }

    fn handle_session_opened(
        &mut self,
        session_id: SessionId,
        identity: &str,
        viewport: Option<Viewport>,
    ) -> Result<Vec<ServerAction>, SessionError> {
        let viewport = viewport.unwrap_or(self.config.default_viewport);
        match self.world.connect(session_id, identity, viewport) {
            Ok(report) => {
                let mut actions = vec![ServerAction::Log {
                    level: LogLevel::Debug,
                    message: format!("session {session_id} opened as {identity}"),
                }];
                actions.extend(report_failures(report));
                Ok(actions)
            },
            Err(SessionError::CapacityReached { max }) => Ok(vec![
                ServerAction::SendToSession { session_id, bytes: Bytes::from_static(SERVER_FULL_NOTICE) },
                ServerAction::CloseSession { session_id, reason: "max sessions exceeded".to_string() },
                ServerAction::Log {
                    level: LogLevel::Warn,
                    message: format!("refused session {session_id}: {max} sessions already open"),
                },
            ]),
            Err(err) => Err(err),
        }
    }

    fn collect_output(&mut self, actions: &mut Vec<ServerAction>) {
        for (session_id, bytes) in self.world.drain_output() {
            actions.push(ServerAction::SendToSession { session_id, bytes });
        }
        for session_id in self.world.drain_close_requests() {
            actions.push(ServerAction::CloseSession { session_id, reason: "disconnected by server".to_string() });
        }
    }
}

fn report_failures(report: PumpReport) -> Vec<ServerAction> {
    if report.failed == 0 {
        return Vec::new();
    }
    vec![ServerAction::Log {
        level: LogLevel::Debug,
        message: format!("{} of {} deliveries failed", report.failed, report.delivered + report.failed),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> ServerDriver {
        ServerDriver::new(DriverConfig {
            initial_text: "hello\nworld".to_string(),
            color_seed: Some(7),
            max_sessions: 2,
            ..DriverConfig::default()
        })
    }

    fn open(driver: &mut ServerDriver, session_id: SessionId) -> Vec<ServerAction> {
        driver
            .process_event(ServerEvent::SessionOpened {
                session_id,
                identity: format!("guest-{session_id}"),
                viewport: Some(Viewport::new(40, 10)),
            })
            .unwrap()
    }

    fn sent_to(actions: &[ServerAction], target: SessionId) -> Vec<u8> {
        actions
            .iter()
            .filter_map(|action| match action {
                ServerAction::SendToSession { session_id, bytes } if *session_id == target => Some(bytes.to_vec()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn opening_a_session_draws_the_document() {
        let mut d = driver();
        let actions = open(&mut d, 1);

        let out = sent_to(&actions, 1);
        assert!(out.starts_with(b"\x1b[?1049h"));
        assert!(contains(&out, b"hello"));
        assert!(contains(&out, b"NORMAL"));
    }

    #[test]
    fn missing_viewport_uses_default() {
        let mut d = driver();
        d.process_event(ServerEvent::SessionOpened { session_id: 1, identity: "a".to_string(), viewport: None })
            .unwrap();
        assert_eq!(d.world().session(1).unwrap().editor().viewport(), Viewport::default());
    }

    #[test]
    fn capacity_refusal_closes_with_reason() {
        let mut d = driver();
        open(&mut d, 1);
        open(&mut d, 2);
        let actions = open(&mut d, 3);

        assert!(actions.iter().any(|a| matches!(
            a,
            ServerAction::CloseSession { session_id: 3, reason } if reason == "max sessions exceeded"
        )));
        assert!(d.world().session(3).is_none());
    }

    #[test]
    fn typing_updates_the_other_session() {
        let mut d = driver();
        open(&mut d, 1);
        open(&mut d, 2);

        d.process_event(ServerEvent::DataReceived { session_id: 1, data: Bytes::from_static(b"i") }).unwrap();
        let actions =
            d.process_event(ServerEvent::DataReceived { session_id: 1, data: Bytes::from_static(b"Z") }).unwrap();

        assert_eq!(d.world().text(), "Zhello\nworld");
        assert!(contains(&sent_to(&actions, 2), b"Zhello"));
    }

    #[test]
    fn unknown_session_is_an_error() {
        let mut d = driver();
        let err = d.process_event(ServerEvent::DataReceived { session_id: 9, data: Bytes::from_static(b"x") });
        assert_eq!(err, Err(SessionError::NotFound(9)));
    }

    #[test]
    fn shutdown_restores_terminals_and_closes() {
        let mut d = driver();
        open(&mut d, 1);
        open(&mut d, 2);

        let actions = d.process_event(ServerEvent::Shutdown).unwrap();
        for id in [1, 2] {
            assert!(sent_to(&actions, id).ends_with(b"\x1b[?1049l"));
            let closed = actions
                .iter()
                .any(|a| matches!(a, ServerAction::CloseSession { session_id, .. } if *session_id == id));
            assert!(closed);
        }
    }

    #[test]
    fn resize_redraws_at_new_size() {
        let mut d = driver();
        open(&mut d, 1);
        let actions =
            d.process_event(ServerEvent::Resized { session_id: 1, viewport: Viewport::new(20, 4) }).unwrap();

        assert_eq!(d.world().session(1).unwrap().editor().viewport(), Viewport::new(20, 4));
        assert!(!sent_to(&actions, 1).is_empty());
    }
}
