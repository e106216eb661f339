//! Per-connection frame dispatch and lifecycle.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{Span, debug, warn};

use crate::callback::Callback;
use crate::config::Config;
use crate::endpoint::bindings::HandlerBindings;
use crate::endpoint::sinks::SinkManager;
use crate::endpoint::state::LifecycleState;
use crate::error::{Error, HandlerPhase, Result};
use crate::protocol::{CloseStatus, Frame, HandshakeMetadata, OpCode};
use crate::session::{Channel, Session, SessionFuture};
use crate::sink;

/// Dispatches the frames of one connection to an endpoint's handlers.
///
/// The transport drives a handler through four entry points:
/// [`on_open`](Self::on_open) once the handshake completed,
/// [`on_frame`](Self::on_frame) for every parsed frame,
/// [`on_error`](Self::on_error) and [`on_closed`](Self::on_closed).
/// All of them take `&mut self`, so at most one is in flight at a time.
/// A transport that spreads one connection over several worker threads
/// must funnel its calls through a single owner (a task or a mutex).
///
/// Every frame passed to `on_frame` has its [`Callback`] completed exactly
/// once, including frames whose payload nobody consumes.
///
/// ```rust,ignore
/// let bindings = HandlerBindings::builder()
///     .on_text(|session, text| Ok(session.send_text(&text)?))
///     .build();
///
/// let mut handler = FrameHandler::new(Arc::new(Echo), bindings, handshake, "conn-1");
/// handler.on_open(channel)?;
/// handler.on_frame(frame, callback)?;
/// ```
pub struct FrameHandler<E> {
    endpoint: Arc<E>,
    endpoint_name: &'static str,
    bindings: HandlerBindings,
    handshake: Arc<HandshakeMetadata>,
    config: Config,
    id: String,
    ready: SessionFuture,
    session: Option<Arc<Session>>,
    /// Set once the open handler succeeded; frames are refused until then.
    opened: bool,
    sinks: SinkManager,
    state: LifecycleState,
    span: Span,
}

impl<E: Send + Sync + 'static> FrameHandler<E> {
    /// Create a handler for connection `id`, with default configuration.
    pub fn new(
        endpoint: Arc<E>,
        bindings: HandlerBindings,
        handshake: HandshakeMetadata,
        id: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let endpoint_name = std::any::type_name::<E>();
        let span = tracing::info_span!("endpoint", endpoint = endpoint_name, connection = %id);

        Self {
            endpoint,
            endpoint_name,
            bindings,
            handshake: Arc::new(handshake),
            config: Config::default(),
            id,
            ready: SessionFuture::new(),
            session: None,
            opened: false,
            sinks: SinkManager::default(),
            state: LifecycleState::Uninitialized,
            span,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Complete `ready` instead of a handler-owned signal. Lets a caller
    /// hand out the signal before the handler is built.
    #[must_use]
    pub fn with_session_future(mut self, ready: SessionFuture) -> Self {
        self.ready = ready;
        self
    }

    /// Open the endpoint on `channel`.
    ///
    /// Creates the [`Session`], binds the message sinks to it and runs the
    /// open handler. If the open handler fails its error is returned, the
    /// ready signal is left pending and frames keep being refused.
    ///
    /// # Errors
    ///
    /// - `Error::DoubleCompletion` once a session was created
    /// - `Error::ConnectionClosed` after [`on_closed`](Self::on_closed)
    /// - `Error::HandlerInvocation` if the open handler fails
    pub fn on_open(&mut self, channel: Arc<dyn Channel>) -> Result<()> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.state == LifecycleState::Closed {
            return Err(Error::ConnectionClosed(None));
        }
        if self.session.is_some() {
            return Err(Error::DoubleCompletion {
                endpoint: self.endpoint_name.to_string(),
            });
        }

        let session = Arc::new(Session::new(
            self.id.clone(),
            self.endpoint_name,
            channel,
            Arc::clone(&self.handshake),
            self.config.clone(),
        ));
        self.session = Some(Arc::clone(&session));

        let text = self.bindings.text.as_ref().map(|b| sink::text_sink(b, &session));
        let binary = self.bindings.binary.as_ref().map(|b| sink::binary_sink(b, &session));
        self.sinks = SinkManager::new(text, binary);

        if let Some(open) = &self.bindings.open {
            open(&session)
                .map_err(|cause| Error::handler(self.endpoint_name, HandlerPhase::Open, cause))?;
        }

        self.opened = true;
        self.state = LifecycleState::Open;
        if !self.ready.complete(session) {
            debug!("ready signal already settled");
        }
        debug!(
            text = self.sinks.has_text_sink(),
            binary = self.sinks.has_binary_sink(),
            "endpoint open"
        );
        Ok(())
    }

    /// Dispatch one frame.
    ///
    /// Frames arriving before the endpoint opened, including after a failed
    /// open handler, fail their callback with `Error::NotOpen`.
    ///
    /// An `Err` from a close or pong handler, a malformed close payload, or
    /// a failed automatic pong reply is reported after `callback` has
    /// already succeeded.
    pub fn on_frame(&mut self, frame: Frame, callback: Callback) -> Result<()> {
        let span = self.span.clone();
        let _enter = span.enter();

        let Some(session) = self.session.clone().filter(|_| self.opened) else {
            debug!(opcode = %frame.opcode, "frame before open");
            callback.failed(Error::NotOpen);
            return Err(Error::NotOpen);
        };

        match frame.opcode {
            OpCode::Close => self.on_close_frame(&session, &frame, callback),
            OpCode::Ping => self.on_ping(&session, &frame, callback),
            OpCode::Pong => self.on_pong(&session, frame, callback),
            OpCode::Text | OpCode::Binary | OpCode::Continuation => {
                self.sinks.accept_message(frame, callback);
                Ok(())
            }
        }
    }

    fn on_close_frame(&self, session: &Session, frame: &Frame, callback: Callback) -> Result<()> {
        // The close frame is consumed whatever its payload or the handler say.
        callback.succeeded();

        let Some(close) = &self.bindings.close else {
            debug!(len = frame.payload_len(), "close frame, no close handler");
            return Ok(());
        };

        let status = CloseStatus::from_payload(frame.payload_bytes().map(|b| &b[..]))
            .inspect_err(|err| debug!(error = %err, "malformed close frame"))?;
        debug!(code = %status.code, reason = %status.reason, "close frame");

        close(session, status.code, &status.reason)
            .map_err(|cause| Error::handler(self.endpoint_name, HandlerPhase::Close, cause))
    }

    fn on_ping(&self, session: &Session, frame: &Frame, callback: Callback) -> Result<()> {
        let outcome = if self.config.auto_pong {
            // The reply gets its own buffer; the frame's belongs to the transport.
            session.send_pong(Bytes::copy_from_slice(frame.payload()))
        } else {
            Ok(())
        };
        callback.succeeded();
        outcome
    }

    fn on_pong(&self, session: &Session, frame: Frame, callback: Callback) -> Result<()> {
        let outcome = match &self.bindings.pong {
            Some(pong) => pong(session, frame.into_payload())
                .map_err(|cause| Error::handler(self.endpoint_name, HandlerPhase::Pong, cause)),
            None => Ok(()),
        };
        callback.succeeded();
        outcome
    }

    /// Report an error on the connection.
    ///
    /// Fails the ready signal if it is still pending, then runs the error
    /// handler. If the handler itself fails, its error is returned with
    /// `cause` attached as the suppressed error.
    pub fn on_error(&mut self, cause: Error) -> Result<()> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.ready.fail(cause.clone()) {
            debug!(error = %cause, "ready signal failed");
        }
        if self.state != LifecycleState::Closed {
            self.state = LifecycleState::Errored;
        }

        let Some(on_error) = &self.bindings.error else {
            warn!(error = %cause, "unhandled error, endpoint has no error handler");
            return Ok(());
        };

        on_error(self.session.as_deref(), &cause).map_err(|failure| {
            Error::handler(self.endpoint_name, HandlerPhase::Error, failure).with_suppressed(cause)
        })
    }

    /// The transport closed the connection.
    ///
    /// Drops the sinks (and any message still being assembled) and fails
    /// the ready signal if the endpoint never opened. The session stays
    /// readable through [`session`](Self::session).
    pub fn on_closed(&mut self, status: &CloseStatus) {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.sinks.is_assembling() {
            debug!("dropping partially received message");
        }
        self.sinks.release();
        self.state = LifecycleState::Closed;

        if self.ready.fail(Error::ConnectionClosed(Some(status.code.as_u16()))) {
            debug!("closed before open");
        }
        debug!(code = %status.code, reason = %status.reason, "endpoint closed");
    }

    #[must_use]
    pub fn session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn endpoint(&self) -> &Arc<E> {
        &self.endpoint
    }

    /// Type name of the endpoint, as used in logs and errors.
    #[must_use]
    pub fn endpoint_name(&self) -> &'static str {
        self.endpoint_name
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[must_use]
    pub fn has_text_sink(&self) -> bool {
        self.sinks.has_text_sink()
    }

    #[must_use]
    pub fn has_binary_sink(&self) -> bool {
        self.sinks.has_binary_sink()
    }

    /// Whether a fragmented message is in progress.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.sinks.is_assembling()
    }

    /// Signal settled once the endpoint opened or failed to.
    #[must_use]
    pub fn session_future(&self) -> &SessionFuture {
        &self.ready
    }
}

impl<E> fmt::Display for FrameHandler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameHandler@{}[{}]", self.id, self.endpoint_name)
    }
}

impl<E> fmt::Debug for FrameHandler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHandler")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint_name)
            .field("state", &self.state)
            .field("bindings", &self.bindings)
            .field("sinks", &self.sinks)
            .field("ready", &self.ready)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CloseCode, HandshakeRequest, HandshakeResponse};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Chat;

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<Frame>>,
    }

    impl Channel for RecordingChannel {
        fn send_frame(&self, frame: Frame) -> Result<()> {
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }
    }

    struct BrokenChannel;

    impl Channel for BrokenChannel {
        fn send_frame(&self, _frame: Frame) -> Result<()> {
            Err(Error::ConnectionClosed(None))
        }
    }

    type Outcomes = Arc<Mutex<Vec<Result<()>>>>;

    fn recording() -> (Callback, Outcomes) {
        let outcomes = Outcomes::default();
        let cb_outcomes = outcomes.clone();
        (
            Callback::new(move |r| cb_outcomes.lock().unwrap().push(r)),
            outcomes,
        )
    }

    fn handler(bindings: HandlerBindings) -> FrameHandler<Chat> {
        let handshake = HandshakeMetadata::new(
            HandshakeRequest::new("/chat", "example.com").with_protocol("chat.v1"),
            HandshakeResponse::new().with_protocol("chat.v1"),
        );
        FrameHandler::new(Arc::new(Chat), bindings, handshake, "conn-7")
    }

    fn opened(bindings: HandlerBindings) -> (FrameHandler<Chat>, Arc<RecordingChannel>) {
        let channel = Arc::new(RecordingChannel::default());
        let mut handler = handler(bindings);
        handler.on_open(channel.clone()).unwrap();
        (handler, channel)
    }

    #[test]
    fn test_open_creates_session_and_completes_ready() {
        let (handler, _) = opened(HandlerBindings::builder().on_text(|_, _| Ok(())).build());

        assert_eq!(handler.state(), LifecycleState::Open);
        assert!(handler.has_text_sink());
        assert!(!handler.has_binary_sink());

        let session = handler.session().unwrap();
        assert_eq!(session.id(), "conn-7");
        assert_eq!(session.negotiated_subprotocol(), Some("chat.v1"));

        let ready = handler.session_future().result().unwrap().unwrap();
        assert!(Arc::ptr_eq(&ready, session));
    }

    #[test]
    fn test_open_twice_is_rejected() {
        let opens = Arc::new(AtomicUsize::new(0));
        let counter = opens.clone();
        let (mut handler, channel) = opened(
            HandlerBindings::builder()
                .on_open(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build(),
        );
        let first = handler.session().cloned().unwrap();

        let err = handler.on_open(channel).unwrap_err();
        assert!(matches!(err, Error::DoubleCompletion { .. }));
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(handler.session().unwrap(), &first));
    }

    #[test]
    fn test_open_handler_failure_leaves_ready_pending() {
        let mut handler = handler(
            HandlerBindings::builder()
                .on_open(|_| Err("no seats left".into()))
                .build(),
        );

        let err = handler.on_open(Arc::new(RecordingChannel::default())).unwrap_err();
        match err {
            Error::HandlerInvocation { phase, ref endpoint, .. } => {
                assert_eq!(phase, HandlerPhase::Open);
                assert!(endpoint.ends_with("Chat"));
            }
            other => panic!("expected handler error, got {other:?}"),
        }
        assert!(!handler.session_future().is_done());
        assert_eq!(handler.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_frame_before_open_fails_callback() {
        let mut handler = handler(HandlerBindings::default());
        let (cb, outcomes) = recording();

        let err = handler.on_frame(Frame::ping("x"), cb).unwrap_err();

        assert!(matches!(err, Error::NotOpen));
        assert!(matches!(outcomes.lock().unwrap()[0], Err(Error::NotOpen)));
    }

    #[test]
    fn test_ping_is_answered_with_copy_of_payload() {
        let (mut handler, channel) = opened(HandlerBindings::default());
        let (cb, outcomes) = recording();

        handler.on_frame(Frame::ping("are you there"), cb).unwrap();

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].opcode, OpCode::Pong);
        assert_eq!(sent[0].payload(), b"are you there");
        assert!(outcomes.lock().unwrap()[0].is_ok());
    }

    #[test]
    fn test_auto_pong_disabled() {
        let channel = Arc::new(RecordingChannel::default());
        let mut handler =
            handler(HandlerBindings::default()).with_config(Config::new().with_auto_pong(false));
        handler.on_open(channel.clone()).unwrap();
        let (cb, outcomes) = recording();

        handler.on_frame(Frame::ping("x"), cb).unwrap();

        assert!(channel.sent.lock().unwrap().is_empty());
        assert!(outcomes.lock().unwrap()[0].is_ok());
    }

    #[test]
    fn test_pong_write_failure_is_returned_after_ack() {
        let mut handler = handler(HandlerBindings::default());
        handler.on_open(Arc::new(BrokenChannel)).unwrap();
        let (cb, outcomes) = recording();

        let err = handler.on_frame(Frame::ping("x"), cb).unwrap_err();

        assert!(matches!(err, Error::ConnectionClosed(None)));
        assert!(outcomes.lock().unwrap()[0].is_ok());
    }

    #[test]
    fn test_close_handler_receives_code_and_reason() {
        let seen = Arc::new(Mutex::new(None));
        let handler_seen = seen.clone();
        let (mut handler, _) = opened(
            HandlerBindings::builder()
                .on_close(move |_, code, reason| {
                    *handler_seen.lock().unwrap() = Some((code, reason.to_string()));
                    Ok(())
                })
                .build(),
        );
        let (cb, outcomes) = recording();

        handler.on_frame(Frame::close(Some(1001), "bye"), cb).unwrap();

        assert_eq!(
            seen.lock().unwrap().clone(),
            Some((CloseCode::GoingAway, "bye".to_string()))
        );
        assert!(outcomes.lock().unwrap()[0].is_ok());
    }

    #[test]
    fn test_close_handler_failure_still_acknowledges() {
        let (mut handler, _) = opened(
            HandlerBindings::builder()
                .on_close(|_, _, _| Err("cleanup failed".into()))
                .build(),
        );
        let (cb, outcomes) = recording();

        let err = handler.on_frame(Frame::close(Some(1000), ""), cb).unwrap_err();

        assert!(matches!(
            err,
            Error::HandlerInvocation {
                phase: HandlerPhase::Close,
                ..
            }
        ));
        assert!(outcomes.lock().unwrap()[0].is_ok());
    }

    #[test]
    fn test_malformed_close_is_acknowledged_then_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let (mut handler, _) = opened(
            HandlerBindings::builder()
                .on_close(move |_, _, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build(),
        );
        let (cb, outcomes) = recording();

        let err = handler
            .on_frame(Frame::new(true, OpCode::Close, vec![0x03]), cb)
            .unwrap_err();

        assert!(matches!(err, Error::ProtocolViolation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_ok());
    }

    #[test]
    fn test_malformed_close_without_handler_is_ignored() {
        let (mut handler, _) = opened(HandlerBindings::default());
        let (cb, outcomes) = recording();

        handler
            .on_frame(Frame::new(true, OpCode::Close, vec![0x03]), cb)
            .unwrap();

        assert!(outcomes.lock().unwrap()[0].is_ok());
    }

    #[test]
    fn test_pong_handler_receives_payload() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler_seen = seen.clone();
        let (mut handler, _) = opened(
            HandlerBindings::builder()
                .on_pong(move |_, data| {
                    handler_seen.lock().unwrap().push(data);
                    Ok(())
                })
                .build(),
        );

        handler.on_frame(Frame::pong("t=1"), Callback::noop()).unwrap();
        handler
            .on_frame(Frame::without_payload(true, OpCode::Pong), Callback::noop())
            .unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[Bytes::from_static(b"t=1"), Bytes::new()]
        );
    }

    #[test]
    fn test_error_before_open_fails_ready() {
        let mut handler = handler(HandlerBindings::default());

        handler.on_error(Error::Io("reset by peer".into())).unwrap();

        assert!(handler.session_future().is_failed());
        assert_eq!(handler.state(), LifecycleState::Errored);
    }

    #[test]
    fn test_error_handler_failure_keeps_cause() {
        let (mut handler, _) = opened(
            HandlerBindings::builder()
                .on_error(|_, _| Err("logger unavailable".into()))
                .build(),
        );

        let err = handler.on_error(Error::Io("reset by peer".into())).unwrap_err();

        assert!(matches!(
            err,
            Error::HandlerInvocation {
                phase: HandlerPhase::Error,
                ..
            }
        ));
        assert!(matches!(err.suppressed(), Some(Error::Io(msg)) if msg == "reset by peer"));
    }

    #[test]
    fn test_closed_releases_sinks_and_fails_pending_ready() {
        let mut handler = handler(HandlerBindings::builder().on_binary(|_, _| Ok(())).build());

        handler.on_closed(&CloseStatus::new(CloseCode::GoingAway, ""));
        assert_eq!(handler.state(), LifecycleState::Closed);
        assert!(matches!(
            handler.session_future().result(),
            Some(Err(Error::ConnectionClosed(Some(1001))))
        ));
    }

    #[test]
    fn test_closed_after_open_keeps_session() {
        let (mut handler, _) = opened(HandlerBindings::builder().on_binary(|_, _| Ok(())).build());
        handler
            .on_frame(Frame::new(false, OpCode::Binary, vec![1]), Callback::noop())
            .unwrap();
        assert!(handler.is_assembling());

        handler.on_closed(&CloseStatus::no_status());

        assert!(!handler.is_assembling());
        assert!(!handler.has_binary_sink());
        assert!(handler.session().is_some());
        assert!(matches!(handler.session_future().result(), Some(Ok(_))));
    }

    #[test]
    fn test_frames_refused_after_failed_open() {
        let mut handler = handler(
            HandlerBindings::builder()
                .on_open(|_| Err("no seats left".into()))
                .on_text(|_, _| panic!("text handler must not run"))
                .build(),
        );
        assert!(handler.on_open(Arc::new(RecordingChannel::default())).is_err());
        assert!(handler.session().is_some());
        let (cb, outcomes) = recording();

        let err = handler.on_frame(Frame::text("hello"), cb).unwrap_err();

        assert!(matches!(err, Error::NotOpen));
        assert!(matches!(outcomes.lock().unwrap()[0], Err(Error::NotOpen)));
    }

    #[test]
    fn test_open_after_closed_is_rejected() {
        let mut handler = handler(HandlerBindings::builder().on_text(|_, _| Ok(())).build());
        handler.on_closed(&CloseStatus::new(CloseCode::GoingAway, ""));

        let err = handler
            .on_open(Arc::new(RecordingChannel::default()))
            .unwrap_err();

        assert!(matches!(err, Error::ConnectionClosed(None)));
        assert_eq!(handler.state(), LifecycleState::Closed);
        assert!(handler.session().is_none());
        assert!(!handler.has_text_sink());
        assert!(handler.session_future().is_failed());
    }

    #[test]
    fn test_display() {
        let handler = handler(HandlerBindings::default());
        let shown = handler.to_string();
        assert!(shown.starts_with("FrameHandler@conn-7["));
        assert!(shown.ends_with("Chat]"));
    }
}
