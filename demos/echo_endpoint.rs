//! Echo endpoint driven by a simulated transport.
//!
//! A reader task plays the framing engine: it feeds parsed frames to a
//! `FrameHandler` and forwards everything the endpoint sends back.
//!
//! Run with: RUST_LOG=debug cargo run --example echo_endpoint

use std::error::Error;
use std::sync::Arc;

use rsws_endpoint::{
    Callback, CloseCode, CloseStatus, Config, Frame, FrameHandler, HandlerBindings,
    HandshakeMetadata, HandshakeRequest, HandshakeResponse, MpscChannel, OpCode,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Echo;

fn bindings() -> HandlerBindings {
    HandlerBindings::builder()
        .on_open(|session| {
            info!(path = %session.handshake_request().path, "client connected");
            Ok(())
        })
        .on_text(|session, text| {
            session.send_text(&text)?;
            Ok(())
        })
        .on_binary(|session, data| {
            session.send_binary(data)?;
            Ok(())
        })
        .on_close(|session, code, reason| {
            info!(%code, reason, "client closing");
            session.close(CloseCode::Normal, "")?;
            Ok(())
        })
        .on_error(|_, cause| {
            info!(error = %cause, "connection error");
            Ok(())
        })
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let handshake = HandshakeMetadata::new(
        HandshakeRequest::new("/echo", "127.0.0.1:9001"),
        HandshakeResponse::new(),
    );
    let mut handler = FrameHandler::new(Arc::new(Echo), bindings(), handshake, "conn-1")
        .with_config(Config::new().with_max_message_size(1 << 20));
    let ready = handler.session_future().clone();

    let (inbound_tx, mut inbound) = mpsc::unbounded_channel::<Frame>();
    let (channel, mut outbound) = MpscChannel::new();

    let reader = tokio::spawn(async move {
        handler.on_open(Arc::new(channel))?;

        while let Some(frame) = inbound.recv().await {
            let is_close = frame.opcode == OpCode::Close;
            let opcode = frame.opcode;
            let ack = Callback::new(move |outcome| {
                if let Err(err) = outcome {
                    tracing::warn!(%opcode, error = %err, "frame rejected");
                }
            });
            if let Err(err) = handler.on_frame(frame, ack) {
                handler.on_error(err)?;
            }
            if is_close {
                break;
            }
        }

        handler.on_closed(&CloseStatus::new(CloseCode::Normal, ""));
        Ok::<_, rsws_endpoint::Error>(())
    });

    let session = ready.wait().await?;
    info!(id = session.id(), "session ready");

    inbound_tx.send(Frame::new(false, OpCode::Text, "Hello, "))?;
    inbound_tx.send(Frame::ping("keepalive"))?;
    inbound_tx.send(Frame::continuation(true, "WebSocket!"))?;
    inbound_tx.send(Frame::binary(vec![1, 2, 3]))?;
    inbound_tx.send(Frame::close(Some(1000), "bye"))?;

    reader.await??;
    drop(session);

    while let Ok(frame) = outbound.try_recv() {
        match frame.opcode {
            OpCode::Text => info!(text = %String::from_utf8_lossy(frame.payload()), "echoed"),
            opcode => info!(%opcode, len = frame.payload_len(), "sent"),
        }
    }

    Ok(())
}
