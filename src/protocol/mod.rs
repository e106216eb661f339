//! Wire-level vocabulary shared by the dispatch layer (RFC 6455).

pub mod close;
pub mod frame;
pub mod handshake;
pub mod opcode;
pub mod utf8;

pub use close::{CloseCode, CloseStatus};
pub use frame::{Frame, MAX_CONTROL_FRAME_PAYLOAD};
pub use handshake::{HandshakeMetadata, HandshakeRequest, HandshakeResponse};
pub use opcode::OpCode;
pub use utf8::Utf8Decoder;
