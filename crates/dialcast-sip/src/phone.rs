use std::net::IpAddr;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::SipError;

/// Bytes in one 20 ms PCMU frame at 8 kHz.
pub const PCMU_FRAME_BYTES: usize = 160;

/// Everything needed to register with one provider.
#[derive(Debug, Clone)]
pub struct PhoneParams {
    /// Gateway host, optionally with `:port`.
    pub gateway: String,
    /// Port used when `gateway` carries none.
    pub port: u16,
    pub username: String,
    pub password: String,
    pub local_ip: IpAddr,
}

/// An answered outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallHandle {
    /// Client-side call id.
    pub call_id: Uuid,
    pub number: String,
}

/// A SIP endpoint able to place calls and play audio into them.
#[async_trait]
pub trait Softphone: Send {
    /// Bind sockets and register with the provider.
    async fn start(&mut self) -> Result<(), SipError>;

    /// Dial `number`. `Ok(None)` means the call was not established
    /// (rejected, unanswered or timed out).
    async fn call(&mut self, number: &str) -> Result<Option<CallHandle>, SipError>;

    /// Stream PCMU frames to the callee at real-time pace.
    async fn play(
        &mut self,
        call: &CallHandle,
        frames: &[[u8; PCMU_FRAME_BYTES]],
    ) -> Result<(), SipError>;

    async fn hangup(&mut self, call: CallHandle) -> Result<(), SipError>;

    /// Unregister and release sockets. Safe to call more than once.
    async fn stop(&mut self) -> Result<(), SipError>;
}

/// Creates softphones; lets the campaign runner be tested without a network.
pub trait PhoneFactory: Send + Sync {
    fn build(&self, params: PhoneParams) -> Box<dyn Softphone>;
}
