//! [`Softphone`] over `rvoip-client-core`.
//!
//! The client stack owns transactions, dialogs, digest authentication, SDP and RTP.
//! This module maps provider settings onto it and turns call states into the
//! answered / not answered decision the campaign runner needs.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dialcast_core::CallConfig;
use rvoip_client_core::{CallState, ClientBuilder, ClientManager, RegistrationConfig};
use tokio::time::{sleep, timeout, Instant};
use uuid::Uuid;

use crate::error::SipError;
use crate::phone::{CallHandle, PhoneFactory, PhoneParams, Softphone, PCMU_FRAME_BYTES};

const REGISTER_EXPIRES: u32 = 3600;
const CODEC: &str = "PCMU";
const FRAME_DURATION: Duration = Duration::from_millis(20);
const STATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Session {
    client: Arc<ClientManager>,
    registration_id: Uuid,
    /// Resolved gateway, used as the host of every request URI.
    gateway: SocketAddr,
}

pub struct SipSoftphone {
    params: PhoneParams,
    config: CallConfig,
    /// Provider host as configured, used in our address of record.
    domain: String,
    gateway_port: u16,
    session: Option<Session>,
}

impl SipSoftphone {
    pub fn new(params: PhoneParams, config: CallConfig) -> Self {
        let (domain, gateway_port) = split_host_port(&params.gateway, params.port);
        Self {
            params,
            config,
            domain,
            gateway_port,
            session: None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Session, SipError> {
        self.session.as_ref().ok_or(SipError::NotStarted)
    }

    fn aor(&self) -> String {
        format!("sip:{}@{}", self.params.username, uri_host(&self.domain))
    }

    async fn register(&self, client: &Arc<ClientManager>, gateway: SocketAddr) -> Result<Uuid, SipError> {
        let local = client.get_client_stats().await.local_sip_addr;
        let registration = RegistrationConfig::new(
            format!("sip:{}", gateway),
            self.aor(),
            format!("sip:{}@{}", self.params.username, local),
        )
        .with_credentials(self.params.username.clone(), self.params.password.clone())
        .with_expires(REGISTER_EXPIRES);

        match timeout(self.config.transaction_timeout, client.register(registration)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SipError::Timeout("REGISTER response".to_string())),
        }
    }
}

#[async_trait]
impl Softphone for SipSoftphone {
    #[tracing::instrument(skip(self), fields(gateway = %self.params.gateway, username = %self.params.username))]
    async fn start(&mut self) -> Result<(), SipError> {
        if self.session.is_some() {
            return Ok(());
        }

        let gateway = resolve(&self.domain, self.gateway_port).await?;
        let client = ClientBuilder::new()
            .local_address(SocketAddr::new(self.params.local_ip, self.config.sip_local_port))
            .media_address(SocketAddr::new(self.params.local_ip, self.config.rtp_local_port))
            .user_agent(self.config.user_agent.clone())
            .domain(self.domain.clone())
            .codecs([CODEC])
            .build()
            .await?;
        client.start().await?;

        let registration_id = match self.register(&client, gateway).await {
            Ok(id) => id,
            Err(e) => {
                if let Err(stop_err) = client.stop().await {
                    tracing::debug!(error = %stop_err, "Client stop after failed registration");
                }
                return Err(e);
            }
        };

        tracing::debug!(%gateway, %registration_id, "Registered");
        self.session = Some(Session {
            client,
            registration_id,
            gateway,
        });
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn call(&mut self, number: &str) -> Result<Option<CallHandle>, SipError> {
        let session = self.session()?;
        let client = &session.client;
        let target = format!("sip:{}@{}", number, session.gateway);

        let call_id = client.make_call(self.aor(), target, None).await?;
        let deadline = Instant::now() + self.config.answer_timeout;

        loop {
            let state = client.get_call(&call_id).await?.state;
            match state {
                CallState::Connected => {
                    return Ok(Some(CallHandle {
                        call_id,
                        number: number.to_string(),
                    }))
                }
                CallState::Failed | CallState::Cancelled | CallState::Terminated => {
                    tracing::debug!(?state, "Call not answered");
                    return Ok(None);
                }
                _ if Instant::now() >= deadline => {
                    // Hanging up an unanswered call sends CANCEL
                    if let Err(e) = client.hangup_call(&call_id).await {
                        tracing::debug!(error = %e, "Cancel after answer timeout failed");
                    }
                    tracing::debug!(?state, "No answer before timeout");
                    return Ok(None);
                }
                _ => sleep(STATE_POLL_INTERVAL).await,
            }
        }
    }

    #[tracing::instrument(skip(self, call, frames), fields(call_id = %call.call_id, frames = frames.len()))]
    async fn play(
        &mut self,
        call: &CallHandle,
        frames: &[[u8; PCMU_FRAME_BYTES]],
    ) -> Result<(), SipError> {
        if frames.is_empty() {
            return Err(SipError::Media("no audio frames to play".to_string()));
        }
        let client = &self.session()?.client;

        let samples: Vec<u8> = frames.iter().flatten().copied().collect();
        client
            .start_audio_transmission_with_custom_audio(&call.call_id, samples, false)
            .await?;

        let length = playback_length(frames.len()).min(self.config.playback_timeout);
        let result = wait_for_playback(client, &call.call_id, Instant::now() + length).await;

        if let Err(e) = client.stop_audio_transmission(&call.call_id).await {
            tracing::debug!(error = %e, "Stopping audio transmission failed");
        }
        result
    }

    #[tracing::instrument(skip(self, call), fields(call_id = %call.call_id))]
    async fn hangup(&mut self, call: CallHandle) -> Result<(), SipError> {
        // Already-ended calls are a no-op on the client side
        self.session()?.client.hangup_call(&call.call_id).await?;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SipError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        if let Err(e) = session.client.unregister(session.registration_id).await {
            tracing::warn!(error = %e, "Unregister failed");
        }
        session.client.stop().await?;
        Ok(())
    }
}

/// Sleep until `deadline`, returning early when the callee hangs up.
async fn wait_for_playback(
    client: &ClientManager,
    call_id: &Uuid,
    deadline: Instant,
) -> Result<(), SipError> {
    loop {
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }

        let state = client.get_call(call_id).await?.state;
        if matches!(
            state,
            CallState::Terminating | CallState::Terminated | CallState::Failed | CallState::Cancelled
        ) {
            tracing::debug!(?state, "Callee hung up during playback");
            return Ok(());
        }

        sleep(STATE_POLL_INTERVAL.min(deadline - now)).await;
    }
}

fn playback_length(frames: usize) -> Duration {
    FRAME_DURATION * u32::try_from(frames).unwrap_or(u32::MAX)
}

/// Builds [`SipSoftphone`]s sharing one call configuration.
#[derive(Debug, Clone, Default)]
pub struct SipPhoneFactory {
    config: CallConfig,
}

impl SipPhoneFactory {
    pub fn new(config: CallConfig) -> Self {
        Self { config }
    }
}

impl PhoneFactory for SipPhoneFactory {
    fn build(&self, params: PhoneParams) -> Box<dyn Softphone> {
        Box::new(SipSoftphone::new(params, self.config.clone()))
    }
}

/// Split `host[:port]`; bare hosts and IPv6 literals without brackets get `default_port`.
fn split_host_port(gateway: &str, default_port: u16) -> (String, u16) {
    let gateway = gateway.trim();
    if let Ok(addr) = gateway.parse::<SocketAddr>() {
        return (addr.ip().to_string(), addr.port());
    }
    if let Some((host, port)) = gateway.rsplit_once(':') {
        if !host.contains(':') {
            if let Ok(port) = port.parse::<u16>() {
                return (host.to_string(), port);
            }
        }
    }
    (gateway.to_string(), default_port)
}

/// IPv6 literals need brackets inside a SIP URI.
fn uri_host(host: &str) -> String {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
        _ => host.to_string(),
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, SipError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| SipError::Resolve(format!("{}: {}", host, e)))?
        .collect();

    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| SipError::Resolve(host.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn phone(gateway: &str) -> SipSoftphone {
        SipSoftphone::new(
            PhoneParams {
                gateway: gateway.to_string(),
                port: 5060,
                username: "alice".to_string(),
                password: "secret".to_string(),
                local_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            },
            CallConfig::default(),
        )
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(
            split_host_port("sip.example.com", 5060),
            ("sip.example.com".to_string(), 5060)
        );
        assert_eq!(
            split_host_port("sip.example.com:5080", 5060),
            ("sip.example.com".to_string(), 5080)
        );
        assert_eq!(
            split_host_port("127.0.0.1:15060", 5060),
            ("127.0.0.1".to_string(), 15060)
        );
        assert_eq!(split_host_port("::1", 5060), ("::1".to_string(), 5060));
    }

    #[test]
    fn test_address_of_record_uses_configured_host() {
        assert_eq!(phone("sip.example.com:5080").aor(), "sip:alice@sip.example.com");
        assert_eq!(phone("::1").aor(), "sip:alice@[::1]");
    }

    #[test]
    fn test_playback_length_is_twenty_ms_per_frame() {
        assert_eq!(playback_length(0), Duration::ZERO);
        assert_eq!(playback_length(50), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_resolve_prefers_literal_address() {
        let addr = resolve("127.0.0.1", 5070).await.unwrap();
        assert_eq!(addr, "127.0.0.1:5070".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let mut phone = phone("127.0.0.1");
        assert!(!phone.is_registered());
        assert!(phone.stop().await.is_ok());
        assert!(matches!(phone.call("+1555").await, Err(SipError::NotStarted)));
    }

    #[tokio::test]
    async fn test_play_rejects_empty_audio_before_touching_the_network() {
        let mut phone = phone("127.0.0.1");
        let call = CallHandle {
            call_id: Uuid::new_v4(),
            number: "+1555".to_string(),
        };
        assert!(matches!(phone.play(&call, &[]).await, Err(SipError::Media(_))));
        assert!(matches!(
            phone.play(&call, &[[0xFF; PCMU_FRAME_BYTES]]).await,
            Err(SipError::NotStarted)
        ));
    }
}
