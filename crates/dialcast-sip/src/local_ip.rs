use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use dialcast_core::constants::LOCAL_IP_PROBE_ADDR;

/// Address of the interface the host would use for outbound traffic.
///
/// Connecting a UDP socket sends nothing; it only asks the kernel to pick a route.
/// Any failure yields `127.0.0.1`.
pub fn detect_local_ip() -> IpAddr {
    match route_source_ip() {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            tracing::debug!(error = %e, "Local IP detection failed, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn route_source_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(LOCAL_IP_PROBE_ADDR)?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_local_ip_is_ipv4_and_never_unspecified() {
        let ip = detect_local_ip();
        assert!(ip.is_ipv4());
        assert!(!ip.is_unspecified());
    }
}
