use serde::{Deserialize, Serialize};

/// A network endpoint: 128-bit IP address (v4-mapped or native v6) and
/// port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Peer {
    pub ip_address: u128,
    pub port: u32,
}

impl Peer {
    pub fn new(ip_address: u128, port: u32) -> Self {
        Self { ip_address, port }
    }

    /// RFC1918 / RFC4193 / loopback / link-local exclusion, used by PoW
    /// submission admission to reject private-subnet
    /// senders.
    pub fn is_public(&self) -> bool {
        if let Some(v4) = self.as_ipv4() {
            return !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast());
        }
        let v6 = std::net::Ipv6Addr::from(self.ip_address);
        !(v6.is_loopback() || v6.is_unspecified() || (v6.segments()[0] & 0xfe00) == 0xfc00)
    }

    fn as_ipv4(&self) -> Option<std::net::Ipv4Addr> {
        // IPv4-mapped IPv6: ::ffff:a.b.c.d
        let is_mapped = (self.ip_address >> 32) == 0xffff;
        let is_plain_v4 = (self.ip_address >> 32) == 0;
        if is_mapped || is_plain_v4 {
            Some(std::net::Ipv4Addr::from((self.ip_address & 0xffff_ffff) as u32))
        } else {
            None
        }
    }
}
