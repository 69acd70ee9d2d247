use serde::{Serialize, Deserialize};

use std::fmt::Display;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

pub const COMPACT_PEER_LENGTH: usize = 6;

/// An IPv4 endpoint handed out by a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl Display for PeerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl From<PeerAddress> for SocketAddr {
    fn from(peer_address: PeerAddress) -> Self {
        SocketAddr::V4(SocketAddrV4::new(peer_address.ip, peer_address.port))
    }
}

impl PeerAddress {
    /// 4 bytes IPv4 followed by a big-endian port.
    pub fn new(peer_address: [u8; COMPACT_PEER_LENGTH]) -> PeerAddress {
        let ip = Ipv4Addr::new(peer_address[0], peer_address[1], peer_address[2], peer_address[3]);
        let port = u16::from_be_bytes([peer_address[4], peer_address[5]]);

        PeerAddress { ip, port }
    }

    pub fn to_compact(&self) -> [u8; COMPACT_PEER_LENGTH] {
        let mut compact = [0u8; COMPACT_PEER_LENGTH];
        compact[..4].copy_from_slice(&self.ip.octets());
        compact[4..].copy_from_slice(&self.port.to_be_bytes());
        compact
    }
}
