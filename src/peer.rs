use thiserror::Error;

pub mod peer_address;
pub use peer_address::{PeerAddress, COMPACT_PEER_LENGTH};

pub mod peer_id;
pub use peer_id::{PeerId, PeerIdError, DEFAULT_PEER_ID_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerListError {
    #[error("malformed compact peer list: {len} bytes is not a multiple of 6")]
    MalformedPeerList { len: usize },
}

/// Unpacks a compact peer list, keeping the tracker's order.
pub fn decode_peers(peers: &[u8]) -> Result<Vec<PeerAddress>, PeerListError> {
    if peers.len() % COMPACT_PEER_LENGTH != 0 {
        return Err(PeerListError::MalformedPeerList { len: peers.len() });
    }

    let peer_addresses = peers
        .chunks_exact(COMPACT_PEER_LENGTH)
        .map(|chunk| {
            let mut ip_port_chunk = [0u8; COMPACT_PEER_LENGTH];
            ip_port_chunk.copy_from_slice(chunk);

            PeerAddress::new(ip_port_chunk)
        })
        .collect::<Vec<PeerAddress>>();

    Ok(peer_addresses)
}

pub fn encode_peers(peer_addresses: &[PeerAddress]) -> Vec<u8> {
    peer_addresses
        .iter()
        .flat_map(PeerAddress::to_compact)
        .collect()
}

#[cfg(test)]
mod peer_list_tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use super::*;

    #[test]
    fn test_decode_peers_empty() {
        assert_eq!(decode_peers(&[]), Ok(Vec::new()));
    }

    #[test]
    fn test_decode_peers_single() {
        let peers = decode_peers(&[192, 168, 1, 1, 0x1A, 0xE1]).unwrap();

        assert_eq!(peers, vec![PeerAddress { ip: Ipv4Addr::new(192, 168, 1, 1), port: 6881 }]);
        assert_eq!(peers[0].to_string(), "192.168.1.1:6881");
        assert_eq!(SocketAddr::from(peers[0]), "192.168.1.1:6881".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_decode_peers_keeps_tracker_order() {
        let data = [
            10, 0, 0, 2, 0xC8, 0xD5,
            10, 0, 0, 1, 0x00, 0x50,
            255, 255, 255, 255, 0xFF, 0xFF,
        ];

        let peers = decode_peers(&data).unwrap();

        assert_eq!(
            peers,
            vec![
                PeerAddress { ip: Ipv4Addr::new(10, 0, 0, 2), port: 51413 },
                PeerAddress { ip: Ipv4Addr::new(10, 0, 0, 1), port: 80 },
                PeerAddress { ip: Ipv4Addr::new(255, 255, 255, 255), port: 65535 },
            ]
        );
        assert_eq!(encode_peers(&peers), data.to_vec());
    }

    #[test]
    fn test_decode_peers_malformed() {
        assert_eq!(
            decode_peers(&[192, 168, 1, 1, 0x1A, 0xE1, 0]),
            Err(PeerListError::MalformedPeerList { len: 7 })
        );
        assert_eq!(decode_peers(&[1, 2, 3]), Err(PeerListError::MalformedPeerList { len: 3 }));
    }
}
