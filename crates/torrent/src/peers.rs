use serde::Deserialize;
use swarm_types::{Bandwidth, Bytes, Percent};

use crate::error::Result;
use crate::raw::{self, RawTorrent};

/// A peer connected to a torrent, with enough of its torrent attached to be
/// listed on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    pub torrent_id: u64,
    pub torrent_name: String,
    pub torrent_size: Bytes,
    pub address: String,
    pub port: u16,
    pub client: String,
    /// How much of the torrent the peer has.
    pub progress: Percent,
    /// Upload rate to the peer.
    pub rate_up: Bandwidth,
    /// Download rate from the peer.
    pub rate_down: Bandwidth,
}
impl Peer {
    /// The peer has the whole torrent.
    pub fn is_seed(&self) -> bool {
        self.progress.is_complete()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeer {
    address: String,
    port: u16,
    #[serde(default)]
    client_name: String,
    progress: f64,
    rate_to_peer: u64,
    rate_to_client: u64,
}

/// Decodes `peers`, tagging each with the torrent's `id`, `name` and `totalSize`.
pub(crate) fn peers(raw: &RawTorrent) -> Result<Vec<Peer>> {
    let torrent_id = raw::uint(raw, "id")?;
    let torrent_name = raw::text(raw, "name")?;
    let torrent_size = Bytes(raw::uint(raw, "totalSize")?);
    let peers = raw::list::<RawPeer>(raw, "peers")?;
    Ok(peers
        .into_iter()
        .map(|peer| Peer {
            torrent_id,
            torrent_name: torrent_name.to_string(),
            torrent_size,
            address: peer.address,
            port: peer.port,
            client: peer.client_name,
            progress: Percent::from_fraction(peer.progress),
            rate_up: Bandwidth(peer.rate_to_peer),
            rate_down: Bandwidth(peer.rate_to_client),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::raw::record;

    #[test]
    fn test_peers_carry_torrent_details() {
        let raw = record(json!({
            "id": 3,
            "name": "ubuntu.iso",
            "totalSize": 4_000_000_000u64,
            "peers": [
                { "address": "10.0.0.2", "port": 51413, "clientName": "Transmission 4.0", "progress": 1.0, "rateToPeer": 0, "rateToClient": 2048 },
                { "address": "10.0.0.3", "port": 6881, "clientName": "qBittorrent", "progress": 0.25, "rateToPeer": 512, "rateToClient": 0 },
            ],
        }));
        let peers = peers(&raw).unwrap();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].torrent_id, 3);
        assert_eq!(peers[0].torrent_name, "ubuntu.iso");
        assert_eq!(peers[0].torrent_size, Bytes(4_000_000_000));
        assert!(peers[0].is_seed());
        assert_eq!(peers[0].rate_down, Bandwidth(2048));
        assert!(!peers[1].is_seed());
        assert_eq!(peers[1].progress, Percent::from_fraction(0.25));
        assert_eq!(peers[1].rate_up, Bandwidth(512));
    }

    #[test]
    fn test_peers_malformed() {
        let raw = record(json!({ "id": 3, "name": "x", "totalSize": 1, "peers": [{ "address": "10.0.0.2" }] }));
        assert!(peers(&raw).is_err());
    }
}
