use anyhow::{Context, Result};
use serde::Serialize;

use tttorrent_tracker::client_options::{help_menu, ClientOptions};
use tttorrent_tracker::peer::{PeerAddress, PeerId};
use tttorrent_tracker::torrent::TorrentFile;
use tttorrent_tracker::tracker::{build_announce_url, SessionParams, Tracker, TrackerEvent};
use tttorrent_tracker::utils::read_file_as_bytes;

#[derive(Debug, Serialize)]
struct AnnounceOutput<'a> {
    name: &'a str,
    info_hash: String,
    interval: u64,
    complete: Option<u64>,
    incomplete: Option<u64>,
    peers: &'a [PeerAddress],
}

fn main() -> Result<()> {
    let options = ClientOptions::from_args(std::env::args().skip(1))
        .context("invalid arguments, use --help for the help menu")?;

    if options.show_help {
        println!("{}", help_menu());
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_max_level(options.tracing_level)
        .with_target(false)
        .init();

    let torrent_path = options
        .torrent_path
        .as_deref()
        .context("missing torrent file argument, use --help for the help menu")?;

    let torrent_data = read_file_as_bytes(torrent_path)?;
    let torrent_file = TorrentFile::from_bytes(&torrent_data)
        .with_context(|| format!("couldn't parse torrent file '{torrent_path}'"))?;

    let info_hash = torrent_file.info_hash();
    tracing::info!("loaded '{}' with info hash {}", torrent_file.info.name(), info_hash);

    let peer_id = PeerId::generate(&options.peer_id_prefix).context("couldn't generate a peer id")?;
    let session = SessionParams::new(peer_id, options.listening_port)
        .with_event(TrackerEvent::Started)
        .with_numwant(options.numwant);

    let announce_url = build_announce_url(&torrent_file, &session)?;

    let tracker = Tracker::new(options.tracker_timeout())?;
    let tracker_response = tracker
        .announce(&announce_url)
        .with_context(|| format!("announce to '{}' failed", torrent_file.announce))?;

    let peers = tracker_response.peers()?;

    if options.json {
        let output = AnnounceOutput {
            name: torrent_file.info.name(),
            info_hash: info_hash.to_hex(),
            interval: tracker_response.interval,
            complete: tracker_response.complete,
            incomplete: tracker_response.incomplete,
            peers: &peers,
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    else {
        println!("info hash: {}", info_hash);
        println!("next announce in: {}s", tracker_response.interval);
        println!("peers ({}):", peers.len());
        for peer in &peers {
            println!("  {}", peer);
        }
    }

    Ok(())
}
