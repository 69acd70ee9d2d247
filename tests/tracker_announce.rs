use std::net::Ipv4Addr;
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tttorrent_tracker::peer::{PeerAddress, PeerId};
use tttorrent_tracker::torrent::{TorrentFile, TorrentInfo};
use tttorrent_tracker::tracker::{
    build_announce_url, Rejection, SessionParams, Tracker, TrackerError, TrackerEvent, TrackerResponse,
};
use tttorrent_tracker::utils::bencode::BencodeError;
use tttorrent_tracker::utils::sha1hash::Sha1Hash;

fn torrent_file(announce: String) -> TorrentFile {
    TorrentFile {
        announce,
        announce_list: None,
        comment: None,
        created_by: None,
        creation_date: None,
        info: TorrentInfo::new(vec![Sha1Hash([b'a'; 20]), Sha1Hash([b'b'; 20])], 262144, "sample.iso", 524288).unwrap(),
    }
}

/// Runs one announce against the mock server on a blocking thread.
async fn announce(mock_server: &MockServer) -> Result<TrackerResponse, TrackerError> {
    let torrent_file = torrent_file(format!("{}/announce", mock_server.uri()));

    tokio::task::spawn_blocking(move || -> Result<TrackerResponse, TrackerError> {
        let session = SessionParams::new(PeerId::from(*b"-TT0100-abcdefghijkl"), 6881)
            .with_event(TrackerEvent::Started);

        let url = build_announce_url(&torrent_file, &session)?;
        let tracker = Tracker::new(Some(Duration::from_secs(5)))?;

        tracker.announce(&url)
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_announce_compact_peers() {
    let mock_server = MockServer::start().await;

    let mut body = b"d8:intervali1800e5:peers12:".to_vec();
    body.extend_from_slice(&[192, 168, 1, 1, 0x1A, 0xE1, 10, 0, 0, 1, 0x00, 0x50]);
    body.push(b'e');

    Mock::given(method("GET"))
        .and(path("/announce"))
        .and(query_param("compact", "1"))
        .and(query_param("port", "6881"))
        .and(query_param("left", "524288"))
        .and(query_param("event", "started"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = announce(&mock_server).await.unwrap();

    assert_eq!(response.interval, 1800);
    assert_eq!(
        response.peers().unwrap(),
        vec![
            PeerAddress { ip: Ipv4Addr::new(192, 168, 1, 1), port: 6881 },
            PeerAddress { ip: Ipv4Addr::new(10, 0, 0, 1), port: 80 },
        ]
    );
}

#[tokio::test]
async fn test_announce_no_peers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/announce"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"d8:intervali900e5:peers0:e".to_vec()))
        .mount(&mock_server)
        .await;

    let response = announce(&mock_server).await.unwrap();

    assert_eq!(response.peers().unwrap(), Vec::new());
}

#[tokio::test]
async fn test_announce_server_error_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/announce"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = announce(&mock_server).await;

    assert!(matches!(result, Err(TrackerError::Rejected(Rejection::Status(500)))));
}

#[tokio::test]
async fn test_announce_failure_reason_with_ok_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/announce"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"d14:failure reason15:unknown torrente".to_vec()))
        .mount(&mock_server)
        .await;

    let result = announce(&mock_server).await;

    assert!(matches!(
        result,
        Err(TrackerError::Rejected(Rejection::Reason(reason))) if reason == "unknown torrent"
    ));
}

#[tokio::test]
async fn test_announce_failure_reason_with_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/announce"))
        .respond_with(ResponseTemplate::new(400).set_body_bytes(b"d14:failure reason7:too fste".to_vec()))
        .mount(&mock_server)
        .await;

    let result = announce(&mock_server).await;

    assert!(matches!(
        result,
        Err(TrackerError::Rejected(Rejection::Reason(reason))) if reason == "too fst"
    ));
}

#[tokio::test]
async fn test_announce_body_not_bencode() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/announce"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>tracker offline</html>"))
        .mount(&mock_server)
        .await;

    let result = announce(&mock_server).await;

    assert!(matches!(result, Err(TrackerError::MalformedResponse(BencodeError::MalformedEncoding { .. }))));
}

#[tokio::test]
async fn test_announce_malformed_peer_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/announce"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"d8:intervali900e5:peers7:abcdefge".to_vec()))
        .mount(&mock_server)
        .await;

    let result = announce(&mock_server).await;

    assert!(matches!(result, Err(TrackerError::MalformedPeerList(_))));
}
