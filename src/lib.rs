pub mod client_options;
pub mod peer;
pub mod torrent;
pub mod tracker;
pub mod utils;
