#![no_main]

use libfuzzer_sys::fuzz_target;
use steam_chat_client::demux::demultiplex;
use steam_chat_client::protocol::PollResponse;
use steam_chat_client::{FriendRoster, SteamId};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<PollResponse>(data) else {
        return;
    };

    // Anything that decodes must survive conversion and demultiplexing.
    let result = raw.into_poll_result(0);
    assert!(result.last_message_seq >= 0);
    let mut roster = FriendRoster::new();
    let batch = demultiplex(result, SteamId::from_account_id(1), &mut roster);
    let _ = batch.into_events();
});
