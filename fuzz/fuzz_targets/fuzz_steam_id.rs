#![no_main]

use libfuzzer_sys::fuzz_target;
use steam_chat_client::SteamId;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(id) = s.parse::<SteamId>() {
            // Every rendering parses back to the same id.
            assert_eq!(id.to_string().parse::<SteamId>().ok(), Some(id));
        }
    }
});
