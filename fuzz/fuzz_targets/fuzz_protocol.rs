#![no_main]

use codesearch::server::protocol::{read_message, NetworkMessage};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes off the socket must decode or fail, never panic
    let mut reader = Cursor::new(data);
    while let Ok(_msg) = read_message::<_, NetworkMessage>(&mut reader) {}
});
