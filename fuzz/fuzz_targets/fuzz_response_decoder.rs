#![no_main]

use libfuzzer_sys::fuzz_target;

// Beliebige Server-Antworten dürfen nie panicken, nur Fehler liefern.
fuzz_target!(|data: &[u8]| {
    let _ = wfst_editor::xml::decode(data);
});
