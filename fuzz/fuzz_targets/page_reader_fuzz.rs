//! Page reader fuzz target: feed arbitrary text to the MT101 reader.
//! The reader must not panic, and every page it returns must render.
//! Build with: cargo fuzz run page_reader_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    for page in swiftmt::PageReader::from_text(s).flatten() {
        let _ = page.content();
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run page_reader_fuzz");
}
