//! Fuzz target: configuration file parser
//!
//! Feeds arbitrary bytes to the JSON config parser that reads the card's
//! `logger.json`.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Anything accepted passes validation and survives a save/parse cycle
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use fluorologger::adapters::config_file::parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = parse(data) else {
        return;
    };

    assert!(config.validate().is_ok(), "parse returned an invalid config");

    let json = serde_json::to_vec(&config).expect("valid config must serialise");
    let again = parse(&json).expect("serialised config must parse back");
    assert_eq!(config, again);
});
