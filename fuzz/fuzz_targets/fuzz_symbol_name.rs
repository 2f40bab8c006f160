#![no_main]
use kerndiff::model::SymbolName;
use libfuzzer_sys::fuzz_target;

/// Fuzz symbol name parsing and rendering.
///
/// Parsing must never panic, and the display form must reparse to an
/// identical name.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let name = SymbolName::parse(s);
        let _ = name.is_variant();
        let _ = name.canonical();

        let rendered = name.to_string();
        let reparsed = SymbolName::parse(&rendered);
        assert_eq!(name, reparsed, "display form must reparse identically");
    }
});
