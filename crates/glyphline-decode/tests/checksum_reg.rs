//! Checksum policy regression test
//!
//! Code 39, MSI, Code 11, and Plessey carry optional check characters whose
//! treatment is selected per symbology in `DecodeOptions`.

use glyphline_decode::{ChecksumPolicy, DecodeOptions, Symbology, decode};
use glyphline_test::{RegParams, fixtures, init_logging};

fn text(modules: &[bool], options: &DecodeOptions) -> Option<String> {
    decode(modules, options).into_result().map(|r| r.text)
}

#[test]
fn checksum_reg() {
    init_logging();
    let mut rp = RegParams::new("checksum");

    // --- Code 39 mod 43 ---
    eprintln!("=== Code 39 ===");
    let checked = fixtures::code39("CODE39", true).unwrap();
    let plain = fixtures::code39("CODE39", false).unwrap();
    let base = DecodeOptions::with_symbology(Symbology::Code39);
    rp.compare_strings(Some("CODE39W"), text(&checked, &base).as_deref());
    let strip = base.code39_checksum(ChecksumPolicy::StripIfValid);
    rp.compare_strings(Some("CODE39"), text(&checked, &strip).as_deref());
    rp.compare_strings(Some("CODE39"), text(&plain, &strip).as_deref());
    let require = base.code39_checksum(ChecksumPolicy::RequireValid);
    rp.compare_strings(Some("CODE39"), text(&checked, &require).as_deref());
    rp.compare_strings(None, text(&plain, &require).as_deref());

    // --- MSI mod 10 ---
    eprintln!("=== MSI ===");
    let base = DecodeOptions::with_symbology(Symbology::Msi);
    let single = fixtures::msi("12345674").unwrap();
    let bad = fixtures::msi("12345670").unwrap();
    rp.compare_strings(Some("12345674"), text(&single, &base).as_deref());
    let require = base.msi_checksum(ChecksumPolicy::RequireValid);
    rp.compare_strings(Some("1234567"), text(&single, &require).as_deref());
    rp.compare_strings(None, text(&bad, &require).as_deref());
    let strip = base.msi_checksum(ChecksumPolicy::StripIfValid);
    rp.compare_strings(Some("12345670"), text(&bad, &strip).as_deref());

    // --- Code 11 C and K ---
    eprintln!("=== Code 11 ===");
    let base = DecodeOptions::with_symbology(Symbology::Code11);
    let require = base.code11_checksum(ChecksumPolicy::RequireValid);
    let both = fixtures::code11("123-4552").unwrap();
    let c_only = fixtures::code11("123-455").unwrap();
    let wrong = fixtures::code11("123-459").unwrap();
    rp.compare_strings(Some("123-4552"), text(&both, &base).as_deref());
    rp.compare_strings(Some("123-45"), text(&both, &require).as_deref());
    rp.compare_strings(Some("123-45"), text(&c_only, &require).as_deref());
    rp.compare_strings(None, text(&wrong, &require).as_deref());

    // --- Plessey CRC, strict by default ---
    eprintln!("=== Plessey ===");
    let base = DecodeOptions::with_symbology(Symbology::Plessey);
    rp.compare(ChecksumPolicy::RequireValid, base.plessey_checksum);
    let good = fixtures::plessey("01AF").unwrap();
    let bad_crc = fixtures::plessey_with_crc("12", 0x00).unwrap();
    rp.compare_strings(Some("01AF"), text(&good, &base).as_deref());
    rp.compare_strings(None, text(&bad_crc, &base).as_deref());
    let lenient = base.plessey_checksum(ChecksumPolicy::None);
    rp.compare_strings(Some("12"), text(&bad_crc, &lenient).as_deref());

    // --- Mandatory checks ignore the policy fields ---
    eprintln!("=== Mandatory checks ===");
    let lenient = DecodeOptions::default()
        .code39_checksum(ChecksumPolicy::None)
        .msi_checksum(ChecksumPolicy::None);
    let itf14_bad = fixtures::itf("15400141288767").unwrap();
    let result = decode(&itf14_bad, &lenient);
    // Falls through to plain ITF, which has no check digit
    rp.compare(Some(Symbology::Itf), result.found().map(|r| r.symbology));

    assert!(rp.cleanup(), "checksum regression test failed");
}
