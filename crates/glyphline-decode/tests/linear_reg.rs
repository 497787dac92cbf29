//! Linear symbology regression test
//!
//! Decodes a clean fixture of every supported symbology in open mode and
//! checks both the reported symbology and the text.

use glyphline_decode::{Decode, DecodeOptions, Symbology, decode};
use glyphline_test::fixtures::{self, TwoOfFive};
use glyphline_test::{RegParams, init_logging};

fn check(rp: &mut RegParams, modules: &[bool], symbology: Symbology, text: &str) {
    let result = decode(modules, &DecodeOptions::default());
    let found = result.found();
    rp.compare(Some(symbology), found.map(|r| r.symbology));
    rp.compare_strings(Some(text), found.map(|r| r.text.as_str()));
}

#[test]
fn linear_reg() {
    init_logging();
    let mut rp = RegParams::new("linear");

    // --- EAN / UPC ---
    eprintln!("=== EAN / UPC ===");
    let m = fixtures::ean13("400638133393").unwrap();
    check(&mut rp, &m, Symbology::Ean, "4006381333931");
    let m = fixtures::ean8("9638507").unwrap();
    check(&mut rp, &m, Symbology::Ean, "96385074");
    let m = fixtures::upca("03600029145").unwrap();
    check(&mut rp, &m, Symbology::UpcA, "036000291452");
    let m = fixtures::upce("0425261").unwrap();
    check(&mut rp, &m, Symbology::UpcE, "04252614");
    let m = fixtures::ean13_with_addon("400638133393", "52495").unwrap();
    check(&mut rp, &m, Symbology::Ean, "4006381333931+52495");

    // --- 2 of 5 family ---
    eprintln!("=== 2 of 5 ===");
    let m = fixtures::itf("15400141288763").unwrap();
    check(&mut rp, &m, Symbology::Itf14, "15400141288763");
    let m = fixtures::itf("123456").unwrap();
    check(&mut rp, &m, Symbology::Itf, "123456");
    let m = fixtures::two_of_five(TwoOfFive::Industrial, "12345").unwrap();
    check(&mut rp, &m, Symbology::Industrial2of5, "12345");
    let m = fixtures::two_of_five(TwoOfFive::Matrix, "0987").unwrap();
    check(&mut rp, &m, Symbology::Matrix2of5, "0987");
    let m = fixtures::two_of_five(TwoOfFive::Iata, "4711").unwrap();
    check(&mut rp, &m, Symbology::Iata2of5, "4711");

    // --- Pattern-table symbologies ---
    eprintln!("=== Pattern tables ===");
    let m = fixtures::code128("Hello-128").unwrap();
    check(&mut rp, &m, Symbology::Code128, "Hello-128");
    let m = fixtures::gs1_128(&["0101234567890128", "10ABC"]).unwrap();
    check(&mut rp, &m, Symbology::Gs1128, "0101234567890128\u{1D}10ABC");
    let m = fixtures::code32("01234567").unwrap();
    check(&mut rp, &m, Symbology::Code32, "012345676");
    let m = fixtures::code39("CODE39", false).unwrap();
    check(&mut rp, &m, Symbology::Code39, "CODE39");
    let m = fixtures::code39_full_ascii("Hi!").unwrap();
    check(&mut rp, &m, Symbology::Code39, "Hi!");
    let m = fixtures::code93("TEST93").unwrap();
    check(&mut rp, &m, Symbology::Code93, "TEST93");
    let m = fixtures::codabar('A', "40156", 'B').unwrap();
    check(&mut rp, &m, Symbology::Codabar, "40156");
    let m = fixtures::msi("12345674").unwrap();
    check(&mut rp, &m, Symbology::Msi, "12345674");
    let m = fixtures::code11("123-45").unwrap();
    check(&mut rp, &m, Symbology::Code11, "123-45");
    let m = fixtures::plessey("01AF").unwrap();
    check(&mut rp, &m, Symbology::Plessey, "01AF");

    // --- Special-purpose ---
    eprintln!("=== Special purpose ===");
    let m = fixtures::patch_code("T").unwrap();
    check(&mut rp, &m, Symbology::PatchCode, "T");
    let m = fixtures::telepen("Telepen 1").unwrap();
    check(&mut rp, &m, Symbology::Telepen, "Telepen 1");
    let m = fixtures::pharmacode(1234).unwrap();
    check(&mut rp, &m, Symbology::Pharmacode, "1234");

    // --- GS1 DataBar ---
    eprintln!("=== GS1 DataBar ===");
    let m = fixtures::databar_truncated("0950110153001").unwrap();
    check(&mut rp, &m, Symbology::Gs1DataBarTruncated, "0950110153001");
    let bits = fixtures::expanded_gtin_bits("0101234567890");
    let m = fixtures::databar_expanded(&bits).unwrap();
    check(&mut rp, &m, Symbology::Gs1DataBarExpanded, "0101012345678904");

    // --- Nothing to find ---
    eprintln!("=== Not recognized ===");
    let noise = [true, false, true, true, false, false, true];
    rp.compare(Decode::NotRecognized, decode(&noise, &DecodeOptions::default()));
    rp.compare(Decode::NotRecognized, decode(&[], &DecodeOptions::default()));
    rp.compare(
        Decode::NotRecognized,
        decode(&[false; 40], &DecodeOptions::default()),
    );

    assert!(rp.cleanup(), "linear regression test failed");
}
