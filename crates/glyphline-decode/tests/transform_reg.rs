//! Transform driver regression test
//!
//! Scanlines read with inverted polarity or in reverse must still decode,
//! and the diagnostics must report which transforms were needed.

use glyphline_decode::modules::runs;
use glyphline_decode::{
    Decode, DecodeError, DecodeJob, DecodeOptions, Symbology, Unstoppable, decode, decode_runs,
};
use glyphline_test::{RegParams, fixtures, init_logging};

/// Inverts a symbol and frames it with dark margins, as a light-on-dark
/// print would scan
fn inverted_with_margins(modules: &[bool]) -> Vec<bool> {
    let mut out = vec![true; 4];
    out.extend(modules.iter().map(|&b| !b));
    out.extend([true; 4]);
    out
}

fn reversed(modules: &[bool]) -> Vec<bool> {
    modules.iter().rev().copied().collect()
}

#[test]
fn transform_reg() {
    init_logging();
    let mut rp = RegParams::new("transform");
    let options = DecodeOptions::default();
    let job = DecodeJob::new(&options).with_stop(&Unstoppable);

    let symbols = [
        (fixtures::ean13("400638133393").unwrap(), "4006381333931"),
        (fixtures::code128("Hello-128").unwrap(), "Hello-128"),
        (fixtures::code93("TEST93").unwrap(), "TEST93"),
    ];

    // --- Test 1: as-is needs one attempt ---
    eprintln!("=== As-is ===");
    for (m, text) in &symbols {
        let (result, diag) = job.decode_with_diagnostics(m);
        rp.compare_strings(Some(*text), result.found().map(|r| r.text.as_str()));
        rp.compare(1, diag.attempts);
        rp.check(!diag.inverted_tried && !diag.reversed_tried, "no transform");
    }

    // --- Test 2: inverted polarity ---
    eprintln!("=== Inverted ===");
    for (m, text) in &symbols {
        let (result, diag) = job.decode_with_diagnostics(&inverted_with_margins(m));
        rp.compare_strings(Some(*text), result.found().map(|r| r.text.as_str()));
        rp.check(diag.inverted_tried, "inverted tried");
        rp.check(!diag.reversed_tried, "reversed not needed");
    }

    // --- Test 3: reversed scan direction ---
    eprintln!("=== Reversed ===");
    for (m, text) in &symbols {
        let (result, diag) = job.decode_with_diagnostics(&reversed(m));
        rp.compare_strings(Some(*text), result.found().map(|r| r.text.as_str()));
        rp.check(diag.reversed_tried, "reversed tried");
    }

    // --- Test 4: inverted and reversed ---
    eprintln!("=== Inverted + reversed ===");
    for (m, text) in &symbols {
        let (result, diag) = job.decode_with_diagnostics(&reversed(&inverted_with_margins(m)));
        rp.compare_strings(Some(*text), result.found().map(|r| r.text.as_str()));
        rp.check(diag.inverted_tried && diag.reversed_tried, "both tried");
    }

    // --- Test 5: nothing decodes after all four transforms ---
    eprintln!("=== Exhausted ===");
    // Equal bars rule out Pharmacode; inverted it trims to one module
    let noise = [true, false, true];
    let (result, diag) = job.decode_with_diagnostics(&noise);
    rp.compare(Decode::NotRecognized, result);
    rp.compare(4, diag.attempts);
    rp.compare(None, diag.matched);
    rp.check(!diag.cancelled, "not cancelled");

    // All-light input only survives trimming once inverted
    let (result, diag) = job.decode_with_diagnostics(&[false; 16]);
    rp.compare(Decode::NotRecognized, result);
    rp.compare(2, diag.attempts);
    rp.check(diag.inverted_tried, "inverted tried on all-light input");

    // Empty input never reaches the dispatcher
    let (_, diag) = job.decode_with_diagnostics(&[]);
    rp.compare(0, diag.attempts);

    // --- Test 6: run-length input ---
    eprintln!("=== Run lengths ===");
    let m = fixtures::code39("RUNS", false).unwrap();
    let result = decode_runs(&runs(&m), &options).unwrap();
    rp.compare(Some(Symbology::Code39), result.found().map(|r| r.symbology));
    rp.compare_strings(Some("RUNS"), result.found().map(|r| r.text.as_str()));
    rp.compare(
        Err(DecodeError::ZeroLengthRun { index: 2 }),
        job.decode_runs(&[1, 1, 0, 1]),
    );

    // --- Test 7: light quiet zones are trimmed away ---
    eprintln!("=== Quiet zones ===");
    let bare = [
        fixtures::ean13("400638133393").unwrap(),
        fixtures::code128("Hello-128").unwrap(),
        fixtures::codabar('A', "40156", 'B').unwrap(),
        fixtures::plessey("01AF").unwrap(),
    ];
    for m in &bare {
        let expected = decode(m, &options).into_result();
        rp.check(expected.is_some(), "bare symbol decodes");
        for margin in [1, 10, 37] {
            let mut padded = vec![false; margin];
            padded.extend_from_slice(m);
            padded.extend(std::iter::repeat_n(false, margin + 3));
            rp.compare(expected.clone(), decode(&padded, &options).into_result());
        }
    }

    assert!(rp.cleanup(), "transform regression test failed");
}
