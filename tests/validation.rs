use ffnorm::engine::validate::{self, RejectReason, ValidationOutcome};
use ffnorm::engine::ResolutionClass;
use std::fs;
use tempfile::TempDir;

fn assert_rejected_with(outcome: ValidationOutcome, check: fn(&RejectReason) -> bool) {
    match outcome {
        ValidationOutcome::Rejected(ref reason) if check(reason) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn rejects_output_below_minimum_size() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("small.mp4");
    fs::write(&output, vec![0u8; 4096]).unwrap();

    let outcome = validate::validate(&output, 100.0, ResolutionClass::P1080, 24.0);
    assert_rejected_with(outcome, |r| matches!(r, RejectReason::TooSmall(4096)));
}

#[test]
fn size_gate_boundary() {
    // one byte under the floor is rejected on size alone
    let temp = TempDir::new().unwrap();
    let tiny = temp.path().join("tiny.mp4");
    fs::write(&tiny, vec![0u8; validate::MIN_OUTPUT_BYTES as usize - 1]).unwrap();

    let outcome = validate::validate(&tiny, 100.0, ResolutionClass::P1080, 24.0);
    assert_rejected_with(outcome, |r| matches!(r, RejectReason::TooSmall(_)));
}

#[test]
fn missing_output_is_unprobeable() {
    let temp = TempDir::new().unwrap();
    let outcome = validate::validate(
        &temp.path().join("never-written.mp4"),
        100.0,
        ResolutionClass::P1080,
        24.0,
    );
    assert_rejected_with(outcome, |r| matches!(r, RejectReason::Unprobeable(_)));
}

#[test]
fn reject_reasons_render_for_logging() {
    let reasons = [
        RejectReason::TooSmall(12),
        RejectReason::Unprobeable("boom".to_string()),
        RejectReason::MissingStream,
        RejectReason::WrongCodec,
        RejectReason::Truncated {
            output_secs: 99.4,
            input_secs: 100.0,
        },
        RejectReason::IncompleteMetadata,
        RejectReason::BitrateTooLow {
            actual_kbps: 100,
            expected_kbps: 10_000,
        },
    ];

    for reason in reasons {
        assert!(!reason.to_string().is_empty());
    }
}
