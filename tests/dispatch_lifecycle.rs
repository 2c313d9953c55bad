//! End-to-end exercises of the invocation dispatcher.

#[path = "_fixtures.rs"]
mod fixtures;

use ff::Field;
use fixtures::{
    encode_call, outputs_to_bytes, sha256_instance, single_return, Channel, TagSink,
    ZERO_BLOCK_DIGEST,
};
use r1cs_bridge::gadget::{ContractError, INPUT_BITS, OUTPUT_BITS};
use r1cs_bridge::messages::{ComponentReturn, Message};
use r1cs_bridge::{call_gadget, CallError, CircuitScalar, VecSink};

#[test]
fn constraints_only_call_streams_one_report() {
    let request = encode_call(sha256_instance(), true, false, Vec::new());

    let mut reports = VecSink::new();
    let mut response = VecSink::new();
    call_gadget(&request, Some(&mut reports), Some(&mut response)).unwrap();

    assert_eq!(reports.len(), 1);
    let report = match Message::decode(&reports.messages()[0]).unwrap() {
        Message::Constraints(report) => report,
        other => panic!("expected constraints report, got {other:?}"),
    };
    assert_eq!(report.instance, sha256_instance());
    assert!(!report.constraints.is_empty());

    let ret = single_return(&response);
    assert!(ret.error.is_none());
    assert!(ret.outputs.is_none(), "no witness phase, no outputs");
    assert!(ret.free_variable_id_after > sha256_instance().free_variable_id_before);
}

#[test]
fn constraint_generation_is_deterministic() {
    let request = encode_call(sha256_instance(), true, false, Vec::new());

    let mut first = VecSink::new();
    call_gadget(&request, Some(&mut first), None).unwrap();
    let mut second = VecSink::new();
    call_gadget(&request, Some(&mut second), None).unwrap();

    assert_eq!(first.messages(), second.messages());
}

#[test]
fn witness_only_call_returns_the_zero_block_digest() {
    let inputs = vec![CircuitScalar::ZERO; INPUT_BITS];
    let request = encode_call(sha256_instance(), false, true, inputs);

    let mut reports = VecSink::new();
    let mut response = VecSink::new();
    call_gadget(&request, Some(&mut reports), Some(&mut response)).unwrap();

    assert_eq!(reports.len(), 1, "only the assignment report");
    assert!(matches!(
        Message::decode(&reports.messages()[0]).unwrap(),
        Message::Assignment(_)
    ));

    let ret = single_return(&response);
    assert!(ret.error.is_none());
    let outputs = ret.outputs.expect("witness phase ran");
    assert_eq!(outputs.len(), OUTPUT_BITS);
    assert_eq!(outputs_to_bytes(&outputs), ZERO_BLOCK_DIGEST);
}

#[test]
fn both_phases_emit_reports_in_protocol_order() {
    let inputs = vec![CircuitScalar::ZERO; INPUT_BITS];
    let request = encode_call(sha256_instance(), true, true, inputs);

    let (mut reports, mut response, log) = TagSink::pair();
    call_gadget(&request, Some(&mut reports), Some(&mut response)).unwrap();

    // Constraints (3) strictly before assignment (4), both before the
    // final response (2).
    assert_eq!(
        log.borrow().as_slice(),
        &[
            (Channel::Report, 3),
            (Channel::Report, 4),
            (Channel::Response, 2),
        ]
    );
}

#[test]
fn no_sink_configuration_is_valid() {
    let inputs = vec![CircuitScalar::ZERO; INPUT_BITS];
    let request = encode_call(sha256_instance(), true, true, inputs);
    call_gadget(&request, None, None).unwrap();
}

#[test]
fn non_call_message_yields_structured_error() {
    let request = Message::Return(ComponentReturn {
        free_variable_id_after: 0,
        error: None,
        outputs: None,
    })
    .encode()
    .unwrap();

    let mut reports = VecSink::new();
    let mut response = VecSink::new();
    call_gadget(&request, Some(&mut reports), Some(&mut response)).unwrap();

    assert!(reports.is_empty(), "no gadget must be constructed");
    let ret = single_return(&response);
    assert!(ret.error.is_some());
    assert!(ret.outputs.is_none());
    assert_eq!(ret.free_variable_id_after, 0);
}

#[test]
fn malformed_envelope_yields_structured_error() {
    let mut response = VecSink::new();
    call_gadget(&[0xff, 0x00, 0x13], None, Some(&mut response)).unwrap();

    let ret = single_return(&response);
    assert!(ret.error.is_some());
}

#[test]
fn arity_mismatch_aborts_without_a_response() {
    let mut instance = sha256_instance();
    instance.incoming_variable_ids.truncate(100);
    let request = encode_call(instance, true, false, Vec::new());

    let mut response = VecSink::new();
    let err = call_gadget(&request, None, Some(&mut response)).unwrap_err();

    assert!(matches!(
        err,
        CallError::Contract(ContractError::IncomingArity { .. })
    ));
    assert!(response.is_empty(), "fatal errors bypass the response channel");
}

#[test]
fn witness_input_length_mismatch_aborts() {
    let request = encode_call(
        sha256_instance(),
        false,
        true,
        vec![CircuitScalar::ONE; INPUT_BITS - 1],
    );

    let err = call_gadget(&request, None, None).unwrap_err();
    assert!(matches!(
        err,
        CallError::Contract(ContractError::WitnessInputLength { .. })
    ));
}
