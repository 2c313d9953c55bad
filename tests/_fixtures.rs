#![allow(dead_code)]

//! Shared helpers for the integration tests.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use r1cs_bridge::gadget::{GadgetInstance, INPUT_BITS, OUTPUT_BITS};
use r1cs_bridge::messages::{ComponentCall, ComponentReturn, Message};
use r1cs_bridge::{CircuitScalar, ReportSink, VecSink};

/// SHA-256 compression of one all-zero 512-bit block with the standard
/// initialization vector.
pub const ZERO_BLOCK_DIGEST: [u8; 32] = [
    0xda, 0x56, 0x98, 0xbe, 0x17, 0xb9, 0xb4, 0x69, 0x62, 0x33, 0x57, 0x99, 0x77, 0x9f, 0xbe,
    0xca, 0x8c, 0xe5, 0xd4, 0x91, 0xc0, 0xd2, 0x62, 0x43, 0xba, 0xfe, 0xf9, 0xea, 0x18, 0x37,
    0xa9, 0xd8,
];

/// SHA-256 compression of one all-one 512-bit block with the standard
/// initialization vector.
pub const ONES_BLOCK_DIGEST: [u8; 32] = [
    0xef, 0x0c, 0x74, 0x8d, 0xf4, 0xda, 0x50, 0xa8, 0xd6, 0xc4, 0x3c, 0x01, 0x3e, 0xdc, 0x3c,
    0xe7, 0x6c, 0x9d, 0x9f, 0xa9, 0xa1, 0x45, 0x8a, 0xde, 0x56, 0xeb, 0x86, 0xc0, 0xa6, 0x44,
    0x92, 0xd2,
];

/// Canonical instance: inputs on ids 1..=512, outputs on 513..=768,
/// locals from 769.
pub fn sha256_instance() -> GadgetInstance {
    GadgetInstance {
        incoming_variable_ids: (1..=INPUT_BITS as u64).collect(),
        outgoing_variable_ids: (INPUT_BITS as u64 + 1..=(INPUT_BITS + OUTPUT_BITS) as u64)
            .collect(),
        free_variable_id_before: (INPUT_BITS + OUTPUT_BITS) as u64 + 1,
    }
}

/// Encodes a component call envelope.
pub fn encode_call(
    instance: GadgetInstance,
    generate_r1cs: bool,
    generate_assignment: bool,
    inputs: Vec<CircuitScalar>,
) -> Vec<u8> {
    Message::Call(ComponentCall {
        instance,
        generate_r1cs,
        generate_assignment,
        inputs,
    })
    .encode()
    .expect("encode call")
}

/// Decodes the single response a sink collected.
pub fn single_return(sink: &VecSink) -> ComponentReturn {
    assert_eq!(sink.len(), 1, "expected exactly one response");
    match Message::decode(&sink.messages()[0]).expect("decode response") {
        Message::Return(ret) => ret,
        other => panic!("expected a component return, got {other:?}"),
    }
}

/// Packs gadget output elements (bit values) into digest bytes, most
/// significant bit first within each byte.
pub fn outputs_to_bytes(outputs: &[CircuitScalar]) -> [u8; 32] {
    assert_eq!(outputs.len(), OUTPUT_BITS);
    let one = CircuitScalar::from(1u64);
    let mut bytes = [0u8; 32];
    for (i, element) in outputs.iter().enumerate() {
        if *element == one {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

/// Channel label recorded by [`TagSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Report,
    Response,
}

/// Sink recording `(channel, message type)` pairs into a log shared
/// across sinks, so tests can assert the global emission order.
pub struct TagSink {
    channel: Channel,
    log: Rc<RefCell<Vec<(Channel, u8)>>>,
}

impl TagSink {
    pub fn pair() -> (TagSink, TagSink, Rc<RefCell<Vec<(Channel, u8)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (
            TagSink {
                channel: Channel::Report,
                log: Rc::clone(&log),
            },
            TagSink {
                channel: Channel::Response,
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl ReportSink for TagSink {
    fn accept(&mut self, message: &[u8]) -> io::Result<()> {
        // Message type byte sits right after the u32 size prefix.
        self.log.borrow_mut().push((self.channel, message[4]));
        Ok(())
    }
}
