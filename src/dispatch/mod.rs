//! Invocation dispatcher: the state machine driving one gadget call.
//!
//! One call is one synchronous execution of four steps in fixed order:
//! validate the request, ensure the field parameters are initialized,
//! run the constraint phase, run the witness phase, then finalize the
//! response. Phases are skipped according to the call's flags, but the
//! gadget's variable declaration always runs so the variable accounting
//! in the response is independent of which phases were requested.
//!
//! Reports are streamed eagerly through the report sink as each phase
//! completes — the constraints report always precedes the assignment
//! report, and both precede the final response — so the response stays
//! small and constant-size regardless of circuit size.
//!
//! Error policy: malformed envelopes and unexpected message types are
//! protocol errors, answered with a structured error inside the
//! response envelope. Contract violations (arity mismatches) abort the
//! call with an `Err` instead, because they indicate a mismatched build
//! between caller and gadget that would desynchronize the shared
//! variable numbering if papered over.

mod sink;

pub use sink::{ReportSink, VecSink, WriteSink};

use core::fmt;
use std::io;

use bellpepper_core::SynthesisError;

use crate::gadget::{ContractError, Gadget, GadgetError, GadgetInstance, Sha256Compress};
use crate::messages::{
    assignment_report, constraints_report, ComponentReturn, Message,
};
use crate::params;
use crate::protoboard::Protoboard;
use crate::ser::SerError;

/// Top-level failure of one invocation.
///
/// `Ok` means the computation finished and the response (when a sink
/// was supplied) was delivered; protocol-level failures travel inside
/// the response envelope, not here.
#[derive(Debug)]
pub enum CallError {
    /// Fatal caller/gadget contract violation; no response was sent.
    Contract(ContractError),
    /// The circuit library failed to synthesize; no response was sent.
    Synthesis(SynthesisError),
    /// A report or response failed to encode.
    Encoding(SerError),
    /// A sink refused a message.
    Delivery(io::Error),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Contract(err) => write!(f, "contract violation: {err}"),
            CallError::Synthesis(err) => write!(f, "synthesis failed: {err}"),
            CallError::Encoding(err) => write!(f, "encoding failed: {err}"),
            CallError::Delivery(err) => write!(f, "message delivery failed: {err}"),
        }
    }
}

impl std::error::Error for CallError {}

impl From<ContractError> for CallError {
    fn from(err: ContractError) -> Self {
        CallError::Contract(err)
    }
}

impl From<GadgetError> for CallError {
    fn from(err: GadgetError) -> Self {
        match err {
            GadgetError::Contract(err) => CallError::Contract(err),
            GadgetError::Synthesis(err) => CallError::Synthesis(err),
        }
    }
}

impl From<SerError> for CallError {
    fn from(err: SerError) -> Self {
        CallError::Encoding(err)
    }
}

/// Convenient alias for dispatcher results.
pub type CallResult<T> = core::result::Result<T, CallError>;

/// Invokes the built-in SHA-256 compression gadget on a serialized
/// component call.
///
/// `report_sink` receives zero or more streamed reports; `response_sink`
/// receives the single final [`ComponentReturn`]. Either sink may be
/// `None`, in which case the corresponding messages are never encoded.
pub fn call_gadget(
    request: &[u8],
    report_sink: Option<&mut dyn ReportSink>,
    response_sink: Option<&mut dyn ReportSink>,
) -> CallResult<()> {
    dispatch_call(request, report_sink, response_sink, Sha256Compress::from_instance)
}

/// Runs the invocation state machine for any gadget variant.
///
/// `construct` builds the gadget from the decoded instance, performing
/// its arity checks; it is the seam through which future gadget kinds
/// share this dispatcher.
pub fn dispatch_call<G, F>(
    request: &[u8],
    mut report_sink: Option<&mut dyn ReportSink>,
    response_sink: Option<&mut dyn ReportSink>,
    construct: F,
) -> CallResult<()>
where
    G: Gadget,
    F: FnOnce(&GadgetInstance) -> Result<G, ContractError>,
{
    // Validate. Anything that is not a well-formed component call is a
    // protocol error answered through the response channel.
    let call = match Message::decode(request) {
        Ok(Message::Call(call)) => call,
        Ok(_) => {
            return respond_error(response_sink, "unexpected message type".to_string());
        }
        Err(err) => {
            return respond_error(response_sink, format!("malformed request: {err}"));
        }
    };

    params::ensure_init();

    let mut gadget = construct(&call.instance)?;
    let mut pb = Protoboard::new();

    // Declaration always runs so `free_variable_id_after` does not
    // depend on which phases the caller requested.
    gadget.generate_constraints(&mut pb)?;

    if call.generate_r1cs {
        if let Some(sink) = report_sink.as_deref_mut() {
            let report = constraints_report(
                &call.instance,
                &pb,
                gadget.num_inputs(),
                gadget.num_outputs(),
            );
            let bytes = Message::Constraints(report).encode()?;
            sink.accept(&bytes).map_err(CallError::Delivery)?;
        }
    }

    let mut outputs = None;
    if call.generate_assignment {
        let values = gadget.generate_witness(&mut pb, &call.inputs)?;
        if let Some(sink) = report_sink.as_deref_mut() {
            let report = assignment_report(
                &call.instance,
                &pb,
                gadget.num_inputs(),
                gadget.num_outputs(),
            );
            let bytes = Message::Assignment(report).encode()?;
            sink.accept(&bytes).map_err(CallError::Delivery)?;
        }
        outputs = Some(values);
    }

    // Finalize.
    let locals = pb.num_variables() - gadget.num_inputs() - gadget.num_outputs();
    deliver(
        response_sink,
        ComponentReturn {
            free_variable_id_after: call.instance.free_variable_id_before + locals as u64,
            error: None,
            outputs,
        },
    )
}

fn respond_error(response_sink: Option<&mut dyn ReportSink>, message: String) -> CallResult<()> {
    deliver(
        response_sink,
        ComponentReturn {
            free_variable_id_after: 0,
            error: Some(message),
            outputs: None,
        },
    )
}

fn deliver(response_sink: Option<&mut dyn ReportSink>, ret: ComponentReturn) -> CallResult<()> {
    if let Some(sink) = response_sink {
        let bytes = Message::Return(ret).encode()?;
        sink.accept(&bytes).map_err(CallError::Delivery)?;
    }
    Ok(())
}
