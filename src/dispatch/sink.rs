use std::io;

/// Consumer of serialized protocol messages.
///
/// Sinks run synchronously on the dispatcher's call stack; a sink that
/// blocks, blocks the whole invocation. Passing `None` where a sink is
/// expected skips the corresponding encode and emit step entirely.
pub trait ReportSink {
    /// Accepts one complete size-prefixed message buffer.
    fn accept(&mut self, message: &[u8]) -> io::Result<()>;
}

/// In-memory sink collecting every message, mainly for tests and
/// in-process hosts.
#[derive(Debug, Default)]
pub struct VecSink {
    messages: Vec<Vec<u8>>,
}

impl VecSink {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far, in delivery order.
    pub fn messages(&self) -> &[Vec<u8>] {
        &self.messages
    }

    /// Consumes the sink and returns the collected messages.
    pub fn into_messages(self) -> Vec<Vec<u8>> {
        self.messages
    }

    /// Number of messages accepted so far.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if no message was accepted yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl ReportSink for VecSink {
    fn accept(&mut self, message: &[u8]) -> io::Result<()> {
        self.messages.push(message.to_vec());
        Ok(())
    }
}

/// Sink forwarding each message to an [`io::Write`] transport. Messages
/// keep their size prefix, so the receiving end can reframe the stream.
#[derive(Debug)]
pub struct WriteSink<W: io::Write> {
    writer: W,
}

impl<W: io::Write> WriteSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> ReportSink for WriteSink<W> {
    fn accept(&mut self, message: &[u8]) -> io::Result<()> {
        self.writer.write_all(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_preserves_delivery_order() {
        let mut sink = VecSink::new();
        sink.accept(&[1]).unwrap();
        sink.accept(&[2, 3]).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.messages(), &[vec![1], vec![2, 3]]);
    }

    #[test]
    fn write_sink_concatenates_frames() {
        let mut sink = WriteSink::new(Vec::new());
        sink.accept(&[1, 2]).unwrap();
        sink.accept(&[3]).unwrap();
        assert_eq!(sink.into_inner(), vec![1, 2, 3]);
    }
}
