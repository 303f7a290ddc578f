//! Human-readable narrative of a claim attempt.

use std::sync::{Mutex, PoisonError};

/// Prefix on every narrative line.
pub const TRACE_PREFIX: &str = "[Agent]: ";

/// Receives narrative lines as they are produced.
///
/// Called synchronously at each state transition of the attempt, before the next
/// network operation starts.
pub trait TraceSink: Send + Sync {
    fn on_log(&self, line: &str);
}

impl<F> TraceSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_log(&self, line: &str) {
        self(line)
    }
}

/// Collects lines in memory.
impl TraceSink for Mutex<Vec<String>> {
    fn on_log(&self, line: &str) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn on_log(&self, _line: &str) {}
}

/// Lines of one attempt. A new trace is started for every attempt.
pub(crate) struct NegotiationTrace<'a> {
    sink: &'a dyn TraceSink,
    lines: Vec<String>,
}

impl<'a> NegotiationTrace<'a> {
    pub fn new(sink: &'a dyn TraceSink) -> Self {
        Self {
            sink,
            lines: Vec::new(),
        }
    }

    pub fn log<S: AsRef<str>>(&mut self, message: S) {
        let line = format!("{TRACE_PREFIX}{}", message.as_ref());
        tracing::info!(target: "x402_claim_agent::trace", "{line}");
        self.sink.on_log(&line);
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Announces that the agent is watching for attestations.
pub fn start_monitoring(sink: &dyn TraceSink) {
    let line = format!("{TRACE_PREFIX}Monitoring stress levels...");
    tracing::info!(target: "x402_claim_agent::trace", "{line}");
    sink.on_log(&line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_prefixed_and_forwarded() {
        let sink = Mutex::new(Vec::new());
        let mut trace = NegotiationTrace::new(&sink);
        trace.log("EZKL Proof detected. Initializing X402 handshake...");
        trace.log(String::from("done"));

        let lines = trace.into_lines();
        assert_eq!(
            lines,
            vec![
                "[Agent]: EZKL Proof detected. Initializing X402 handshake...".to_string(),
                "[Agent]: done".to_string(),
            ]
        );
        assert_eq!(*sink.lock().unwrap(), lines);
    }

    #[test]
    fn test_poisoned_sink_keeps_lines() {
        let sink = Mutex::new(vec!["[Agent]: before".to_string()]);
        let _ = std::panic::catch_unwind(|| {
            let _guard = sink.lock().unwrap();
            panic!("poison the sink");
        });
        assert!(sink.is_poisoned());

        let mut trace = NegotiationTrace::new(&sink);
        trace.log("after");
        let lines = sink.into_inner().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(lines, vec!["[Agent]: before", "[Agent]: after"]);
    }

    #[test]
    fn test_start_monitoring() {
        let sink = Mutex::new(Vec::new());
        start_monitoring(&sink);
        start_monitoring(&NoTrace);
        assert_eq!(
            *sink.lock().unwrap(),
            vec!["[Agent]: Monitoring stress levels...".to_string()]
        );
    }
}
