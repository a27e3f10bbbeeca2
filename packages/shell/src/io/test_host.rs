//! In-memory host for driving the shell loop in tests.

use std::collections::VecDeque;

use super::{InputLine, IoError, IoHost, Output, OutputStyle, PromptConfig, Signal};

/// Queued input is consumed in order; written output and prompts are kept
/// for inspection.
///
/// Signals are returned before input on every turn, the same order the
/// terminal host reports them.
#[derive(Debug, Default)]
pub struct TestHost {
    input_queue: VecDeque<String>,
    signal_queue: VecDeque<Signal>,
    output_buffer: Vec<Output>,
    prompts: Vec<PromptConfig>,
    flush_count: usize,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that will replay `lines` in order.
    pub fn with_inputs(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut host = Self::new();
        host.queue_inputs(lines);
        host
    }

    pub fn queue_input(&mut self, line: impl Into<String>) {
        self.input_queue.push_back(line.into());
    }

    pub fn queue_inputs(&mut self, lines: impl IntoIterator<Item = impl Into<String>>) {
        for line in lines {
            self.queue_input(line);
        }
    }

    pub fn queue_signal(&mut self, signal: Signal) {
        self.signal_queue.push_back(signal);
    }

    pub fn output(&self) -> &[Output] {
        &self.output_buffer
    }

    /// Text of every output written, concatenated.
    pub fn output_text(&self) -> String {
        self.output_buffer
            .iter()
            .map(|o| o.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn output_with_style(&self, style: OutputStyle) -> Vec<&str> {
        self.output_buffer
            .iter()
            .filter(|o| o.style == style)
            .map(|o| o.text.as_str())
            .collect()
    }

    /// Output written with [`OutputStyle::Normal`], i.e. command results.
    pub fn results(&self) -> Vec<&str> {
        self.output_with_style(OutputStyle::Normal)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.output_with_style(OutputStyle::Error)
    }

    pub fn last_prompt(&self) -> Option<&PromptConfig> {
        self.prompts.last()
    }

    /// Every prompt path shown, oldest first.
    pub fn prompt_paths(&self) -> Vec<&str> {
        self.prompts
            .iter()
            .map(|p| p.current_path.as_str())
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn has_pending_input(&self) -> bool {
        !self.input_queue.is_empty()
    }
}

impl IoHost for TestHost {
    fn wait_for_input(&mut self) -> Result<(), IoError> {
        Ok(())
    }

    fn read_input(&mut self) -> Result<Option<InputLine>, IoError> {
        match self.input_queue.pop_front() {
            Some(line) => Ok(Some(InputLine { line })),
            // an exhausted script ends the session like Ctrl+D would
            None if self.signal_queue.is_empty() => {
                self.signal_queue.push_back(Signal::Eof);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn read_signal(&mut self) -> Result<Option<Signal>, IoError> {
        Ok(self.signal_queue.pop_front())
    }

    fn write_output(&mut self, output: Output) -> Result<(), IoError> {
        self.output_buffer.push(output);
        Ok(())
    }

    fn write_prompt(&mut self, config: PromptConfig) -> Result<(), IoError> {
        self.prompts.push(config);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IoError> {
        self.flush_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_host_is_empty() {
        let host = TestHost::new();
        assert!(!host.has_pending_input());
        assert!(host.output().is_empty());
        assert!(host.last_prompt().is_none());
        assert_eq!(host.flush_count(), 0);
    }

    #[test]
    fn inputs_are_read_in_order() {
        let mut host = TestHost::with_inputs(["first", "second"]);
        assert_eq!(host.read_input().unwrap().unwrap().line, "first");
        assert_eq!(host.read_input().unwrap().unwrap().line, "second");
    }

    #[test]
    fn exhausted_input_queues_eof() {
        let mut host = TestHost::new();
        assert!(host.read_input().unwrap().is_none());
        assert!(matches!(host.read_signal().unwrap(), Some(Signal::Eof)));
        assert!(host.read_signal().unwrap().is_none());
    }

    #[test]
    fn signals_are_read_in_order() {
        let mut host = TestHost::new();
        host.queue_signal(Signal::Interrupt);
        host.queue_signal(Signal::Eof);
        assert!(matches!(host.read_signal().unwrap(), Some(Signal::Interrupt)));
        assert!(matches!(host.read_signal().unwrap(), Some(Signal::Eof)));
    }

    #[test]
    fn output_is_filtered_by_style() {
        let mut host = TestHost::new();
        host.write_output(Output::normal("listing\n")).unwrap();
        host.write_output(Output::error("oops")).unwrap();
        host.write_output(Output::info("bye")).unwrap();

        assert_eq!(host.results(), vec!["listing\n"]);
        assert_eq!(host.errors(), vec!["oops"]);
        assert_eq!(host.output_text(), "listing\noopsbye");
    }

    #[test]
    fn prompts_are_recorded() {
        let mut host = TestHost::new();
        for path in ["/", "/a"] {
            host.write_prompt(PromptConfig {
                current_path: path.to_string(),
                entry_count: 0,
            })
            .unwrap();
        }
        assert_eq!(host.prompt_paths(), vec!["/", "/a"]);
        assert_eq!(host.last_prompt().unwrap().current_path, "/a");
    }

    #[test]
    fn flush_is_counted() {
        let mut host = TestHost::new();
        host.flush().unwrap();
        host.flush().unwrap();
        assert_eq!(host.flush_count(), 2);
    }
}
