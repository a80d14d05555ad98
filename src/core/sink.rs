//! Output surfaces for styled lines

use super::markup::StyledLine;

/// Anything that can display finished output lines
pub trait LineSink {
    /// Append a line at the end of the output and bring it into view
    fn push_line(&mut self, line: StyledLine);
}

/// In-memory sink, used for non-interactive runs and tests
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Vec<StyledLine>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> &[StyledLine] {
        &self.lines
    }

    /// Remove and return everything collected so far
    pub fn take(&mut self) -> Vec<StyledLine> {
        std::mem::take(&mut self.lines)
    }
}

impl LineSink for BufferSink {
    fn push_line(&mut self, line: StyledLine) {
        self.lines.push(line);
    }
}
