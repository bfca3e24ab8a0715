const INDENT: &str = "    ";

/// Line-oriented text buffer with brace-block indentation.
///
/// `blank()` only requests a separator: requests collapse, and a separator is
/// never emitted right after `{` or right before `}`.
#[derive(Debug)]
pub struct CodeWriter {
    out: String,
    depth: usize,
    pending_blank: bool,
    at_block_start: bool,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
            pending_blank: false,
            at_block_start: true,
        }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        if std::mem::take(&mut self.pending_blank) && !self.at_block_start {
            self.out.push('\n');
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
        self.at_block_start = false;
    }

    pub fn blank(&mut self) {
        self.pending_blank = true;
    }

    pub fn open(&mut self) {
        self.line("{");
        self.depth += 1;
        self.at_block_start = true;
    }

    pub fn close(&mut self) {
        self.pending_blank = false;
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
