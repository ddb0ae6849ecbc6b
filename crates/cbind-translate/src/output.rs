//! Nested text accumulation.
//!
//! An [`Output`] is a stack of string buffers. [`Output::scope`] pushes a
//! fresh buffer and returns a [`Scope`] guard that writes to it; the
//! buffer leaves the stack when the guard is finished, merged into its
//! parent, or dropped. Text written into a scope never reaches the parent
//! unless the scope is explicitly merged.

/// Stack of text buffers; the bottom buffer is the declaration's text.
#[derive(Debug)]
pub struct Output {
    stack: Vec<String>,
    indent_width: usize,
}

impl Output {
    #[must_use]
    pub fn new(indent_width: usize) -> Self {
        Self {
            stack: vec![String::new()],
            indent_width,
        }
    }

    /// Push a fresh accumulation scope.
    pub fn scope(&mut self) -> Scope<'_> {
        self.stack.push(String::new());
        let depth = self.stack.len();
        Scope {
            output: self,
            depth,
            closed: false,
        }
    }

    /// Number of open buffers, the bottom one included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Text accumulated in the top buffer.
    #[must_use]
    pub fn current(&self) -> &str {
        self.stack.last().map_or("", String::as_str)
    }

    pub fn line(&mut self, text: &str) {
        if let Some(top) = self.stack.last_mut() {
            top.push_str(text);
            top.push('\n');
        }
    }

    /// Text of the bottom buffer.
    #[must_use]
    pub fn into_text(mut self) -> String {
        self.stack.truncate(1);
        self.stack.pop().unwrap_or_default()
    }

    fn pop(&mut self, depth: usize) -> String {
        self.stack.truncate(depth);
        if self.stack.len() == depth && depth > 1 {
            self.stack.pop().unwrap_or_default()
        } else {
            String::new()
        }
    }
}

/// Guard for one pushed buffer; dropping it discards the buffer.
#[derive(Debug)]
pub struct Scope<'o> {
    output: &'o mut Output,
    depth: usize,
    closed: bool,
}

impl Scope<'_> {
    /// Append one line to this scope.
    pub fn line(&mut self, text: &str) {
        self.output.line(text);
    }

    /// Append several lines to this scope.
    pub fn lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line(line.as_ref());
        }
    }

    /// Append text that already carries its own line breaks.
    pub fn text(&mut self, text: &str) {
        if let Some(top) = self.output.stack.last_mut() {
            top.push_str(text);
        }
    }

    /// Text written so far, without closing the scope.
    #[must_use]
    pub fn data(&self) -> &str {
        self.output.current()
    }

    /// Push a nested scope on top of this one.
    pub fn scope(&mut self) -> Scope<'_> {
        self.output.scope()
    }

    /// Close the scope and hand its text to the caller.
    #[must_use]
    pub fn finish(mut self) -> String {
        self.closed = true;
        self.output.pop(self.depth)
    }

    /// Close the scope and append its text, indented one level, to the
    /// enclosing buffer.
    pub fn indented(mut self) {
        self.closed = true;
        let text = self.output.pop(self.depth);
        let pad = " ".repeat(self.output.indent_width);
        let mut merged = String::with_capacity(text.len() + pad.len() * 4);
        for line in text.lines() {
            if !line.is_empty() {
                merged.push_str(&pad);
                merged.push_str(line);
            }
            merged.push('\n');
        }
        if let Some(top) = self.output.stack.last_mut() {
            top.push_str(&merged);
        }
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.output.pop(self.depth);
        }
    }
}
