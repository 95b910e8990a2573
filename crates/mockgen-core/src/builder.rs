//! Indented text buffer for emitted C++.

/// Line-oriented C++ text builder.
#[derive(Debug, Default)]
pub struct CodeBuilder {
    output: String,
    indent: usize,
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation.
    pub fn writeln(&mut self, s: &str) {
        if !s.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str("    ");
            }
            self.output.push_str(s);
        }
        self.output.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write `{`, the lines produced by `body` one level deeper, then `}`.
    pub fn block(&mut self, body: impl FnOnce(&mut Self)) {
        self.writeln("{");
        self.indent();
        body(self);
        self.dedent();
        self.writeln("}");
    }

    /// Open `namespace expect { namespace a$ { ... ` on a single line.
    pub fn open_namespaces(&mut self, namespaces: &[String]) {
        let mut line = String::from("namespace expect {");
        for ns in namespaces {
            line.push_str(" namespace ");
            line.push_str(ns);
            line.push_str(" {");
        }
        self.writeln(&line);
    }

    /// Close what [`CodeBuilder::open_namespaces`] opened.
    pub fn close_namespaces(&mut self, namespaces: &[String]) {
        let line = vec!["}"; namespaces.len() + 1].join(" ");
        self.writeln(&line);
    }

    pub fn finish(self) -> String {
        self.output
    }
}
