//! Indentation-aware PHP source emission.
//!
//! [`PhpEmitter`] accumulates the PHP source of one output file. Static HTML
//! handed over by the template compilers is collected in a literal buffer and
//! written as a single `$html .= "...";` statement right before the next
//! statement, so adjacent markup fragments never become one statement each.

/// One level of indentation in generated code.
pub const INDENT: &str = "    ";

/// Name of the output buffer variable inside every generated render function.
pub const HTML_VAR: &str = "$html";

/// Stateful PHP source writer.
#[derive(Debug, Default)]
pub struct PhpEmitter {
    /// The generated code.
    code: String,
    /// Current indentation depth.
    indent: usize,
    /// Pending static HTML, not yet written as a statement.
    literal: String,
    /// Prefix applied by [`PhpEmitter::begin_namespace`].
    ns_prefix: String,
}

impl PhpEmitter {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an emitter for a standalone file.
    ///
    /// With `emit_header` the output starts with the `<?php` open tag.
    pub fn with_header(emit_header: bool, ns_prefix: impl Into<String>) -> Self {
        let mut emitter = Self {
            ns_prefix: ns_prefix.into(),
            ..Self::default()
        };
        if emit_header {
            emitter.write_line("<?php");
        }
        emitter
    }

    /// The namespace prefix of this emitter.
    pub fn ns_prefix(&self) -> &str {
        &self.ns_prefix
    }

    /// Current indentation depth.
    pub fn depth(&self) -> usize {
        self.indent
    }

    fn at_line_start(&self) -> bool {
        self.code.is_empty() || self.code.ends_with('\n')
    }

    fn push(&mut self, code: &str) {
        if code.is_empty() {
            return;
        }
        if self.at_line_start() {
            for _ in 0..self.indent {
                self.code.push_str(INDENT);
            }
        }
        self.code.push_str(code);
    }

    /// Append code to the current line.
    pub fn write(&mut self, code: &str) {
        self.flush_html_literal();
        self.push(code);
    }

    /// Write a complete statement on its own line.
    pub fn write_line(&mut self, code: &str) {
        self.flush_html_literal();
        self.carriage_return();
        self.push(code);
        self.code.push('\n');
    }

    /// Write each line of `text` as its own line.
    pub fn write_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.write_line(line);
        }
    }

    /// Start `code` on a fresh line, leaving the line open.
    pub fn next_line(&mut self, code: &str) {
        self.flush_html_literal();
        self.carriage_return();
        self.push(code);
    }

    /// Finish the current line with `code`.
    pub fn feed_line(&mut self, code: &str) {
        self.write(code);
        self.code.push('\n');
    }

    /// Break the current line unless already at a line start.
    pub fn carriage_return(&mut self) {
        if !self.at_line_start() {
            self.code.push('\n');
        }
    }

    /// Increase the indentation depth.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease the indentation depth.
    pub fn unindent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Queue static HTML to be emitted with the next statement.
    pub fn buffer_html_literal(&mut self, html: &str) {
        self.literal.push_str(html);
    }

    /// Whether static HTML is waiting to be flushed.
    pub fn has_pending_literal(&self) -> bool {
        !self.literal.is_empty()
    }

    /// Append the value of a PHP expression to the output buffer.
    pub fn write_html(&mut self, code: &str) {
        self.write_line(&format!("{} .= {};", HTML_VAR, code));
    }

    /// Emit the serialized render data as an HTML comment.
    pub fn write_data_comment(&mut self) {
        self.write_html("\"<!--s-data:\" . _::json_encode($ctx->data) . \"-->\"");
    }

    /// Write pending static HTML as one statement.
    pub fn flush_html_literal(&mut self) {
        if self.literal.is_empty() {
            return;
        }
        let literal = std::mem::take(&mut self.literal);
        self.write_html(&string_literal(&literal));
    }

    /// Open a namespace block; the emitter prefix is prepended.
    pub fn begin_namespace(&mut self, ns: &str) {
        let full = format!("{}{}", self.ns_prefix, ns);
        let full = full.trim_matches('\\');
        if full.is_empty() {
            self.write_line("namespace {");
        } else {
            self.write_line(&format!("namespace {} {{", full));
        }
        self.indent();
    }

    /// Close the current namespace block.
    pub fn end_namespace(&mut self) {
        self.end_block();
    }

    /// Write a namespace block around `body`.
    pub fn write_namespace<R>(&mut self, ns: &str, body: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_namespace(ns);
        let ret = body(self);
        self.end_namespace();
        ret
    }

    pub fn write_switch<R>(&mut self, expr: &str, body: impl FnOnce(&mut Self) -> R) -> R {
        self.write_block(&format!("switch ({})", expr), body)
    }

    /// Write a `case` label; `body` is indented under it.
    pub fn write_case<R>(&mut self, expr: &str, body: impl FnOnce(&mut Self) -> R) -> R {
        self.write_line(&format!("case {}:", expr));
        self.indented(body)
    }

    /// Write a `default` label; `body` is indented under it.
    pub fn write_default<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        self.write_line("default:");
        self.indented(body)
    }

    pub fn write_break(&mut self) {
        self.write_line("break;");
    }

    fn indented<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        self.indent();
        let ret = body(self);
        self.flush_html_literal();
        self.unindent();
        ret
    }

    /// Write a function definition.
    ///
    /// The header continues the current line, so a closure can be assigned
    /// with `next_line("$f = ")` followed by this call and `feed_line(";")`.
    /// The closing brace is left open on its line.
    pub fn write_function<R>(
        &mut self,
        name: &str,
        args: &[&str],
        uses: &[&str],
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let head = if name.is_empty() {
            "function ".to_string()
        } else {
            format!("function {}", name)
        };
        let uses = if uses.is_empty() {
            String::new()
        } else {
            format!("use ({}) ", uses.join(", "))
        };
        self.feed_line(&format!("{}({}) {}{{", head, args.join(", "), uses));
        let ret = self.indented(body);
        self.next_line("}");
        ret
    }

    /// Write a closure definition, see [`PhpEmitter::write_function`].
    pub fn write_anonymous_function<R>(
        &mut self,
        args: &[&str],
        uses: &[&str],
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.write_function("", args, uses, body)
    }

    pub fn write_function_call(&mut self, name: &str, args: &[String]) {
        self.write(&format!("{}({})", name, args.join(", ")));
    }

    pub fn write_if<R>(&mut self, expr: &str, body: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_if(expr);
        let ret = body(self);
        self.end_if();
        ret
    }

    pub fn begin_if(&mut self, expr: &str) {
        self.begin_block(&format!("if ({})", expr));
    }

    pub fn begin_else_if(&mut self, expr: &str) {
        self.begin_block(&format!("else if ({})", expr));
    }

    pub fn begin_else(&mut self) {
        self.begin_block("else");
    }

    pub fn end_if(&mut self) {
        self.end_block();
    }

    pub fn write_foreach<R>(&mut self, expr: &str, body: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_foreach(expr);
        let ret = body(self);
        self.end_foreach();
        ret
    }

    pub fn begin_foreach(&mut self, expr: &str) {
        self.begin_block(&format!("foreach ({})", expr));
    }

    pub fn end_foreach(&mut self) {
        self.end_block();
    }

    pub fn write_continue(&mut self) {
        self.write_line("continue;");
    }

    pub fn write_block<R>(&mut self, expr: &str, body: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_block(expr);
        let ret = body(self);
        self.end_block();
        ret
    }

    pub fn begin_block(&mut self, expr: &str) {
        self.write_line(&format!("{} {{", expr));
        self.indent();
    }

    /// Close a block. Pending HTML is flushed inside the block first.
    pub fn end_block(&mut self) {
        self.flush_html_literal();
        self.unindent();
        self.write_line("}");
    }

    /// The code written so far, pending literals excluded.
    pub fn full_text(&self) -> &str {
        &self.code
    }

    /// Flush pending literals and return the generated code.
    pub fn finish(mut self) -> String {
        self.flush_html_literal();
        self.code
    }
}

/// Quote `source` as a double-quoted PHP string literal.
pub fn string_literal(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 2);
    out.push('"');
    for c in source.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
