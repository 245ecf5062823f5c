/// Accumulates description lines. Columns are separated by a single tab so a
/// later pass can align them.
#[derive(Debug, Clone, Default)]
pub struct PrefixWriter {
    lines: Vec<String>,
}

impl PrefixWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, prefix: &str, text: impl AsRef<str>) {
        self.lines.push(format!("{}{}", prefix, text.as_ref()));
    }

    /// Writes `label:<TAB>value`.
    pub fn field(&mut self, prefix: &str, label: &str, value: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}:\t{}", prefix, label, value.as_ref()));
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Joins the lines, dropping trailing blank or whitespace-only lines.
    pub fn finish(mut self) -> String {
        while self
            .lines
            .last()
            .map_or(false, |line| line.trim().is_empty())
        {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_trims_trailing_blank_lines() {
        let mut w = PrefixWriter::new();
        w.field("", "Name", "frontend");
        w.field("  ", "Image", "<default>");
        w.blank();
        w.line("", "  \t ");
        assert_eq!(w.finish(), "Name:\tfrontend\n  Image:\t<default>\n");
    }

    #[test]
    fn test_finish_empty() {
        let mut w = PrefixWriter::new();
        w.blank();
        assert_eq!(w.finish(), "");
    }
}
