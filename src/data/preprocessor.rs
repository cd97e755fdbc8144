// ============================================================
// Layer 4: Text Preprocessor
// ============================================================
// Cleans the question and the context before they are embedded
// in the single-sentence wrapper handed to the tokenizer.
//
// Pasted passages often contain:
//   - Non-breaking spaces (U+00A0) and zero-width spaces (U+200B)
//   - Byte order marks (U+FEFF)
//   - Tabs, carriage returns and line breaks
//   - Control characters
//   - Runs of spaces from indentation
//
// The wrapper is one sentence, so all of these become a single
// ASCII space and the result is one trimmed line.
//
// Reference: Rust Book §8 (Strings in Rust)

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Normalise `text` into a single line with single spaces.
    pub fn clean(&self, text: &str) -> String {
        let mut out        = String::with_capacity(text.len());
        let mut last_space = true;

        for c in text.chars() {
            let c = match c {
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_whitespace() || c.is_control() => ' ',
                c => c,
            };

            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        out.trim_end().to_string()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
