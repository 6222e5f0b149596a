//! Decoding of raw emulator output into plain text lines.

use vte::Perform;

/// Turns one raw line into the text a console would show.
///
/// Bytes go through a VTE state machine so colour and cursor sequences are
/// dropped and invalid UTF-8 becomes U+FFFD instead of failing the read.
#[derive(Debug, Default)]
pub struct LineDecoder {
    text: String,
}

impl LineDecoder {
    /// Create a decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes`, without the trailing line terminator.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.text.clear();
        let mut parser = vte::Parser::new();
        for byte in bytes {
            parser.advance(self, *byte);
        }
        let end = self.text.trim_end_matches(['\r', '\n']).len();
        self.text.truncate(end);
        std::mem::take(&mut self.text)
    }
}

impl Perform for LineDecoder {
    fn print(&mut self, c: char) {
        self.text.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            // Backspace
            0x08 => {
                self.text.pop();
            }
            b'\t' => self.text.push('\t'),
            _ => {}
        }
    }
}
