/// Streaming line-ending normalizer: CRLF and lone CR become LF.
///
/// Input may be fed in arbitrary chunks; a CR at the end of one chunk is held back until the next
/// byte (or [`LineEndings::finish`]) decides whether it starts a CRLF pair.
#[derive(Debug, Default)]
pub struct LineEndings {
    pending_cr: bool,
}

impl LineEndings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<u8>) {
        out.reserve(chunk.len());
        for &byte in chunk {
            if self.pending_cr {
                self.pending_cr = false;
                out.push(b'\n');
                if byte == b'\n' {
                    continue;
                }
            }
            if byte == b'\r' {
                self.pending_cr = true;
            } else {
                out.push(byte);
            }
        }
    }

    pub fn finish(&mut self, out: &mut Vec<u8>) {
        if std::mem::take(&mut self.pending_cr) {
            out.push(b'\n');
        }
    }
}
