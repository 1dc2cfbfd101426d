/// Length-bounded text splitting for synthesis providers.
///
/// Paragraphs (blank-line separated, i.e. inning boundaries) are packed
/// greedily; a paragraph that alone exceeds the ceiling is split at sentence
/// ends, a sentence that still exceeds it at whitespace, and a single word
/// longer than the ceiling is cut at character boundaries.

const PARAGRAPH_BREAK: &str = "\n\n";

/// Split `text` into chunks of at most `max_len` characters, in order.
///
/// `max_len == 0` means no ceiling. Blank input yields no chunks.
pub fn split_for_synthesis(text: &str, max_len: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if max_len == 0 || char_len(text) <= max_len {
        return vec![text.to_string()];
    }

    let mut packer = Packer::new(max_len);
    for paragraph in paragraphs(text) {
        if char_len(paragraph) <= max_len {
            packer.add(paragraph, PARAGRAPH_BREAK);
            continue;
        }
        packer.flush();
        let mut inner = Packer::new(max_len);
        for sentence in sentences(paragraph) {
            if char_len(sentence) <= max_len {
                inner.add(sentence, " ");
                continue;
            }
            inner.flush();
            for word in sentence.split_whitespace() {
                if char_len(word) <= max_len {
                    inner.add(word, " ");
                } else {
                    inner.flush();
                    inner.chunks.extend(hard_split(word, max_len));
                }
            }
            inner.flush();
        }
        packer.extend(inner.finish());
    }
    packer.finish()
}

struct Packer {
    max_len: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl Packer {
    fn new(max_len: usize) -> Self {
        Self {
            max_len,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    /// Append `piece` (already within the ceiling), starting a new chunk
    /// when it would not fit.
    fn add(&mut self, piece: &str, separator: &str) {
        let piece_len = char_len(piece);
        if self.current.is_empty() {
            self.current.push_str(piece);
            self.current_len = piece_len;
            return;
        }
        let joined = self.current_len + char_len(separator) + piece_len;
        if joined <= self.max_len {
            self.current.push_str(separator);
            self.current.push_str(piece);
            self.current_len = joined;
        } else {
            self.flush();
            self.current.push_str(piece);
            self.current_len = piece_len;
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn extend(&mut self, chunks: Vec<String>) {
        self.flush();
        self.chunks.extend(chunks);
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split(PARAGRAPH_BREAK)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Sentences end at '.', '!' or '?' followed by whitespace or the end.
fn sentences(paragraph: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_break = match chars.peek() {
            Some((_, next)) => next.is_whitespace(),
            None => true,
        };
        if at_break {
            let end = i + c.len_utf8();
            let sentence = paragraph[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }
    }
    let rest = paragraph[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

fn hard_split(word: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_len)
        .map(|piece| piece.iter().collect())
        .collect()
}
