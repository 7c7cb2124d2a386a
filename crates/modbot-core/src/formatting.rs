/// Split a plain-text reply into messages of at most `limit` bytes.
///
/// Splits happen on line boundaries; a single line longer than `limit` is cut
/// at a char boundary.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut out: Vec<String> = Vec::new();
    let mut chunk = String::new();
    // A chunk may begin with a blank line, so emptiness alone does not tell
    // whether the next line needs a separator.
    let mut started = false;

    for line in text.split('\n') {
        let sep = usize::from(started);
        if chunk.len() + sep + line.len() <= limit {
            if started {
                chunk.push('\n');
            }
            chunk.push_str(line);
            started = true;
            continue;
        }

        if started {
            flush_chunk(&mut out, &mut chunk);
        }

        let mut rest = line;
        while rest.len() > limit {
            let (head, tail) = split_utf8_prefix(rest, limit);
            out.push(head.to_string());
            rest = tail;
        }
        chunk.push_str(rest);
        started = true;
    }

    if started {
        flush_chunk(&mut out, &mut chunk);
    }
    out
}

/// Empty chunks are dropped: the platform rejects empty messages.
fn flush_chunk(out: &mut Vec<String>, chunk: &mut String) {
    if !chunk.is_empty() {
        out.push(std::mem::take(chunk));
    }
}

fn split_utf8_prefix(s: &str, max_bytes: usize) -> (&str, &str) {
    let mut idx = max_bytes.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    if idx == 0 {
        // First char is wider than the limit; emit it alone.
        idx = s.chars().next().map(char::len_utf8).unwrap_or(s.len());
    }
    s.split_at(idx)
}
