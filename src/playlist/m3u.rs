//! Reader for extended M3U / M3U8 playlists.
//!
//! Only the parts needed to rebuild an album are understood: `#EXTINF`
//! directives (duration and title) and the media reference that follows them.
//! Every other `#` line is ignored.

const EXTINF: &str = "#EXTINF:";

/// One media reference read from the playlist, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M3uEntry {
    /// Raw reference exactly as written (URI, absolute path or bare file name).
    pub reference: String,
    pub title: String,
    pub duration: Option<u32>,
    /// 1-based line of the reference.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum M3uSyntaxError {
    #[error("line {line}: malformed #EXTINF directive: {reason}")]
    MalformedExtinf { line: usize, reason: String },
}

struct ExtInf {
    line: usize,
    title: String,
    duration: Option<u32>,
}

/// Split `info,title` on the first comma outside double quotes, so quoted
/// attribute values may contain commas.
fn split_info_and_title(body: &str) -> (&str, &str) {
    let mut in_quotes = false;
    for (index, c) in body.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return (&body[..index], &body[index + 1..]),
            _ => {}
        }
    }
    (body, "")
}

fn parse_extinf(line: usize, body: &str) -> Result<ExtInf, M3uSyntaxError> {
    let malformed = |reason: String| M3uSyntaxError::MalformedExtinf { line, reason };

    let (info, title) = split_info_and_title(body);
    // Attributes such as `tvg-id="..."` may follow the duration.
    let duration_token = info
        .split_whitespace()
        .next()
        .ok_or_else(|| malformed("missing duration".to_string()))?;

    let seconds: f64 = duration_token
        .parse()
        .map_err(|_| malformed(format!("invalid duration '{}'", duration_token)))?;
    if !seconds.is_finite() {
        return Err(malformed(format!("invalid duration '{}'", duration_token)));
    }

    // -1 is the conventional "unknown" marker.
    let duration = if seconds < 0.0 {
        None
    } else {
        Some(seconds.trunc().min(u32::MAX as f64) as u32)
    };

    Ok(ExtInf {
        line,
        title: title.trim().to_string(),
        duration,
    })
}

/// Parse playlist text into its ordered entries.
pub fn parse_entries(contents: &str) -> Result<Vec<M3uEntry>, M3uSyntaxError> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    let mut entries = Vec::new();
    let mut pending: Option<ExtInf> = None;

    for (index, raw_line) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(body) = line.strip_prefix(EXTINF) {
            if let Some(previous) = pending.replace(parse_extinf(line_number, body)?) {
                log::debug!(
                    "#EXTINF on line {} has no media reference, superseded by line {}",
                    previous.line,
                    line_number
                );
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let info = pending.take();
        entries.push(M3uEntry {
            reference: line.to_string(),
            title: info.as_ref().map(|i| i.title.clone()).unwrap_or_default(),
            duration: info.and_then(|i| i.duration),
            line: line_number,
        });
    }

    if let Some(info) = pending {
        log::warn!(
            "#EXTINF on line {} ('{}') has no media reference, ignoring it",
            info.line,
            info.title
        );
    }

    Ok(entries)
}
