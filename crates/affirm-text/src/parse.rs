//! Line-oriented importer.
//!
//! Pipeline:
//!   raw &str
//!     └─ classify()     → Line (blank | comment | marker | text)
//!          └─ Builder   → accumulate numbered / plain entries
//!               └─ finish → Vec<Entry>

/// One candidate affirmation recovered from the payload. Validation happens
/// later, in the use-case layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
  /// 1-based line number where the entry starts.
  pub line: usize,
  /// Entry text; continuation lines are joined with `\n`.
  pub text: String,
}

// ─── Line classification ─────────────────────────────────────────────────────

enum Line<'a> {
  Blank,
  Comment,
  /// A numbered marker; carries the text after it.
  Marker(&'a str),
  Text(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    Line::Blank
  } else if trimmed.starts_with('#') {
    Line::Comment
  } else if let Some(rest) = numbered_marker(trimmed) {
    Line::Marker(rest)
  } else {
    Line::Text(trimmed)
  }
}

/// Recognise `<digits>. ` or `<digits>) ` at the start of `s` and return the
/// remainder. `1.5 cups` is not a marker: the separator must be followed by
/// whitespace or the end of the line.
pub(crate) fn numbered_marker(s: &str) -> Option<&str> {
  let digits = s.bytes().take_while(u8::is_ascii_digit).count();
  if digits == 0 || digits > 6 {
    return None;
  }
  let rest = &s[digits..];
  let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
  if rest.is_empty() || rest.starts_with(char::is_whitespace) {
    Some(rest.trim())
  } else {
    None
  }
}

/// A continuation line may be escaped with a leading `\` so that text which
/// looks like a comment or a marker, is blank, or carries its own leading or
/// trailing whitespace survives an export round trip verbatim.
fn unescape_continuation(raw: &str) -> Option<&str> {
  raw.trim_start().strip_prefix('\\')
}

// ─── Builder ─────────────────────────────────────────────────────────────────

struct Pending {
  line:     usize,
  lines:    Vec<String>,
  numbered: bool,
}

#[derive(Default)]
struct Builder {
  current: Option<Pending>,
  entries: Vec<Entry>,
}

impl Builder {
  fn flush(&mut self) {
    if let Some(p) = self.current.take() {
      let text = p.lines.join("\n").trim().to_owned();
      // A bare marker with nothing after it still yields an (empty) entry so
      // the caller can report it as rejected rather than dropping it silently.
      if p.numbered || !text.is_empty() {
        self.entries.push(Entry { line: p.line, text });
      }
    }
  }

  fn start(&mut self, line: usize, text: &str, numbered: bool) {
    self.flush();
    self.current = Some(Pending {
      line,
      lines: vec![text.to_owned()],
      numbered,
    });
  }

  fn in_numbered_entry(&self) -> bool {
    self.current.as_ref().is_some_and(|p| p.numbered)
  }

  fn continue_with(&mut self, text: &str) {
    if let Some(p) = self.current.as_mut() {
      p.lines.push(text.to_owned());
    }
  }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Split `input` into candidate entries.
///
/// Comment lines are skipped wherever they appear and do not end the entry
/// they interrupt. Blank lines end a numbered entry. Outside a numbered
/// entry, every text line is an entry of its own.
pub fn parse(input: &str) -> Vec<Entry> {
  let input = input.strip_prefix('\u{feff}').unwrap_or(input);
  let mut builder = Builder::default();

  for (idx, raw) in input.split('\n').enumerate() {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);
    let line_no = idx + 1;

    if builder.in_numbered_entry()
      && let Some(escaped) = unescape_continuation(raw)
    {
      builder.continue_with(escaped);
      continue;
    }

    match classify(raw) {
      Line::Blank => builder.flush(),
      Line::Comment => {}
      Line::Marker(rest) => builder.start(line_no, rest, true),
      Line::Text(text) if builder.in_numbered_entry() => {
        builder.continue_with(text);
      }
      Line::Text(text) => builder.start(line_no, text, false),
    }
  }

  builder.flush();
  builder.entries
}
