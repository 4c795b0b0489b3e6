//! Export writer. Output is always accepted by [`crate::parse`].

use affirm_core::affirmation::{Affirmation, sort_for_display};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::parse::numbered_marker;

/// Render `records` as a numbered list in presentation order, preceded by a
/// `#` metadata header.
///
/// Multi-line texts are written as continuation lines indented under their
/// marker. A continuation line that is blank, carries its own surrounding
/// whitespace, or would read as a comment or marker is escaped with a leading
/// `\`, so every text parses back unchanged. Inactive records carry a
/// `# inactive` comment, which the importer ignores.
pub fn serialize(records: &[Affirmation], exported_at: DateTime<Utc>) -> String {
  let mut ordered = records.to_vec();
  sort_for_display(&mut ordered);

  let mut out = String::new();
  out.push_str("# Affirm export\n");
  out.push_str(&format!(
    "# exported_at: {}\n",
    exported_at.to_rfc3339_opts(SecondsFormat::Secs, true)
  ));
  out.push_str(&format!("# count: {}\n", ordered.len()));
  out.push_str("#\n");

  for (i, record) in ordered.iter().enumerate() {
    if !record.is_active {
      out.push_str("# inactive\n");
    }

    let mut lines: Vec<&str> = record.text.trim().split('\n').collect();
    out.push_str(&format!("{}.", i + 1));
    // The marker line is trimmed on import, so a first line with trailing
    // whitespace moves down to an escaped continuation.
    if let Some(first) = lines.first().copied()
      && !first.is_empty()
      && first.trim_end() == first
    {
      out.push(' ');
      out.push_str(first);
      lines.remove(0);
    } else if lines.first().is_some_and(|l| l.is_empty()) {
      lines.remove(0);
    }
    out.push('\n');

    for line in lines {
      out.push_str("   ");
      if needs_escape(line) {
        out.push('\\');
      }
      out.push_str(line);
      out.push('\n');
    }
  }

  out
}

fn needs_escape(line: &str) -> bool {
  line.trim().is_empty()
    || line.trim() != line
    || line.starts_with('#')
    || line.starts_with('\\')
    || numbered_marker(line).is_some()
}
