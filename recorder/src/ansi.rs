//! Terminal control-sequence stripping for captured command output.
//!
//! Removes ECMA-48 control sequences introduced by `ESC [` or the
//! single-character C1 CSI (U+009B): parameter bytes (`0x30..=0x3F`), then
//! intermediate bytes (`0x20..=0x2F`), then one final byte (`0x40..=0x7E`).
//! Text outside sequences is preserved verbatim. Stripping is best-effort and
//! never fails; a sequence truncated at the end of input is dropped.

/// First and last CSI parameter bytes.
const PARAM_RANGE: (u32, u32) = (0x30, 0x3f);

/// First and last CSI intermediate bytes.
const INTERMEDIATE_RANGE: (u32, u32) = (0x20, 0x2f);

/// First and last CSI final bytes.
const FINAL_RANGE: (u32, u32) = (0x40, 0x7e);

/// Strips CSI control sequences from `input`.
///
/// Idempotent: stripping already-stripped text is a no-op.
///
/// # Example
///
/// ```
/// use oplog_recorder::ansi::strip_ansi;
///
/// assert_eq!(strip_ansi("\u{1b}[32mhi\u{1b}[0m\n"), "hi\n");
/// ```
#[must_use]
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let introduces_sequence = match c {
            '\u{1b}' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    true
                } else {
                    false
                }
            }
            '\u{9b}' => true,
            _ => false,
        };

        if !introduces_sequence {
            out.push(c);
            continue;
        }

        // Parameter bytes, then intermediate bytes. A byte outside both
        // ranges ends the scan; if it is a final byte it is consumed with
        // the sequence, otherwise the sequence is malformed and the byte
        // is treated as ordinary text on the next loop iteration.
        while let Some(&next) = chars.peek() {
            let code = next as u32;
            if in_range(code, PARAM_RANGE) || in_range(code, INTERMEDIATE_RANGE) {
                chars.next();
            } else {
                break;
            }
        }

        if let Some(&next) = chars.peek() {
            if in_range(next as u32, FINAL_RANGE) {
                chars.next();
            }
        }
    }

    out
}

fn in_range(code: u32, (lo, hi): (u32, u32)) -> bool {
    (lo..=hi).contains(&code)
}
