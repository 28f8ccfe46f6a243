//! Sanitization of server-provided text before it reaches the terminal.
//!
//! Keywords, summaries, recommendations and error details all come from the
//! analysis backend. Terminal emulators act on escape sequences embedded in
//! such text (clipboard writes, hyperlinks, cursor movement), so every string
//! from the response is filtered here before it is rendered.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

/// Where the scanner is inside an escape sequence.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Text,
    /// Just saw ESC.
    Escape,
    /// ESC followed by a charset/line-attribute introducer; one more char to drop.
    EscapeOperand,
    /// Inside `ESC [` or C1 CSI parameters.
    Csi,
    /// Inside an OSC string, terminated by BEL or ST.
    Osc,
    /// Inside DCS/PM/APC, terminated by ST.
    Str,
    /// Saw ESC inside an OSC/DCS string; `\` completes ST.
    StrEscape,
}

/// Strip escape sequences and control characters, keeping `\n`, `\t` and `\r`.
///
/// Returns the input unchanged (borrowed) when it contains nothing to strip.
///
/// ```
/// use lexcheck_types::sanitize_terminal_text;
///
/// assert_eq!(sanitize_terminal_text("GDPR"), "GDPR");
/// assert_eq!(sanitize_terminal_text("\x1b[31mGDPR\x1b[0m"), "GDPR");
/// ```
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_unsafe) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut state = Scan::Text;

    for c in input.chars() {
        state = match state {
            Scan::Text => match c {
                ESC => Scan::Escape,
                C1_CSI => Scan::Csi,
                c if is_unsafe(c) => Scan::Text,
                c => {
                    out.push(c);
                    Scan::Text
                }
            },
            Scan::Escape => match c {
                '[' => Scan::Csi,
                ']' => Scan::Osc,
                'P' | '^' | '_' => Scan::Str,
                '(' | ')' | '*' | '+' | '#' | ' ' => Scan::EscapeOperand,
                '7' | '8' | 'c' | 'D' | 'E' | 'H' | 'M' | 'N' | 'O' | 'Z' | '=' | '>' | '<' => {
                    Scan::Text
                }
                // Unknown sequence: drop the ESC and treat this char as text.
                c => {
                    if !is_unsafe(c) {
                        out.push(c);
                    }
                    Scan::Text
                }
            },
            Scan::EscapeOperand => Scan::Text,
            Scan::Csi => match c {
                '\x40'..='\x7e' => Scan::Text,
                '\x20'..='\x3f' => Scan::Csi,
                // Malformed: abandon the sequence and keep the char.
                c => {
                    if !is_unsafe(c) {
                        out.push(c);
                    }
                    Scan::Text
                }
            },
            Scan::Osc => match c {
                BEL => Scan::Text,
                ESC => Scan::StrEscape,
                _ => Scan::Osc,
            },
            Scan::Str => match c {
                ESC => Scan::StrEscape,
                _ => Scan::Str,
            },
            Scan::StrEscape => match c {
                '\\' => Scan::Text,
                ESC => Scan::StrEscape,
                _ => Scan::Str,
            },
        };
    }

    Cow::Owned(out)
}

fn is_unsafe(c: char) -> bool {
    let c0 = c <= '\x1f' && !matches!(c, '\n' | '\t' | '\r');
    let c1 = ('\u{0080}'..='\u{009f}').contains(&c);
    c0 || c1 || c == '\x7f'
}
