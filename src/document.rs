// ── On-disk text representation ────────────────────────────────────────────────
//
// Decodes file bytes into the `\n`-separated text handed to the rich-edit
// control, and encodes the control's text back into the exact on-disk form
// (encoding, BOM and line-ending convention) it was read in.  Pure Rust; no
// Win32 imports.  A file whose bytes do not match its BOM is rejected rather
// than decoded lossily, so saving never rewrites bytes the user did not touch.

use encoding_rs::{EncoderResult, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

use crate::error::{QuillError, Result};

// ── Encoding ──────────────────────────────────────────────────────────────────

/// The character encoding of the document on disk.
///
/// The in-memory representation is always a Rust `String`; this records what
/// encoding should be used when writing back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    /// UTF-8 without a byte-order mark.
    Utf8,
    /// UTF-8 preceded by `EF BB BF`.
    Utf8Bom,
    /// UTF-16 Little-Endian with BOM.
    Utf16Le,
    /// UTF-16 Big-Endian with BOM.
    Utf16Be,
    /// Single-byte text that is not valid UTF-8, read as Windows-1252 (the
    /// Western ANSI code page).  Every byte has a mapping, so unedited text
    /// round-trips.
    Ansi,
}

impl Encoding {
    /// Short display string for diagnostics.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf8Bom => "UTF-8 BOM",
            Self::Utf16Le => "UTF-16 LE",
            Self::Utf16Be => "UTF-16 BE",
            Self::Ansi => "ANSI",
        }
    }
}

// ── EOL mode ──────────────────────────────────────────────────────────────────

/// The end-of-line convention used by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EolMode {
    /// Windows-style `\r\n`.
    Crlf,
    /// Unix-style `\n`.
    Lf,
    /// Old Mac-style `\r`.
    Cr,
}

impl EolMode {
    /// Short display string for diagnostics.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "CRLF",
            Self::Lf => "LF",
            Self::Cr => "CR",
        }
    }

    fn sequence(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
            Self::Cr => "\r",
        }
    }
}

// ── Decode ────────────────────────────────────────────────────────────────────

/// Result of reading a file: its text with `\n` line breaks plus what is
/// needed to write it back unchanged.
#[derive(Debug)]
pub(crate) struct Decoded {
    pub(crate) text: String,
    pub(crate) encoding: Encoding,
    pub(crate) eol: EolMode,
}

/// Detect the encoding and line-ending convention of `bytes` and decode them.
///
/// Encoding detection order:
/// 1. UTF-16 LE BOM (`FF FE`)
/// 2. UTF-16 BE BOM (`FE FF`)
/// 3. UTF-8 BOM (`EF BB BF`)
/// 4. Heuristic: if the bytes are valid UTF-8, treat as UTF-8
/// 5. Fallback: ANSI (Windows-1252)
///
/// Fails with `QuillError::Malformed` when the payload after a BOM is not
/// valid in the encoding the BOM announces.
pub(crate) fn decode(bytes: &[u8]) -> Result<Decoded> {
    let (encoding, raw) = detect_and_decode(bytes)?;
    let eol = detect_eol(&raw);
    Ok(Decoded {
        text: normalize_newlines(&raw),
        encoding,
        eol,
    })
}

fn detect_and_decode(bytes: &[u8]) -> Result<(Encoding, String)> {
    let boms: [(&[u8], Encoding, &'static encoding_rs::Encoding); 3] = [
        (&[0xFF, 0xFE], Encoding::Utf16Le, UTF_16LE),
        (&[0xFE, 0xFF], Encoding::Utf16Be, UTF_16BE),
        (&[0xEF, 0xBB, 0xBF], Encoding::Utf8Bom, UTF_8),
    ];
    for (bom, encoding, codec) in boms {
        if let Some(payload) = bytes.strip_prefix(bom) {
            // Odd trailing bytes and unpaired surrogates count as malformed.
            let text = codec
                .decode_without_bom_handling_and_without_replacement(payload)
                .ok_or(QuillError::Malformed { encoding: encoding.as_str() })?;
            return Ok((encoding, text.into_owned()));
        }
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok((Encoding::Utf8, s.to_owned()));
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    Ok((Encoding::Ansi, text.into_owned()))
}

/// Detect the dominant EOL style in `text`.
///
/// Counts `\r\n`, `\r`, and `\n` and returns whichever appears most.
/// Falls back to `EolMode::Crlf` when no line endings are present.
pub(crate) fn detect_eol(text: &str) -> EolMode {
    let bytes = text.as_bytes();
    let mut crlf = 0usize;
    let mut lf = 0usize;
    let mut cr = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                crlf += 1;
                i += 2;
            }
            b'\r' => {
                cr += 1;
                i += 1;
            }
            b'\n' => {
                lf += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    if crlf >= lf && crlf >= cr {
        EolMode::Crlf
    } else if lf >= cr {
        EolMode::Lf
    } else {
        EolMode::Cr
    }
}

/// Collapse `\r\n` and lone `\r` into `\n`.
///
/// The rich-edit control reports paragraph breaks as `\r` or `\r\n`
/// depending on the query; everything past the control boundary uses `\n`.
pub(crate) fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

// ── Encode ────────────────────────────────────────────────────────────────────

/// Encode `text` for disk using `encoding` and `eol`.
///
/// Any `\r\n` or `\r` already in `text` is treated as a line break, so text
/// straight from the control can be passed in unchanged.  Characters that
/// cannot be represented in ANSI are written as `?`.
pub(crate) fn encode(text: &str, encoding: Encoding, eol: EolMode) -> Vec<u8> {
    let normalized = normalize_newlines(text);
    let s = if eol == EolMode::Lf {
        normalized
    } else {
        normalized.replace('\n', eol.sequence())
    };

    match encoding {
        Encoding::Utf8 => s.into_bytes(),
        Encoding::Utf8Bom => {
            let mut out = vec![0xEF_u8, 0xBB, 0xBF];
            out.extend_from_slice(s.as_bytes());
            out
        }
        Encoding::Utf16Le => {
            let mut out = vec![0xFF_u8, 0xFE]; // LE BOM
            for unit in s.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
        Encoding::Utf16Be => {
            let mut out = vec![0xFE_u8, 0xFF]; // BE BOM
            for unit in s.encode_utf16() {
                out.extend_from_slice(&unit.to_be_bytes());
            }
            out
        }
        Encoding::Ansi => encode_ansi(&s),
    }
}

/// Windows-1252 without HTML entity replacement: unmappable characters
/// become `?`, as the system's own ANSI conversion does.
fn encode_ansi(s: &str) -> Vec<u8> {
    let mut encoder = WINDOWS_1252.new_encoder();
    let mut out = Vec::with_capacity(s.len());
    let mut buf = [0u8; 1024];
    let mut rest = s;
    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(rest, &mut buf, true);
        out.extend_from_slice(&buf[..written]);
        rest = &rest[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => out.push(b'?'),
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_ok(bytes: &[u8]) -> Decoded {
        decode(bytes).expect("decode")
    }

    fn round_trip(bytes: &[u8]) -> Vec<u8> {
        let d = decode_ok(bytes);
        encode(&d.text, d.encoding, d.eol)
    }

    #[test]
    fn encoding_display() {
        assert_eq!(Encoding::Utf8.as_str(), "UTF-8");
        assert_eq!(Encoding::Utf8Bom.as_str(), "UTF-8 BOM");
        assert_eq!(Encoding::Utf16Le.as_str(), "UTF-16 LE");
        assert_eq!(Encoding::Utf16Be.as_str(), "UTF-16 BE");
        assert_eq!(Encoding::Ansi.as_str(), "ANSI");
    }

    #[test]
    fn eol_display() {
        assert_eq!(EolMode::Crlf.as_str(), "CRLF");
        assert_eq!(EolMode::Lf.as_str(), "LF");
        assert_eq!(EolMode::Cr.as_str(), "CR");
    }

    #[test]
    fn detect_encoding_utf16le() {
        let d = decode_ok(b"\xFF\xFEh\x00i\x00");
        assert_eq!(d.encoding, Encoding::Utf16Le);
        assert_eq!(d.text, "hi");
    }

    #[test]
    fn detect_encoding_utf16be() {
        let d = decode_ok(b"\xFE\xFF\x00h\x00i");
        assert_eq!(d.encoding, Encoding::Utf16Be);
        assert_eq!(d.text, "hi");
    }

    #[test]
    fn detect_encoding_utf8_bom() {
        let d = decode_ok(b"\xEF\xBB\xBFhello");
        assert_eq!(d.encoding, Encoding::Utf8Bom);
        assert_eq!(d.text, "hello");
    }

    #[test]
    fn detect_encoding_utf8_no_bom() {
        assert_eq!(decode_ok("héllo wörld".as_bytes()).encoding, Encoding::Utf8);
    }

    #[test]
    fn detect_encoding_ansi_fallback() {
        // 0x80–0x9F are invalid UTF-8 lead bytes
        let d = decode_ok(b"caf\xE9 \x80");
        assert_eq!(d.encoding, Encoding::Ansi);
        assert_eq!(d.text, "caf\u{e9} \u{20ac}");
    }

    #[test]
    fn ansi_reads_windows_1252_punctuation() {
        let d = decode_ok(b"\x93hi\x94 \x80");
        assert_eq!(d.encoding, Encoding::Ansi);
        assert_eq!(d.text, "\u{201c}hi\u{201d} \u{20ac}");
        assert_eq!(encode(&d.text, Encoding::Ansi, d.eol), b"\x93hi\x94 \x80");
    }

    #[test]
    fn ansi_undefined_bytes_round_trip() {
        let bytes: &[u8] = b"\x81\x8D\x8F\x90\x9D";
        assert_eq!(round_trip(bytes), bytes);
    }

    #[test]
    fn utf16_with_odd_trailing_byte_is_rejected() {
        let err = decode(b"\xFF\xFEa\x00b").expect_err("odd length");
        assert!(matches!(err, QuillError::Malformed { encoding: "UTF-16 LE" }));
        assert!(decode(b"\xFE\xFF\x00a\x00").is_err());
    }

    #[test]
    fn utf8_bom_with_invalid_payload_is_rejected() {
        let err = decode(b"\xEF\xBB\xBFcaf\xE9").expect_err("invalid UTF-8");
        assert!(matches!(err, QuillError::Malformed { encoding: "UTF-8 BOM" }));
    }

    #[test]
    fn unpaired_surrogate_is_rejected() {
        // D800 with nothing after it.
        assert!(decode(b"\xFF\xFE\x00\xD8").is_err());
    }

    #[test]
    fn detect_eol_crlf_dominant() {
        assert_eq!(detect_eol("a\r\nb\r\nc\n"), EolMode::Crlf);
    }

    #[test]
    fn detect_eol_lf_dominant() {
        assert_eq!(detect_eol("a\nb\nc\n"), EolMode::Lf);
    }

    #[test]
    fn detect_eol_cr_dominant() {
        assert_eq!(detect_eol("a\rb\rc"), EolMode::Cr);
    }

    #[test]
    fn detect_eol_no_newlines_defaults_crlf() {
        assert_eq!(detect_eol("no newlines here"), EolMode::Crlf);
    }

    #[test]
    fn normalize_collapses_all_break_styles() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_newlines("\r\r\n"), "\n\n");
    }

    #[test]
    fn decoded_text_uses_lf_only() {
        let d = decode_ok(b"one\r\ntwo\r\n");
        assert_eq!(d.text, "one\ntwo\n");
        assert_eq!(d.eol, EolMode::Crlf);
    }

    #[test]
    fn round_trip_is_byte_identical_per_convention() {
        let samples: [&[u8]; 9] = [
            b"plain, no newline",
            b"unix\nlines\n",
            b"dos\r\nlines\r\n",
            b"mac\rlines\r",
            b"\xEF\xBB\xBFbom\r\nfile",
            b"\xFF\xFEa\x00\r\x00\n\x00b\x00",
            b"\xFE\xFF\x00a\x00\r\x00\n\x00b",
            b"latin \xE9\xE8\nend",
            b"\x93quoted\x94\r\n\x80 5\r\n",
        ];
        for bytes in samples {
            assert_eq!(round_trip(bytes), bytes, "round trip of {bytes:?}");
        }
    }

    #[test]
    fn encode_accepts_control_line_breaks() {
        // Text from the control may still carry `\r`; it must not double up.
        assert_eq!(encode("a\rb", Encoding::Utf8, EolMode::Crlf), b"a\r\nb");
        assert_eq!(encode("a\r\nb", Encoding::Utf8, EolMode::Lf), b"a\nb");
    }

    #[test]
    fn ansi_encode_replaces_unrepresentable_chars() {
        assert_eq!(encode("a\u{263A}b", Encoding::Ansi, EolMode::Lf), b"a?b");
    }
}
