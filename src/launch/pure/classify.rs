// Output line decoding and classification (pure)

/// Presentation category of an output line. Never affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClass {
    Error,
    Warning,
    /// Informational or fixme-level noise, hidden unless verbose.
    Info,
    Plain,
}

/// Case-insensitive substring classification, checked in severity order.
pub fn classify_line(line: &str) -> LineClass {
    let lower = line.to_lowercase();
    if lower.contains("err:") || lower.contains("error") {
        LineClass::Error
    } else if lower.contains("warn:") || lower.contains("warning") {
        LineClass::Warning
    } else if lower.contains("fixme:") || lower.contains("trace:") {
        LineClass::Info
    } else {
        LineClass::Plain
    }
}

pub fn should_deliver(class: LineClass, verbose: bool) -> bool {
    verbose || class != LineClass::Info
}

/// Decode one raw line. Invalid UTF-8 becomes U+FFFD; the trailing line
/// terminator is dropped.
pub fn decode_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim_end_matches(['\n', '\r']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wine_channels_are_classified() {
        assert_eq!(classify_line("0024:err:module:import_dll Library X not found"), LineClass::Error);
        assert_eq!(classify_line("0024:warn:seh:dispatch_exception"), LineClass::Warning);
        assert_eq!(classify_line("0024:fixme:ntdll:NtQuerySystemInformation"), LineClass::Info);
        assert_eq!(classify_line("0024:trace:file:CreateFileW"), LineClass::Info);
        assert_eq!(classify_line("Loading level 3"), LineClass::Plain);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify_line("FATAL ERROR in renderer"), LineClass::Error);
        assert_eq!(classify_line("Warning: shader cache miss"), LineClass::Warning);
        assert_eq!(classify_line("FIXME:d3d"), LineClass::Info);
    }

    #[test]
    fn errors_win_over_fixme() {
        assert_eq!(classify_line("fixme:d3d: error compiling shader"), LineClass::Error);
    }

    #[test]
    fn info_lines_only_delivered_when_verbose() {
        assert!(!should_deliver(LineClass::Info, false));
        assert!(should_deliver(LineClass::Info, true));
        assert!(should_deliver(LineClass::Error, false));
        assert!(should_deliver(LineClass::Plain, false));
    }

    #[test]
    fn decode_replaces_invalid_bytes() {
        assert_eq!(decode_line(b"ok\n"), "ok");
        assert_eq!(decode_line(b"crlf\r\n"), "crlf");
        assert_eq!(decode_line(b"bad \xff byte\n"), "bad \u{FFFD} byte");
    }
}
