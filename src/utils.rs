/* --- src/utils.rs --- */

/// Quote a string for a POSIX shell: wrap in single quotes and replace
/// every embedded `'` with `'\''`.
///
/// The result can be spliced into a `sh -c` command line and is read back
/// as exactly the original string, whatever it contains.
pub fn shell_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            // close the quote, emit an escaped quote, reopen
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// Quote a string for PowerShell: wrap in single quotes and double every
/// embedded `'` or `"`.
pub fn powershell_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '"' {
            out.push(c);
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// Convert a Rust string to a null-terminated UTF-16 vector.
#[cfg(windows)]
pub fn to_wstring(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Read a null-terminated UTF-16 buffer back into a String (lossy).
#[cfg(windows)]
pub unsafe fn from_wstring_ptr(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let len = (0..).take_while(|&i| unsafe { *ptr.offset(i) } != 0).count();
    let slice = unsafe { std::slice::from_raw_parts(ptr, len) };
    String::from_utf16_lossy(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote_plain() {
        assert_eq!(shell_quote("hello"), "'hello'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_shell_quote_embedded_single_quote() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_shell_quote_leaves_double_quotes_alone() {
        assert_eq!(shell_quote(r#"say "hi""#), r#"'say "hi"'"#);
    }

    #[test]
    fn test_powershell_quote_doubles_both_quote_kinds() {
        assert_eq!(powershell_quote("it's"), "'it''s'");
        assert_eq!(powershell_quote(r#"a"b"#), r#"'a""b'"#);
        assert_eq!(powershell_quote(r#"'""#), r#"'''""'"#);
    }

    #[test]
    fn test_powershell_quote_plain() {
        assert_eq!(powershell_quote("hello world"), "'hello world'");
    }

    // Round-trip the quoted string through a real shell and check it comes
    // back byte-for-byte, including injection attempts.
    #[cfg(unix)]
    #[test]
    fn test_shell_quote_round_trip() {
        use std::process::Command;

        let cases = [
            "plain",
            "it's got 'quotes'",
            r#"double " and single ' mixed"#,
            "$(touch /tmp/pwned) `id` ;&|",
            "newline\nand\ttab",
            "'; rm -rf / #",
        ];
        for case in cases {
            let output = Command::new("sh")
                .arg("-c")
                .arg(format!("printf %s {}", shell_quote(case)))
                .output()
                .unwrap();
            assert_eq!(String::from_utf8_lossy(&output.stdout), *case, "case: {case:?}");
        }
    }
}
