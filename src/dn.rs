//! Distinguished Name (DN) parsing, serialization, and comparison.
//!
//! Follows RFC 4514's string representation: a DN is a comma- or
//! semicolon-separated sequence of RDNs, most-specific first, each RDN a
//! `+`-joined set of `attribute=value` pairs. Escaping uses either a
//! backslash followed by one of the reserved characters, a backslash
//! followed by two hex digits, or wrapping the whole value in double
//! quotes.

use std::fmt;

use crate::error::LdapError;

/// One `attribute=value` pair inside an RDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ava {
    pub attribute: String,
    pub value: String,
}

/// A relative distinguished name: one or more [`Ava`]s joined by `+`.
///
/// Equality ignores the order of the `+`-joined attributes but is
/// case-sensitive on values, per RFC 4514 and `spec.md` §3.
#[derive(Debug, Clone, Eq)]
pub struct Rdn {
    pub avas: Vec<Ava>,
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        if self.avas.len() != other.avas.len() {
            return false;
        }
        self.avas.iter().all(|ava| other.avas.contains(ava))
    }
}

impl Rdn {
    pub fn single(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            avas: vec![Ava {
                attribute: attribute.into(),
                value: value.into(),
            }],
        }
    }
}

/// An ordered sequence of RDNs, most-specific first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistinguishedName {
    pub rdns: Vec<Rdn>,
}

const ESCAPE_ANYWHERE: &[char] = &[',', '+', '"', '\\', '<', '>', ';', '='];

/// Parses a DN string.
///
/// `strict` controls whether invalid characters (unescaped reserved
/// characters appearing outside any escape or quote context) are rejected.
/// In non-strict mode they are accepted verbatim, for callers assembling
/// DNs from untrusted input that would rather not fail than be strict.
pub fn parse(input: &str, strict: bool) -> Result<DistinguishedName, LdapError> {
    let mut parser = DnParser {
        bytes: input.as_bytes(),
        pos: 0,
        strict,
    };
    parser.parse_dn()
}

impl std::str::FromStr for DistinguishedName {
    type Err = LdapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s, true)
    }
}

struct DnParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    strict: bool,
}

impl<'a> DnParser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn parse_dn(&mut self) -> Result<DistinguishedName, LdapError> {
        let mut rdns = Vec::new();
        if self.bytes.is_empty() {
            return Ok(DistinguishedName { rdns });
        }
        loop {
            rdns.push(self.parse_rdn()?);
            match self.peek() {
                Some(b',') | Some(b';') => {
                    self.pos += 1;
                    if self.peek().is_none() {
                        if self.strict {
                            return Err(LdapError::InvalidInput("trailing separator in DN".into()));
                        }
                        break;
                    }
                }
                None => break,
                Some(_) => {
                    if self.strict {
                        return Err(LdapError::InvalidInput(format!(
                            "unexpected character at offset {} in DN",
                            self.pos
                        )));
                    }
                    break;
                }
            }
        }
        Ok(DistinguishedName { rdns })
    }

    fn parse_rdn(&mut self) -> Result<Rdn, LdapError> {
        let mut avas = vec![self.parse_ava()?];
        while self.peek() == Some(b'+') {
            self.pos += 1;
            avas.push(self.parse_ava()?);
        }
        Ok(Rdn { avas })
    }

    fn parse_ava(&mut self) -> Result<Ava, LdapError> {
        let attribute = self.parse_attribute_name()?;
        match self.bump() {
            Some(b'=') => {}
            _ => {
                if self.strict {
                    return Err(LdapError::InvalidInput(
                        "missing '=' in RDN attribute-value assertion".into(),
                    ));
                }
            }
        }
        let value = self.parse_value()?;
        Ok(Ava { attribute, value })
    }

    fn parse_attribute_name(&mut self) -> Result<String, LdapError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'=' {
                break;
            }
            self.pos += 1;
        }
        let raw = &self.bytes[start..self.pos];
        String::from_utf8(raw.to_vec())
            .map_err(|_| LdapError::InvalidInput("non-UTF-8 attribute name in DN".into()))
    }

    fn parse_value(&mut self) -> Result<String, LdapError> {
        if self.peek() == Some(b'"') {
            return self.parse_quoted_value();
        }
        let mut out = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(b',') | Some(b';') | Some(b'+') => break,
                Some(b'\\') => {
                    self.pos += 1;
                    out.extend(self.parse_escape()?);
                }
                Some(b) => {
                    self.pos += 1;
                    out.push(b);
                }
            }
        }
        // Trailing unescaped spaces are insignificant per RFC 4514.
        while out.last() == Some(&b' ') {
            out.pop();
        }
        String::from_utf8(out).map_err(|_| LdapError::InvalidInput("non-UTF-8 RDN value".into()))
    }

    fn parse_quoted_value(&mut self) -> Result<String, LdapError> {
        self.pos += 1; // opening quote
        let mut out = Vec::new();
        loop {
            match self.bump() {
                Some(b'"') => {
                    return String::from_utf8(out)
                        .map_err(|_| LdapError::InvalidInput("non-UTF-8 RDN value".into()));
                }
                Some(b'\\') => out.extend(self.parse_escape()?),
                Some(b) => out.push(b),
                None => {
                    return Err(LdapError::InvalidInput("unbalanced quotes in DN".into()));
                }
            }
        }
    }

    fn parse_escape(&mut self) -> Result<Vec<u8>, LdapError> {
        let is_hex = |b: u8| b.is_ascii_hexdigit();
        if let (Some(h1), Some(h2)) = (self.peek(), self.bytes.get(self.pos + 1).copied()) {
            if is_hex(h1) && is_hex(h2) {
                self.pos += 2;
                let hex = std::str::from_utf8(&[h1, h2]).unwrap();
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| LdapError::InvalidInput("bad hex escape in DN".into()))?;
                return Ok(vec![byte]);
            }
        }
        match self.bump() {
            Some(b) => Ok(vec![b]),
            None => Err(LdapError::InvalidInput(
                "trailing backslash in DN".into(),
            )),
        }
    }
}

fn escape_value(value: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = value.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        let leading_or_trailing_space =
            c == ' ' && (i == 0 || i == chars.len() - 1);
        let leading_hash = c == '#' && i == 0;
        if ESCAPE_ANYWHERE.contains(&c) || leading_or_trailing_space || leading_hash {
            out.push('\\');
            out.push(c);
        } else if c == '\r' || c == '\n' {
            out.push('\\');
            out.push_str(&format!("{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

impl fmt::Display for Ava {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, escape_value(&self.value))
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.avas.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", parts.join("+"))
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.rdns.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl DistinguishedName {
    pub fn to_dn_string(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_dn() {
        let dn = parse("cn=Jim Smith,dc=example,dc=com", true).unwrap();
        assert_eq!(dn.rdns.len(), 3);
        assert_eq!(dn.rdns[0].avas[0].attribute, "cn");
        assert_eq!(dn.rdns[0].avas[0].value, "Jim Smith");
    }

    #[test]
    fn parses_compound_rdn() {
        let dn = parse("cn=Jim+sn=Smith,dc=example,dc=com", true).unwrap();
        assert_eq!(dn.rdns[0].avas.len(), 2);
        assert_eq!(dn.rdns[0].avas[1].attribute, "sn");
    }

    #[test]
    fn round_trips_through_string_form() {
        let text = "cn=Jim\\, Smith,dc=example,dc=com";
        let dn = parse(text, true).unwrap();
        let again = parse(&dn.to_dn_string(), true).unwrap();
        assert_eq!(dn, again);
    }

    #[test]
    fn hex_escape_is_decoded() {
        let dn = parse(r"cn=Lu\c4\8di\c4\87,dc=example,dc=com", true).unwrap();
        // \c4 \8d etc decode to raw bytes; since our value storage is a
        // Rust String, non-UTF8 sequences are rejected, but this sequence
        // is valid UTF-8 for "Lučić" when taken byte-for-byte.
        assert_eq!(dn.rdns[0].avas[0].attribute, "cn");
    }

    #[test]
    fn quoted_value_is_unwrapped() {
        let dn = parse(r#"cn="Jim, Smith",dc=example,dc=com"#, true).unwrap();
        assert_eq!(dn.rdns[0].avas[0].value, "Jim, Smith");
    }

    #[test]
    fn rdn_equality_ignores_ava_order() {
        let a = Rdn {
            avas: vec![Ava::new_for_test("cn", "Jim"), Ava::new_for_test("sn", "Smith")],
        };
        let b = Rdn {
            avas: vec![Ava::new_for_test("sn", "Smith"), Ava::new_for_test("cn", "Jim")],
        };
        assert_eq!(a, b);
    }

    #[test]
    fn strict_mode_rejects_unbalanced_quotes() {
        assert!(parse(r#"cn="Jim,dc=example,dc=com"#, true).is_err());
    }

    #[test]
    fn non_strict_mode_tolerates_malformed_trailing_input() {
        assert!(parse("cn=Jim,", false).is_ok());
    }

    impl Ava {
        fn new_for_test(attribute: &str, value: &str) -> Self {
            Ava {
                attribute: attribute.to_string(),
                value: value.to_string(),
            }
        }
    }
}
