//! Sender address normalization.

/// The sender of a chat message.
///
/// The export stores senders as bare email addresses. The normalized form is
/// lowercased for grouping and deduplication; the original casing is kept for
/// display in the report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct SenderAddress {
    /// Lowercased address used for grouping, sorting, and deduplication.
    pub address: String,
    /// The address as it appears in the export.
    pub display: String,
}

impl SenderAddress {
    /// Parse a sender field from the export.
    ///
    /// Tolerates the occasional `"Display Name <user@domain>"` form; anything
    /// else is taken verbatim. An empty field yields an empty sender (the
    /// export omits the address for some system messages).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self {
                address: String::new(),
                display: String::new(),
            };
        }

        // "Name <address>" or "<address>"
        if let Some(angle_start) = trimmed.rfind('<') {
            if let Some(angle_end) = trimmed.rfind('>') {
                if angle_end > angle_start {
                    let addr = trimmed[angle_start + 1..angle_end].trim();
                    return Self {
                        address: addr.to_lowercase(),
                        display: addr.to_string(),
                    };
                }
            }
        }

        Self {
            address: trimmed.to_lowercase(),
            display: trimmed.to_string(),
        }
    }

    /// Whether the export carried no sender at all.
    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }
}

impl std::fmt::Display for SenderAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_address() {
        let s = SenderAddress::parse("user@example.com");
        assert_eq!(s.address, "user@example.com");
        assert_eq!(s.display, "user@example.com");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let s = SenderAddress::parse("User.Name@Example.COM");
        assert_eq!(s.address, "user.name@example.com");
        assert_eq!(s.display, "User.Name@Example.COM");
    }

    #[test]
    fn test_parse_angle_form() {
        let s = SenderAddress::parse("User One <User1@example.com>");
        assert_eq!(s.address, "user1@example.com");
        assert_eq!(s.display, "User1@example.com");
    }

    #[test]
    fn test_parse_empty() {
        let s = SenderAddress::parse("  ");
        assert!(s.is_empty());
        assert_eq!(s.display, "");
    }
}
