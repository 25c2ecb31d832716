//! Security utilities for async-API operations.
//!
//! This module provides the escaping and validation helpers that MUST be
//! used when user-provided values end up inside XML control documents.
//!
//! ## XML Injection Prevention
//!
//! **CRITICAL**: All user-provided values interpolated into jobInfo
//! documents MUST be escaped using the functions in this module.
//!
//! ```rust
//! use hopper_sf_client::security::xml;
//!
//! // CORRECT - Always escape user input
//! let object = xml::escape("Account");
//! let doc = format!("<object>{}</object>", object);
//!
//! // WRONG - NEVER do this
//! // let doc = format!("<object>{}</object>", user_input);
//! ```

/// XML escaping utilities for control documents.
pub mod xml {
    /// Escape a string for safe inclusion in XML content.
    ///
    /// This escapes the five predefined XML entities.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hopper_sf_client::security::xml;
    ///
    /// let safe = xml::escape("Hello <World> & 'Friends'");
    /// assert_eq!(safe, "Hello &lt;World&gt; &amp; &apos;Friends&apos;");
    /// ```
    #[must_use]
    pub fn escape(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }
}

/// Identifier validation for object and field names.
pub mod field {
    /// Validate that a field name contains only safe characters.
    ///
    /// Field names should only contain alphanumeric characters, underscores,
    /// and the `__c` / `__r` suffixes for custom fields/relationships.
    ///
    /// Returns `true` if the field name is safe, `false` otherwise.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hopper_sf_client::security::field;
    ///
    /// assert!(field::is_safe_field_name("External_Id__c"));
    /// assert!(!field::is_safe_field_name("Bad'; DROP TABLE--"));
    /// ```
    #[must_use]
    pub fn is_safe_field_name(name: &str) -> bool {
        let Some(first) = name.chars().next() else {
            return false;
        };

        // Must start with a letter
        if !first.is_ascii_alphabetic() {
            return false;
        }

        // Rest must be alphanumeric or underscore
        for ch in name.chars() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                return false;
            }
        }

        true
    }

    /// Validate that a SObject name is safe.
    ///
    /// SObject names follow the same rules as field names.
    #[must_use]
    pub fn is_safe_sobject_name(name: &str) -> bool {
        is_safe_field_name(name)
    }
}
