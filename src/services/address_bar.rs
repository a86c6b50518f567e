//! What the address bar shows for a tab.

use crate::types::tab::Tab;

/// Connection security indicator next to the address bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    Secure,
    Insecure,
    /// Internal pages, blank tabs and non-http schemes.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBarView {
    pub text: String,
    pub security: Security,
}

pub fn address_bar_view(tab: &Tab) -> AddressBarView {
    if tab.is_blank() {
        return AddressBarView {
            text: String::new(),
            security: Security::Unknown,
        };
    }

    let security = if tab.is_internal() {
        Security::Unknown
    } else if tab.url.starts_with("https://") {
        Security::Secure
    } else if tab.url.starts_with("http://") {
        Security::Insecure
    } else {
        Security::Unknown
    };

    AddressBarView {
        text: tab.url.clone(),
        security,
    }
}
