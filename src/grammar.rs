//! Assembly of the two in-app UA grammars.
//!
//! Both grammars share one prefix, ending inside the bracketed app-info
//! segment. The legacy grammar closes the segment right there. The extended
//! grammar appends exactly one of two tails: the experimental marker, or the
//! operation marker with FBRV. Either may be followed by the IABMV marker.
//! Clients that report the experimental marker never send FBRV.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const ENGINE: &str = "Mozilla/5.0";
pub const APP_NAME: &str = "FBIOS";
pub const DEVICE_FAMILY: &str = "iPhone";
pub const OS_FAMILY: &str = "iOS";
pub const DEVICE_CLASS: &str = "phone";
pub const EXPERIMENTAL_MARKER: &str = "FBOP/80";
pub const OPERATION_MARKER: &str = "FBOP/5";
pub const IABMV_MARKER: &str = "IABMV/1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    Legacy,
    Extended,
}

impl Grammar {
    /// Legacy with probability `legacy_probability`.
    pub fn choose<R>(legacy_probability: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        if rng.gen_bool(legacy_probability) {
            Grammar::Legacy
        } else {
            Grammar::Extended
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::Legacy => write!(f, "legacy"),
            Grammar::Extended => write!(f, "extended"),
        }
    }
}

/// Resolved catalog values substituted into the shared prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixFields<'a> {
    pub ios_version: &'a str,
    pub ios_build: &'a str,
    pub webkit_version: &'a str,
    pub app_version: &'a str,
    pub app_build: &'a str,
    pub device: &'a str,
    pub scale: &'a str,
    pub locale: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedTail {
    Experimental { iabmv: bool },
    Revision { fbrv: String, iabmv: bool },
}

impl ExtendedTail {
    pub fn iabmv(&self) -> bool {
        match self {
            ExtendedTail::Experimental { iabmv } | ExtendedTail::Revision { iabmv, .. } => *iabmv,
        }
    }
}

/// What follows the shared prefix. Legacy carries no tail at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Legacy,
    Extended(ExtendedTail),
}

impl Body {
    pub fn grammar(&self) -> Grammar {
        match self {
            Body::Legacy => Grammar::Legacy,
            Body::Extended(_) => Grammar::Extended,
        }
    }

    pub fn fbrv(&self) -> Option<&str> {
        match self {
            Body::Extended(ExtendedTail::Revision { fbrv, .. }) => Some(fbrv),
            _ => None,
        }
    }
}

/// Everything up to and including `FBLC`, left inside the open `[` segment.
pub fn common_prefix(fields: &PrefixFields<'_>) -> String {
    let os_token = fields.ios_version.replace('.', "_");
    let app_info = [
        format!("FBAN/{APP_NAME}"),
        format!("FBAV/{}", fields.app_version),
        format!("FBBV/{}", fields.app_build),
        format!("FBDV/{}", fields.device),
        format!("FBMD/{DEVICE_FAMILY}"),
        format!("FBSN/{OS_FAMILY}"),
        format!("FBSV/{}", fields.ios_version),
        format!("FBSS/{}", fields.scale),
        format!("FBID/{DEVICE_CLASS}"),
        format!("FBLC/{}", fields.locale),
    ];

    format!(
        "{ENGINE} ({DEVICE_FAMILY}; CPU iPhone OS {os_token} like Mac OS X) AppleWebKit/{webkit} (KHTML, like Gecko) Mobile/{build} [{info}",
        webkit = fields.webkit_version,
        build = fields.ios_build,
        info = app_info.join(";"),
    )
}

/// Tokens appended after the prefix, each preceded by `;`.
pub fn variant_body(body: &Body) -> Vec<String> {
    let tail = match body {
        Body::Legacy => return Vec::new(),
        Body::Extended(tail) => tail,
    };

    let mut tokens = match tail {
        ExtendedTail::Experimental { .. } => vec![EXPERIMENTAL_MARKER.to_string()],
        ExtendedTail::Revision { fbrv, .. } => {
            vec![OPERATION_MARKER.to_string(), format!("FBRV/{fbrv}")]
        }
    };
    if tail.iabmv() {
        tokens.push(IABMV_MARKER.to_string());
    }
    tokens
}

/// Prefix, body tokens, closing bracket.
pub fn assemble(fields: &PrefixFields<'_>, body: &Body) -> String {
    let mut user_agent = common_prefix(fields);
    for token in variant_body(body) {
        user_agent.push(';');
        user_agent.push_str(&token);
    }
    user_agent.push(']');
    user_agent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> PrefixFields<'static> {
        PrefixFields {
            ios_version: "17.2.1",
            ios_build: "21C62",
            webkit_version: "605.1.15",
            app_version: "324.0",
            app_build: "123456789",
            device: "iPhone 12",
            scale: "3",
            locale: "en_US",
        }
    }

    #[test]
    fn legacy_closes_after_locale() {
        assert_eq!(
            assemble(&fields(), &Body::Legacy),
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/21C62 [FBAN/FBIOS;FBAV/324.0;FBBV/123456789;FBDV/iPhone 12;FBMD/iPhone;FBSN/iOS;FBSV/17.2.1;FBSS/3;FBID/phone;FBLC/en_US]"
        );
    }

    #[test]
    fn experimental_tail_has_no_revision() {
        let body = Body::Extended(ExtendedTail::Experimental { iabmv: false });
        let ua = assemble(&fields(), &body);
        assert!(ua.ends_with(";FBLC/en_US;FBOP/80]"));
        assert!(!ua.contains("FBRV/"));
        assert_eq!(body.fbrv(), None);

        let body = Body::Extended(ExtendedTail::Experimental { iabmv: true });
        let ua = assemble(&fields(), &body);
        assert!(ua.ends_with(";FBLC/en_US;FBOP/80;IABMV/1]"));
        assert!(!ua.contains("FBRV/"));
    }

    #[test]
    fn revision_tail_orders_markers() {
        let body = Body::Extended(ExtendedTail::Revision {
            fbrv: "700123456".into(),
            iabmv: true,
        });
        assert!(assemble(&fields(), &body).ends_with(";FBLC/en_US;FBOP/5;FBRV/700123456;IABMV/1]"));

        let body = Body::Extended(ExtendedTail::Revision {
            fbrv: "700123456".into(),
            iabmv: false,
        });
        assert!(assemble(&fields(), &body).ends_with(";FBOP/5;FBRV/700123456]"));
        assert_eq!(body.fbrv(), Some("700123456"));
        assert_eq!(body.grammar(), Grammar::Extended);
    }

    #[test]
    fn prefix_is_shared_by_both_grammars() {
        let prefix = common_prefix(&fields());
        let legacy = assemble(&fields(), &Body::Legacy);
        let body = Body::Extended(ExtendedTail::Experimental { iabmv: true });
        let extended = assemble(&fields(), &body);

        assert!(legacy.starts_with(&prefix));
        assert!(extended.starts_with(&prefix));
    }
}
