//! Best-effort User-Agent classification.

use woothee::parser::Parser;

use crate::domain::entities::{DeviceType, UNKNOWN};

/// Device, browser and OS derived from a User-Agent header.
///
/// Never contains empty strings: undetected values use the `unknown` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAgent {
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
}

impl ParsedAgent {
    fn unknown() -> Self {
        Self {
            device_type: DeviceType::Other,
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
        }
    }
}

pub fn parse_user_agent(user_agent: Option<&str>) -> ParsedAgent {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return ParsedAgent::unknown();
    };

    let Some(result) = Parser::new().parse(ua) else {
        return ParsedAgent::unknown();
    };

    let device_type = match result.category {
        "pc" => DeviceType::Desktop,
        "smartphone" | "mobilephone" if is_tablet(result.os, ua) => DeviceType::Tablet,
        "smartphone" | "mobilephone" => DeviceType::Mobile,
        _ => DeviceType::Other,
    };

    ParsedAgent {
        device_type,
        browser: known_or_unknown(result.name),
        os: known_or_unknown(result.os),
    }
}

/// Woothee files tablets under "smartphone"; split them out by OS and the
/// Android convention of omitting "Mobile" on tablets.
fn is_tablet(os: &str, ua: &str) -> bool {
    os == "iPad" || ua.contains("Tablet") || (os == "Android" && !ua.contains("Mobile"))
}

fn known_or_unknown(value: &str) -> String {
    if value.is_empty() || value == "UNKNOWN" {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}
