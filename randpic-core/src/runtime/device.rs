use crate::category::Category;

/// Substrings (lowercase) that mark a user agent as mobile.
pub const MOBILE_PATTERNS: [&str; 8] = [
    "android",
    "ipad",
    "iphone",
    "ipod",
    "windows phone",
    "iemobile",
    "blackberry",
    "mobile",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn classify(user_agent: &str) -> DeviceClass {
        let ua = user_agent.to_ascii_lowercase();
        if MOBILE_PATTERNS.iter().any(|p| ua.contains(p)) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    /// Portrait screens get vertical images.
    pub fn category(self) -> Category {
        match self {
            DeviceClass::Mobile => Category::Vertical,
            DeviceClass::Desktop => Category::Horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iphone_is_vertical() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
        assert_eq!(DeviceClass::classify(ua), DeviceClass::Mobile);
        assert_eq!(DeviceClass::classify(ua).category(), Category::Vertical);
    }

    #[test]
    fn windows_desktop_is_horizontal() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
        assert_eq!(DeviceClass::classify(ua), DeviceClass::Desktop);
        assert_eq!(DeviceClass::classify(ua).category(), Category::Horizontal);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(DeviceClass::classify("SOMETHING ANDROID"), DeviceClass::Mobile);
        assert_eq!(DeviceClass::classify("Windows Phone 8.0"), DeviceClass::Mobile);
        assert_eq!(DeviceClass::classify(""), DeviceClass::Desktop);
    }
}
