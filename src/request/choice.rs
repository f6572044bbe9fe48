//! Closed sets of run choices with a verbatim fallback for unknown values.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value outside the known set, kept verbatim.
            Unrecognized(String),
        }

        impl $name {
            /// Every recognized value, in presentation order.
            pub const KNOWN: &'static [&'static str] = &[$($text),+];

            /// Returns the text this choice renders as.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Unrecognized(other) => other,
                }
            }

            /// Re-reads the rendered text, so an `Unrecognized` value that
            /// spells a known choice becomes that choice.
            #[must_use]
            pub fn canonical(&self) -> Self {
                Self::from(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($text => Self::$variant,)+
                    other => Self::Unrecognized(other.to_string()),
                }
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice! {
    /// Target platform the suite runs against.
    Platform {
        /// `PLA`
        Pla => "PLA",
        /// `FE`
        Fe => "FE",
        /// `TAP`
        Tap => "TAP",
        /// `CORE_OPS`
        CoreOps => "CORE_OPS",
        /// `CORE_OPS_EUROUAT`
        CoreOpsEurouat => "CORE_OPS_EUROUAT",
        /// `CORE_OPS_BIZ`
        CoreOpsBiz => "CORE_OPS_BIZ",
        /// Production. Forces the backend environment to `PROD`.
        Prod => "PROD",
        /// `XMNUP`
        Xmnup => "XMNUP",
    }
}

choice! {
    /// Backend environment selector exported as `E2E_ENV`.
    E2eEnv {
        /// `VI11_1`
        Vi11_1 => "VI11_1",
        /// `VI7_1`
        Vi7_1 => "VI7_1",
        /// `SFC_1`
        Sfc1 => "SFC_1",
        /// `CORE_OPS`
        CoreOps => "CORE_OPS",
        /// `CORE_OPS_EUROUAT`
        CoreOpsEurouat => "CORE_OPS_EUROUAT",
        /// `CORE_OPS_BIZ`
        CoreOpsBiz => "CORE_OPS_BIZ",
        /// `PROD`
        Prod => "PROD",
    }
}

choice! {
    /// Browser or device the runner targets.
    Project {
        /// Desktop Chrome.
        Chrome => "chrome",
        /// Bundled Chromium.
        Chromium => "chromium",
        /// Firefox.
        Firefox => "firefox",
        /// Microsoft Edge.
        Edge => "edge",
        /// Chromium with mobile emulation.
        MobileChromium => "mobile-chromium",
        /// Chrome on a BrowserStack Android device.
        BsAndroidChrome => "bs-android-chrome",
        /// Safari on a BrowserStack iOS device.
        BsIosSafari => "bs-ios-safari",
    }
}

choice! {
    /// How the browser is driven.
    Mode {
        /// Visible browser window.
        Headed => "headed",
        /// Step-through inspector.
        Debug => "debug",
        /// No window.
        Headless => "headless",
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::Pla
    }
}

impl Default for E2eEnv {
    fn default() -> Self {
        Self::Vi11_1
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::Chrome
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Headed
    }
}

/// Remote device family for BrowserStack projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCloud {
    /// Android device, exported as `BS_DEVICE=android`.
    Android,
    /// iOS device, exported as `BS_DEVICE=ios`.
    Ios,
}

impl DeviceCloud {
    /// The `BS_DEVICE` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl Project {
    /// The device family when this project runs on BrowserStack.
    #[must_use]
    pub fn device_cloud(&self) -> Option<DeviceCloud> {
        match self.canonical() {
            Self::BsAndroidChrome => Some(DeviceCloud::Android),
            Self::BsIosSafari => Some(DeviceCloud::Ios),
            _ => None,
        }
    }
}

/// Test engine the generated command invokes.
///
/// Matching is case-insensitive. Anything that is not `JEST` runs under
/// Playwright, so older saved state without a runner keeps working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Runner {
    /// Playwright test runner.
    #[default]
    Playwright,
    /// Jest.
    Jest,
    /// Unknown text; runs under Playwright.
    Unrecognized(String),
}

impl Runner {
    /// Every recognized value, in presentation order.
    pub const KNOWN: &'static [&'static str] = &["PLAYWRIGHT", "JEST"];

    /// Returns the text this runner renders as.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Playwright => "PLAYWRIGHT",
            Self::Jest => "JEST",
            Self::Unrecognized(other) => other,
        }
    }

    /// Whether the Jest argument mapping applies.
    #[must_use]
    pub fn is_jest(&self) -> bool {
        self.as_str().eq_ignore_ascii_case("JEST")
    }
}

impl From<&str> for Runner {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("JEST") {
            Self::Jest
        } else if value.eq_ignore_ascii_case("PLAYWRIGHT") {
            Self::Playwright
        } else {
            Self::Unrecognized(value.to_string())
        }
    }
}

impl FromStr for Runner {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(value))
    }
}

impl fmt::Display for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_parse_to_variants() {
        assert_eq!(Platform::from("PROD"), Platform::Prod);
        assert_eq!(E2eEnv::from("SFC_1"), E2eEnv::Sfc1);
        assert_eq!(Project::from("mobile-chromium"), Project::MobileChromium);
        assert_eq!(Mode::from("debug"), Mode::Debug);
    }

    #[test]
    fn unknown_values_round_trip_verbatim() {
        let platform = Platform::from("prod");
        assert_eq!(platform, Platform::Unrecognized("prod".into()));
        assert_eq!(platform.to_string(), "prod");
        assert_eq!(Project::from("").as_str(), "");
    }

    #[test]
    fn known_lists_match_rendering() {
        for text in Project::KNOWN {
            assert_eq!(Project::from(*text).as_str(), *text);
        }
        for text in Platform::KNOWN {
            assert!(!matches!(Platform::from(*text), Platform::Unrecognized(_)));
        }
    }

    #[test]
    fn runner_matching_ignores_case() {
        assert_eq!(Runner::from("jest"), Runner::Jest);
        assert_eq!(Runner::from("Jest"), Runner::Jest);
        assert_eq!(Runner::from("playwright"), Runner::Playwright);
        assert!(!Runner::from("mocha").is_jest());
        assert!(!Runner::from("").is_jest());
    }

    #[test]
    fn only_browserstack_projects_map_to_devices() {
        assert_eq!(Project::BsAndroidChrome.device_cloud(), Some(DeviceCloud::Android));
        assert_eq!(Project::BsIosSafari.device_cloud(), Some(DeviceCloud::Ios));
        assert_eq!(Project::Chrome.device_cloud(), None);
        assert_eq!(Project::from("bs-windows-edge").device_cloud(), None);
    }

    #[test]
    fn unrecognized_spelling_of_known_value_behaves_as_known() {
        let ios = Project::Unrecognized("bs-ios-safari".into());
        assert_eq!(ios.device_cloud(), Some(DeviceCloud::Ios));
        assert_eq!(Platform::Unrecognized("PROD".into()).canonical(), Platform::Prod);
        assert!(Runner::Unrecognized("jest".into()).is_jest());
        assert!(!Runner::Unrecognized("jester".into()).is_jest());
    }
}
