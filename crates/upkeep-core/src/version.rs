use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Release maturity channel. Ordering follows declaration order, so an
/// unrecognized channel ranks below every known pre-release and a stable
/// release outranks any pre-release of the same major.minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Unknown,
    Pre,
    Beta,
    Rc,
    Stable,
}

impl Channel {
    fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "pre" => Self::Pre,
            "beta" => Self::Beta,
            "rc" => Self::Rc,
            "stable" => Self::Stable,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Pre => "pre",
            Self::Beta => "beta",
            Self::Rc => "rc",
            Self::Stable => "stable",
        }
    }
}

/// A parsed `vMAJOR.MINOR[-CHANNELnumber]` version identifier.
///
/// The derived `Ord` compares the fields in declaration order, which is
/// exactly the release ordering: major, then minor, then channel rank,
/// then release number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub channel: Channel,
    pub release: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("invalid version format: {input}")]
    InvalidFormat { input: String },
}

impl FromStr for Version {
    type Err = VersionParseError;

    /// Extracts the first version occurrence anywhere in the (trimmed)
    /// input, so labels like `"MyApp v1.2-rc1"` parse the same as
    /// `"v1.2-rc1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        for (start, _) in trimmed.match_indices('v') {
            if let Some(version) = parse_at(trimmed, start) {
                return Ok(version);
            }
        }
        Err(VersionParseError::InvalidFormat {
            input: trimmed.to_string(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)?;
        if self.channel != Channel::Stable || self.release != 0 {
            write!(f, "-{}{}", self.channel.as_str(), self.release)?;
        }
        Ok(())
    }
}

/// Compare two version strings, parsing both.
///
/// # Errors
/// Returns `VersionParseError` when either string contains no version.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionParseError> {
    Ok(a.parse::<Version>()?.cmp(&b.parse::<Version>()?))
}

fn parse_at(s: &str, start: usize) -> Option<Version> {
    let rest = &s[start + 1..];
    let (major, rest) = take_number(rest)?;
    // A bare major (the "v0" bootstrap sentinel) is accepted with minor 0
    // so it orders below every real release.
    let (minor, rest) = match rest.strip_prefix('.') {
        Some(rest) => take_number(rest)?,
        None => (0, rest),
    };
    let (channel, release) = parse_suffix(rest);
    Some(Version {
        major,
        minor,
        channel,
        release,
    })
}

fn take_number(s: &str) -> Option<(u32, &str)> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// The suffix is optional as a whole: `-rc2` qualifies the version, but a
/// dangling `-rc` or `-2` does not and is ignored.
fn parse_suffix(s: &str) -> (Channel, u32) {
    let Some(rest) = s.strip_prefix('-') else {
        return (Channel::Stable, 0);
    };
    let tag_end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    if tag_end == 0 {
        return (Channel::Stable, 0);
    }
    let (tag, digits) = rest.split_at(tag_end);
    let Some((release, _)) = take_number(digits) else {
        return (Channel::Stable, 0);
    };
    (Channel::from_tag(tag), release)
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::{Channel, Version, VersionParseError, compare};

    fn parse(s: &str) -> Version {
        s.parse().expect("version should parse")
    }

    #[test]
    fn parse_stable_version() {
        let v = parse("v1.0");
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 0);
        assert_eq!(v.channel, Channel::Stable);
        assert_eq!(v.release, 0);
    }

    #[test]
    fn parse_with_release_suffix() {
        let v = parse("v0.2-pre1");
        assert_eq!(v.major, 0);
        assert_eq!(v.minor, 2);
        assert_eq!(v.channel, Channel::Pre);
        assert_eq!(v.release, 1);
    }

    #[test]
    fn parse_embedded_in_label() {
        let v = parse("MyApp v2.14-rc3");
        assert_eq!(v.major, 2);
        assert_eq!(v.minor, 14);
        assert_eq!(v.channel, Channel::Rc);
        assert_eq!(v.release, 3);
    }

    #[test]
    fn parse_with_surrounding_whitespace() {
        assert_eq!(parse("  v1.2  "), parse("v1.2"));
    }

    #[test]
    fn parse_garbage_fails() {
        let result: Result<Version, _> = "garbage".parse();
        assert!(matches!(
            result,
            Err(VersionParseError::InvalidFormat { ref input }) if input == "garbage"
        ));
    }

    #[test]
    fn parse_bare_v_fails() {
        assert!("just some v text".parse::<Version>().is_err());
    }

    #[test]
    fn parse_bootstrap_sentinel() {
        let v = parse("v0");
        assert_eq!(v.major, 0);
        assert_eq!(v.minor, 0);
        assert_eq!(v.channel, Channel::Stable);
    }

    #[test]
    fn incomplete_suffix_is_ignored() {
        let v = parse("v1.0-rc");
        assert_eq!(v.channel, Channel::Stable);
        assert_eq!(v.release, 0);
    }

    #[test]
    fn unknown_channel_ranks_below_pre() {
        assert!(parse("v1.0-alpha1") < parse("v1.0-pre1"));
    }

    #[test]
    fn compare_equal_versions() {
        assert_eq!(compare("v1.0", "v1.0").unwrap(), Ordering::Equal);
    }

    #[test]
    fn compare_by_minor() {
        assert_eq!(compare("v1.2", "v1.1").unwrap(), Ordering::Greater);
    }

    #[test]
    fn stable_outranks_pre_release() {
        assert_eq!(compare("v2.0-pre1", "v2.0").unwrap(), Ordering::Less);
    }

    #[test]
    fn compare_by_release_number_within_channel() {
        assert_eq!(compare("v2.0-rc2", "v2.0-rc1").unwrap(), Ordering::Greater);
    }

    #[test]
    fn rc_outranks_beta() {
        assert!(parse("v2.0-rc1") > parse("v2.0-beta9"));
    }

    #[test]
    fn bootstrap_sentinel_orders_below_releases() {
        assert_eq!(compare("v0", "v1.0").unwrap(), Ordering::Less);
        assert_eq!(compare("v0", "v0.1-pre1").unwrap(), Ordering::Less);
        assert_eq!(compare("v0", "v0").unwrap(), Ordering::Equal);
    }

    #[test]
    fn compare_propagates_parse_failure() {
        assert!(compare("garbage", "v1.0").is_err());
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(parse("v1.0").to_string(), "v1.0");
        assert_eq!(parse("v2.3-beta4").to_string(), "v2.3-beta4");
        assert_eq!(parse("App v1.5-rc2 (nightly)").to_string(), "v1.5-rc2");
    }
}
