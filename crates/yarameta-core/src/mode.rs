//! Run mode selection

use std::fmt;

/// How provenance is derived for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Walk every commit reachable from `HEAD`.
    FullHistory,
    /// Walk the commits in `from..to`, in `HEAD` history order.
    BranchRange { from: String, to: String },
    /// Compare rule files against the parent of `HEAD` and stamp changed rules
    /// with today's date.
    Local,
}

impl Mode {
    /// Pick the mode from the `--initial` flag and the branch range.
    ///
    /// `--initial` wins; a range is used only when both ends are given.
    pub fn select(initial: bool, from: Option<&str>, to: Option<&str>) -> Self {
        if initial {
            return Self::FullHistory;
        }
        match (non_empty(from), non_empty(to)) {
            (Some(from), Some(to)) => Self::BranchRange {
                from: from.to_string(),
                to: to.to_string(),
            },
            _ => Self::Local,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullHistory => write!(f, "full-history"),
            Self::BranchRange { from, to } => write!(f, "branch-range {from}..{to}"),
            Self::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, Some("main"), Some("topic"), Mode::FullHistory)]
    #[case(false, Some("main"), Some("topic"), Mode::BranchRange { from: "main".into(), to: "topic".into() })]
    #[case(false, Some("main"), None, Mode::Local)]
    #[case(false, Some(""), Some("topic"), Mode::Local)]
    #[case(false, None, None, Mode::Local)]
    fn test_select(
        #[case] initial: bool,
        #[case] from: Option<&str>,
        #[case] to: Option<&str>,
        #[case] expected: Mode,
    ) {
        assert_eq!(Mode::select(initial, from, to), expected);
    }

    #[test]
    fn test_display() {
        let mode = Mode::BranchRange {
            from: "main".into(),
            to: "HEAD".into(),
        };
        assert_eq!(mode.to_string(), "branch-range main..HEAD");
        assert_eq!(Mode::Local.to_string(), "local");
    }
}
