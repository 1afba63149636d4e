//! Load options

use std::fmt;
use std::ops::BitOr;

use crate::error::{Error, Result};

/// What to do with a malformed line in mesh text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the whole load on the first malformed line
    #[default]
    Abort,
    /// Log the line, skip it, and keep scanning
    SkipMalformedLines,
}

/// Configuration read once at the start of a load
///
/// Everything defaults to off, which gives a lossless parse with one group
/// per group marker and tuple-form faces.
///
/// # Example
///
/// ```
/// use objmesh::Options;
///
/// let options = Options::new()
///     .with_per_vertex_flatten(true)
///     .with_split_uv_seams(true);
/// assert!(options.validate().is_ok());
///
/// let same = Options::FLATTEN | Options::SPLIT_SEAMS;
/// assert_eq!(options, same);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Merge every group into one group named after the document
    pub force_single_group: bool,
    /// Keep zero-triangle groups as transform anchors
    pub create_empty_groups: bool,
    /// Log per-group statistics after loading and when saving
    pub log_group_info: bool,
    /// Relabel flattened vertices so each UV shell is contiguous
    pub split_uv_seams: bool,
    /// Co-index normals and uvs with positions
    pub per_vertex_flatten: bool,
    /// Malformed line handling
    pub error_policy: ErrorPolicy,
}

impl Options {
    /// Only `force_single_group`
    pub const SINGLE_GROUP: Self = Self {
        force_single_group: true,
        ..Self::new()
    };
    /// Only `create_empty_groups`
    pub const EMPTY_GROUPS: Self = Self {
        create_empty_groups: true,
        ..Self::new()
    };
    /// Only `log_group_info`
    pub const LOG_GROUPS: Self = Self {
        log_group_info: true,
        ..Self::new()
    };
    /// Only `split_uv_seams`
    pub const SPLIT_SEAMS: Self = Self {
        split_uv_seams: true,
        ..Self::new()
    };
    /// Only `per_vertex_flatten`
    pub const FLATTEN: Self = Self {
        per_vertex_flatten: true,
        ..Self::new()
    };
    /// Only the skip-malformed-lines error policy
    pub const SKIP_MALFORMED: Self = Self {
        error_policy: ErrorPolicy::SkipMalformedLines,
        ..Self::new()
    };

    /// All options off
    pub const fn new() -> Self {
        Self {
            force_single_group: false,
            create_empty_groups: false,
            log_group_info: false,
            split_uv_seams: false,
            per_vertex_flatten: false,
            error_policy: ErrorPolicy::Abort,
        }
    }

    /// Set `force_single_group`
    pub fn with_force_single_group(mut self, enabled: bool) -> Self {
        self.force_single_group = enabled;
        self
    }

    /// Set `create_empty_groups`
    pub fn with_create_empty_groups(mut self, enabled: bool) -> Self {
        self.create_empty_groups = enabled;
        self
    }

    /// Set `log_group_info`
    pub fn with_log_group_info(mut self, enabled: bool) -> Self {
        self.log_group_info = enabled;
        self
    }

    /// Set `split_uv_seams`
    pub fn with_split_uv_seams(mut self, enabled: bool) -> Self {
        self.split_uv_seams = enabled;
        self
    }

    /// Set `per_vertex_flatten`
    pub fn with_per_vertex_flatten(mut self, enabled: bool) -> Self {
        self.per_vertex_flatten = enabled;
        self
    }

    /// Set the malformed line policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Reject combinations that cannot be honoured
    pub fn validate(&self) -> Result<()> {
        if self.split_uv_seams && !self.per_vertex_flatten {
            return Err(Error::InvalidOptionCombination(
                "split_uv_seams requires per_vertex_flatten".to_string(),
            ));
        }
        Ok(())
    }
}

impl BitOr for Options {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            force_single_group: self.force_single_group || rhs.force_single_group,
            create_empty_groups: self.create_empty_groups || rhs.create_empty_groups,
            log_group_info: self.log_group_info || rhs.log_group_info,
            split_uv_seams: self.split_uv_seams || rhs.split_uv_seams,
            per_vertex_flatten: self.per_vertex_flatten || rhs.per_vertex_flatten,
            error_policy: if rhs.error_policy == ErrorPolicy::Abort {
                self.error_policy
            } else {
                rhs.error_policy
            },
        }
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.force_single_group, "SingleGroup"),
            (self.create_empty_groups, "EmptyGroups"),
            (self.log_group_info, "LogGroups"),
            (self.split_uv_seams, "SplitSeams"),
            (self.per_vertex_flatten, "Flatten"),
            (
                self.error_policy == ErrorPolicy::SkipMalformedLines,
                "SkipMalformed",
            ),
        ];
        let set: Vec<&str> = flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", set.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_off() {
        let options = Options::default();
        assert_eq!(options, Options::new());
        assert!(!options.per_vertex_flatten);
        assert_eq!(options.error_policy, ErrorPolicy::Abort);
        assert_eq!(options.to_string(), "None");
    }

    #[test]
    fn test_bitor_combines_flags() {
        let options = Options::SINGLE_GROUP | Options::FLATTEN | Options::SKIP_MALFORMED;
        assert!(options.force_single_group);
        assert!(options.per_vertex_flatten);
        assert!(!options.split_uv_seams);
        assert_eq!(options.error_policy, ErrorPolicy::SkipMalformedLines);
        assert_eq!(options.to_string(), "SingleGroup|Flatten|SkipMalformed");
    }

    #[test]
    fn test_split_seams_requires_flatten() {
        let err = Options::SPLIT_SEAMS.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidOptionCombination(_)));
        assert!((Options::SPLIT_SEAMS | Options::FLATTEN).validate().is_ok());
    }
}
