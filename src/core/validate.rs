//! Platform-dependent required-field rules.
//!
//! The same rules gate a parsed libc file and describe what a successful
//! discovery produces:
//!
//! | field              | required when                          |
//! |--------------------|----------------------------------------|
//! | `include_dir`      | always                                 |
//! | `sys_include_dir`  | always                                 |
//! | `crt_dir`          | target is not Darwin                   |
//! | `msvc_lib_dir`     | target is Windows with a non-GNU ABI   |
//! | `kernel32_lib_dir` | target is Windows with a non-GNU ABI   |

use crate::core::record::{Field, InstallationRecord};
use crate::core::target::Target;

/// Why a field is required for a target, or `None` if it is optional.
pub fn requirement(field: Field, target: &Target) -> Option<&'static str> {
    match field {
        Field::IncludeDir | Field::SysIncludeDir => Some("required on every target"),
        Field::CrtDir if !target.is_darwin() => Some("required unless targeting macOS"),
        Field::MsvcLibDir | Field::Kernel32LibDir if target.is_windows_msvc() => {
            Some("required when targeting MSVC on Windows")
        }
        _ => None,
    }
}

/// Whether a field must be present for `target`.
pub fn is_required(field: Field, target: &Target) -> bool {
    requirement(field, target).is_some()
}

/// The fields that must be present for `target`, in canonical order.
pub fn required_fields(target: &Target) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|f| is_required(*f, target))
        .collect()
}

/// The first required field missing from `record`, with the reason it is
/// required.
pub fn first_missing(record: &InstallationRecord, target: &Target) -> Option<(Field, &'static str)> {
    Field::ALL.into_iter().find_map(|field| {
        let reason = requirement(field, target)?;
        (!record.is_set(field)).then_some((field, reason))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(triple: &str) -> Target {
        Target::parse(triple).unwrap()
    }

    #[test]
    fn test_linux_requirements() {
        let fields = required_fields(&target("x86_64-unknown-linux-gnu"));
        assert_eq!(
            fields,
            vec![Field::IncludeDir, Field::SysIncludeDir, Field::CrtDir]
        );
    }

    #[test]
    fn test_darwin_does_not_need_crt() {
        let fields = required_fields(&target("aarch64-apple-darwin"));
        assert_eq!(fields, vec![Field::IncludeDir, Field::SysIncludeDir]);
    }

    #[test]
    fn test_windows_msvc_needs_everything() {
        let fields = required_fields(&target("x86_64-pc-windows-msvc"));
        assert_eq!(fields, Field::ALL.to_vec());
    }

    #[test]
    fn test_windows_gnu_skips_msvc_dirs() {
        let fields = required_fields(&target("x86_64-pc-windows-gnu"));
        assert_eq!(
            fields,
            vec![Field::IncludeDir, Field::SysIncludeDir, Field::CrtDir]
        );
    }

    #[test]
    fn test_first_missing_in_canonical_order() {
        let mut record = InstallationRecord::new();
        record.set(Field::SysIncludeDir, "/usr/include");
        let t = target("x86_64-unknown-linux-gnu");

        assert_eq!(first_missing(&record, &t).map(|m| m.0), Some(Field::IncludeDir));

        record.set(Field::IncludeDir, "/usr/include");
        assert_eq!(first_missing(&record, &t).map(|m| m.0), Some(Field::CrtDir));

        record.set(Field::CrtDir, "/usr/lib");
        assert!(first_missing(&record, &t).is_none());
    }
}
