use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{AnalysisError, SessionFile};

const SUBJECT_DIR_PREFIX: &str = "sub-";
const SESSION_FILE_EXTENSION: &str = "nwb";

/// Locates session files under a data root.
///
/// The expected layout is one subdirectory per subject (named `sub-<id>`),
/// each containing `.nwb` files named `sub-<subject>_ses-<session>` with an
/// optional trailing suffix. Subjects and files are visited in lexicographic
/// order so a run is deterministic regardless of filesystem enumeration
/// order. Files that do not follow the naming convention are skipped.
///
/// # Arguments
///
/// * `root` - Data root containing the subject subdirectories
///
/// # Returns
///
/// A `Result` containing the discovered session files, in processing order.
pub fn find_sessions(root: &Path) -> Result<Vec<SessionFile>, AnalysisError> {
    let mut subject_dirs: Vec<PathBuf> = Vec::new();

    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        let is_subject_dir = path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(SUBJECT_DIR_PREFIX));
        if is_subject_dir {
            subject_dirs.push(path);
        }
    }
    subject_dirs.sort();

    let mut sessions = Vec::new();
    for dir in &subject_dirs {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(SESSION_FILE_EXTENSION))
            })
            .collect();
        files.sort();

        for path in files {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            match parse_session_name(stem) {
                Some((subject, session)) => sessions.push(SessionFile {
                    path,
                    subject,
                    session,
                }),
                None => debug!("Skipping file with unrecognized name: {}", path.display()),
            }
        }
    }

    Ok(sessions)
}

/// Parses subject and session identifiers from a file stem.
///
/// Accepts `sub-<subject>_ses-<session>` with any further underscore-separated
/// suffix (e.g., `sub-mouse01_ses-20240117_behavior`). Returns `None` when
/// either identifier is absent or empty.
pub(crate) fn parse_session_name(stem: &str) -> Option<(String, String)> {
    let mut subject = None;
    let mut session = None;

    for token in stem.split('_') {
        if let Some(rest) = token.strip_prefix("sub-") {
            if subject.is_none() && !rest.is_empty() {
                subject = Some(rest.to_string());
            }
        } else if let Some(rest) = token.strip_prefix("ses-") {
            if session.is_none() && !rest.is_empty() {
                session = Some(rest.to_string());
            }
        }
    }

    Some((subject?, session?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn parses_conventional_names() {
        assert_eq!(
            parse_session_name("sub-mouse01_ses-20240117"),
            Some(("mouse01".to_string(), "20240117".to_string()))
        );
        assert_eq!(
            parse_session_name("sub-r12_ses-03_behavior"),
            Some(("r12".to_string(), "03".to_string()))
        );
    }

    #[test]
    fn rejects_incomplete_names() {
        assert_eq!(parse_session_name("sub-mouse01"), None);
        assert_eq!(parse_session_name("ses-20240117"), None);
        assert_eq!(parse_session_name("sub-_ses-01"), None);
        assert_eq!(parse_session_name("notes"), None);
    }

    #[test]
    fn discovery_is_sorted_and_filtered() {
        let root = tempfile::tempdir().unwrap();

        for dir in ["sub-b", "sub-a", "analysis"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        for (dir, file) in [
            ("sub-b", "sub-b_ses-01.nwb"),
            ("sub-a", "sub-a_ses-02.nwb"),
            ("sub-a", "sub-a_ses-01.nwb"),
            ("sub-a", "readme.txt"),
            ("sub-a", "scratch.nwb"),
            ("analysis", "sub-c_ses-01.nwb"),
        ] {
            File::create(root.path().join(dir).join(file)).unwrap();
        }

        let sessions = find_sessions(root.path()).unwrap();
        let ids: Vec<(&str, &str)> = sessions
            .iter()
            .map(|s| (s.subject.as_str(), s.session.as_str()))
            .collect();

        // "analysis" is not a subject dir, readme.txt is not a session file,
        // and scratch.nwb does not follow the naming convention.
        assert_eq!(ids, vec![("a", "01"), ("a", "02"), ("b", "01")]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        assert!(find_sessions(&missing).is_err());
    }
}
