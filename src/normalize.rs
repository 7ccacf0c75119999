//! Path normalization: turns an arbitrary input path into the normalized
//! forward-slash absolute form every matching API requires (§6's
//! path-input form). Kept separate from the matcher because it's the one
//! place this engine actually looks at the filesystem's notion of "home"
//! or "cwd" rather than pure pattern algebra.

/// Context needed to resolve `~`, relative paths, and (for `..`) a
/// sensible floor so `..` can't walk above the project root when one is
/// given.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub home_dir: String,
    pub cwd: String,
    pub project_root: Option<String>,
}

/// Normalizes `input` to `/`-separated, absolute, no `.`/`..`, no
/// trailing slash (except a bare `/`). Backslashes are treated as path
/// separators (Windows-style input is accepted and rewritten).
pub fn normalize(input: &str, ctx: &NormalizeContext) -> String {
    let slashed = input.replace('\\', "/");

    let absolute_base = if let Some(rest) = slashed.strip_prefix('~') {
        format!("{}{}", ctx.home_dir.trim_end_matches('/'), rest)
    } else if slashed.starts_with('/') {
        slashed
    } else {
        format!("{}/{}", ctx.cwd.trim_end_matches('/'), slashed)
    };

    let floor = ctx.project_root.as_deref().map(split_components).unwrap_or_default();
    let mut stack: Vec<&str> = Vec::new();
    for component in split_components(&absolute_base) {
        match component {
            "." => {}
            ".." => {
                if stack.len() > floor.len() {
                    stack.pop();
                }
            }
            other => stack.push(other),
        }
    }

    if stack.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", stack.join("/"))
    }
}

fn split_components(path: &str) -> Vec<&str> {
    path.split('/').filter(|c| !c.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> NormalizeContext {
        NormalizeContext { home_dir: "/home/alice".to_string(), cwd: "/home/alice/project".to_string(), project_root: None }
    }

    #[test]
    fn expands_tilde_to_home_dir() {
        assert_eq!(normalize("~/src/lib.rs", &ctx()), "/home/alice/src/lib.rs");
    }

    #[test]
    fn resolves_relative_paths_against_cwd() {
        assert_eq!(normalize("src/lib.rs", &ctx()), "/home/alice/project/src/lib.rs");
    }

    #[test]
    fn collapses_dot_and_dot_dot() {
        assert_eq!(normalize("/a/./b/../c", &ctx()), "/a/c");
    }

    #[test]
    fn project_root_floors_dot_dot_climbing() {
        let context = NormalizeContext { project_root: Some("/home/alice/project".to_string()), ..ctx() };
        assert_eq!(normalize("../../../etc/passwd", &context), "/home/alice/project/etc/passwd");
    }

    #[test]
    fn backslashes_are_treated_as_separators() {
        assert_eq!(normalize(r"C:\temp\file.txt", &ctx()), "/C:/temp/file.txt");
    }

    #[test]
    fn root_normalizes_to_bare_slash() {
        assert_eq!(normalize("/", &ctx()), "/");
        assert_eq!(normalize("/a/..", &ctx()), "/");
    }
}
