//! Static file serving
//!
//! [`serve`] answers for one filesystem path: a directory becomes an HTML
//! link list, a regular file is returned as `text/plain`, anything else is
//! refused. Filesystem problems always end up as a status page on the
//! response, never as an error to the caller.
//!
//! [`StaticFiles`] puts a root directory in front of [`serve`] and refuses
//! request paths that would leave it.

use crate::{Response, StatusCode};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Serve a filesystem path into `res`
///
/// | path is            | status | body                       |
/// |--------------------|--------|----------------------------|
/// | missing            | 404    | `404 Not Found`            |
/// | directory          | 200    | `text/html` link list      |
/// | regular file       | 200    | `text/plain` file bytes    |
/// | other (device, …)  | 403    | `403 Forbidden`            |
/// | unreadable         | 500    | `500 Internal Server Error`|
///
/// Symlinks are followed. Directory entries are listed in the order the
/// filesystem yields them, each linked by its full path.
pub fn serve(path: impl AsRef<Path>, res: &mut Response) {
    let path = path.as_ref();

    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "static path not found");
            res.set_status_page(StatusCode::NOT_FOUND);
            return;
        }
    };

    if meta.is_dir() {
        list_directory(path, res);
    } else if meta.is_file() {
        serve_file(path, res);
    } else {
        debug!(path = %path.display(), "refusing special file");
        res.set_status_page(StatusCode::FORBIDDEN);
    }
}

fn serve_file(path: &Path, res: &mut Response) {
    match fs::read(path) {
        Ok(content) => {
            res.set_status(StatusCode::OK);
            res.set_header("Content-Type", "text/plain");
            res.set_body(content);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file");
            res.set_status_page(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn list_directory(path: &Path, res: &mut Response) {
    match render_listing(path) {
        Ok(html) => {
            res.set_status(StatusCode::OK);
            res.set_header("Content-Type", "text/html");
            res.set_body(html);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to list directory");
            res.set_status_page(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn render_listing(path: &Path) -> std::io::Result<String> {
    let mut html = String::from("<html><body><ul>");
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            entry.path().display(),
            entry.file_name().to_string_lossy()
        ));
    }
    html.push_str("</ul></body></html>");
    Ok(html)
}

/// Static file configuration
#[derive(Debug, Clone)]
pub struct StaticFileConfig {
    /// Root directory
    pub root: PathBuf,
    /// Allow hidden files (dot files)
    pub hidden: bool,
}

impl Default for StaticFileConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            hidden: false,
        }
    }
}

impl StaticFileConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn hidden(mut self, allowed: bool) -> Self {
        self.hidden = allowed;
        self
    }
}

/// Static files under a root directory
#[derive(Debug, Clone)]
pub struct StaticFiles {
    config: StaticFileConfig,
}

impl StaticFiles {
    pub fn new(config: StaticFileConfig) -> Self {
        Self { config }
    }

    /// Serve files below `root` with default settings
    pub fn root(root: impl Into<PathBuf>) -> Self {
        Self::new(StaticFileConfig::new(root))
    }

    /// Serve `relative` (a request-supplied path) from below the root
    ///
    /// Paths that would escape the root or touch hidden files get a 404.
    pub fn handle(&self, relative: &str, res: &mut Response) {
        match self.sanitize_path(relative) {
            Some(path) => serve(self.config.root.join(path), res),
            None => {
                debug!(path = relative, "rejected static path");
                res.set_status_page(StatusCode::NOT_FOUND);
            }
        }
    }

    /// Sanitize request path to prevent directory traversal
    fn sanitize_path(&self, path: &str) -> Option<PathBuf> {
        let path = path.trim_start_matches('/');

        // Check for hidden files
        if !self.config.hidden && path.split('/').any(|s| s.starts_with('.') && s != ".") {
            return None;
        }

        let mut result = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(c) => result.push(c),
                Component::ParentDir => return None, // Prevent ../
                _ => {}
            }
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn body_of(res: &Response) -> String {
        res.body_string().unwrap()
    }

    #[test]
    fn test_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut res = Response::ok();
        serve(dir.path().join("nope.txt"), &mut res);

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(&res), "404 Not Found");
    }

    #[test]
    fn test_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("notes.html");
        File::create(&file_path).unwrap().write_all(b"<b>raw</b>\n").unwrap();

        let mut res = Response::ok();
        serve(&file_path, &mut res);

        assert_eq!(res.status(), StatusCode::OK);
        // Content type does not depend on the extension
        assert_eq!(res.content_type(), Some("text/plain"));
        assert_eq!(res.body().as_ref(), b"<b>raw</b>\n");
        assert_eq!(res.header("Content-Length"), Some("11"));
    }

    #[test]
    fn test_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("deep.txt")).unwrap();

        let mut res = Response::ok();
        serve(dir.path(), &mut res);

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.content_type(), Some("text/html"));

        let html = body_of(&res);
        assert!(html.starts_with("<html><body><ul>"));
        assert!(html.ends_with("</ul></body></html>"));
        let file_link = format!("<li><a href=\"{}\">a.txt</a></li>", dir.path().join("a.txt").display());
        let dir_link = format!("<li><a href=\"{}\">sub</a></li>", dir.path().join("sub").display());
        assert!(html.contains(&file_link));
        assert!(html.contains(&dir_link));
        assert!(!html.contains("deep.txt"));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut res = Response::ok();
        serve(dir.path(), &mut res);

        assert_eq!(body_of(&res), "<html><body><ul></ul></body></html>");
    }

    #[cfg(unix)]
    #[test]
    fn test_special_file_forbidden() {
        let mut res = Response::ok();
        serve("/dev/null", &mut res);

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_of(&res), "403 Forbidden");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_unreadable_file_is_500() {
        // A regular file whose read fails at offset 0
        let mut res = Response::ok();
        serve("/proc/self/mem", &mut res);

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(&res), "500 Internal Server Error");
        assert_eq!(res.content_type(), None);
    }

    #[test]
    fn test_listing_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("plain.txt");
        File::create(&file_path).unwrap();

        assert!(render_listing(&file_path).is_err());

        let mut res = Response::ok();
        list_directory(&file_path, &mut res);
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(&res), "500 Internal Server Error");
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_directory_is_500() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind root
        let readable = fs::read_dir(&locked).is_ok();
        let mut res = Response::ok();
        serve(&locked, &mut res);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body_of(&res), "500 Internal Server Error");
        }
    }

    #[test]
    fn test_keeps_existing_headers() {
        let dir = tempfile::tempdir().unwrap();
        let mut res = Response::ok();
        res.set_header("X-Custom-Header", "Middleware-Value");
        serve(dir.path().join("missing"), &mut res);

        assert_eq!(res.header("X-Custom-Header"), Some("Middleware-Value"));
    }

    #[test]
    fn test_sanitize_path() {
        let handler = StaticFiles::root(".");

        assert_eq!(handler.sanitize_path("/index.html"), Some(PathBuf::from("index.html")));
        assert_eq!(handler.sanitize_path("css/style.css"), Some(PathBuf::from("css/style.css")));
        assert!(handler.sanitize_path("/../etc/passwd").is_none());
        assert!(handler.sanitize_path("a/../../b").is_none());
        assert!(handler.sanitize_path("/.hidden").is_none());
        assert_eq!(handler.sanitize_path("./a.txt"), Some(PathBuf::from("a.txt")));
    }

    #[test]
    fn test_hidden_allowed() {
        let handler = StaticFiles::new(StaticFileConfig::new(".").hidden(true));
        assert_eq!(handler.sanitize_path(".env"), Some(PathBuf::from(".env")));
        assert!(handler.sanitize_path("../x").is_none());
    }

    #[test]
    fn test_handle_under_root() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("hello.txt")).unwrap().write_all(b"hello").unwrap();
        let handler = StaticFiles::root(dir.path());

        let mut res = Response::ok();
        handler.handle("hello.txt", &mut res);
        assert_eq!(body_of(&res), "hello");

        let mut res = Response::ok();
        handler.handle("../hello.txt", &mut res);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
