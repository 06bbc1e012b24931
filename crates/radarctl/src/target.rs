use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TARGET_IMAGE: &str = "/wanted.png";

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct TargetPath(String);

crate::impl_string_newtype!(TargetPath);

impl TargetPath {
    /// Web-style absolute paths (`/wanted.png`) are looked up under `asset_dir`
    /// when one is configured. A `file://` prefix always means a literal path.
    pub fn resolve(&self, asset_dir: Option<&Path>) -> PathBuf {
        if let Some(literal) = self.0.strip_prefix("file://") {
            return PathBuf::from(literal);
        }
        match asset_dir {
            Some(root) => root.join(self.0.trim_start_matches('/')),
            None => PathBuf::from(&self.0),
        }
    }
}

impl Default for TargetPath {
    fn default() -> Self {
        Self::from(DEFAULT_TARGET_IMAGE)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read target image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode target image: {0}")]
    Decode(String),
}

/// Image shown at the target marker. Once loaded it never returns to `Pending`.
#[derive(Debug, Clone)]
pub enum TargetImage<T> {
    Pending,
    Primary(T),
    Fallback(T),
}

impl<T> TargetImage<T> {
    pub fn handle(&self) -> Option<&T> {
        match self {
            Self::Pending => None,
            Self::Primary(handle) | Self::Fallback(handle) => Some(handle),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl<T> Default for TargetImage<T> {
    fn default() -> Self {
        Self::Pending
    }
}

/// Identifies one load attempt. Only the most recent ticket may complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    path: TargetPath,
}

impl LoadTicket {
    pub fn path(&self) -> &TargetPath {
        &self.path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Loaded,
    FellBack,
    /// The primary and the fallback both failed; the image is unchanged.
    Failed,
    /// Superseded or cancelled; the result was discarded.
    Stale,
}

impl Completion {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Loaded | Self::FellBack)
    }
}

pub struct TargetLoader<T> {
    generation: u64,
    in_flight: Option<u64>,
    image: TargetImage<T>,
    failed_attempts: usize,
}

impl<T> TargetLoader<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            in_flight: None,
            image: TargetImage::Pending,
            failed_attempts: 0,
        }
    }

    /// Empty loader for a new mount. Generations keep counting from `self`, so
    /// tickets handed out before the remount can never match.
    pub fn succeeding(&self) -> Self {
        Self {
            generation: self.generation,
            ..Self::new()
        }
    }

    /// Starts a new attempt, superseding any earlier one. The current image
    /// stays visible until the new attempt completes.
    pub fn request(&mut self, path: TargetPath) -> LoadTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        LoadTicket {
            generation: self.generation,
            path,
        }
    }

    /// Discards whatever is in flight.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn image(&self) -> &TargetImage<T> {
        &self.image
    }

    pub fn handle(&self) -> Option<&T> {
        self.image.handle()
    }

    pub fn failed_attempts(&self) -> usize {
        self.failed_attempts
    }

    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<T, LoadError>,
        fallback: impl FnOnce() -> Result<T, LoadError>,
    ) -> Completion {
        if self.in_flight != Some(ticket.generation) {
            log::debug!("Ignoring stale load of '{}'", ticket.path);
            return Completion::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(handle) => {
                log::info!("Loaded target image '{}'", ticket.path);
                self.image = TargetImage::Primary(handle);
                Completion::Loaded
            }
            Err(e) => {
                self.failed_attempts += 1;
                log::warn!("{} ('{}'), using fallback icon", e, ticket.path);
                match fallback() {
                    Ok(handle) => {
                        self.image = TargetImage::Fallback(handle);
                        Completion::FellBack
                    }
                    Err(e) => {
                        log::error!("Fallback icon unavailable: {}", e);
                        Completion::Failed
                    }
                }
            }
        }
    }
}

impl<T> Default for TargetLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> Result<&'static str, LoadError> {
        Err(LoadError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing.png",
        )))
    }

    fn icon() -> Result<&'static str, LoadError> {
        Ok("fallback")
    }

    #[test]
    fn test_success_reaches_primary_and_stays() {
        let mut loader = TargetLoader::new();
        let ticket = loader.request(TargetPath::from("/wanted.png"));
        assert!(loader.image().is_pending());

        let done = loader.complete(ticket.clone(), Ok("wanted"), icon);
        assert_eq!(done, Completion::Loaded);
        assert_eq!(loader.handle(), Some(&"wanted"));

        // a duplicate completion of the same ticket can't revert the image
        assert_eq!(loader.complete(ticket, missing(), icon), Completion::Stale);
        assert!(loader.image().is_primary());
        assert_eq!(loader.failed_attempts(), 0);
    }

    #[test]
    fn test_failure_falls_back_and_counts_once() {
        let mut loader = TargetLoader::new();
        let ticket = loader.request(TargetPath::from("/missing.png"));

        assert_eq!(
            loader.complete(ticket.clone(), missing(), icon),
            Completion::FellBack
        );
        assert_eq!(loader.complete(ticket, missing(), icon), Completion::Stale);

        assert!(loader.image().is_fallback());
        assert_eq!(loader.handle(), Some(&"fallback"));
        assert_eq!(loader.failed_attempts(), 1);
        assert!(!loader.is_loading());
    }

    #[test]
    fn test_superseded_load_is_ignored() {
        let mut loader = TargetLoader::new();
        let first = loader.request(TargetPath::from("/first.png"));
        let second = loader.request(TargetPath::from("/second.png"));

        assert_eq!(loader.complete(second, Ok("second"), icon), Completion::Loaded);
        assert_eq!(loader.complete(first, Ok("first"), icon), Completion::Stale);
        assert_eq!(loader.handle(), Some(&"second"));
    }

    #[test]
    fn test_ticket_from_previous_mount_is_stale() {
        let mut first = TargetLoader::new();
        let old = first.request(TargetPath::from("/old.png"));
        first.cancel();

        let mut second = first.succeeding();
        assert!(second.image().is_pending());
        let fresh = second.request(TargetPath::from("/new.png"));

        assert_eq!(second.complete(old, Ok("old image"), icon), Completion::Stale);
        assert!(second.image().is_pending());
        assert_eq!(second.complete(fresh, Ok("new image"), icon), Completion::Loaded);
        assert_eq!(second.handle(), Some(&"new image"));
    }

    #[test]
    fn test_stale_failure_does_not_warn_or_fall_back() {
        let mut loader = TargetLoader::new();
        let first = loader.request(TargetPath::from("/first.png"));
        let second = loader.request(TargetPath::from("/second.png"));

        assert_eq!(loader.complete(first, missing(), icon), Completion::Stale);
        assert_eq!(loader.failed_attempts(), 0);
        assert!(loader.image().is_pending());
        assert!(loader.is_loading());

        loader.complete(second, Ok("second"), icon);
        assert!(loader.image().is_primary());
    }

    #[test]
    fn test_previous_image_kept_while_new_path_loads() {
        let mut loader = TargetLoader::new();
        let first = loader.request(TargetPath::from("/first.png"));
        loader.complete(first, Ok("first"), icon);

        let _second = loader.request(TargetPath::from("/second.png"));
        assert_eq!(loader.handle(), Some(&"first"));
    }

    #[test]
    fn test_cancel_discards_in_flight() {
        let mut loader = TargetLoader::new();
        let ticket = loader.request(TargetPath::from("/wanted.png"));
        loader.cancel();

        assert_eq!(loader.complete(ticket, Ok("late"), icon), Completion::Stale);
        assert!(loader.image().is_pending());
    }

    #[test]
    fn test_fallback_failure_leaves_image_unchanged() {
        let mut loader: TargetLoader<&str> = TargetLoader::new();
        let ticket = loader.request(TargetPath::from("/missing.png"));

        let done = loader.complete(ticket, missing(), || {
            Err(LoadError::Decode("broken".to_string()))
        });
        assert_eq!(done, Completion::Failed);
        assert!(!done.changed());
        assert!(loader.image().is_pending());
        assert_eq!(loader.failed_attempts(), 1);
    }

    #[test]
    fn test_path_resolution() {
        let root = Path::new("/srv/radar");
        let cases = vec![
            ("/wanted.png", Some(root), "/srv/radar/wanted.png"),
            ("img/target.png", Some(root), "/srv/radar/img/target.png"),
            ("file:///tmp/x.png", Some(root), "/tmp/x.png"),
            ("/wanted.png", None, "/wanted.png"),
            ("relative.png", None, "relative.png"),
        ];

        for (raw, dir, expected) in cases {
            assert_eq!(
                TargetPath::from(raw).resolve(dir),
                PathBuf::from(expected),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_path_is_transparent_in_serde() {
        let path: TargetPath = serde_json::from_str("\"/wanted.png\"").unwrap();
        assert_eq!(path, TargetPath::default());
    }
}
