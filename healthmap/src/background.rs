//! What is drawn behind the markers: the vector silhouette or a photo.
//!
//! Background selection is local view state. Switching it never touches the
//! marker list; markers are defined against the logical canvas, so a point on
//! the body stays a point on the body when a photo is swapped in.
//!
//! Other parts of the application (the photo gallery, for one) ask for a
//! background change by handing the engine a [`BackgroundCommand`].

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

/// The active background.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Background {
    /// Default vector body outline.
    #[default]
    Silhouette,
    /// An externally stored photo.
    Photo { url: String },
}

impl Background {
    #[must_use]
    pub fn is_photo(&self) -> bool {
        matches!(self, Self::Photo { .. })
    }

    #[must_use]
    pub fn photo_url(&self) -> Option<&str> {
        match self {
            Self::Photo { url } => Some(url),
            Self::Silhouette => None,
        }
    }
}

/// Typed request to change the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundCommand {
    /// Use the photo at `url` as the map background.
    UsePhoto(String),
    /// Return to the silhouette.
    UseSilhouette,
}

/// Holds the current background selection.
#[derive(Debug, Clone, Default)]
pub struct BackgroundProvider {
    current: Background,
}

impl BackgroundProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_photo(&mut self, url: impl Into<String>) {
        self.current = Background::Photo { url: url.into() };
    }

    /// Revert to the silhouette.
    pub fn clear_photo(&mut self) {
        self.current = Background::Silhouette;
    }

    #[must_use]
    pub fn current(&self) -> &Background {
        &self.current
    }

    /// Apply a command. Returns `true` if the background changed.
    pub fn apply(&mut self, command: BackgroundCommand) -> bool {
        let before = self.current.clone();
        match command {
            BackgroundCommand::UsePhoto(url) => self.set_photo(url),
            BackgroundCommand::UseSilhouette => self.clear_photo(),
        }
        self.current != before
    }
}
