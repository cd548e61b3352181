//! Image modal
//!
//! Click a generated image in the chat log to see it full size. The close
//! button or a click on the dark overlay around the image closes it again.

/// What a click inside the modal landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalTarget {
    /// The overlay itself (`#image-modal`)
    Overlay,
    /// The enlarged image (`#modal-img`)
    Image,
    /// The close control (`.close-modal-btn`)
    CloseButton,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageModal {
    open: Option<String>,
}

impl ImageModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source of the image being shown, if open
    pub fn image(&self) -> Option<&str> {
        self.open.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Open the modal on a `dream-image`'s source
    pub fn open(&mut self, src: impl Into<String>) {
        self.open = Some(src.into());
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    /// Handle a click inside the open modal
    pub fn on_click(&mut self, target: ModalTarget) {
        match target {
            ModalTarget::Overlay | ModalTarget::CloseButton => self.close(),
            ModalTarget::Image => {}
        }
    }
}
