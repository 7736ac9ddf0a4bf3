//! Stack types: what the caller wants and what the remote API reports.

use std::fmt;

use super::id::StackId;

/// A stack as reported by the remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStack {
    pub id: StackId,
    pub name: String,
}

impl RemoteStack {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: StackId::new(id),
            name: name.into(),
        }
    }
}

impl fmt::Display for RemoteStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}

/// Options forwarded verbatim to the remote update call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Remove services no longer present in the stack file.
    pub prune: bool,
    /// Force a re-pull of images referenced by the stack.
    pub pull_image: bool,
}

/// Desired state for a single stack, fixed for the whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct StackIntent {
    pub name: String,
    /// Full stack definition, already template-expanded.
    pub file_content: String,
    pub delete: bool,
    pub update_options: UpdateOptions,
}

impl StackIntent {
    pub fn new(name: impl Into<String>, file_content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_content: file_content.into(),
            delete: false,
            update_options: UpdateOptions::default(),
        }
    }

    #[must_use]
    pub fn with_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    #[must_use]
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.update_options.prune = prune;
        self
    }

    #[must_use]
    pub fn with_pull_image(mut self, pull_image: bool) -> Self {
        self.update_options.pull_image = pull_image;
        self
    }
}

// Stack files routinely embed secrets; keep them out of debug output.
impl fmt::Debug for StackIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackIntent")
            .field("name", &self.name)
            .field("file_content", &format_args!("<{} bytes>", self.file_content.len()))
            .field("delete", &self.delete)
            .field("update_options", &self.update_options)
            .finish()
    }
}
