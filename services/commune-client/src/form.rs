use crate::api::{ApiClient, CreatedPost, Error};

/// Controlled state behind the create-post page.
///
/// The displayed value is always the last committed state value, and a
/// submission clears both fields whatever the API answers. The outcome
/// of the submission is still reported to the caller.
#[derive(Debug, Clone, Default)]
pub struct CreatePostForm {
    title: String,
    content: String,
}

impl CreatePostForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Send the form as a single post creation request. Both fields are
    /// reset before the outcome is known.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<CreatedPost, Error> {
        let title = std::mem::take(&mut self.title);
        let content = std::mem::take(&mut self.content);
        api.create_post(&title, &content).await
    }
}
