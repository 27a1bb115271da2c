//! Comment rendering contract and the built-in markdown renderer.

use async_trait::async_trait;
use cla_types::RenderedComment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Comments the bot posts on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentTemplate {
    /// Asks the author to sign, with the accepted commands.
    Agreement,
    /// The command could not be understood.
    Error,
    /// Signing on behalf of a prohibited company.
    BlockedCompany,
}

/// Values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentParams {
    pub user: String,
    pub bot: String,
    /// Link to the agreement document
    pub agreement: Option<String>,
    pub company: Option<String>,
}

impl CommentParams {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
            ..Self::default()
        }
    }

    pub fn with_agreement(mut self, agreement: impl Into<String>) -> Self {
        self.agreement = Some(agreement.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("template {template:?} requires parameter `{parameter}`")]
    MissingParameter {
        template: CommentTemplate,
        parameter: &'static str,
    },

    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

/// Turns a template and its parameters into a comment.
#[async_trait]
pub trait CommentRenderer: Send + Sync {
    async fn render(
        &self,
        template: CommentTemplate,
        params: &CommentParams,
    ) -> Result<RenderedComment, RenderError>;
}

/// Renders the built-in markdown templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownCommentRenderer;

impl MarkdownCommentRenderer {
    pub fn new() -> Self {
        Self
    }

    fn agreement(params: &CommentParams) -> Result<String, RenderError> {
        let agreement = params
            .agreement
            .as_deref()
            .ok_or(RenderError::MissingParameter {
                template: CommentTemplate::Agreement,
                parameter: "agreement",
            })?;

        Ok(format!(
            "@{user} please read the following Contributor License Agreement (CLA). \
             If you agree with the CLA, please reply with the following information.\n\n\
             ```\n\
             @{bot} agree [company=\"{{your company}}\"]\n\
             ```\n\n\
             > Options:\n\
             > - (default - no company specified) I have sole ownership of intellectual property rights \
             to my Submissions and I am not making Submissions in the course of work for my employer.\n\
             > ```\n\
             > @{bot} agree\n\
             > ```\n\
             > - (when company given) I am making Submissions in the course of work for my employer \
             (or my employer has intellectual property rights in my Submissions by contract or applicable law). \
             I have permission from my employer to make Submissions and enter into this Agreement on behalf of my employer.\n\
             > ```\n\
             > @{bot} agree company=\"your company\"\n\
             > ```\n\n\
             To withdraw a previous agreement, reply with `@{bot} terminate`.\n\n\
             [Contributor License Agreement]({agreement})",
            user = params.user,
            bot = params.bot,
            agreement = agreement,
        ))
    }

    fn error(params: &CommentParams) -> String {
        format!(
            "@{user} the command you issued was incorrect. Please try again.\n\n\
             Examples are:\n\n\
             ```\n\
             @{bot} agree\n\
             ```\n\n\
             and\n\n\
             ```\n\
             @{bot} agree company=\"your company\"\n\
             ```",
            user = params.user,
            bot = params.bot,
        )
    }

    fn blocked_company(params: &CommentParams) -> Result<String, RenderError> {
        let company = params
            .company
            .as_deref()
            .ok_or(RenderError::MissingParameter {
                template: CommentTemplate::BlockedCompany,
                parameter: "company",
            })?;

        Ok(format!(
            "@{user} the agreement cannot be signed on behalf of \"{company}\". \
             Please sign as an individual or contact the repository maintainers.",
            user = params.user,
            company = company,
        ))
    }
}

#[async_trait]
impl CommentRenderer for MarkdownCommentRenderer {
    async fn render(
        &self,
        template: CommentTemplate,
        params: &CommentParams,
    ) -> Result<RenderedComment, RenderError> {
        let markdown = match template {
            CommentTemplate::Agreement => Self::agreement(params)?,
            CommentTemplate::Error => Self::error(params),
            CommentTemplate::BlockedCompany => Self::blocked_company(params)?,
        };
        Ok(RenderedComment::new(markdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_agreement_mentions_user_bot_and_link() {
        let params = CommentParams::new("alice", "cla-bot").with_agreement("https://x.yml");
        let comment = MarkdownCommentRenderer::new()
            .render(CommentTemplate::Agreement, &params)
            .await
            .unwrap();

        assert!(comment.markdown.starts_with("@alice "));
        assert!(comment.markdown.contains("@cla-bot agree company=\"your company\""));
        assert!(comment.markdown.contains("(https://x.yml)"));
        assert!(!comment.keep_history);
    }

    #[tokio::test]
    async fn test_agreement_requires_link() {
        let err = MarkdownCommentRenderer::new()
            .render(CommentTemplate::Agreement, &CommentParams::new("alice", "cla-bot"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingParameter {
                template: CommentTemplate::Agreement,
                parameter: "agreement",
            }
        );
    }

    #[tokio::test]
    async fn test_blocked_company_names_company() {
        let params = CommentParams::new("alice", "cla-bot").with_company("Acme Corp");
        let comment = MarkdownCommentRenderer::new()
            .render(CommentTemplate::BlockedCompany, &params)
            .await
            .unwrap();
        assert!(comment.markdown.contains("\"Acme Corp\""));
    }
}
