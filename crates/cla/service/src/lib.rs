//! # CLA Service
//!
//! Event-driven front of the CLA engine. The hosting process turns webhook
//! deliveries into [`EventContext`]s and hands them to [`ClaApp`], which
//! routes them to the registered handlers and returns an [`AppOutput`]:
//! conclusion, optional comment and check, and a batch of state writes.
//!
//! ## Handlers
//!
//! | Event | Handler |
//! |-------|---------|
//! | pull_request | [`PullRequestHandler`] |
//! | issue_comment | [`IssueCommentHandler`], [`LegacyCommentCleanup`] |
//! | push | [`PushHandler`] |
//! | merge_group | [`MergeGroupHandler`] |
//! | status | [`LegacyStatusOverride`] |

#![deny(unsafe_code)]

pub mod admin;
pub mod app;
pub mod audit;
pub mod comments;
pub mod config;
pub mod error;
pub mod event;
pub mod handlers;
pub mod telemetry;

pub use app::{ClaApp, Collaborators};
pub use comments::{CommentParams, CommentRenderer, CommentTemplate, MarkdownCommentRenderer, RenderError};
pub use config::{BotConfig, LegacyConfig, LoggingConfig, RetryConfig, ServiceConfig};
pub use error::{Result, ServiceError};
pub use event::{
    CommitState, CommitStatusEvent, EventAction, EventContext, EventPayload, EventType,
    IssueCommentEvent, MergeGroupEvent, PlatformContext, PolicyBinding, PullRequestEvent,
    PushEvent, PushedFile,
};
pub use handlers::{
    EventHandler, HandlerRegistry, IssueCommentHandler, LegacyCommentCleanup,
    LegacyStatusOverride, MergeGroupHandler, PullRequestHandler, PushHandler, Services,
};
pub use telemetry::init_tracing;
