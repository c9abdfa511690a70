/*!
`post.rs`

  linkedin post fetch <url> [--comments --reactions + limits / sort / replies]
  linkedin post react <url> --type <like|love|support|celebrate|insightful|funny>
  linkedin post comment <url> <text> [--company-url U]
  linkedin post create <text> [--company-url U] [--attachments url:type[:name] ...]

Attachment specs split on `:` from the right, so URLs keep their scheme
separator: `https://cdn/x.png:image`, `https://cdn/a.pdf:document:Deck`.
*/

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::{Value, json};

use super::shared::{Ctx, Params};
use crate::api::Action;
use crate::error::{ExitCode, UsageError};

const ATTACHMENT_TYPES: [&str; 3] = ["image", "video", "document"];

#[derive(Args, Debug)]
pub struct PostArgs {
    #[command(subcommand)]
    pub command: PostCommand,
}

#[derive(Subcommand, Debug)]
pub enum PostCommand {
    /// Fetch a LinkedIn post
    Fetch(FetchArgs),

    /// React to a LinkedIn post
    React {
        /// LinkedIn post URL
        url: String,

        /// Reaction type
        #[arg(long = "type", value_enum)]
        reaction: Reaction,

        /// React on behalf of a company page
        #[arg(long = "company-url")]
        company_url: Option<String>,
    },

    /// Comment on a LinkedIn post
    Comment {
        /// LinkedIn post URL
        url: String,

        /// Comment text (up to 1000 characters)
        text: String,

        /// Comment on behalf of a company page
        #[arg(long = "company-url")]
        company_url: Option<String>,
    },

    /// Create a LinkedIn post
    Create {
        /// Post text (up to 3000 characters)
        text: String,

        /// Post on behalf of a company page
        #[arg(long = "company-url")]
        company_url: Option<String>,

        /// Attachment as url:type[:name] (type: image|video|document), repeatable
        #[arg(long = "attachments", value_name = "SPEC")]
        attachments: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Reaction {
    Like,
    Love,
    Support,
    Celebrate,
    Insightful,
    Funny,
}

impl Reaction {
    fn as_str(&self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Love => "love",
            Reaction::Support => "support",
            Reaction::Celebrate => "celebrate",
            Reaction::Insightful => "insightful",
            Reaction::Funny => "funny",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CommentSort {
    #[value(name = "mostRelevant")]
    MostRelevant,
    #[value(name = "mostRecent")]
    MostRecent,
}

impl CommentSort {
    fn as_str(&self) -> &'static str {
        match self {
            CommentSort::MostRelevant => "mostRelevant",
            CommentSort::MostRecent => "mostRecent",
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// LinkedIn post URL
    pub url: String,

    /// Include comments
    #[arg(long)]
    pub comments: bool,

    /// Include reactions
    #[arg(long)]
    pub reactions: bool,

    /// Max comments to retrieve
    #[arg(long = "comments-limit", value_name = "N")]
    pub comments_limit: Option<u32>,

    /// Comment sort order
    #[arg(long = "comments-sort", value_enum)]
    pub comments_sort: Option<CommentSort>,

    /// Include comment replies
    #[arg(long = "comments-replies")]
    pub comments_replies: bool,

    /// Max reactions to retrieve
    #[arg(long = "reactions-limit", value_name = "N")]
    pub reactions_limit: Option<u32>,
}

pub fn execute_post(args: PostArgs, ctx: &Ctx) -> Result<()> {
    match args.command {
        PostCommand::Fetch(a) => ctx.run_action(Action::FetchPost, fetch_params(a)),
        PostCommand::React {
            url,
            reaction,
            company_url,
        } => {
            let mut p = Params::new();
            p.set("postUrl", url)
                .set("type", reaction.as_str())
                .opt("companyUrl", company_url);
            ctx.run_void_action(
                Action::ReactToPost,
                p.into_value(),
                &format!("Reacted with {}.", reaction.as_str()),
            )
        }
        PostCommand::Comment {
            url,
            text,
            company_url,
        } => {
            let mut p = Params::new();
            p.set("postUrl", url)
                .set("text", text)
                .opt("companyUrl", company_url);
            ctx.run_void_action(Action::CommentOnPost, p.into_value(), "Comment posted.")
        }
        PostCommand::Create {
            text,
            company_url,
            attachments,
        } => {
            let parsed = attachments
                .iter()
                .map(String::as_str)
                .map(parse_attachment)
                .collect::<Result<Vec<_>, _>>()?;
            let mut p = Params::new();
            p.set("text", text).opt("companyUrl", company_url);
            if !parsed.is_empty() {
                p.set("attachments", parsed);
            }
            ctx.run_action(Action::CreatePost, p.into_value())
        }
    }
}

fn fetch_params(a: FetchArgs) -> Value {
    let mut p = Params::new();
    p.set("postUrl", a.url)
        .flag("retrieveComments", a.comments)
        .flag("retrieveReactions", a.reactions);

    if a.comments {
        let mut config = Params::new();
        config
            .opt("limit", a.comments_limit)
            .opt("sort", a.comments_sort.map(|s| s.as_str()))
            .flag("replies", a.comments_replies);
        p.nested("commentsRetrievalConfig", config);
    }
    if a.reactions {
        let mut config = Params::new();
        config.opt("limit", a.reactions_limit);
        p.nested("reactionsRetrievalConfig", config);
    }
    p.into_value()
}

/// `url:type` or `url:type:name`.
fn parse_attachment(spec: &str) -> Result<Value, UsageError> {
    let parts: Vec<&str> = spec.split(':').collect();
    let n = parts.len();
    if n < 2 {
        return Err(UsageError::new(
            ExitCode::Validation,
            format!("Invalid attachment format: \"{spec}\". Expected url:type[:name]"),
        ));
    }

    let last = parts[n - 1];
    if ATTACHMENT_TYPES.contains(&last) {
        return Ok(json!({ "url": parts[..n - 1].join(":"), "type": last }));
    }
    if n > 2 && ATTACHMENT_TYPES.contains(&parts[n - 2]) {
        return Ok(json!({
            "url": parts[..n - 2].join(":"),
            "type": parts[n - 2],
            "name": last,
        }));
    }
    Err(UsageError::new(
        ExitCode::Validation,
        format!("Invalid attachment type in \"{spec}\". Must be one of: image, video, document"),
    ))
}
