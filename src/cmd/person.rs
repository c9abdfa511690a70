/*!
`person.rs`

  linkedin person fetch <url> [--experience --education --skills --languages
                               --posts --comments --reactions + limits]
  linkedin person search [--term T --limit N + filters]
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::Value;

use super::shared::{Ctx, Params, retrieval_config};
use crate::api::Action;

#[derive(Args, Debug)]
pub struct PersonArgs {
    #[command(subcommand)]
    pub command: PersonCommand,
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
    /// Fetch a LinkedIn person profile
    Fetch(FetchArgs),

    /// Search for people on LinkedIn
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// LinkedIn profile URL
    pub url: String,

    /// Include work experience
    #[arg(long)]
    pub experience: bool,

    /// Include education history
    #[arg(long)]
    pub education: bool,

    /// Include skills
    #[arg(long)]
    pub skills: bool,

    /// Include languages
    #[arg(long)]
    pub languages: bool,

    /// Include posts
    #[arg(long)]
    pub posts: bool,

    /// Include comments
    #[arg(long)]
    pub comments: bool,

    /// Include reactions
    #[arg(long)]
    pub reactions: bool,

    /// Max posts to retrieve
    #[arg(long = "posts-limit", value_name = "N")]
    pub posts_limit: Option<u32>,

    /// Retrieve posts since ISO timestamp
    #[arg(long = "posts-since", value_name = "TIMESTAMP")]
    pub posts_since: Option<String>,

    /// Max comments to retrieve
    #[arg(long = "comments-limit", value_name = "N")]
    pub comments_limit: Option<u32>,

    /// Retrieve comments since ISO timestamp
    #[arg(long = "comments-since", value_name = "TIMESTAMP")]
    pub comments_since: Option<String>,

    /// Max reactions to retrieve
    #[arg(long = "reactions-limit", value_name = "N")]
    pub reactions_limit: Option<u32>,

    /// Retrieve reactions since ISO timestamp
    #[arg(long = "reactions-since", value_name = "TIMESTAMP")]
    pub reactions_since: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Search keyword or phrase
    #[arg(long)]
    pub term: Option<String>,

    /// Max results to return
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Filter by first name
    #[arg(long = "first-name")]
    pub first_name: Option<String>,

    /// Filter by last name
    #[arg(long = "last-name")]
    pub last_name: Option<String>,

    /// Filter by position
    #[arg(long)]
    pub position: Option<String>,

    /// Filter by locations (comma-separated)
    #[arg(long)]
    pub locations: Option<String>,

    /// Filter by industries (comma-separated)
    #[arg(long)]
    pub industries: Option<String>,

    /// Filter by current companies (comma-separated)
    #[arg(long = "current-companies")]
    pub current_companies: Option<String>,

    /// Filter by previous companies (comma-separated)
    #[arg(long = "previous-companies")]
    pub previous_companies: Option<String>,

    /// Filter by schools (comma-separated)
    #[arg(long)]
    pub schools: Option<String>,
}

pub fn execute_person(args: PersonArgs, ctx: &Ctx) -> Result<()> {
    match args.command {
        PersonCommand::Fetch(a) => ctx.run_action(Action::FetchPerson, fetch_params(a)),
        PersonCommand::Search(a) => ctx.run_action(Action::SearchPeople, search_params(a)),
    }
}

fn fetch_params(a: FetchArgs) -> Value {
    let mut p = Params::new();
    p.set("personUrl", a.url)
        .flag("retrieveExperience", a.experience)
        .flag("retrieveEducation", a.education)
        .flag("retrieveSkills", a.skills)
        .flag("retrieveLanguages", a.languages)
        .flag("retrievePosts", a.posts)
        .flag("retrieveComments", a.comments)
        .flag("retrieveReactions", a.reactions);

    // Limits only matter when the matching section is requested
    if a.posts {
        p.nested("postsRetrievalConfig", retrieval_config(a.posts_limit, a.posts_since));
    }
    if a.comments {
        p.nested(
            "commentsRetrievalConfig",
            retrieval_config(a.comments_limit, a.comments_since),
        );
    }
    if a.reactions {
        p.nested(
            "reactionsRetrievalConfig",
            retrieval_config(a.reactions_limit, a.reactions_since),
        );
    }
    p.into_value()
}

fn search_params(a: SearchArgs) -> Value {
    let mut filter = Params::new();
    filter
        .opt("firstName", a.first_name)
        .opt("lastName", a.last_name)
        .opt("position", a.position)
        .csv("locations", a.locations.as_deref())
        .csv("industries", a.industries.as_deref())
        .csv("currentCompanies", a.current_companies.as_deref())
        .csv("previousCompanies", a.previous_companies.as_deref())
        .csv("schools", a.schools.as_deref());

    let mut p = Params::new();
    p.opt("term", a.term)
        .opt("limit", a.limit)
        .nested("filter", filter);
    p.into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_fetch_sends_only_url() {
        let v = fetch_params(FetchArgs {
            url: "https://www.linkedin.com/in/john-doe".into(),
            posts_limit: Some(5),
            ..Default::default()
        });
        assert_eq!(v, json!({"personUrl": "https://www.linkedin.com/in/john-doe"}));
    }

    #[test]
    fn posts_with_limits_get_retrieval_config() {
        let v = fetch_params(FetchArgs {
            url: "u".into(),
            experience: true,
            posts: true,
            posts_limit: Some(10),
            posts_since: Some("2024-01-01T00:00:00Z".into()),
            comments: true,
            ..Default::default()
        });
        assert_eq!(
            v,
            json!({
                "personUrl": "u",
                "retrieveExperience": true,
                "retrievePosts": true,
                "retrieveComments": true,
                "postsRetrievalConfig": {"limit": 10, "since": "2024-01-01T00:00:00Z"}
            })
        );
    }

    #[test]
    fn search_filter_splits_lists() {
        let v = search_params(SearchArgs {
            term: Some("rust".into()),
            locations: Some("Berlin, Munich".into()),
            ..Default::default()
        });
        assert_eq!(
            v,
            json!({"term": "rust", "filter": {"locations": ["Berlin", "Munich"]}})
        );
    }

    #[test]
    fn empty_search_has_no_filter() {
        assert_eq!(search_params(SearchArgs::default()), json!({}));
    }
}
