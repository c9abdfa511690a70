/*!
`company.rs`

  linkedin company fetch <url> [--employees --dms --posts + limits / employee filters]
  linkedin company search [--term T --limit N --sizes --locations --industries]
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::Value;

use super::shared::{Ctx, Params, retrieval_config};
use crate::api::Action;

#[derive(Args, Debug)]
pub struct CompanyArgs {
    #[command(subcommand)]
    pub command: CompanyCommand,
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommand {
    /// Fetch a LinkedIn company profile
    Fetch(FetchArgs),

    /// Search for companies on LinkedIn
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// LinkedIn company URL
    pub url: String,

    /// Include employee data
    #[arg(long)]
    pub employees: bool,

    /// Include decision makers
    #[arg(long)]
    pub dms: bool,

    /// Include company posts
    #[arg(long)]
    pub posts: bool,

    /// Max employees to retrieve
    #[arg(long = "employees-limit", value_name = "N")]
    pub employees_limit: Option<u32>,

    /// Filter employees by first name
    #[arg(long = "employees-first-name")]
    pub employees_first_name: Option<String>,

    /// Filter employees by last name
    #[arg(long = "employees-last-name")]
    pub employees_last_name: Option<String>,

    /// Filter employees by position
    #[arg(long = "employees-position")]
    pub employees_position: Option<String>,

    /// Filter employees by locations (comma-separated)
    #[arg(long = "employees-locations")]
    pub employees_locations: Option<String>,

    /// Filter employees by industries (comma-separated)
    #[arg(long = "employees-industries")]
    pub employees_industries: Option<String>,

    /// Filter employees by schools (comma-separated)
    #[arg(long = "employees-schools")]
    pub employees_schools: Option<String>,

    /// Max decision makers to retrieve
    #[arg(long = "dms-limit", value_name = "N")]
    pub dms_limit: Option<u32>,

    /// Max posts to retrieve
    #[arg(long = "posts-limit", value_name = "N")]
    pub posts_limit: Option<u32>,

    /// Retrieve posts since ISO timestamp
    #[arg(long = "posts-since", value_name = "TIMESTAMP")]
    pub posts_since: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Search keyword or phrase
    #[arg(long)]
    pub term: Option<String>,

    /// Max results to return
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Filter by company sizes (comma-separated, e.g. "1-10,11-50,51-200")
    #[arg(long)]
    pub sizes: Option<String>,

    /// Filter by locations (comma-separated)
    #[arg(long)]
    pub locations: Option<String>,

    /// Filter by industries (comma-separated)
    #[arg(long)]
    pub industries: Option<String>,
}

pub fn execute_company(args: CompanyArgs, ctx: &Ctx) -> Result<()> {
    match args.command {
        CompanyCommand::Fetch(a) => ctx.run_action(Action::FetchCompany, fetch_params(a)),
        CompanyCommand::Search(a) => ctx.run_action(Action::SearchCompanies, search_params(a)),
    }
}

fn fetch_params(a: FetchArgs) -> Value {
    let mut p = Params::new();
    p.set("companyUrl", a.url)
        .flag("retrieveEmployees", a.employees)
        .flag("retrieveDMs", a.dms)
        .flag("retrievePosts", a.posts);

    if a.employees {
        let mut filter = Params::new();
        filter
            .opt("firstName", a.employees_first_name)
            .opt("lastName", a.employees_last_name)
            .opt("position", a.employees_position)
            .csv("locations", a.employees_locations.as_deref())
            .csv("industries", a.employees_industries.as_deref())
            .csv("schools", a.employees_schools.as_deref());

        let mut config = Params::new();
        config.opt("limit", a.employees_limit).nested("filter", filter);
        p.nested("employeesRetrievalConfig", config);
    }
    if a.dms {
        p.nested("dmsRetrievalConfig", retrieval_config(a.dms_limit, None));
    }
    if a.posts {
        p.nested("postsRetrievalConfig", retrieval_config(a.posts_limit, a.posts_since));
    }
    p.into_value()
}

fn search_params(a: SearchArgs) -> Value {
    let mut filter = Params::new();
    filter
        .csv("sizes", a.sizes.as_deref())
        .csv("locations", a.locations.as_deref())
        .csv("industries", a.industries.as_deref());

    let mut p = Params::new();
    p.opt("term", a.term)
        .opt("limit", a.limit)
        .nested("filter", filter);
    p.into_value()
}
