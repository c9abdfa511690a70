/*!
`navigator.rs`

Sales Navigator variants of the person / company / message commands.

  linkedin navigator person fetch <hashed-url>
  linkedin navigator person search [--term --limit + filters]
  linkedin navigator company fetch <hashed-url> [--employees --dms + filters]
  linkedin navigator company search [--term --limit --sizes --revenue-min/max ...]
  linkedin navigator message send <person-url> <text> --subject S
  linkedin navigator message get <person-url> [--since TIMESTAMP]
*/

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::{Value, json};

use super::shared::{Ctx, Params, retrieval_config};
use crate::api::Action;
use crate::workflow::ChannelKind;

#[derive(Args, Debug)]
pub struct NavigatorArgs {
    #[command(subcommand)]
    pub command: NavigatorCommand,
}

#[derive(Subcommand, Debug)]
pub enum NavigatorCommand {
    /// Sales Navigator person profiles
    Person {
        #[command(subcommand)]
        command: PersonCommand,
    },

    /// Sales Navigator company profiles
    Company {
        #[command(subcommand)]
        command: CompanyCommand,
    },

    /// Sales Navigator inbox
    Message {
        #[command(subcommand)]
        command: MessageCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
    /// Fetch a person profile via Sales Navigator
    Fetch {
        /// Hashed Sales Navigator profile URL
        hashed_url: String,
    },

    /// Search for people via Sales Navigator
    Search(PersonSearchArgs),
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommand {
    /// Fetch a company profile via Sales Navigator
    Fetch(CompanyFetchArgs),

    /// Search for companies via Sales Navigator
    Search(CompanySearchArgs),
}

#[derive(Subcommand, Debug)]
pub enum MessageCommand {
    /// Send a message via Sales Navigator
    Send {
        /// LinkedIn profile URL of the recipient
        person_url: String,

        /// Message text
        text: String,

        /// Message subject
        #[arg(long)]
        subject: String,
    },

    /// Get Sales Navigator conversation messages
    Get {
        /// LinkedIn profile URL
        person_url: String,

        /// Retrieve messages since ISO timestamp
        #[arg(long, value_name = "TIMESTAMP")]
        since: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct PersonSearchArgs {
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

    /// Filter by years of experience ranges (comma-separated)
    #[arg(long = "years-of-experience")]
    pub years_of_experience: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct CompanyFetchArgs {
    /// Hashed Sales Navigator company URL
    pub hashed_url: String,

    /// Include employee data
    #[arg(long)]
    pub employees: bool,

    /// Include decision makers
    #[arg(long)]
    pub dms: bool,

    /// Max employees to retrieve
    #[arg(long = "employees-limit", value_name = "N")]
    pub employees_limit: Option<u32>,

    /// Filter employees by first name
    #[arg(long = "employees-first-name")]
    pub employees_first_name: Option<String>,

    /// Filter employees by last name
    #[arg(long = "employees-last-name")]
    pub employees_last_name: Option<String>,

    /// Filter employees by positions (comma-separated)
    #[arg(long = "employees-positions")]
    pub employees_positions: Option<String>,

    /// Filter employees by locations (comma-separated)
    #[arg(long = "employees-locations")]
    pub employees_locations: Option<String>,

    /// Filter employees by industries (comma-separated)
    #[arg(long = "employees-industries")]
    pub employees_industries: Option<String>,

    /// Filter employees by schools (comma-separated)
    #[arg(long = "employees-schools")]
    pub employees_schools: Option<String>,

    /// Filter employees by years of experience ranges (comma-separated)
    #[arg(long = "employees-years-of-experience")]
    pub employees_years_of_experience: Option<String>,

    /// Max decision makers to retrieve
    #[arg(long = "dms-limit", value_name = "N")]
    pub dms_limit: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub struct CompanySearchArgs {
    /// Search keyword or phrase
    #[arg(long)]
    pub term: Option<String>,

    /// Max results to return
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Filter by company sizes (comma-separated)
    #[arg(long)]
    pub sizes: Option<String>,

    /// Filter by locations (comma-separated)
    #[arg(long)]
    pub locations: Option<String>,

    /// Filter by industries (comma-separated)
    #[arg(long)]
    pub industries: Option<String>,

    /// Minimum annual revenue
    #[arg(long = "revenue-min")]
    pub revenue_min: Option<String>,

    /// Maximum annual revenue
    #[arg(long = "revenue-max")]
    pub revenue_max: Option<String>,
}

pub fn execute_navigator(args: NavigatorArgs, ctx: &Ctx) -> Result<()> {
    match args.command {
        NavigatorCommand::Person { command } => match command {
            PersonCommand::Fetch { hashed_url } => ctx.run_action(
                Action::NvFetchPerson,
                json!({ "personHashedUrl": hashed_url }),
            ),
            PersonCommand::Search(a) => {
                ctx.run_action(Action::NvSearchPeople, person_search_params(a))
            }
        },
        NavigatorCommand::Company { command } => match command {
            CompanyCommand::Fetch(a) => {
                ctx.run_action(Action::NvFetchCompany, company_fetch_params(a))
            }
            CompanyCommand::Search(a) => {
                ctx.run_action(Action::NvSearchCompanies, company_search_params(a))
            }
        },
        NavigatorCommand::Message { command } => match command {
            MessageCommand::Send {
                person_url,
                text,
                subject,
            } => ctx.run_void_action(
                Action::NvSendMessage,
                json!({ "personUrl": person_url, "text": text, "subject": subject }),
                "Sales Navigator message sent.",
            ),
            MessageCommand::Get { person_url, since } => {
                ctx.get_conversation(ChannelKind::SalesNavigator, person_url, since)
            }
        },
    }
}

fn person_search_params(a: PersonSearchArgs) -> Value {
    let mut filter = Params::new();
    filter
        .opt("firstName", a.first_name)
        .opt("lastName", a.last_name)
        .opt("position", a.position)
        .csv("locations", a.locations.as_deref())
        .csv("industries", a.industries.as_deref())
        .csv("currentCompanies", a.current_companies.as_deref())
        .csv("previousCompanies", a.previous_companies.as_deref())
        .csv("schools", a.schools.as_deref())
        .csv("yearsOfExperience", a.years_of_experience.as_deref());

    let mut p = Params::new();
    p.opt("term", a.term)
        .opt("limit", a.limit)
        .nested("filter", filter);
    p.into_value()
}

fn company_fetch_params(a: CompanyFetchArgs) -> Value {
    let mut p = Params::new();
    p.set("companyHashedUrl", a.hashed_url)
        .flag("retrieveEmployees", a.employees)
        .flag("retrieveDMs", a.dms);

    if a.employees {
        let mut filter = Params::new();
        filter
            .opt("firstName", a.employees_first_name)
            .opt("lastName", a.employees_last_name)
            .csv("positions", a.employees_positions.as_deref())
            .csv("locations", a.employees_locations.as_deref())
            .csv("industries", a.employees_industries.as_deref())
            .csv("schools", a.employees_schools.as_deref())
            .csv(
                "yearsOfExperiences",
                a.employees_years_of_experience.as_deref(),
            );

        let mut config = Params::new();
        config.opt("limit", a.employees_limit).nested("filter", filter);
        p.nested("employeesRetrievalConfig", config);
    }
    if a.dms {
        p.nested("dmsRetrievalConfig", retrieval_config(a.dms_limit, None));
    }
    p.into_value()
}

fn company_search_params(a: CompanySearchArgs) -> Value {
    let mut revenue = Params::new();
    revenue.opt("min", a.revenue_min).opt("max", a.revenue_max);

    let mut filter = Params::new();
    filter
        .csv("sizes", a.sizes.as_deref())
        .csv("locations", a.locations.as_deref())
        .csv("industries", a.industries.as_deref())
        .nested("annualRevenue", revenue);

    let mut p = Params::new();
    p.opt("term", a.term)
        .opt("limit", a.limit)
        .nested("filter", filter);
    p.into_value()
}
