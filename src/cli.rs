use clap::{Args, Parser, Subcommand};
use rental_listings::models::{parse_amenities, PropertyDraft, PropertyPatch};

/// Browse and manage rental listings
#[derive(Debug, Parser)]
#[command(name = "rental-listings", about = "Browse and manage rental listings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every property (the default)
    List {
        /// Print the listings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one property
    Show { id: String },
    /// List a new property
    Add(ListingArgs),
    /// Change fields of an existing property
    Update {
        id: String,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete a property
    Delete { id: String },
    /// Toggle saved marks for this run and show the saved properties
    Saved { ids: Vec<String> },
}

/// Fields of the listing form
#[derive(Debug, Args)]
pub struct ListingArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub location: String,
    /// Monthly rent
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub bedrooms: u32,
    #[arg(long)]
    pub bathrooms: u32,
    /// Floor area in square metres
    #[arg(long)]
    pub area: f64,
    /// Image URL
    #[arg(long)]
    pub image: String,
    #[arg(long)]
    pub description: String,
    /// Comma-separated, e.g. "wifi, parking"
    #[arg(long, default_value = "")]
    pub amenities: String,
}

impl From<ListingArgs> for PropertyDraft {
    fn from(args: ListingArgs) -> Self {
        Self {
            title: args.title,
            location: args.location,
            price: args.price,
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            area: args.area,
            image: args.image,
            description: args.description,
            amenities: args.amenities,
        }
    }
}

/// Fields to change; anything not given is left as is
#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub bedrooms: Option<u32>,
    #[arg(long)]
    pub bathrooms: Option<u32>,
    #[arg(long)]
    pub area: Option<f64>,
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Comma-separated; replaces the whole list
    #[arg(long)]
    pub amenities: Option<String>,
    #[arg(long)]
    pub featured: Option<bool>,
    #[arg(long)]
    pub virtual_tour: Option<bool>,
    #[arg(long)]
    pub agent_id: Option<i64>,
}

impl From<UpdateArgs> for PropertyPatch {
    fn from(args: UpdateArgs) -> Self {
        Self {
            title: args.title,
            location: args.location,
            price: args.price,
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            area: args.area,
            image: args.image,
            description: args.description,
            amenities: args.amenities.as_deref().map(parse_amenities),
            featured: args.featured,
            virtual_tour: args.virtual_tour,
            agent_id: args.agent_id,
            ..Default::default()
        }
    }
}
