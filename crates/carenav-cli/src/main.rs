use api_shared::NavigationRes;
use carenav_core::{
    can_access, normalize, CanonicalRole, EnabledModules, Identity, Navigation,
    NavigationCatalog, SessionSelection, TenantContext, TenantSource,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "carenav")]
#[command(about = "CareNav navigation and tenant-context CLI")]
struct Cli {
    /// YAML navigation catalog (defaults to the built-in catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalise a raw role string
    Normalize {
        /// Role as issued by the authentication service
        raw: String,
    },
    /// Print the navigation a role would see
    Navigation {
        #[arg(long)]
        role: String,
        /// Enabled modules (comma-separated); omit for unknown modules
        #[arg(long, value_delimiter = ',')]
        modules: Option<Vec<String>>,
        /// Current location, to mark the active item
        #[arg(long)]
        location: Option<String>,
        /// Print JSON instead of an outline
        #[arg(long)]
        json: bool,
    },
    /// Check whether a role may open a page
    Access {
        #[arg(long)]
        role: String,
        /// Page path, optionally with query and hash
        path: String,
        /// Enabled modules (comma-separated); omit for unknown modules
        #[arg(long, value_delimiter = ',')]
        modules: Option<Vec<String>>,
    },
    /// Resolve the effective organization
    ResolveOrg {
        /// Organization bound to the identity
        #[arg(long)]
        bound: Option<String>,
        /// Organization stored in the session
        #[arg(long)]
        selected: Option<String>,
    },
    /// Validate a catalog and print its outline
    Catalog {
        /// Catalog file (overrides --catalog)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn load_catalog(path: Option<&Path>) -> Result<NavigationCatalog, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(NavigationCatalog::load(path)?),
        None => Ok(NavigationCatalog::builtin()),
    }
}

fn enabled_modules(modules: Option<Vec<String>>) -> EnabledModules {
    modules.map_or(EnabledModules::Unknown, EnabledModules::from_names)
}

fn print_outline(navigation: &Navigation, active_path: Option<&str>) {
    if navigation.is_empty() {
        println!("(no navigation)");
        return;
    }
    for group in &navigation.groups {
        println!("{}", group.label);
        for item in &group.items {
            let marker = if active_path == Some(item.path.as_str()) { "*" } else { " " };
            println!(" {marker} {:<28} {}", item.path, item.label);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Normalize { raw }) => {
            let role = normalize(&raw);
            println!("{} ({})", role, role.display_name());
        }
        Some(Commands::Navigation {
            role,
            modules,
            location,
            json,
        }) => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let role = normalize(&role);
            let modules = enabled_modules(modules);
            let navigation = catalog.build_navigation(&role, &modules);
            let res = NavigationRes::new(
                &role,
                None,
                modules.is_known(),
                &navigation,
                location.as_deref(),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&res)?);
            } else {
                print_outline(&navigation, res.active_path.as_deref());
            }
        }
        Some(Commands::Access {
            role,
            path,
            modules,
        }) => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let role = normalize(&role);
            let allowed = can_access(&path, &role, &enabled_modules(modules), &catalog);
            println!("{}", if allowed { "allowed" } else { "denied" });
        }
        Some(Commands::ResolveOrg { bound, selected }) => {
            let identity = Identity::new(CanonicalRole::SuperAdmin.as_str(), bound.as_deref());
            let tenant =
                TenantContext::resolve(&identity, &SessionSelection::from_raw(selected.as_deref()));
            match (tenant.organization_id(), tenant.source()) {
                (Some(id), TenantSource::Bound) => println!("{id} (bound)"),
                (Some(id), _) => println!("{id} (selected)"),
                (None, _) => println!("No organization. A super administrator must select one."),
            }
        }
        Some(Commands::Catalog { file }) => {
            let catalog = load_catalog(file.as_deref().or(cli.catalog.as_deref()))?;
            let full = catalog.full_tree();
            println!(
                "Full tree: {} groups, {} items",
                full.len(),
                full.iter().map(|group| group.items.len()).sum::<usize>()
            );
            for role in catalog.portal_roles() {
                let groups = catalog.portal(role).unwrap_or_default();
                println!(
                    "Portal {:<16} {} groups, {} items",
                    role.as_str(),
                    groups.len(),
                    groups.iter().map(|group| group.items.len()).sum::<usize>()
                );
            }
        }
        None => {
            println!("Use --help for usage");
        }
    }

    Ok(())
}
