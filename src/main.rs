//! Family Constellation CLI
//!
//! Usage:
//!   family-constellation [OPTIONS] <COMMAND>
//!
//! Options:
//!   -s, --store <FILE>   Arrangement file (JSON), created on first save
//!   -c, --config <FILE>  Engine configuration (TOML format)
//!   -r, --roles <FILE>   Role catalog (TOML format)
//!   -v, --verbose        Log placement decisions to stderr
//!   -h, --help           Print help

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use family_constellation::entity::DEFAULT_ICON;
use family_constellation::ports::{
    build_prompt, describe, ExportError, WriterSink, DEFAULT_EXPORT_FILE,
};
use family_constellation::renderer::snapshot_data_url;
use family_constellation::{
    ArrangementConfig, EntityId, Error, FileSink, Gender, JsonFileStore, NewEntity, Point,
    RoleCatalog, Session, ShapeClass, SvgConfig,
};

const DEFAULT_STORE: &str = "family-constellation.json";

#[derive(Parser)]
#[command(name = "family-constellation")]
#[command(about = "Arrange family members on a canvas for constellation work")]
struct Cli {
    /// Arrangement file (JSON)
    #[arg(short, long, default_value = DEFAULT_STORE)]
    store: PathBuf,

    /// Engine configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Role catalog file (TOML format)
    #[arg(short, long)]
    roles: Option<PathBuf>,

    /// Log placement decisions (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a family member at the staging point
    Add {
        name: String,
        /// Relation label, e.g. 父亲 or father
        role: String,
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long)]
        shape: Option<ShapeClass>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        deceased: bool,
    },
    /// List every entity
    List,
    /// Drag an entity and drop it at X Y
    Move {
        id: EntityId,
        x: f64,
        y: f64,
        /// Where the entity was grabbed, relative to its top-left corner
        #[arg(long, num_args = 2, value_names = ["DX", "DY"], allow_negative_numbers = true)]
        grab: Option<Vec<f64>>,
        /// Place the top-left corner exactly, without overlap avoidance
        #[arg(long, conflicts_with = "grab")]
        exact: bool,
    },
    /// Drag the resize handle by DX DY
    Resize {
        id: EntityId,
        #[arg(allow_negative_numbers = true)]
        dx: f64,
        #[arg(allow_negative_numbers = true)]
        dy: f64,
    },
    /// Turn an entity clockwise by 45° steps
    Rotate {
        id: EntityId,
        #[arg(short, long, default_value_t = 1)]
        times: usize,
    },
    /// Flip the deceased marker
    ToggleDeceased { id: EntityId },
    /// Remove an entity
    Delete { id: EntityId },
    /// Remove every entity
    Clear,
    /// Write the entity list as JSON
    Export {
        /// Output file (stdout if omitted, `-o` alone uses the default name)
        #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
        output: Option<PathBuf>,
    },
    /// Print the arrangement description
    Describe {
        /// Print the full analyst prompt instead
        #[arg(long)]
        prompt: bool,
    },
    /// Render the canvas as SVG
    Snapshot {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the base64 data URL instead of the SVG document
        #[arg(long)]
        data_url: bool,
        /// Leave out name and relation labels
        #[arg(long)]
        no_labels: bool,
        /// Write the document on one line
        #[arg(long)]
        compact: bool,
        /// Prefix for CSS class names
        #[arg(long)]
        class_prefix: Option<String>,
    },
    /// List the known relation labels
    Roles,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = match &cli.config {
        Some(path) => ArrangementConfig::from_file(path)?,
        None => ArrangementConfig::default(),
    };
    let catalog = match &cli.roles {
        Some(path) => RoleCatalog::from_file(path)?,
        None => RoleCatalog::default(),
    };

    let mut session = Session::open(JsonFileStore::new(&cli.store), config, catalog)?;

    match cli.command {
        Command::Add {
            name,
            role,
            gender,
            shape,
            icon,
            deceased,
        } => {
            let mut input = NewEntity::new(name, role).deceased(deceased);
            if let Some(gender) = gender {
                input = input.with_gender(gender);
            }
            if let Some(shape) = shape {
                input = input.with_shape(shape);
            }
            if let Some(icon) = icon {
                input = input.with_icon(icon);
            }
            let id = session.add(input)?;
            println!("Added {}", id);
        }
        Command::List => {
            for e in session.entities() {
                println!(
                    "{:>3}  {} {} ({}){}  at ({}, {})  {}  {}x{}",
                    e.id().0,
                    e.icon(),
                    e.name(),
                    e.role(),
                    if e.is_deceased() { " †" } else { "" },
                    e.position().x,
                    e.position().y,
                    e.facing(),
                    e.size().width,
                    e.size().height
                );
            }
        }
        Command::Move {
            id,
            x,
            y,
            grab,
            exact,
        } => {
            let target = Point::new(x, y);
            if exact {
                let p = session.move_to(id, target)?;
                println!("Moved {} to ({}, {})", id, p.x, p.y);
            } else {
                let pointer = match (grab.as_deref(), session.state().get(id)) {
                    (Some(&[dx, dy]), Some(entity)) => Some(entity.position() + Point::new(dx, dy)),
                    _ => None,
                };
                let token = session.begin_drag(id, pointer)?;
                if let Some(r) = session.drop_at(token, target)? {
                    println!("Moved {} to ({}, {})", id, r.position.x, r.position.y);
                    if r.overlapping {
                        eprintln!("Warning: no free spot nearby, {} overlaps another member", id);
                    }
                }
            }
        }
        Command::Resize { id, dx, dy } => {
            let token = session.begin_resize(id, Point::origin())?;
            if let Some(size) = session.resize_to(token, Point::new(dx, dy))? {
                println!("Resized {} to {}x{}", id, size.width, size.height);
            }
            session.end_resize(token);
        }
        Command::Rotate { id, times } => {
            for _ in 0..times {
                session.rotate(id)?;
            }
            if let Some(e) = session.state().get(id) {
                println!("{} now faces {}", id, e.facing());
            }
        }
        Command::ToggleDeceased { id } => {
            let deceased = session.toggle_deceased(id)?;
            println!(
                "{} is now marked {}",
                id,
                if deceased { "deceased" } else { "living" }
            );
        }
        Command::Delete { id } => {
            let removed = session.delete(id)?;
            println!("Deleted {} ({})", removed.name(), removed.role());
        }
        Command::Clear => {
            let count = session.clear()?;
            println!("Removed {} members", count);
        }
        Command::Export { output } => match output {
            Some(path) => {
                session.export_to(&mut FileSink::new(&path))?;
                println!("Exported to {}", path.display());
            }
            None => session.export_to(&mut WriterSink::new(std::io::stdout().lock()))?,
        },
        Command::Describe { prompt } => {
            if prompt {
                println!("{}", build_prompt(&describe(session.entities())));
            } else {
                println!("{}", describe(session.entities()));
            }
        }
        Command::Snapshot {
            output,
            data_url,
            no_labels,
            compact,
            class_prefix,
        } => {
            let mut svg_config = SvgConfig::default()
                .with_labels(!no_labels)
                .with_pretty_print(!compact);
            if let Some(prefix) = class_prefix {
                svg_config = svg_config.with_class_prefix(prefix);
            }
            let svg = session.render(&svg_config);
            let text = if data_url {
                snapshot_data_url(&svg)
            } else {
                svg
            };
            match output {
                Some(path) => {
                    fs::write(&path, text).map_err(ExportError::from)?;
                    println!("Snapshot written to {}", path.display());
                }
                None => println!("{}", text),
            }
        }
        Command::Roles => print_roles(session.state().catalog()),
    }

    Ok(())
}

fn print_roles(catalog: &RoleCatalog) {
    for role in catalog.roles() {
        let mut tags = Vec::new();
        if role.immediate {
            tags.push("immediate");
        }
        if role.child {
            tags.push("child");
        }
        println!(
            "{} {}  [{}]  {}",
            role.icon.as_deref().unwrap_or(DEFAULT_ICON),
            role.label,
            tags.join(", "),
            role.aliases.join(", ")
        );
    }
}
