use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::fmt::{Display, Write as _};
use std::path::{Path, PathBuf};
use tagtree_core::config::Settings;
use tagtree_core::store::TreeStore;
use tagtree_core::{Document, Node, NodePath, Session};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

#[derive(Parser, Debug)]
#[command(
    name = "tagtree",
    about = "Edit, export and store labeled trees addressed by index paths",
    version
)]
struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    debug: u8,
    /// Extra TOML config file, layered over the global one
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the canonical document
    Export(ExportArgs),
    /// Print an indented outline with node paths
    Show(InputArgs),
    /// Rename the node at a path
    Rename(RenameArgs),
    /// Make the node at a path a leaf holding a value (drops its children)
    SetData(SetDataArgs),
    /// Append a default child to the node at a path (drops leaf data)
    AddChild(AddChildArgs),
    /// List stored trees, newest first
    List,
    /// Print a stored tree record
    Get(IdArgs),
    /// Store a document, updating when --id is given
    Save(SaveArgs),
    /// Delete a stored tree
    Delete(IdArgs),
    /// Zip all stored trees into an archive beside the store directory
    Backup,
}

#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// Document to load (.json); defaults to the starter tree
    input: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ExportArgs {
    #[command(flatten)]
    src: InputArgs,
    /// Pretty-print instead of the compact persisted form
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(ClapArgs, Debug)]
struct EditTarget {
    #[command(flatten)]
    src: InputArgs,
    /// Node path, e.g. /0/2 (empty or / for the root)
    #[arg(long, default_value = "/")]
    path: NodePath,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct RenameArgs {
    #[command(flatten)]
    target: EditTarget,
    /// New name (trimmed, must not be blank)
    #[arg(long)]
    name: String,
}

#[derive(ClapArgs, Debug)]
struct SetDataArgs {
    #[command(flatten)]
    target: EditTarget,
    /// New value; empty clears leaf data and keeps any children
    #[arg(long)]
    value: String,
}

#[derive(ClapArgs, Debug)]
struct AddChildArgs {
    #[command(flatten)]
    target: EditTarget,
}

#[derive(ClapArgs, Debug)]
struct IdArgs {
    id: u64,
}

#[derive(ClapArgs, Debug)]
struct SaveArgs {
    #[command(flatten)]
    src: InputArgs,
    /// Existing tree id to update
    #[arg(long)]
    id: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);
    let settings = Settings::load(cli.config.as_deref()).unwrap_or_else(|e| fail(2, e));
    match cli.cmd.unwrap_or(Cmd::Show(InputArgs { input: None })) {
        Cmd::Export(a) => cmd_export(&settings, a),
        Cmd::Show(a) => cmd_show(&settings, a),
        Cmd::Rename(a) => cmd_edit(&settings, a.target, |s, p| s.rename(p, &a.name)),
        Cmd::SetData(a) => cmd_edit(&settings, a.target, |s, p| s.set_data(p, &a.value)),
        Cmd::AddChild(a) => cmd_edit(&settings, a.target, |s, p| s.add_child(p)),
        Cmd::List => cmd_list(&settings),
        Cmd::Get(a) => cmd_get(&settings, a),
        Cmd::Save(a) => cmd_save(&settings, a),
        Cmd::Delete(a) => cmd_delete(&settings, a),
        Cmd::Backup => cmd_backup(&settings),
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    // RUST_LOG, when set, wins over -d
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);
    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
    tracing::debug!(?level, "logging initialised");
}

fn fail(code: i32, msg: impl Display) -> ! {
    eprintln!("error: {}", msg);
    std::process::exit(code);
}

fn load_session(settings: &Settings, input: Option<&Path>) -> Session {
    let session = match input {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .unwrap_or_else(|e| fail(2, format!("{}: {}", p.display(), e)));
            let doc = tagtree_core::from_json(&text)
                .unwrap_or_else(|e| fail(2, format!("{}: {}", p.display(), e)));
            Session::open(Some(&doc), tagtree_core::starter_tree)
        }
        None => Session::open(None, || {
            settings.starter_tree().unwrap_or_else(|e| fail(2, e))
        }),
    };
    session
        .unwrap_or_else(|e| fail(2, e))
        .with_child_template(settings.child.clone())
}

fn open_store(settings: &Settings) -> TreeStore {
    TreeStore::open(&settings.store_dir).unwrap_or_else(|e| fail(4, e))
}

fn emit(doc: &Document, out: Option<&Path>) {
    let text = tagtree_core::to_json_pretty(doc).unwrap_or_else(|e| fail(5, e));
    match out {
        Some(p) => std::fs::write(p, text)
            .unwrap_or_else(|e| fail(5, format!("writing {}: {}", p.display(), e))),
        None => println!("{}", text),
    }
}

fn cmd_export(settings: &Settings, args: ExportArgs) {
    let doc = load_session(settings, args.src.input.as_deref()).export();
    let text = if args.pretty {
        tagtree_core::to_json_pretty(&doc)
    } else {
        tagtree_core::to_json(&doc)
    };
    println!("{}", text.unwrap_or_else(|e| fail(5, e)));
}

fn cmd_show(settings: &Settings, args: InputArgs) {
    let session = load_session(settings, args.input.as_deref());
    let mut out = String::new();
    outline(session.tree(), &NodePath::root(), 0, &mut out).unwrap_or_else(|e| fail(5, e));
    print!("{}", out);
}

fn outline(node: &Node, path: &NodePath, depth: usize, out: &mut String) -> std::fmt::Result {
    let indent = "  ".repeat(depth);
    match node {
        Node::Leaf { name, data } => writeln!(out, "{}{} = {:?}\t{}", indent, name, data, path)?,
        Node::Interior { name, .. } => writeln!(out, "{}{}\t{}", indent, name, path)?,
        Node::Unclassified { name } => writeln!(out, "{}{} (empty)\t{}", indent, name, path)?,
    }
    for (i, child) in node.children().iter().enumerate() {
        outline(child, &path.child(i), depth + 1, out)?;
    }
    Ok(())
}

fn cmd_edit<F>(settings: &Settings, target: EditTarget, edit: F)
where
    F: FnOnce(&mut Session, &NodePath) -> Result<(), tagtree_core::EditError>,
{
    let mut session = load_session(settings, target.src.input.as_deref());
    edit(&mut session, &target.path).unwrap_or_else(|e| fail(3, e));
    emit(&session.export(), target.out.as_deref());
}

fn cmd_list(settings: &Settings) {
    let trees = open_store(settings).list().unwrap_or_else(|e| fail(4, e));
    for t in trees {
        println!(
            "{}\t{}\t{}",
            t.id,
            t.name,
            t.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn cmd_get(settings: &Settings, args: IdArgs) {
    let rec = open_store(settings)
        .get(args.id)
        .unwrap_or_else(|e| fail(4, e));
    println!(
        "{}",
        serde_json::to_string_pretty(&rec).unwrap_or_else(|e| fail(5, e))
    );
}

fn cmd_save(settings: &Settings, args: SaveArgs) {
    let doc = load_session(settings, args.src.input.as_deref()).export();
    let rec = open_store(settings)
        .save(args.id, &doc)
        .unwrap_or_else(|e| fail(4, e));
    println!("saved tree {} ({})", rec.id, rec.name);
}

fn cmd_delete(settings: &Settings, args: IdArgs) {
    open_store(settings)
        .delete(args.id)
        .unwrap_or_else(|e| fail(4, e));
    println!("deleted tree {}", args.id);
}

fn cmd_backup(settings: &Settings) {
    let dest = open_store(settings)
        .backup()
        .unwrap_or_else(|e| fail(4, e));
    println!("{}", dest.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_args_parse_paths() {
        let cli = Cli::try_parse_from(["tagtree", "rename", "t.json", "--path", "/0/1", "--name", "x"])
            .unwrap();
        let Some(Cmd::Rename(a)) = cli.cmd else {
            panic!("expected rename");
        };
        assert_eq!(a.target.path, NodePath::from([0, 1]));
        assert_eq!(a.target.src.input, Some(PathBuf::from("t.json")));
    }

    #[test]
    fn outline_lists_every_node_with_its_path() {
        let mut out = String::new();
        outline(&tagtree_core::starter_tree(), &NodePath::root(), 0, &mut out).unwrap();
        assert_eq!(out.lines().count(), 5);
        assert!(out.contains("  child2 = \"c2 World\"\t/1"));
        assert!(out.starts_with("root\t/"));
    }
}
