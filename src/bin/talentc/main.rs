//! talentc: a thin CLI front-end over the talent-tree build engine. Loads a
//! JSON catalog file and an optional JSON loadout file and drives
//! count/generate/encode/decode/validate — it contains no DP logic of its
//! own, the same way the example pack's own interactive front-ends are thin
//! consumers of their respective libraries.

mod loadout;

use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use talent_engine::prelude::*;

use loadout::{build_constraint_set, parse_tree_hash, LoadoutFile, RawSelection, SelectionFile};

#[derive(Parser)]
#[command(name = "talentc")]
#[command(about = "Exact build-counting and unranking engine for class talent trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the validator over one tree and print its findings.
    Validate {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        class: String,
        #[arg(long)]
        spec: String,
        #[arg(long, default_value = "class")]
        tree: String,
        #[arg(long)]
        loadout: Option<PathBuf>,
    },
    /// Count exact builds. Omit --tree to fan out across every tree of the
    /// specialization, one worker thread each.
    Count {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        class: String,
        #[arg(long)]
        spec: String,
        #[arg(long)]
        tree: Option<String>,
        #[arg(long)]
        loadout: Option<PathBuf>,
    },
    /// Generate (or evenly sample) concrete builds for one tree.
    Generate {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        class: String,
        #[arg(long)]
        spec: String,
        #[arg(long, default_value = "class")]
        tree: String,
        #[arg(long)]
        loadout: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Encode a selection file into a wire hash string.
    Encode {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        class: String,
        #[arg(long)]
        spec: String,
        #[arg(long)]
        selection: PathBuf,
    },
    /// Decode a wire hash string against a catalog's node list.
    Decode {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        class: String,
        #[arg(long)]
        spec: String,
        hash: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { catalog, class, spec, tree, loadout } => {
            run_validate(catalog, &class, &spec, &tree, loadout)
        }
        Command::Count { catalog, class, spec, tree, loadout } => {
            run_count(catalog, &class, &spec, tree, loadout)
        }
        Command::Generate { catalog, class, spec, tree, loadout, limit } => {
            run_generate(catalog, &class, &spec, &tree, loadout, limit)
        }
        Command::Encode { catalog, class, spec, selection } => {
            run_encode(catalog, &class, &spec, selection)
        }
        Command::Decode { catalog, class, spec, hash } => run_decode(catalog, &class, &spec, &hash),
    }
}

fn read_catalog(path: &PathBuf) -> Vec<Specialization> {
    let raw = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error reading {}: {e}", path.display());
        exit(1);
    });
    parse_specializations(&raw, PointBudgets::default()).unwrap_or_else(|e| {
        eprintln!("error parsing catalog: {e}");
        exit(1);
    })
}

fn find_spec<'a>(specs: &'a [Specialization], class: &str, spec: &str) -> &'a Specialization {
    specs.iter().find(|s| s.class_name == class && s.spec_name == spec).unwrap_or_else(|| {
        eprintln!("no specialization matching class={class} spec={spec} in catalog");
        exit(1);
    })
}

fn resolve_tree<'a>(specialization: &'a Specialization, name: &str) -> &'a TalentTree {
    match name {
        "class" => &specialization.class_tree,
        "spec" => &specialization.spec_tree,
        other => specialization.hero_tree_by_name(other).unwrap_or_else(|| {
            eprintln!("no hero tree named {other}");
            exit(1);
        }),
    }
}

fn load_constraints(tree: &TalentTree, loadout: Option<&PathBuf>) -> ConstraintSet {
    let Some(path) = loadout else { return ConstraintSet::new() };
    let raw = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error reading {}: {e}", path.display());
        exit(1);
    });
    let file: LoadoutFile = serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("error parsing loadout {}: {e}", path.display());
        exit(1);
    });
    build_constraint_set(tree, file.constraints).unwrap_or_else(|e| {
        eprintln!("error building constraints: {e}");
        exit(1);
    })
}

fn run_validate(catalog: PathBuf, class: &str, spec: &str, tree_name: &str, loadout: Option<PathBuf>) {
    let specs = read_catalog(&catalog);
    let specialization = find_spec(&specs, class, spec);
    let tree = resolve_tree(specialization, tree_name);
    let constraints = load_constraints(tree, loadout.as_ref());
    let warnings = validate(tree, &constraints);
    if warnings.is_empty() {
        println!("no findings");
        return;
    }
    for w in &warnings {
        let severity = if w.is_error() { "error" } else { "warning" };
        println!("[{severity}] {} (nodes: {:?})", w.message, w.node_ids);
    }
}

fn run_count(catalog: PathBuf, class: &str, spec: &str, tree_name: Option<String>, loadout: Option<PathBuf>) {
    let specs = read_catalog(&catalog);
    let specialization = find_spec(&specs, class, spec);

    match tree_name {
        Some(name) => {
            let tree = resolve_tree(specialization, &name);
            let constraints = load_constraints(tree, loadout.as_ref());
            let report = count_tree_builds(tree, &constraints);
            print_report(&name, &report);
        }
        None => {
            // One worker thread per tree, each with its own constraint set;
            // no data is shared mutably across workers (§5's worker-per-tree
            // model).
            let trees = specialization.all_trees();
            let results: Vec<(String, CountReport)> = std::thread::scope(|scope| {
                let handles: Vec<_> = trees
                    .into_iter()
                    .enumerate()
                    .map(|(i, tree)| {
                        let name = tree_label(i, tree);
                        let constraints = load_constraints(tree, loadout.as_ref());
                        scope.spawn(move || (name, count_tree_builds(tree, &constraints)))
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().expect("worker thread panicked")).collect()
            });
            for (name, report) in &results {
                print_report(name, report);
            }
        }
    }
}

fn tree_label(index: usize, tree: &TalentTree) -> String {
    match tree.kind {
        TreeKind::Class => "class".to_string(),
        TreeKind::Spec => "spec".to_string(),
        TreeKind::Hero => tree.sub_tree_name.clone().unwrap_or_else(|| format!("hero#{index}")),
    }
}

fn print_report(name: &str, report: &CountReport) {
    println!("{name}: count={} ({:?}, {} finding(s))", report.count, report.duration, report.warnings.len());
    for w in &report.warnings {
        let severity = if w.is_error() { "error" } else { "warning" };
        println!("  [{severity}] {}", w.message);
    }
}

fn run_generate(
    catalog: PathBuf,
    class: &str,
    spec: &str,
    tree_name: &str,
    loadout: Option<PathBuf>,
    limit: Option<usize>,
) {
    let specs = read_catalog(&catalog);
    let specialization = find_spec(&specs, class, spec);
    let tree = resolve_tree(specialization, tree_name);
    let constraints = load_constraints(tree, loadout.as_ref());
    let builds = generate_tree_builds(tree, &constraints, limit);
    println!("{} build(s)", builds.len());
    for build in &builds {
        let mut entries: Vec<(EntryId, u32)> = build.entries.iter().map(|(&id, &rank)| (id, rank)).collect();
        entries.sort_unstable();
        let rendered: Vec<String> = entries.iter().map(|(id, rank)| format!("{id}:{rank}")).collect();
        println!("  {}", rendered.join(", "));
    }
}

fn run_encode(catalog: PathBuf, class: &str, spec: &str, selection_path: PathBuf) {
    let specs = read_catalog(&catalog);
    let specialization = find_spec(&specs, class, spec);
    let nodes = collect_talent_nodes(specialization);

    let raw = std::fs::read_to_string(&selection_path).unwrap_or_else(|e| {
        eprintln!("error reading {}: {e}", selection_path.display());
        exit(1);
    });
    let file: SelectionFile = serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("error parsing selection {}: {e}", selection_path.display());
        exit(1);
    });

    let tree_hash = match file.tree_hash.as_deref() {
        Some(h) => parse_tree_hash(h).unwrap_or_else(|| {
            eprintln!("tree_hash must be exactly 32 hex characters");
            exit(1);
        }),
        None => [0u8; 16],
    };

    let mut selection = TalentSelection::new(file.spec_id, tree_hash);
    for (node_id, raw_selection) in file.nodes {
        let sel = match raw_selection {
            RawSelection::Granted => NodeSelection::Granted,
            RawSelection::Rank(rank) => NodeSelection::Rank(rank),
            RawSelection::Entry(index) => NodeSelection::Entry(index),
        };
        selection.nodes.insert(node_id, sel);
    }

    println!("{}", encode_talent_hash(&selection, &nodes));
}

fn run_decode(catalog: PathBuf, class: &str, spec: &str, hash: &str) {
    let specs = read_catalog(&catalog);
    let specialization = find_spec(&specs, class, spec);
    let nodes = collect_talent_nodes(specialization);

    match decode_talent_hash(hash, &nodes) {
        None => {
            eprintln!("hash is malformed or uses an unrecognized version");
            exit(1);
        }
        Some(selection) => {
            println!("version={} specId={}", selection.version, selection.spec_id);
            let mut entries: Vec<(NodeId, NodeSelection)> = selection.nodes.into_iter().collect();
            entries.sort_unstable_by_key(|(id, _)| *id);
            for (id, sel) in entries {
                println!("  {id}: {sel:?}");
            }
        }
    }
}

/// The union of a specialization's class, spec, and hero-tree nodes in
/// ascending id order — the flat node list the wire codec expects (§6).
fn collect_talent_nodes(specialization: &Specialization) -> Vec<TalentNode> {
    let mut nodes: Vec<TalentNode> =
        specialization.all_trees().iter().flat_map(|t| t.nodes().iter().map(TalentNode::from)).collect();
    nodes.sort_by_key(|n| n.id);
    nodes
}
