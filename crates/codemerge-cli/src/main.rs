use anyhow::Context;
use clap::{Parser, Subcommand};
use codemerge_core::config::Settings;
use codemerge_core::logging::init_logging;
use codemerge_core::{
    CachedProvider, ComponentSkeletonModel, MetadataStore, ProjectSyncDataProvider,
    ProjectSyncMetadataModel, StaticProvider,
};
use codemerge_engine::{ComponentInfoForMerge, IdMap, MergeOptions, MergeOutput, merge_files};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "codemerge",
    about = "Merge regenerated component files with developer edits"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to .codemerge data directory
    #[arg(long, default_value = ".codemerge")]
    data_dir: PathBuf,

    /// Log to file only
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default settings
    Init {
        #[arg(long)]
        yes: bool,
    },
    /// Merge one component
    Merge {
        #[arg(long)]
        project: String,
        #[arg(long)]
        component: String,
        /// The file as edited by developers
        #[arg(long)]
        edited: PathBuf,
        /// The freshly generated file
        #[arg(long)]
        new: PathBuf,
        /// JSON object mapping the new file's logical ids to uuids
        #[arg(long)]
        id_map: PathBuf,
        /// Base metadata JSON to use instead of the metadata store
        #[arg(long)]
        metadata: Option<PathBuf>,
        #[arg(long, conflicts_with = "in_place")]
        output: Option<PathBuf>,
        /// Overwrite the edited file
        #[arg(long)]
        in_place: bool,
        #[arg(long)]
        yes: bool,
    },
    /// Merge every component listed in a manifest
    Batch {
        #[arg(long)]
        project: String,
        /// JSON object: component id -> {editedFile, newFile, nameInIdToUuid}
        #[arg(long)]
        manifest: PathBuf,
        #[arg(long)]
        metadata: Option<PathBuf>,
        #[arg(long)]
        in_place: bool,
        #[arg(long)]
        yes: bool,
    },
    /// Store a generated file as the base for later merges
    Record {
        #[arg(long)]
        project: String,
        #[arg(long)]
        revision: u64,
        #[arg(long)]
        component: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        id_map: PathBuf,
    },
    /// List the components stored for a revision
    Show {
        #[arg(long)]
        project: String,
        #[arg(long)]
        revision: u64,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry {
    edited_file: PathBuf,
    new_file: PathBuf,
    #[serde(default)]
    name_in_id_to_uuid: IdMap,
}

fn settings_path(cli: &Cli) -> PathBuf {
    cli.data_dir.join("settings.json")
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let path = settings_path(cli);
    let mut settings = Settings::load_or_default(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if !path.exists() {
        settings.metadata.dir = cli.data_dir.join("metadata");
        settings.logging.dir = cli.data_dir.join("logs");
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let _guard = init_logging(&settings.logging.dir, &settings.logging.filter, cli.quiet)?;

    match &cli.command {
        Commands::Init { yes } => cmd_init(&cli, *yes),
        Commands::Merge {
            project,
            component,
            edited,
            new,
            id_map,
            metadata,
            output,
            in_place,
            yes,
        } => {
            let info = ComponentInfoForMerge {
                edited_file: read(edited)?,
                new_file: read(new)?,
                new_name_in_id_to_uuid: read_id_map(id_map)?,
            };
            let components = BTreeMap::from([(component.clone(), info)]);
            let provider = provider(&settings, metadata.as_deref())?;
            let Some(result) = run_merge(&settings, &components, project, provider).await? else {
                return Ok(());
            };
            let Some(merged) = result.files.get(component) else {
                return Ok(());
            };
            if *in_place {
                write_confirmed(edited, merged, *yes)
            } else if let Some(path) = output {
                std::fs::write(path, merged)
                    .with_context(|| format!("failed to write {}", path.display()))
            } else {
                print!("{}", merged);
                Ok(())
            }
        }
        Commands::Batch {
            project,
            manifest,
            metadata,
            in_place,
            yes,
        } => cmd_batch(&settings, project, manifest, metadata.as_deref(), *in_place, *yes).await,
        Commands::Record {
            project,
            revision,
            component,
            file,
            id_map,
        } => {
            let store = MetadataStore::new(&settings.metadata.dir);
            let ids = read_id_map(id_map)?.into_iter().collect();
            store
                .record(project, *revision, ComponentSkeletonModel::new(component, ids, read(file)?))
                .await
                .with_context(|| format!("failed to record {} at revision {}", component, revision))?;
            tracing::info!(project = %project, revision, component = %component, "recorded base");
            println!("Recorded {} for {} at revision {}", component, project, revision);
            Ok(())
        }
        Commands::Show { project, revision } => {
            let store = MetadataStore::new(&settings.metadata.dir);
            let model = store
                .load(project, *revision)
                .await
                .with_context(|| format!("no metadata for {} at revision {}", project, revision))?;
            println!("{} @ {}", project, revision);
            for component in &model.components {
                println!(
                    "  {}  {} ids, {} bytes",
                    component.uuid,
                    component.name_in_id_to_uuid.len(),
                    component.file_content.len()
                );
            }
            Ok(())
        }
    }
}

fn cmd_init(cli: &Cli, yes: bool) -> anyhow::Result<()> {
    let path = settings_path(cli);
    if path.exists()
        && !yes
        && !dialoguer::Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", path.display()))
            .default(false)
            .interact()?
    {
        return Ok(());
    }
    let mut settings = Settings::default();
    settings.metadata.dir = cli.data_dir.join("metadata");
    settings.logging.dir = cli.data_dir.join("logs");
    settings
        .save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn cmd_batch(
    settings: &Settings,
    project: &str,
    manifest: &Path,
    metadata: Option<&Path>,
    in_place: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let entries: BTreeMap<String, ManifestEntry> = serde_json::from_str(&read(manifest)?)
        .with_context(|| format!("malformed manifest {}", manifest.display()))?;
    let root = manifest.parent().unwrap_or(Path::new("."));

    let mut components = BTreeMap::new();
    let mut targets = BTreeMap::new();
    for (id, entry) in entries {
        let edited = root.join(&entry.edited_file);
        components.insert(
            id.clone(),
            ComponentInfoForMerge {
                edited_file: read(&edited)?,
                new_file: read(&root.join(&entry.new_file))?,
                new_name_in_id_to_uuid: entry.name_in_id_to_uuid,
            },
        );
        targets.insert(id, edited);
    }

    let provider = provider(settings, metadata)?;
    let Some(result) = run_merge(settings, &components, project, provider).await? else {
        return Ok(());
    };

    if in_place
        && !yes
        && !dialoguer::Confirm::new()
            .with_prompt(format!("Overwrite {} file(s)?", result.files.len()))
            .default(false)
            .interact()?
    {
        return Ok(());
    }
    for (id, merged) in &result.files {
        let Some(path) = targets.get(id) else {
            continue;
        };
        if in_place {
            std::fs::write(path, merged)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Updated {}", path.display());
        } else {
            println!("// ===== {} ({}) =====", id, path.display());
            println!("{}", merged);
        }
    }
    Ok(())
}

fn provider(
    settings: &Settings,
    metadata: Option<&Path>,
) -> anyhow::Result<Arc<dyn ProjectSyncDataProvider>> {
    Ok(match metadata {
        Some(path) => {
            let model = ProjectSyncMetadataModel::from_json(&read(path)?)
                .with_context(|| format!("malformed metadata {}", path.display()))?;
            Arc::new(StaticProvider::new(model))
        }
        None => Arc::new(CachedProvider::new(MetadataStore::new(&settings.metadata.dir))),
    })
}

async fn run_merge(
    settings: &Settings,
    components: &BTreeMap<String, ComponentInfoForMerge>,
    project: &str,
    provider: Arc<dyn ProjectSyncDataProvider>,
) -> anyhow::Result<Option<MergeOutput>> {
    let options = MergeOptions::from_settings(settings);
    let result = match merge_files(components, project, provider, &options).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(project, error = %e, "merge failed");
            return Err(e).context("merge failed");
        }
    };
    let Some(result) = result else {
        eprintln!("Nothing to merge: no file carries a plasmic-managed-jsx marker.");
        return Ok(None);
    };
    for (id, warnings) in &result.warnings {
        eprintln!("{}:", id);
        for line in warnings.summary_lines() {
            eprintln!("  warning: {}", line);
        }
    }
    Ok(Some(result))
}

fn write_confirmed(path: &Path, content: &str, yes: bool) -> anyhow::Result<()> {
    if !yes
        && !dialoguer::Confirm::new()
            .with_prompt(format!("Overwrite {}?", path.display()))
            .default(false)
            .interact()?
    {
        return Ok(());
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Updated {}", path.display());
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_id_map(path: &Path) -> anyhow::Result<IdMap> {
    serde_json::from_str(&read(path)?).with_context(|| format!("malformed id map {}", path.display()))
}
