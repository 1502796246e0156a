use std::path::PathBuf;
use std::process;

use arena_core::bulk_edit::{BulkEdit, EditMode};
use arena_core::core_api::{
    DEFAULT_FILENAME, DEFAULT_PLAYER_TEAM, DeadRecordPolicy, SaveOptions, SaveStore, Session,
    StoreConfig,
};
use arena_core::record::EditableField;
use arena_core::roster::{RosterQuery, SortState};
use arena_render::{
    JsonStyle, MetaSelection, TextRenderOptions, TextStyle, render_json_full, render_json_meta,
    render_meta_text, render_text_with_options,
};
use clap::{Parser, ValueEnum};
use serde_json::Value as JsonValue;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Add,
    Set,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAV.DAT", default_value = DEFAULT_FILENAME)]
    path: PathBuf,
    /// List every team instead of only the player's.
    #[arg(long, conflicts_with = "team")]
    all: bool,
    #[arg(long, allow_hyphen_values = true)]
    team: Option<i64>,
    /// Team id treated as the player's roster.
    #[arg(long = "player-team", default_value_t = DEFAULT_PLAYER_TEAM, allow_hyphen_values = true)]
    player_team: i64,
    #[arg(long)]
    search: Option<String>,
    #[arg(long = "min-level", default_value_t = 0, allow_hyphen_values = true)]
    min_level: i64,
    /// Only names containing an underscore.
    #[arg(long)]
    underscore: bool,
    /// Sort by a record key; repeating the same key flips the direction.
    #[arg(long, value_name = "KEY")]
    sort: Vec<String>,
    #[arg(long = "base-stats")]
    base_stats: bool,
    #[arg(long)]
    json: bool,
    /// Keep dead characters in the save instead of dropping them.
    #[arg(long = "keep-dead")]
    keep_dead: bool,
    #[arg(long)]
    gold: bool,
    #[arg(long)]
    reputation: bool,
    #[arg(long = "set-gold", allow_hyphen_values = true)]
    set_gold: Option<String>,
    #[arg(long = "set-reputation", allow_hyphen_values = true)]
    set_reputation: Option<String>,
    /// Roster indices to edit.
    #[arg(long, value_name = "IDX", value_delimiter = ',', conflicts_with = "select_listed")]
    select: Vec<usize>,
    /// Edit every record the listing filters match.
    #[arg(long = "select-listed")]
    select_listed: bool,
    #[arg(long, value_enum, default_value_t = ModeArg::Add)]
    mode: ModeArg,
    #[arg(long, allow_hyphen_values = true)]
    level: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    potential: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    skill: Option<String>,
    #[arg(long = "living-skill", allow_hyphen_values = true)]
    living_skill: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    strength: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    endurance: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    agility: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    precision: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    intelligence: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    willpower: Option<String>,
    /// Write edits back to SAV.DAT.
    #[arg(long, conflicts_with = "output")]
    write: bool,
    /// Write edits to a different file.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long = "no-backup")]
    no_backup: bool,
}

impl Cli {
    fn field_edits(&self) -> Vec<(EditableField, &str)> {
        [
            (EditableField::Level, &self.level),
            (EditableField::PotentialPoint, &self.potential),
            (EditableField::SkillPoint, &self.skill),
            (EditableField::LivingSkillPoint, &self.living_skill),
            (EditableField::Strength, &self.strength),
            (EditableField::Endurance, &self.endurance),
            (EditableField::Agility, &self.agility),
            (EditableField::Precision, &self.precision),
            (EditableField::Intelligence, &self.intelligence),
            (EditableField::Willpower, &self.willpower),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            player_team: self.player_team,
            dead_records: if self.keep_dead {
                DeadRecordPolicy::Retain
            } else {
                DeadRecordPolicy::Prune
            },
            ..StoreConfig::default()
        }
    }

    fn roster_query(&self) -> RosterQuery {
        let mut sort = SortState::new();
        for key in &self.sort {
            sort.request(key);
        }

        RosterQuery {
            team: if self.all {
                None
            } else {
                Some(self.team.unwrap_or(self.player_team))
            },
            name_contains: self.search.clone(),
            min_level: self.min_level,
            underscore_only: self.underscore,
            sort: sort.spec().cloned(),
        }
    }

    fn meta_selection(&self) -> MetaSelection {
        MetaSelection {
            gold: self.gold,
            reputation: self.reputation,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let field_edits = cli.field_edits();
    let has_selection = cli.select_listed || !cli.select.is_empty();
    let has_meta_edits = cli.set_gold.is_some() || cli.set_reputation.is_some();
    let has_edits = has_meta_edits || !field_edits.is_empty();

    if !field_edits.is_empty() && !has_selection {
        eprintln!("field values require --select <IDX,...> or --select-listed");
        process::exit(2);
    }
    if has_selection && field_edits.is_empty() {
        eprintln!("--select/--select-listed require at least one field value");
        process::exit(2);
    }
    if has_edits && !cli.write && cli.output.is_none() {
        eprintln!("edits require --write or --output <PATH>");
        process::exit(2);
    }
    if !has_edits && (cli.write || cli.output.is_some()) {
        eprintln!("--write/--output require at least one edit");
        process::exit(2);
    }

    let mut store = SaveStore::with_config(cli.store_config());
    if let Err(e) = store.load(&cli.path) {
        eprintln!("Error loading save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    }

    let query = cli.roster_query();

    if let Some(raw) = cli.set_gold.as_deref() {
        let stored = store.set_gold(raw).unwrap_or_else(|e| {
            eprintln!("Error applying gold edit: {e}");
            process::exit(1);
        });
        log::info!("gold set to {stored}");
    }
    if let Some(raw) = cli.set_reputation.as_deref() {
        let stored = store.set_reputation(raw).unwrap_or_else(|e| {
            eprintln!("Error applying reputation edit: {e}");
            process::exit(1);
        });
        log::info!("reputation set to {stored}");
    }

    let mut status = Vec::new();
    if !field_edits.is_empty() {
        let targets: Vec<usize> = if cli.select_listed {
            loaded(&store)
                .query(&query)
                .into_iter()
                .map(|(index, _)| index)
                .collect()
        } else {
            cli.select.clone()
        };
        let mode = match cli.mode {
            ModeArg::Add => EditMode::Add,
            ModeArg::Set => EditMode::Set,
        };
        let edit = field_edits
            .iter()
            .fold(BulkEdit::new(mode), |edit, &(field, value)| {
                edit.with_field(field, value)
            });

        let count = store.bulk_edit(&targets, &edit).unwrap_or_else(|e| {
            eprintln!("Error applying bulk edit: {e}");
            process::exit(1);
        });
        status.push(format!("Applied changes to {count} record(s)"));
    }

    if has_edits {
        let options = SaveOptions {
            path: cli.output.clone(),
            make_backup: !cli.no_backup,
        };
        let report = store.save(&options).unwrap_or_else(|e| {
            eprintln!("Error writing save: {e}");
            process::exit(1);
        });
        status.push(format!("Wrote edited save to {}", report.destination.display()));
        if let Some(backup) = report.backup {
            status.push(format!("Backup written to {}", backup.display()));
        }
    }

    let session = loaded(&store);
    let meta = cli.meta_selection();

    if cli.json {
        let json = if meta.is_any_selected() {
            render_json_meta(session, &meta, JsonStyle::CanonicalV1)
        } else {
            render_json_full(session, &query, JsonStyle::CanonicalV1)
        };
        print_json(&json);
        return;
    }

    if meta.is_any_selected() {
        print!("{}", render_meta_text(session, &meta));
        return;
    }

    if has_edits {
        for line in &status {
            println!("{line}");
        }
        return;
    }

    print!(
        "{}",
        render_text_with_options(
            session,
            &query,
            TextStyle::Table,
            TextRenderOptions {
                base_stats: cli.base_stats,
            },
        )
    );
}

fn loaded(store: &SaveStore) -> &Session {
    store.session().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    })
}

fn print_json(json: &JsonValue) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}
