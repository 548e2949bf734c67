//! Qozy CLI
//!
//! Command-line interface for inspecting and configuring a Qozy daemon.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufReader, Stdout, Write};
use std::path::PathBuf;
use std::process::{Command, ExitCode};

use clap::{Parser, Subcommand};
use qozy_client::{
    colored_bool, display_field, italic, validate, Bridge, CliWriter, Client, ClientError, Dict,
    List, PromptError, SchemaNode, SchemaPrompter, StreamIo, Styled, Table, Thing, ValidateError,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn, Level};

/// Editor used for settings when `EDITOR` is not set.
const DEFAULT_EDITOR: &str = "vim";

#[derive(Parser)]
#[command(name = "qozy")]
#[command(about = "Qozy command line interface")]
#[command(version)]
struct Cli {
    /// Daemon host
    #[arg(long, env = "QOZY_REMOTE_HOST", default_value = "localhost")]
    host: String,

    /// Daemon port
    #[arg(long, env = "QOZY_REMOTE_PORT", default_value_t = 9876)]
    port: u16,

    /// Disable ANSI colors in output
    #[arg(long = "no-colors")]
    no_colors: bool,

    /// Log requests to stderr
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show, configure or remove a bridge
    Bridge {
        id: String,

        #[command(subcommand)]
        command: Option<BridgeCommand>,
    },

    /// List bridges, add one, or list available bridge types
    Bridges {
        #[command(subcommand)]
        command: Option<BridgesCommand>,
    },

    /// Show or change a thing
    Thing {
        id: String,

        #[command(subcommand)]
        command: Option<ThingCommand>,
    },

    /// List things, their tags, or scan for new ones
    Things {
        /// Only things carrying this tag (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        #[command(subcommand)]
        command: Option<ThingsCommand>,
    },

    /// List notifications
    Notifications,

    /// List triggers
    Triggers,

    /// Show a rule or attach a trigger to it
    Rule {
        id: String,

        #[command(subcommand)]
        command: Option<RuleCommand>,
    },

    /// List rules or add one
    Rules {
        #[command(subcommand)]
        command: Option<RulesCommand>,
    },

    /// List plugins
    Plugins,
}

#[derive(Subcommand)]
enum BridgeCommand {
    /// Print the bridge settings, their schema, or set them
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommand>,
    },

    /// Remove the bridge
    Remove,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the JSON Schema of the settings
    Schema,

    /// Replace the settings (opens $EDITOR unless -i or --answers is given)
    Set {
        /// Answer one question per setting instead of editing JSON
        #[arg(long, short)]
        interactive: bool,

        /// Replay answers from a file, one line per question
        #[arg(long, conflicts_with = "interactive")]
        answers: Option<PathBuf>,

        /// Submit without validating against the schema
        #[arg(long)]
        skip_validation: bool,
    },
}

#[derive(Subcommand)]
enum BridgesCommand {
    /// Add a bridge of the given type
    Add { bridge_type: String },

    /// List bridge types the daemon can create
    Types,
}

#[derive(Subcommand)]
enum ThingCommand {
    /// Apply a value to a channel (`on`/`off` for switches, JSON otherwise)
    Set {
        channel: String,

        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Remove the thing
    Remove,

    /// Rename the thing
    Name { name: String },

    /// Add or remove tags, then list them
    Tags {
        #[arg(long, short)]
        add: Vec<String>,

        #[arg(long, short)]
        remove: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ThingsCommand {
    /// List all tags in use
    Tags,

    /// Ask bridges to look for new things
    Scan,
}

#[derive(Subcommand)]
enum RuleCommand {
    /// Attach a trigger to the rule
    AddTrigger { trigger_id: String },
}

#[derive(Subcommand)]
enum RulesCommand {
    /// Create an empty rule and print its id
    Add,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error("cannot read answers from {path}: {source}")]
    Answers {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot run editor '{editor}': {source}")]
    Editor {
        editor: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// Already reported to the operator.
    #[error("aborted")]
    Aborted { code: i32 },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Client(e) => e.exit_code(),
            CliError::Prompt(e) => e.exit_code(),
            CliError::Validate(e) => e.exit_code(),
            CliError::Json(_) => 2,
            CliError::Answers { .. } | CliError::Editor { .. } | CliError::Io(_) => 3,
            CliError::Aborted { code } => *code,
        }
    }
}

struct Session {
    client: Client,
    out: CliWriter<Stdout>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut out = CliWriter::new(io::stdout());
    if cli.no_colors {
        out.disable_colors();
    }

    let client = match Client::connect(&cli.host, cli.port) {
        Ok(client) => client,
        Err(e @ ClientError::Connect { .. }) => {
            debug!(error = %e, "connection failed");
            if let Err(write_error) = out.alert(&format!(
                "Could not connect to Qozy daemon at {}:{}",
                cli.host, cli.port
            )) {
                warn!(error = %write_error, "could not report connection failure");
            }
            return exit_code(e.exit_code());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code(e.exit_code());
        }
    };

    let mut session = Session { client, out };

    let result = match cli.command {
        Commands::Bridge { id, command } => run_bridge(&mut session, &id, command),
        Commands::Bridges { command } => run_bridges(&mut session, command),
        Commands::Thing { id, command } => run_thing(&mut session, &id, command),
        Commands::Things { tags, command } => run_things(&mut session, &tags, command),
        Commands::Notifications => run_notifications(&mut session),
        Commands::Triggers => run_triggers(&mut session),
        Commands::Rule { id, command } => run_rule(&mut session, &id, command),
        Commands::Rules { command } => run_rules(&mut session, command),
        Commands::Plugins => run_plugins(&mut session),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Aborted { code }) => exit_code(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(e.exit_code())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Tell the operator and stop with `code`.
fn abort(session: &mut Session, message: &str, code: i32) -> Result<(), CliError> {
    session.out.alert(message)?;
    Err(CliError::Aborted { code })
}

fn print_json(session: &mut Session, value: &Value) -> Result<(), CliError> {
    session.out.writeline(serde_json::to_string_pretty(value)?)?;
    Ok(())
}

// --- Bridges ---

fn run_bridge(
    session: &mut Session,
    id: &str,
    command: Option<BridgeCommand>,
) -> Result<(), CliError> {
    let bridge = session.client.bridge(id)?;

    match command {
        Some(BridgeCommand::Settings { command: None }) => print_json(session, &bridge.settings),
        Some(BridgeCommand::Settings {
            command: Some(SettingsCommand::Schema),
        }) => print_json(session, &bridge.settings_schema),
        Some(BridgeCommand::Settings {
            command:
                Some(SettingsCommand::Set {
                    interactive,
                    answers,
                    skip_validation,
                }),
        }) => set_bridge_settings(session, &bridge, interactive, answers, skip_validation),
        Some(BridgeCommand::Remove) => {
            session.client.remove_bridge(&bridge.id)?;
            session
                .out
                .success(&format!("Bridge \"{}\" removed.", bridge.id))?;
            Ok(())
        }
        None => show_bridge(session, &bridge),
    }
}

fn show_bridge(session: &mut Session, bridge: &Bridge) -> Result<(), CliError> {
    let things = session.client.bridge_things(&bridge.id)?;
    let active = session.client.bridge_running(&bridge.id)?;

    let mut dict = Dict::new();
    dict.add("Id", &bridge.id)
        .add("Active", colored_bool(active))
        .add("Vendor", &bridge.vendor_prefix)
        .add("Things", things.len().to_string());
    dict.write(&mut session.out)?;

    if !things.is_empty() {
        session.out.headline("Things")?;

        let mut table = Table::new(&["ID", "ONLINE", "CHANNELS"]);
        for thing in &things {
            let online = session.client.thing_online(&thing.id)?;
            table.row(vec![
                Styled::from(&thing.id),
                colored_bool(online),
                thing.channels.len().to_string().into(),
            ]);
        }
        table.write(&mut session.out)?;
    }

    Ok(())
}

fn set_bridge_settings(
    session: &mut Session,
    bridge: &Bridge,
    interactive: bool,
    answers: Option<PathBuf>,
    skip_validation: bool,
) -> Result<(), CliError> {
    let settings = if interactive || answers.is_some() {
        let schema = SchemaNode::parse(&bridge.settings_schema).map_err(PromptError::from)?;
        debug!(bridge = %bridge.id, kind = schema.kind_name(), "collecting settings");

        let colors = session.out.colors();
        match answers {
            Some(path) => {
                let file = File::open(&path).map_err(|source| CliError::Answers {
                    path: path.clone(),
                    source,
                })?;
                let mut io = StreamIo::new(BufReader::new(file), io::stdout());
                SchemaPrompter::new(&mut io)
                    .colors(colors)
                    .read(&schema, "", false)?
            }
            None => {
                let mut io = StreamIo::terminal();
                SchemaPrompter::new(&mut io)
                    .colors(colors)
                    .read(&schema, "", false)?
            }
        }
    } else {
        match edit_in_editor(&bridge.settings)? {
            Some(settings) => settings,
            None => return abort(session, "Couldn't parse settings", 2),
        }
    };

    if !skip_validation {
        if let Err(e) = validate(&bridge.settings_schema, &settings) {
            match &e {
                ValidateError::Invalid { errors } => {
                    eprintln!("Validation failed:");
                    for error in errors {
                        eprintln!("  {}", error);
                    }
                }
                ValidateError::InvalidSchema { .. } => eprintln!("Error: {}", e),
            }
            return Err(CliError::Aborted { code: e.exit_code() });
        }
    }

    match session.client.set_bridge_settings(&bridge.id, &settings) {
        Ok(()) => {
            session
                .out
                .success(&format!("Updated settings for bridge \"{}\"", bridge.id))?;
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "settings update rejected");
            abort(
                session,
                &format!("Couldn't update settings for bridge \"{}\"", bridge.id),
                e.exit_code(),
            )
        }
    }
}

/// Let the operator edit `settings` as JSON. `None` if the result does not parse.
fn edit_in_editor(settings: &Value) -> Result<Option<Value>, CliError> {
    let mut file = tempfile::Builder::new()
        .prefix("qozy-settings-")
        .suffix(".json")
        .tempfile()?;
    file.write_all(serde_json::to_string_pretty(settings)?.as_bytes())?;
    file.flush()?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| DEFAULT_EDITOR.to_string());
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or(DEFAULT_EDITOR);

    let status = Command::new(program)
        .args(words)
        .arg(file.path())
        .status()
        .map_err(|source| CliError::Editor {
            editor: editor.clone(),
            source,
        })?;
    if !status.success() {
        warn!(%status, editor = %editor, "editor exited unsuccessfully");
    }

    let content = fs::read_to_string(file.path())?;
    Ok(serde_json::from_str(&content).ok())
}

fn run_bridges(session: &mut Session, command: Option<BridgesCommand>) -> Result<(), CliError> {
    match command {
        Some(BridgesCommand::Add { bridge_type }) => {
            match session.client.add_bridge(&bridge_type) {
                Ok(bridge) => {
                    session
                        .out
                        .success(&format!("Added bridge, id \"{}\"", bridge.id))?;
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "bridge creation failed");
                    abort(session, "Could not add bridge", e.exit_code())
                }
            }
        }
        Some(BridgesCommand::Types) => {
            let types: List = session.client.bridge_types()?.into_iter().collect();
            types.write(&mut session.out)?;
            Ok(())
        }
        None => {
            let mut table = Table::new(&["ID", "ACTIVE", "VENDOR", "THINGS"]);
            for bridge in session.client.bridges()? {
                let active = session.client.bridge_running(&bridge.id)?;
                let things = session.client.bridge_things(&bridge.id)?;
                table.row(vec![
                    Styled::from(&bridge.id),
                    colored_bool(active),
                    Styled::from(&bridge.vendor_prefix),
                    things.len().to_string().into(),
                ]);
            }
            table.write(&mut session.out)?;
            Ok(())
        }
    }
}

// --- Things ---

fn run_thing(
    session: &mut Session,
    id: &str,
    command: Option<ThingCommand>,
) -> Result<(), CliError> {
    let thing = session.client.thing(id)?;

    match command {
        Some(ThingCommand::Set { channel, value }) => {
            let applied = apply_channel_value(&session.client, &thing, &channel, &value);

            match applied {
                Ok(()) => {
                    session.out.success(&format!(
                        "Applied value \"{}\" to \"{}\", channel \"{}\"",
                        value, thing.id, channel
                    ))?;
                    Ok(())
                }
                Err(e) => abort(
                    session,
                    &format!("Couldn't set value, reason: {}", e),
                    e.exit_code(),
                ),
            }
        }
        Some(ThingCommand::Remove) => {
            session.client.remove_thing(&thing.id)?;
            session
                .out
                .success(&format!("Thing \"{}\" removed.", thing.id))?;
            Ok(())
        }
        Some(ThingCommand::Name { name }) => {
            if session.client.rename_thing(&thing.id, &name)? {
                session
                    .out
                    .success(&format!("Thing \"{}\" renamed to \"{}\".", thing.id, name))?;
                Ok(())
            } else {
                abort(
                    session,
                    &format!("Thing \"{}\" was not renamed.", thing.id),
                    1,
                )
            }
        }
        Some(ThingCommand::Tags { add, remove }) => {
            let mut tags = thing.tags.clone();
            for tag in &add {
                tags = session.client.add_thing_tag(&thing.id, tag)?;
            }
            for tag in &remove {
                tags = session.client.remove_thing_tag(&thing.id, tag)?;
            }

            session.out.headline("Tags")?;
            let list: List = tags.into_iter().collect();
            list.write(&mut session.out)?;
            Ok(())
        }
        None => {
            let online = session.client.thing_online(&thing.id)?;

            let mut dict = Dict::new();
            dict.add("Id", &thing.id)
                .add("Bridge", &thing.bridge_id)
                .add("Online", colored_bool(online))
                .add("Channels", thing.channels.len().to_string());
            dict.write(&mut session.out)?;

            session.out.newline()?;

            let mut table = Table::new(&["NAME", "SENSOR", "VALUE"]);
            for channel in thing.channels.values() {
                table.row(vec![
                    Styled::from(&channel.name),
                    colored_bool(channel.sensor),
                    display_field(&channel.value).into(),
                ]);
            }
            table.write(&mut session.out)?;

            if !thing.tags.is_empty() {
                session.out.headline("Tags")?;
                let list: List = thing.tags.iter().collect();
                list.write(&mut session.out)?;
            }
            Ok(())
        }
    }
}

fn apply_channel_value(
    client: &Client,
    thing: &Thing,
    channel: &str,
    raw: &str,
) -> Result<(), CliError> {
    let target = thing
        .channel(channel)
        .ok_or_else(|| ClientError::UnknownChannel {
            thing: thing.id.clone(),
            channel: channel.to_string(),
        })?;
    let value = target.parse_value(raw)?;
    client.apply_channel(&thing.id, &target.name, &value)?;
    Ok(())
}

fn run_things(
    session: &mut Session,
    tags: &[String],
    command: Option<ThingsCommand>,
) -> Result<(), CliError> {
    match command {
        Some(ThingsCommand::Tags) => {
            let in_use: BTreeSet<String> = if tags.is_empty() {
                session.client.tags()?.into_iter().collect()
            } else {
                session
                    .client
                    .things(tags)?
                    .into_iter()
                    .flat_map(|thing| thing.tags)
                    .collect()
            };
            let list: List = in_use.into_iter().collect();
            list.write(&mut session.out)?;
            Ok(())
        }
        Some(ThingsCommand::Scan) => {
            session.client.scan()?;
            Ok(())
        }
        None => {
            let mut table = Table::new(&["ID", "NAME", "ONLINE", "CHANNELS"]);
            for thing in session.client.things(tags)? {
                let online = session.client.thing_online(&thing.id)?;
                let name = match &thing.name {
                    Some(name) => Styled::from(name),
                    None => italic("<not set>"),
                };
                table.row(vec![
                    Styled::from(&thing.id),
                    name,
                    colored_bool(online),
                    thing.channels.len().to_string().into(),
                ]);
            }
            table.write(&mut session.out)?;
            Ok(())
        }
    }
}

// --- Notifications, triggers, rules, plugins ---

fn run_notifications(session: &mut Session) -> Result<(), CliError> {
    let mut table = Table::new(&["CREATED", "TITLE", "SUMMARY", "DISMISSABLE"]);
    for notification in session.client.notifications()? {
        table.row(vec![
            display_field(&notification.created).into(),
            Styled::from(&notification.title),
            Styled::from(&notification.summary),
            colored_bool(notification.dismissable),
        ]);
    }
    table.write(&mut session.out)?;
    Ok(())
}

fn run_triggers(session: &mut Session) -> Result<(), CliError> {
    let mut table = Table::new(&["ID", "EVENT NAME"]);
    for trigger in session.client.triggers()? {
        table.row(vec![
            Styled::from(&trigger.id),
            Styled::from(&trigger.event_name),
        ]);
    }
    table.write(&mut session.out)?;
    Ok(())
}

fn run_rules(session: &mut Session, command: Option<RulesCommand>) -> Result<(), CliError> {
    match command {
        Some(RulesCommand::Add) => {
            let rule = session.client.add_rule()?;
            session.out.writeline(rule.id)?;
            Ok(())
        }
        None => {
            let mut table = Table::new(&["ID", "NAME", "TRIGGERS", "ACTIONS"]);
            for rule in session.client.rules()? {
                table.row(vec![
                    Styled::from(&rule.id),
                    rule.name.unwrap_or_default().into(),
                    rule.triggers.len().to_string().into(),
                    rule.actions.len().to_string().into(),
                ]);
            }
            table.write(&mut session.out)?;
            Ok(())
        }
    }
}

fn run_rule(
    session: &mut Session,
    id: &str,
    command: Option<RuleCommand>,
) -> Result<(), CliError> {
    let rule = session.client.rule(id)?;

    match command {
        Some(RuleCommand::AddTrigger { trigger_id }) => {
            let trigger = session.client.trigger(&trigger_id)?;
            session.client.add_rule_trigger(&rule.id, &trigger.id)?;
            session.out.success(&format!(
                "Successfully added trigger \"{}\" to rule \"{}\".",
                trigger.id, rule.id
            ))?;
            Ok(())
        }
        None => {
            let mut dict = Dict::new();
            dict.add("Id", &rule.id)
                .add("Name", rule.name.clone().unwrap_or_default())
                .add("Triggers", rule.triggers.len().to_string())
                .add("Actions", rule.actions.len().to_string());
            dict.write(&mut session.out)?;

            if !rule.triggers.is_empty() {
                session.out.headline("Triggers")?;
                let list: List = rule.triggers.iter().map(|t| t.id.as_str()).collect();
                list.write(&mut session.out)?;
            }
            Ok(())
        }
    }
}

fn run_plugins(session: &mut Session) -> Result<(), CliError> {
    let list: List = session.client.plugins()?.iter().map(display_field).collect();
    list.write(&mut session.out)?;
    Ok(())
}
