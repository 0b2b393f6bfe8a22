
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use mindmap::config::{ClientConfig, ConfigError, Environment};
use mindmap::net::api::ApiClient;
use mindmap::net::error::ApiError;
use mindmap::net::poll::{PollOptions, poll_for_content};
use mindmap::net::types::{Node, NodeOrder, Space, User};
use mindmap::render;
use mindmap::state::space::{Mutation, SpaceViewState};
use mindmap::state::spaces::SpacesListState;
use mindmap::state::{FormError, SubmitError};
use mindmap::tree;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Submit(#[from] SubmitError),
    #[error("{0}")]
    Form(#[from] FormError),
    #[error("invalid reorder entry `{0}`; expected NODE_ID=INDEX")]
    InvalidOrder(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "mindmap", about = "Mind map spaces, nodes and generated content")]
struct Cli {
    /// Overrides the base URL derived from the environment.
    #[arg(long, env = "MINDMAP_BASE_URL")]
    base_url: Option<String>,

    /// `development` or `production`; defaults to `MINDMAP_ENV`.
    #[arg(long = "env")]
    environment: Option<Environment>,

    /// Print raw JSON instead of rendered text.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

struct CliContext {
    api: ApiClient,
    poll: PollOptions,
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    Spaces(SpacesCommand),
    /// Render the node tree of one space.
    Tree(TreeArgs),
    Node(NodeCommand),
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct SpacesCommand {
    #[command(subcommand)]
    command: SpacesSubcommand,
}

#[derive(Subcommand, Debug)]
enum SpacesSubcommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Show {
        space_id: String,
    },
    Update {
        space_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        space_id: String,
    },
}

#[derive(Args, Debug)]
struct TreeArgs {
    space_id: String,
    /// Hide the children of this node; repeatable.
    #[arg(long = "collapse")]
    collapse: Vec<String>,
    /// Highlight this node and show its content below the tree.
    #[arg(long)]
    select: Option<String>,
}

#[derive(Args, Debug)]
struct NodeCommand {
    #[command(subcommand)]
    command: NodeSubcommand,
}

#[derive(Subcommand, Debug)]
enum NodeSubcommand {
    Show {
        space_id: String,
        node_id: String,
    },
    Add {
        space_id: String,
        title: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        content_html: Option<String>,
        /// Poll until the generated content is ready.
        #[arg(long, default_value_t = false)]
        wait: bool,
    },
    Edit {
        space_id: String,
        node_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Delete {
        space_id: String,
        node_id: String,
    },
    Reorder {
        space_id: String,
        /// Entries of the form NODE_ID=INDEX.
        #[arg(required = true)]
        orders: Vec<String>,
    },
    Poll {
        space_id: String,
        node_id: String,
        #[arg(long)]
        max_attempts: Option<u32>,
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
    Show { user_id: String },
    Create { email: String, name: String },
    Update { user_id: String, email: String, name: String },
    Delete { user_id: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(environment) = cli.environment {
        config = config.with_environment(environment);
    }
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url);
    }
    info!(environment = ?config.environment, base_url = %config.base_url, "mindmap client configured");

    let ctx = CliContext { api: ApiClient::from_config(&config)?, poll: config.poll, json: cli.json };

    match cli.command {
        Command::Spaces(spaces) => run_spaces(&ctx, spaces).await,
        Command::Tree(args) => run_tree(&ctx, args).await,
        Command::Node(node) => run_node(&ctx, node).await,
        Command::Users(users) => run_users(&ctx, users).await,
    }
}

// =============================================================================
// SPACES
// =============================================================================

async fn run_spaces(ctx: &CliContext, spaces: SpacesCommand) -> Result<(), CliError> {
    match spaces.command {
        SpacesSubcommand::List => {
            let mut list = SpacesListState::default();
            list.load(&ctx.api).await?;
            if ctx.json {
                return print_json(&list.items);
            }
            if list.items.is_empty() {
                println!("no spaces");
            }
            for space in &list.items {
                print!("{}", render::space_card(space));
            }
            Ok(())
        }
        SpacesSubcommand::Create { name, description } => {
            let mut list = SpacesListState::default();
            list.open_create();
            list.create.name = name;
            list.create.description = description.unwrap_or_default();
            let space = list.submit_create(&ctx.api).await?;
            print_space(ctx, &space)
        }
        SpacesSubcommand::Show { space_id } => {
            let space = ctx.api.get_space(&space_id).await?;
            print_space(ctx, &space)
        }
        SpacesSubcommand::Update { space_id, name, description } => {
            let space = ctx.api.update_space(&space_id, name.as_deref(), description.as_deref()).await?;
            print_space(ctx, &space)
        }
        SpacesSubcommand::Delete { space_id } => {
            ctx.api.delete_space(&space_id).await?;
            print_deleted(ctx, "space", &space_id)
        }
    }
}

fn print_space(ctx: &CliContext, space: &Space) -> Result<(), CliError> {
    if ctx.json {
        return print_json(space);
    }
    print!("{}", render::space_card(space));
    Ok(())
}

// =============================================================================
// TREE
// =============================================================================

async fn run_tree(ctx: &CliContext, args: TreeArgs) -> Result<(), CliError> {
    let mut view = SpaceViewState::new(args.space_id);
    view.load(&ctx.api).await?;
    if let Err(violation) = tree::check_well_formed(view.roots()) {
        warn!(space_id = %view.space_id, %violation, "server returned a malformed tree");
    }

    for node_id in &args.collapse {
        if !view.collapsed.contains(node_id) {
            view.toggle_collapsed(node_id);
        }
    }
    if let Some(node_id) = args.select.as_deref() {
        view.select_node(&ctx.api, node_id).await?;
    }

    if ctx.json {
        return print_json(&view.space);
    }
    print_tree(&view);
    if let Some(node) = view.detail.node.as_ref() {
        println!();
        print!("{}", render::node_detail(node));
    }
    Ok(())
}

fn print_tree(view: &SpaceViewState) {
    if let Some(space) = view.space.as_ref() {
        print!("{}", render::space_header(space, view.total_nodes()));
    }
    let forest = view.view();
    if forest.is_empty() {
        println!("(empty space)");
    } else {
        print!("{}", render::tree_text(&forest));
    }
}

// =============================================================================
// NODES
// =============================================================================

async fn run_node(ctx: &CliContext, node: NodeCommand) -> Result<(), CliError> {
    match node.command {
        NodeSubcommand::Show { space_id, node_id } => {
            let node = ctx.api.get_node(&space_id, &node_id).await?;
            print_node(ctx, &node)
        }
        NodeSubcommand::Add { space_id, title, parent, content_html, wait } => {
            let mut view = SpaceViewState::new(space_id);
            view.load(&ctx.api).await?;
            view.open_add(parent.as_deref())?;
            if let Some(form) = view.form_mut() {
                form.title = title;
                form.content = content_html.unwrap_or_default();
            }
            let mutation = view.submit_modal(&ctx.api).await?;
            if wait {
                if let Mutation::Created(created) = &mutation {
                    info!(node_id = %created.node_id, "waiting for generated content");
                    let ready = poll_for_content(&ctx.api, &view.space_id, &created.node_id, ctx.poll).await?;
                    return print_node(ctx, &ready);
                }
            }
            report_mutation(ctx, &view, &mutation)
        }
        NodeSubcommand::Edit { space_id, node_id, title, content } => {
            let mut view = SpaceViewState::new(space_id);
            view.load(&ctx.api).await?;
            view.open_edit(&ctx.api, &node_id).await?;
            if let Some(form) = view.form_mut() {
                if let Some(title) = title {
                    form.title = title;
                }
                if let Some(content) = content {
                    form.content = content;
                }
            }
            let mutation = view.submit_modal(&ctx.api).await?;
            report_mutation(ctx, &view, &mutation)
        }
        NodeSubcommand::Delete { space_id, node_id } => {
            let mut view = SpaceViewState::new(space_id);
            view.load(&ctx.api).await?;
            view.open_delete(&node_id)?;
            let mutation = view.submit_modal(&ctx.api).await?;
            report_mutation(ctx, &view, &mutation)
        }
        NodeSubcommand::Reorder { space_id, orders } => {
            let orders = orders.iter().map(|raw| parse_order(raw)).collect::<Result<Vec<_>, _>>()?;
            ctx.api.reorder_nodes(&space_id, &orders).await?;
            let mut view = SpaceViewState::new(space_id);
            view.load(&ctx.api).await?;
            if ctx.json {
                return print_json(&view.space);
            }
            print_tree(&view);
            Ok(())
        }
        NodeSubcommand::Poll { space_id, node_id, max_attempts, interval_ms } => {
            let mut options = ctx.poll;
            if let Some(max_attempts) = max_attempts {
                options.max_attempts = max_attempts;
            }
            if let Some(interval_ms) = interval_ms {
                options.interval = Duration::from_millis(interval_ms);
            }
            let node = poll_for_content(&ctx.api, &space_id, &node_id, options).await?;
            print_node(ctx, &node)
        }
    }
}

fn parse_order(raw: &str) -> Result<NodeOrder, CliError> {
    let invalid = || CliError::InvalidOrder(raw.to_owned());
    let (node_id, index) = raw.split_once('=').ok_or_else(invalid)?;
    let node_id = node_id.trim();
    if node_id.is_empty() {
        return Err(invalid());
    }
    let new_order_index = index.trim().parse::<i64>().map_err(|_| invalid())?;
    Ok(NodeOrder { node_id: node_id.to_owned(), new_order_index })
}

fn report_mutation(ctx: &CliContext, view: &SpaceViewState, mutation: &Mutation) -> Result<(), CliError> {
    match mutation {
        Mutation::Created(node) | Mutation::Updated(node) => {
            if ctx.json {
                return print_json(node);
            }
            let verb = if matches!(mutation, Mutation::Created(_)) { "created" } else { "updated" };
            match tree::depth_of(view.roots(), &node.node_id) {
                Some(depth) => println!("{verb} node {} at depth {depth}", node.node_id),
                None => println!("{verb} node {}", node.node_id),
            }
        }
        Mutation::Deleted(node_id) => return print_deleted(ctx, "node", node_id),
    }
    if !ctx.json {
        print_tree(view);
    }
    Ok(())
}

fn print_node(ctx: &CliContext, node: &Node) -> Result<(), CliError> {
    if ctx.json {
        return print_json(node);
    }
    print!("{}", render::node_detail(node));
    Ok(())
}

// =============================================================================
// USERS
// =============================================================================

async fn run_users(ctx: &CliContext, users: UsersCommand) -> Result<(), CliError> {
    match users.command {
        UsersSubcommand::List => {
            let users = ctx.api.list_users().await?;
            if ctx.json {
                return print_json(&users);
            }
            for user in &users {
                println!("{}", user_line(user));
            }
            Ok(())
        }
        UsersSubcommand::Show { user_id } => {
            let user = ctx.api.get_user(&user_id).await?;
            print_user(ctx, &user)
        }
        UsersSubcommand::Create { email, name } => {
            let user = ctx.api.create_user(&email, &name).await?;
            print_user(ctx, &user)
        }
        UsersSubcommand::Update { user_id, email, name } => {
            let user = ctx.api.update_user(&user_id, &email, &name).await?;
            print_user(ctx, &user)
        }
        UsersSubcommand::Delete { user_id } => {
            ctx.api.delete_user(&user_id).await?;
            print_deleted(ctx, "user", &user_id)
        }
    }
}

fn user_line(user: &User) -> String {
    format!("{}  {} <{}>", user.id, user.name, user.email)
}

fn print_user(ctx: &CliContext, user: &User) -> Result<(), CliError> {
    if ctx.json {
        return print_json(user);
    }
    println!("{}", user_line(user));
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_deleted(ctx: &CliContext, kind: &str, id: &str) -> Result<(), CliError> {
    if ctx.json {
        return print_json(&serde_json::json!({ "deleted": kind, "id": id }));
    }
    println!("deleted {kind} {id}");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
