use chrono::Utc;
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use unicode_width::UnicodeWidthStr;
use vvc::api::{
    CheckOutcome, CmdMessage, ConfigAction, ItemRow, MessageLevel, NewItem, SitePaths, VvcApi,
};
use vvc::config::VvcConfig;
use vvc::error::{Result, VvcError};
use vvc::store::fs::FileStore;

mod args;
use args::{Cli, Commands};

const HOME_ENV: &str = "VVC_HOME";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut api = init_api()?;

    match cli.command {
        Some(Commands::Init) => handle_init(&api),
        Some(Commands::Add {
            kind,
            slug,
            title,
            parent,
            status,
        }) => {
            let item = NewItem {
                kind: kind.into(),
                slug,
                title,
                parent,
                status: status.into(),
            };
            handle_add(&mut api, item)
        }
        Some(Commands::List) | None => handle_list(&api),
        Some(Commands::Show { ids }) => handle_show(&mut api, &ids, true),
        Some(Commands::Hide { ids }) => handle_show(&mut api, &ids, false),
        Some(Commands::Check { uri, logged_in }) => handle_check(&api, &uri, logged_in),
        Some(Commands::HiddenPages) => handle_hidden_pages(&api),
        Some(Commands::Activate) => handle_activate(&mut api),
        Some(Commands::Uninstall) => handle_uninstall(&mut api),
        Some(Commands::Config { key, value }) => handle_config(&api, key, value),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn site_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("org", "vvc", "vvc")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| VvcError::Api("Could not determine data directory".to_string()))
}

fn init_api() -> Result<VvcApi<FileStore>> {
    let site = site_dir()?;
    let config = VvcConfig::load(&site)?;
    let store = FileStore::new(site.clone());
    Ok(VvcApi::new(store, config, SitePaths::new(site)))
}

fn handle_init(api: &VvcApi<FileStore>) -> Result<()> {
    let result = api.init()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_add(api: &mut VvcApi<FileStore>, item: NewItem) -> Result<()> {
    let result = api.add_item(item)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(api: &VvcApi<FileStore>) -> Result<()> {
    let result = api.list_items()?;
    print_rows(&result.listed_items);
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(api: &mut VvcApi<FileStore>, ids: &[u64], show: bool) -> Result<()> {
    let result = if show {
        api.show_items(ids)?
    } else {
        api.hide_items(ids)?
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_check(api: &VvcApi<FileStore>, uri: &str, logged_in: bool) -> Result<()> {
    let result = api.check(uri, logged_in)?;
    print_messages(&result.messages);
    if let Some(check) = &result.check {
        print_check(check);
    }
    Ok(())
}

fn handle_hidden_pages(api: &VvcApi<FileStore>) -> Result<()> {
    let result = api.hidden_pages()?;
    for id in &result.hidden_page_ids {
        println!("{}", id);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_activate(api: &mut VvcApi<FileStore>) -> Result<()> {
    let result = api.activate()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_uninstall(api: &mut VvcApi<FileStore>) -> Result<()> {
    let result = api.uninstall()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(api: &VvcApi<FileStore>, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = api.config(action)?;
    if let (Some(config), true) = (&result.config, result.messages.is_empty()) {
        for key in VvcConfig::KEYS {
            println!("{} = {}", key, config.get(key).unwrap_or_default());
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn print_check(check: &CheckOutcome) {
    let status = check.response.status.to_string();
    let status = if check.response.not_found {
        status.red()
    } else {
        status.green()
    };
    println!("status: {}", status);
    println!("title: {}", check.document_title);
    if check.response.no_cache {
        println!("cache: no-cache");
    }
    if let Some(url) = &check.login_url {
        println!("login: {}", url);
    }
    if let Some(body) = &check.body {
        println!("{}", body);
    }
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const CELL_WIDTH: usize = 12;
const INHERITED_MARKER: &str = "⤴";

fn print_rows(rows: &[ItemRow]) {
    if rows.is_empty() {
        println!("No content found.");
        return;
    }

    for row in rows {
        let item = &row.item;
        let id_str = format!("{:>4}. ", item.id);
        let kind_str = format!("{:<5}", item.kind.as_str());

        // Own flag says visible but an ancestor hides it.
        let inherited = row.cell.visible && !row.reachable;
        let cell_text = if inherited {
            format!("{} {}", row.cell, INHERITED_MARKER)
        } else {
            row.cell.to_string()
        };
        let cell_padding = CELL_WIDTH.saturating_sub(cell_text.width());
        let cell_colored = if !row.cell.visible {
            cell_text.red()
        } else if inherited {
            cell_text.yellow()
        } else {
            cell_text.green()
        };

        let status = if item.status == vvc::model::PostStatus::Publish {
            String::new()
        } else {
            format!(" [{}]", item.status)
        };
        let title_content = format!("{} /{}{}", item.title, item.slug, status);

        let fixed_width = id_str.width() + kind_str.width() + 1 + CELL_WIDTH + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&title_content, available);
        let padding = available.saturating_sub(title_display.width());

        println!(
            "{}{} {}{}{}{}{}",
            id_str,
            kind_str.dimmed(),
            title_display,
            " ".repeat(padding),
            cell_colored,
            " ".repeat(cell_padding),
            format_time_ago(item.modified_at).dimmed()
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: chrono::DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = timeago::Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
